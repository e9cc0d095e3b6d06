//! First-write-wins cells.
//!
//! Several graph fields must keep the first value they are ever given and
//! ignore every later assignment (a node's simple name, its package). The
//! source universe feeds the same logical declaration to the graph many
//! times, and identity depends on the name not drifting between feedings.
//! [`SetOnce`] makes that rule a type instead of a scattered
//! `if field.is_none()` convention, and its [`set`](SetOnce::set) reports
//! whether the write landed so callers can surface the ambiguity when two
//! different values compete for the same cell.

/// A cell that accepts exactly one value; later writes are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetOnce<T>(Option<T>);

impl<T> SetOnce<T> {
    /// An unset cell.
    pub const fn empty() -> Self {
        SetOnce(None)
    }

    /// Store `value` if the cell is unset. Returns `true` when the write
    /// landed, `false` when an earlier value already occupies the cell (the
    /// earlier value is kept, `value` is dropped).
    pub fn set(&mut self, value: T) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(value);
        true
    }

    /// The stored value, if any.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    /// Whether a value has been stored.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl<T: Copy> SetOnce<T> {
    /// The stored value by copy, if any.
    #[inline]
    pub fn copied(&self) -> Option<T> {
        self.0
    }
}

impl<T> Default for SetOnce<T> {
    fn default() -> Self {
        Self::empty()
    }
}
