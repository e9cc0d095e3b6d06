//! String interner for name deduplication.
//!
//! Type names, member names, and package names repeat heavily across a
//! binding-generation run ("name", "value", "Object", "java.lang", ...).
//! Interning them into a pool and passing around u32 handles (Atoms) removes
//! the duplicate allocations and turns every name comparison into an integer
//! comparison, which matters for the identity-sensitive paths (set-once name
//! cells, member dedup, binding lookups).

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Names that show up in virtually every declaration file fed to the
/// generator: source keywords and builtins, the target-side builtin type
/// names, common member names, and the generator's own sentinel names.
const COMMON_STRINGS: &[&str] = &[
    // Source-side builtins and keywords that leak into names
    "any",
    "boolean",
    "number",
    "string",
    "symbol",
    "object",
    "void",
    "null",
    "undefined",
    "this",
    "new",
    "constructor",
    "prototype",
    "toString",
    "valueOf",
    // Target-side builtin type names
    "Object",
    "String",
    "Number",
    "Boolean",
    "Array",
    "Function",
    "Promise",
    "Map",
    "Set",
    "Date",
    "RegExp",
    "Error",
    "Iterable",
    "Iterator",
    // Packages
    "java.lang",
    "java.util",
    // Type parameter names
    "T",
    "U",
    "K",
    "V",
    "E",
    "R",
    // Common member names
    "id",
    "name",
    "value",
    "length",
    "key",
    "index",
    "item",
    "data",
    "type",
    "target",
    "options",
    "callback",
    "handler",
    "message",
    "status",
    "result",
    "element",
    "event",
    "document",
    "window",
    "add",
    "remove",
    "get",
    "set",
    "addEventListener",
    "removeEventListener",
    // Generator sentinels
    "execute",
    "__type",
];

/// String interner that deduplicates strings and returns Atom handles.
///
/// # Example
/// ```
/// use tsj_common::interner::Interner;
/// let mut interner = Interner::new();
/// let a1 = interner.intern("Element");
/// let a2 = interner.intern("Element");
/// assert_eq!(a1, a2); // Same atom for same string
/// assert_eq!(interner.resolve(a1), "Element");
/// ```
#[derive(Default)]
pub struct Interner {
    /// Map from string to atom index
    map: FxHashMap<Arc<str>, Atom>,
    /// Vector of all interned strings (index 0 is empty string)
    strings: Vec<Arc<str>>,
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(1024),
        };
        // Index 0 is reserved for empty/none
        let empty: Arc<str> = Arc::from("");
        interner.strings.push(empty.clone());
        interner.map.insert(empty, Atom::NONE);
        interner
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Intern an owned String, avoiding allocation if possible.
    #[inline]
    pub fn intern_owned(&mut self, s: String) -> Atom {
        if let Some(&atom) = self.map.get(s.as_str()) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s.into_boxed_str());
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Resolve an Atom back to its string value.
    /// Returns empty string if atom is out of bounds (safety for error recovery).
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }

    /// Try to resolve an Atom, returning None if invalid.
    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0 as usize).map(|s| s.as_ref())
    }

    /// Get the number of interned strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the interner is empty (only has the empty string).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }

    /// Pre-intern the names common in binding-generation runs.
    /// Call this after creating the interner for better cache locality.
    pub fn intern_common(&mut self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedups() {
        let mut interner = Interner::new();
        let a = interner.intern("HTMLElement");
        let b = interner.intern("HTMLElement");
        let c = interner.intern("SVGElement");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(interner.resolve(a), "HTMLElement");
        assert_eq!(interner.resolve(c), "SVGElement");
    }

    #[test]
    fn test_empty_string_is_none() {
        let mut interner = Interner::new();
        assert_eq!(interner.intern(""), Atom::NONE);
        assert!(Atom::NONE.is_none());
        assert_eq!(interner.resolve(Atom::NONE), "");
    }

    #[test]
    fn test_intern_owned_matches_intern() {
        let mut interner = Interner::new();
        let a = interner.intern("Element");
        let b = interner.intern_owned("Element".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn test_try_resolve_out_of_bounds() {
        let interner = Interner::new();
        assert_eq!(interner.try_resolve(Atom(9999)), None);
        assert_eq!(interner.resolve(Atom(9999)), "");
    }

    #[test]
    fn test_intern_common_is_idempotent() {
        let mut interner = Interner::new();
        interner.intern_common();
        let len = interner.len();
        interner.intern_common();
        assert_eq!(interner.len(), len);
    }
}
