//! Common foundation types for the tsj binding generator.
//!
//! This crate holds the pieces shared by every stage of the generator:
//!
//! - [`interner`]: string interning ([`Atom`] handles) for type, member, and
//!   package names, so name comparisons are integer comparisons.
//! - [`set_once`]: the [`SetOnce`] cell backing first-write-wins fields
//!   (simple names, package names).
//! - [`limits`]: centralized thresholds (stack growth for deep recursion).
//!
//! Nothing in here knows about the type graph itself; `tsj-graph` builds on
//! top of these.

pub mod interner;
pub mod limits;
pub mod set_once;

pub use interner::{Atom, Interner};
pub use set_once::SetOnce;
