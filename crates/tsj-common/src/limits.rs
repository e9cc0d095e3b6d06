//! Centralized limits and thresholds for the tsj generator.
//!
//! Shared constants live here so the same value is never defined twice with
//! drifting copies. The graph core itself has no operation-count limits (its
//! algorithms terminate via caches and visited sets), so what remains is the
//! stack policy for the recursive walks.

/// Remaining-stack threshold below which recursive graph walks grow the
/// stack instead of risking overflow.
///
/// Substitution and the ancestor walks recurse along type structure, and
/// declaration files produced by generators can nest types hundreds of
/// levels deep, which is legitimate input. The walks call
/// `stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, ..)` rather than
/// imposing an arbitrary depth cutoff. 100 KiB leaves room for the deepest
/// single frame chain between checks.
pub const STACK_RED_ZONE: usize = 100 * 1024;

/// Size of each stack segment allocated when the red zone is hit.
///
/// 1 MiB per growth keeps allocations rare without holding large idle
/// segments for shallow graphs.
pub const STACK_GROWTH: usize = 1024 * 1024;
