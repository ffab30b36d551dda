//! Float comparison utilities shared across the crate.
//!
//! Every cost comparison in the planners goes through [`approx_eq`]: key
//! ordering, the local-consistency predicate, and world-point equality.
//! Strict `==` on accumulated f32 distances would make those predicates
//! brittle.

/// Absolute component of the comparison tolerance.
pub const ABS_TOL: f32 = 1e-5;

/// Relative component of the comparison tolerance.
pub const REL_TOL: f32 = 1e-5;

/// Saturating "no path" cost.
///
/// Finite on purpose: `g - rhs` and `min(g, rhs) + h` must stay NaN-free,
/// which `f32::INFINITY` cannot guarantee. Any reachable path cost is many
/// orders of magnitude below this, and sums of a handful of these stay far
/// from f32 overflow.
pub const COST_INFINITY: f32 = 1e12;

/// Approximate equality with an absolute-plus-relative epsilon.
///
/// The relative term keeps comparisons meaningful near [`COST_INFINITY`],
/// where f32 spacing is far coarser than any absolute tolerance.
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= ABS_TOL + REL_TOL * a.abs().max(b.abs())
}

/// `a < b` and not approximately equal.
#[inline]
pub fn definitely_less(a: f32, b: f32) -> bool {
    a < b && !approx_eq(a, b)
}
