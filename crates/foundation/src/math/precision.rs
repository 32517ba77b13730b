//! Deterministic float ordering.
//!
//! Geometry code sorts and deduplicates floating-point vertices; this module
//! provides the single ordering used for that so results do not depend on
//! signed zeros or NaN payloads.

use core::cmp::Ordering;

use super::Vec2;

/// Tolerance used by the 2D predicates when deciding "on the line" cases.
pub const GEOMETRY_EPSILON: f64 = 1.0e-9;

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        // Handles +0.0 and -0.0.
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats.
///
/// Prefer this any time you sort floats or use them in ordered keys.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// Lexicographic `(x, y)` ordering built on [`stable_total_cmp_f64`].
pub fn stable_cmp_vec2(a: Vec2, b: Vec2) -> Ordering {
    stable_total_cmp_f64(a.x, b.x).then_with(|| stable_total_cmp_f64(a.y, b.y))
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, stable_cmp_vec2, stable_total_cmp_f64};
    use crate::math::Vec2;
    use core::cmp::Ordering;

    #[test]
    fn canonicalizes_negative_zero() {
        assert_eq!(canonical_f64(-0.0), 0.0);
        assert_eq!(canonical_f64(0.0), 0.0);
    }

    #[test]
    fn stable_cmp_is_total_and_deterministic() {
        assert_eq!(stable_total_cmp_f64(1.0, 2.0), Ordering::Less);
        assert_eq!(stable_total_cmp_f64(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
    }

    #[test]
    fn vec2_orders_by_x_then_y() {
        let a = Vec2::new(1.0, 5.0);
        let b = Vec2::new(1.0, 2.0);
        let c = Vec2::new(0.0, 9.0);
        let mut pts = vec![a, b, c];
        pts.sort_by(|p, q| stable_cmp_vec2(*p, *q));
        assert_eq!(pts, vec![c, b, a]);
    }
}
