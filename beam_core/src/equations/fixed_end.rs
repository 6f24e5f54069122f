//! # Fixed-End (Clamped-Clamped) Beam Formulas
//!
//! Reactions and internal forces of a single element clamped at both ends.
//! The reactions are the finite-element load-vector contributions of the
//! element's own loads; the internal-force functions are the particular
//! solution that is added to the Hermite field during postprocessing.
//!
//! ## Notation
//!
//! - `L` = Element length
//! - `a` = Load position from the left end, `b = L - a`
//! - `w` = Line load intensity (positive downward)
//! - `P` = Point load (positive downward)
//! - `M0` = Applied couple (positive counter-clockwise)
//! - `c` = Centroid of a patch load, `h` = half of its loaded length
//!
//! ## Sign Conventions
//!
//! Reactions are returned in DOF order `[V1, M1, V2, M2]` as the forces the
//! clamps exert on the element: forces positive upward, moments positive
//! counter-clockwise. For a downward load `V1, V2 > 0`, `M1 > 0` and `M2 < 0`.
//!
//! ## References
//!
//! - Roark's Formulas for Stress and Strain, 8th Edition, Table 8.1 (fixed ends)
//! - Przemieniecki, Theory of Matrix Structural Analysis, Ch. 5

// =============================================================================
// FIXED-END REACTIONS
// =============================================================================

/// Fixed-end reactions for a uniform load w over the full element
///
/// ```text
///    ↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓ w
///  ▐═════════════════▌
///  M1                M2
/// ```
///
/// # Formulas
/// - V1 = V2 = wL/2
/// - M1 = wL²/12, M2 = -wL²/12
#[inline]
pub fn uniform_fixed_end_reactions(w: f64, l: f64) -> [f64; 4] {
    let v = w * l / 2.0;
    let m = w * l * l / 12.0;
    [v, m, v, -m]
}

/// Fixed-end reactions for a point load P at distance a from the left end
///
/// # Formulas (b = L - a)
/// - V1 = Pb²(3a + b)/L³
/// - M1 = Pab²/L²
/// - V2 = Pa²(a + 3b)/L³
/// - M2 = -Pa²b/L²
#[inline]
pub fn point_fixed_end_reactions(p: f64, a: f64, l: f64) -> [f64; 4] {
    let b = l - a;
    let l2 = l * l;
    let l3 = l2 * l;
    [
        p * b * b * (3.0 * a + b) / l3,
        p * a * b * b / l2,
        p * a * a * (a + 3.0 * b) / l3,
        -p * a * a * b / l2,
    ]
}

/// Fixed-end reactions for a uniform load w over the part [start, end]
///
/// ```text
///          ↓↓↓↓↓↓↓↓↓ w
///  ▐═══════════════════▌
///       start    end
///          ←─2h─→
///            c
/// ```
///
/// The point-load reactions are cubic in the load position, so integrating
/// them over the loaded zone is exact through the centroid offset c and the
/// half-width h:
///
/// ```text
/// ∫[c-h, c+h] f(a)·w da = w·(2h·f(c) + h³/3·f''(c))
/// ```
///
/// # Formulas
/// - V1 = w·(2h·(L³ - 3Lc² + 2c³)/L³ + h³/3·(12c - 6L)/L³)
/// - M1 = w·(2h·c(L - c)²/L²       + h³/3·(6c - 4L)/L²)
/// - V2 = w·(2h·c²(3L - 2c)/L³      + h³/3·(6L - 12c)/L³)
/// - M2 = -w·(2h·c²(L - c)/L²      + h³/3·(2L - 6c)/L²)
///
/// With start = 0 and end = L these reduce to the full uniform case.
#[inline]
pub fn patch_fixed_end_reactions(w: f64, start: f64, end: f64, l: f64) -> [f64; 4] {
    let c = (start + end) / 2.0;
    let h = (end - start) / 2.0;
    let l2 = l * l;
    let l3 = l2 * l;
    let h3 = h.powi(3) / 3.0;

    let v1 = 2.0 * h * (l3 - 3.0 * l * c * c + 2.0 * c.powi(3)) / l3 + h3 * (12.0 * c - 6.0 * l) / l3;
    let m1 = 2.0 * h * c * (l - c).powi(2) / l2 + h3 * (6.0 * c - 4.0 * l) / l2;
    let v2 = 2.0 * h * c * c * (3.0 * l - 2.0 * c) / l3 + h3 * (6.0 * l - 12.0 * c) / l3;
    let m2 = 2.0 * h * c * c * (l - c) / l2 + h3 * (2.0 * l - 6.0 * c) / l2;

    [w * v1, w * m1, w * v2, -w * m2]
}

/// Fixed-end reactions for a couple M0 (counter-clockwise) at distance a
///
/// Work-equivalent reactions from the slopes of the Hermite shape functions
/// at the load point, which is exact for an Euler-Bernoulli element.
///
/// # Formulas (ξ = a/L)
/// - V1 = 6M0·ξ(1 - ξ)/L
/// - M1 = -M0·(1 - ξ)(1 - 3ξ)
/// - V2 = -6M0·ξ(1 - ξ)/L
/// - M2 = -M0·ξ(3ξ - 2)
///
/// At midspan: V1 = 1.5M0/L, M1 = M2 = M0/4.
#[inline]
pub fn moment_fixed_end_reactions(m0: f64, a: f64, l: f64) -> [f64; 4] {
    let xi = a / l;
    let v = 6.0 * m0 * xi * (1.0 - xi) / l;
    [
        v,
        -m0 * (1.0 - xi) * (1.0 - 3.0 * xi),
        -v,
        -m0 * xi * (3.0 * xi - 2.0),
    ]
}

// =============================================================================
// CLAMPED-ELEMENT INTERNAL FORCES (load contribution left of the cut)
// =============================================================================

/// Moment and shear at x caused by the loads left of the cut, excluding the
/// end reactions: `(ΔM, ΔV)` to be subtracted from `R1·x - M1` and `R1`.
///
/// ```text
/// M(x) = R1·x - M1 - ΔM(x)
/// V(x) = R1 - ΔV(x)
/// ```
#[inline]
pub fn uniform_cut_effect(w: f64, x: f64) -> (f64, f64) {
    (w * x * x / 2.0, w * x)
}

/// Cut effect of a point load P at a (acts once the cut passes the load)
#[inline]
pub fn point_cut_effect(p: f64, a: f64, x: f64) -> (f64, f64) {
    if x > a {
        (p * (x - a), p)
    } else {
        (0.0, 0.0)
    }
}

/// Cut effect of a patch load w over [start, end]
#[inline]
pub fn patch_cut_effect(w: f64, start: f64, end: f64, x: f64) -> (f64, f64) {
    if x <= start {
        return (0.0, 0.0);
    }
    let loaded = x.min(end) - start;
    let resultant = w * loaded;
    let centroid = start + loaded / 2.0;
    (resultant * (x - centroid), resultant)
}

/// Cut effect of a counter-clockwise couple M0 at a
#[inline]
pub fn moment_cut_effect(m0: f64, a: f64, x: f64) -> (f64, f64) {
    if x > a {
        (m0, 0.0)
    } else {
        (0.0, 0.0)
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_reactions() {
        // 6 m element, 10 kN/m
        let r = uniform_fixed_end_reactions(10.0, 6.0);
        assert_relative_eq!(r[0], 30.0);
        assert_relative_eq!(r[1], 30.0);
        assert_relative_eq!(r[2], 30.0);
        assert_relative_eq!(r[3], -30.0);
    }

    #[test]
    fn test_point_load_midspan() {
        // P at midspan: V = P/2, M = PL/8
        let r = point_fixed_end_reactions(8.0, 2.0, 4.0);
        assert_relative_eq!(r[0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(r[1], 4.0, epsilon = 1e-12);
        assert_relative_eq!(r[2], 4.0, epsilon = 1e-12);
        assert_relative_eq!(r[3], -4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_point_load_asymmetric_equilibrium() {
        let (p, a, l) = (12.0, 1.0, 5.0);
        let r = point_fixed_end_reactions(p, a, l);
        // Vertical equilibrium
        assert_relative_eq!(r[0] + r[2], p, epsilon = 1e-12);
        // Moment equilibrium about the left end (ccw positive)
        assert_relative_eq!(r[1] + r[3] + r[2] * l - p * a, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn test_patch_full_length_matches_uniform() {
        let patch = patch_fixed_end_reactions(7.5, 0.0, 4.0, 4.0);
        let uniform = uniform_fixed_end_reactions(7.5, 4.0);
        for k in 0..4 {
            assert_relative_eq!(patch[k], uniform[k], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_patch_matches_many_point_loads() {
        let (w, s, e, l) = (3.0, 0.5, 2.25, 4.0);
        let exact = patch_fixed_end_reactions(w, s, e, l);

        let n = 4000;
        let dx = (e - s) / n as f64;
        let mut summed = [0.0; 4];
        for k in 0..n {
            let a = s + dx * (k as f64 + 0.5);
            let r = point_fixed_end_reactions(w * dx, a, l);
            for j in 0..4 {
                summed[j] += r[j];
            }
        }
        for j in 0..4 {
            assert_relative_eq!(exact[j], summed[j], max_relative = 1e-6);
        }
    }

    #[test]
    fn test_moment_midspan() {
        let r = moment_fixed_end_reactions(10.0, 2.0, 4.0);
        assert_relative_eq!(r[0], 1.5 * 10.0 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(r[1], 2.5, epsilon = 1e-12);
        assert_relative_eq!(r[2], -1.5 * 10.0 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(r[3], 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_moment_reactions_balance_applied_couple() {
        let (m0, a, l) = (5.0, 1.2, 3.0);
        let r = moment_fixed_end_reactions(m0, a, l);
        assert_relative_eq!(r[0] + r[2], 0.0, epsilon = 1e-12);
        // Σ moments about left end: M1 + M2 + V2·L + M0 = 0
        assert_relative_eq!(r[1] + r[3] + r[2] * l + m0, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_uniform_clamped_midspan_moment() {
        // M(L/2) = wL²/24 for a clamped-clamped element
        let (w, l) = (10.0, 6.0);
        let r = uniform_fixed_end_reactions(w, l);
        let x = l / 2.0;
        let (dm, dv) = uniform_cut_effect(w, x);
        assert_relative_eq!(r[0] * x - r[1] - dm, w * l * l / 24.0, epsilon = 1e-10);
        assert_relative_eq!(r[0] - dv, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_patch_cut_effect_beyond_patch() {
        let (dm, dv) = patch_cut_effect(2.0, 1.0, 3.0, 5.0);
        // Resultant 4 kN at 2 m, cut at 5 m
        assert_relative_eq!(dm, 12.0);
        assert_relative_eq!(dv, 4.0);
        assert_eq!(patch_cut_effect(2.0, 1.0, 3.0, 0.5), (0.0, 0.0));
    }
}
