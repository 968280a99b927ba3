//! Closed-form real-root solvers for the offset engine.
//!
//! An equation with no real roots yields an empty list; callers treat that
//! as a valid outcome ("no inflection points"), never as an error.

use std::cmp::Ordering;

/// Slack when accepting roots just outside the unit interval.
const UNIT_EPSILON: f64 = 1e-6;

const COEFF_EPSILON: f64 = 1e-12;

/// Real roots of `a·t² + b·t + c = 0`.
pub(crate) fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < COEFF_EPSILON {
        if b.abs() < COEFF_EPSILON {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }
    if discriminant == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    let sq = discriminant.sqrt();
    vec![(-b + sq) / (2.0 * a), (-b - sq) / (2.0 * a)]
}

/// Real roots of `a·t³ + b·t² + c·t + d = 0`.
///
/// Uses the trigonometric form when all three roots are real and Cardano's
/// formula otherwise.
pub(crate) fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.abs() < COEFF_EPSILON {
        return solve_quadratic(b, c, d);
    }
    let b = b / a;
    let c = c / a;
    let d = d / a;

    // Depress: t = x + shift removes the quadratic term.
    let shift = -b / 3.0;
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;

    let discriminant = (q / 2.0) * (q / 2.0) + (p / 3.0) * (p / 3.0) * (p / 3.0);

    if discriminant > COEFF_EPSILON {
        // One real root.
        let sq = discriminant.sqrt();
        let u = (-q / 2.0 + sq).cbrt();
        let v = (-q / 2.0 - sq).cbrt();
        return vec![u + v + shift];
    }

    if discriminant.abs() <= COEFF_EPSILON {
        if p.abs() < COEFF_EPSILON {
            // Triple root.
            return vec![shift];
        }
        // Double root plus a simple one.
        return vec![3.0 * q / p + shift, -3.0 * q / (2.0 * p) + shift];
    }

    // Three distinct real roots (trigonometric form; p < 0 here).
    let m = 2.0 * (-p / 3.0).sqrt();
    let argument = (3.0 * q / (2.0 * p) * (-3.0 / p).sqrt()).clamp(-1.0, 1.0);
    let phi = argument.acos() / 3.0;
    (0..3)
        .map(|k| m * (phi - k as f64 * std::f64::consts::TAU / 3.0).cos() + shift)
        .collect()
}

/// Keep roots that land in the unit parameter interval.
///
/// Roots within a small slack outside `[0, 1]` are clamped in; near-equal
/// roots are deduplicated.
pub(crate) fn clamp_to_unit(mut roots: Vec<f64>) -> Vec<f64> {
    roots.retain(|t| t.is_finite() && *t >= -UNIT_EPSILON && *t <= 1.0 + UNIT_EPSILON);
    for t in roots.iter_mut() {
        *t = t.clamp(0.0, 1.0);
    }
    roots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    roots.dedup_by(|a, b| (*a - *b).abs() <= UNIT_EPSILON);
    roots
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quadratic_two_roots() {
        let mut roots = solve_quadratic(1.0, -3.0, 2.0);
        roots.sort_by(|a, b| a.partial_cmp(b).expect("finite"));
        assert_eq!(roots.len(), 2);
        assert_abs_diff_eq!(roots[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(roots[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quadratic_no_real_roots_is_empty() {
        assert!(solve_quadratic(1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_quadratic_degenerates_to_linear() {
        let roots = solve_quadratic(0.0, 2.0, -1.0);
        assert_eq!(roots.len(), 1);
        assert_abs_diff_eq!(roots[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_cubic_three_real_roots() {
        // (t - 1)(t - 2)(t - 3) = t³ - 6t² + 11t - 6
        let roots = sorted_roots(solve_cubic(1.0, -6.0, 11.0, -6.0));
        assert_eq!(roots.len(), 3);
        assert_abs_diff_eq!(roots[0], 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(roots[1], 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(roots[2], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cubic_single_real_root() {
        // t³ + t + 1 has one real root near -0.6823.
        let roots = solve_cubic(1.0, 0.0, 1.0, 1.0);
        assert_eq!(roots.len(), 1);
        assert_abs_diff_eq!(roots[0], -0.682_327_803_8, epsilon = 1e-9);
    }

    #[test]
    fn test_cubic_degenerates_to_quadratic() {
        let roots = sorted_roots(solve_quadratic(1.0, -1.0, 0.0));
        assert_eq!(roots.len(), 2);
        let via_cubic = sorted_roots(solve_cubic(0.0, 1.0, -1.0, 0.0));
        assert_eq!(via_cubic, roots);
    }

    #[test]
    fn test_clamp_to_unit_filters_and_dedupes() {
        let roots = clamp_to_unit(vec![-0.5, -1e-9, 0.3, 0.3 + 1e-9, 0.9, 1.2]);
        assert_eq!(roots.len(), 3);
        assert_abs_diff_eq!(roots[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(roots[1], 0.3, epsilon = 1e-8);
        assert_abs_diff_eq!(roots[2], 0.9, epsilon = 1e-12);
    }

    fn sorted_roots(mut roots: Vec<f64>) -> Vec<f64> {
        roots.sort_by(|a, b| a.partial_cmp(b).expect("finite"));
        roots
    }
}
