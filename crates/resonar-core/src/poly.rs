//! Horner-form fixed-point polynomial evaluation.
//!
//! The approximation layer ([`crate::approx`]) and the tone-filter
//! designer ([`crate::tone`]) both reduce transcendental functions to
//! short polynomials over a bounded domain. This module provides the one
//! evaluator they share.

use crate::fixed::{Q31_SHIFT, mul32x32_shift, sat_add, sat_sub};

/// Evaluates a polynomial in Horner form over fixed-point operands.
///
/// `coeffs` is ordered highest degree first; `x` is a fixed-point value
/// whose Q format is described by `mul_shift` (each Horner step computes
/// `(acc * x) >> mul_shift`). The result carries the Q format of the
/// coefficients and is finally scaled by `post_shift`: positive shifts
/// left (saturating), negative shifts right.
///
/// When `x == i32::MIN` and `mul_shift` is 31 — i.e. the input is exactly
/// −1.0 in Q31 — the evaluator switches to an alternating-sign
/// accumulation of the coefficients instead of multiplying by the input.
/// Negating −1.0 in Q31 is not representable, so this end point is kept
/// as its own branch with its own tests rather than folded into the
/// generic path.
///
/// All accumulation is saturating.
pub fn eval_polynomial(coeffs: &[i32], x: i32, mul_shift: u32, post_shift: i32) -> i32 {
    let acc = if x == i32::MIN && mul_shift == Q31_SHIFT {
        eval_at_negative_one(coeffs)
    } else {
        let mut acc = 0i32;
        for &c in coeffs {
            acc = sat_add(mul32x32_shift(acc, x, mul_shift), c);
        }
        acc
    };
    apply_post_shift(acc, post_shift)
}

/// Alternating-sign series for x == −1.0 exactly: the degree-(n−1−i)
/// term of `coeffs[i]` contributes with sign `(−1)^(n−1−i)`.
fn eval_at_negative_one(coeffs: &[i32]) -> i32 {
    let mut acc = 0i32;
    let n = coeffs.len();
    for (i, &c) in coeffs.iter().enumerate() {
        let degree = n - 1 - i;
        if degree % 2 == 0 {
            acc = sat_add(acc, c);
        } else {
            acc = sat_sub(acc, c);
        }
    }
    acc
}

fn apply_post_shift(value: i32, post_shift: i32) -> i32 {
    if post_shift >= 0 {
        let wide = i64::from(value) << post_shift.min(31);
        if wide > i64::from(i32::MAX) {
            i32::MAX
        } else if wide < i64::from(i32::MIN) {
            i32::MIN
        } else {
            wide as i32
        }
    } else {
        value >> (-post_shift).min(31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::Q15_ONE;

    // p(x) = 2x^2 + 3x + 4 with Q15 coefficients and Q15 x.
    const P_Q15: [i32; 3] = [2 * Q15_ONE, 3 * Q15_ONE, 4 * Q15_ONE];

    #[test]
    fn quadratic_at_simple_points() {
        // x = 1.0
        assert_eq!(eval_polynomial(&P_Q15, Q15_ONE, 15, 0), 9 * Q15_ONE);
        // x = 0
        assert_eq!(eval_polynomial(&P_Q15, 0, 15, 0), 4 * Q15_ONE);
        // x = -1.0 (generic path: mul_shift != 31)
        assert_eq!(eval_polynomial(&P_Q15, -Q15_ONE, 15, 0), 3 * Q15_ONE);
        // x = 0.5
        assert_eq!(
            eval_polynomial(&P_Q15, Q15_ONE / 2, 15, 0),
            6 * Q15_ONE // 2*0.25 + 3*0.5 + 4 = 6
        );
    }

    #[test]
    fn matches_f64_oracle_across_sweep() {
        for i in -100..=100 {
            let xf = f64::from(i) / 100.0;
            let x = (xf * f64::from(Q15_ONE)) as i32;
            let expected = 2.0 * xf * xf + 3.0 * xf + 4.0;
            let got = f64::from(eval_polynomial(&P_Q15, x, 15, 0)) / f64::from(Q15_ONE);
            assert!(
                (got - expected).abs() < 1e-3,
                "x = {xf}: got {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn negative_one_q31_uses_alternating_series() {
        // p(x) = x^3 + 2x^2 + 3x + 4 at x = −1 is −1 + 2 − 3 + 4 = 2.
        let coeffs = [1000, 2000, 3000, 4000];
        assert_eq!(eval_polynomial(&coeffs, i32::MIN, 31, 0), 2000);
    }

    #[test]
    fn negative_one_q31_agrees_with_nearby_input() {
        // The special branch must be continuous with the generic path:
        // evaluating at −1.0 and at −1.0 + 1ulp should agree closely.
        let coeffs = [12_345, -23_456, 34_567, 45_678];
        let exact = eval_polynomial(&coeffs, i32::MIN, 31, 0);
        let near = eval_polynomial(&coeffs, i32::MIN + 1, 31, 0);
        assert!(
            (exact - near).abs() < 8,
            "branch discontinuity: {exact} vs {near}"
        );
    }

    #[test]
    fn post_shift_scales_and_saturates() {
        let c = [1 << 20];
        assert_eq!(eval_polynomial(&c, 0, 15, 4), 1 << 24);
        assert_eq!(eval_polynomial(&c, 0, 15, -4), 1 << 16);
        // Large left shift saturates instead of wrapping.
        assert_eq!(eval_polynomial(&c, 0, 15, 20), i32::MAX);
        assert_eq!(eval_polynomial(&[-(1 << 20)], 0, 15, 20), i32::MIN);
    }

    #[test]
    fn empty_coefficients_yield_zero() {
        assert_eq!(eval_polynomial(&[], 123, 15, 0), 0);
    }
}
