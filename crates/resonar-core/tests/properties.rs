//! Property-based tests for resonar-core fixed-point primitives.
//!
//! Checks saturating arithmetic against wide-integer oracles, polynomial
//! evaluation against floating point, and mixer ramp convergence, using
//! proptest for randomized input generation.

use proptest::prelude::*;
use resonar_core::{
    GAIN_ONE_Q31, MIX_TILE, MixGain, Q15_ONE, decay_gain_q15, design_high_pass, design_low_pass,
    eval_polynomial, exp2_q15, mul32x32_shift, sat_abs, sat_add, sat_sub,
};

fn clamp_i64(x: i64) -> i32 {
    x.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// The widening multiply agrees with an i64 oracle for every shift.
    #[test]
    fn mul_matches_i64_oracle(a in any::<i32>(), b in any::<i32>(), shift in 0u32..=31) {
        let oracle = clamp_i64((i64::from(a) * i64::from(b)) >> shift);
        prop_assert_eq!(mul32x32_shift(a, b, shift), oracle);
    }

    /// Saturating add and sub agree with i64 arithmetic clamped to i32.
    #[test]
    fn sat_ops_match_i64_oracle(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(sat_add(a, b), clamp_i64(i64::from(a) + i64::from(b)));
        prop_assert_eq!(sat_sub(a, b), clamp_i64(i64::from(a) - i64::from(b)));
    }

    /// Absolute value never goes negative, including at i32::MIN.
    #[test]
    fn sat_abs_is_nonnegative(a in any::<i32>()) {
        prop_assert!(sat_abs(a) >= 0);
        prop_assert_eq!(sat_abs(a), clamp_i64(i64::from(a).abs()));
    }

    /// Horner evaluation of a random cubic tracks the f64 result within
    /// accumulated rounding, away from the saturation rails.
    #[test]
    fn polynomial_tracks_f64(
        coeffs in prop::array::uniform4(-100_000i32..100_000),
        x in -(1i32 << 30)..(1 << 30),
    ) {
        let got = f64::from(eval_polynomial(&coeffs, x, 31, 0));
        let xf = f64::from(x) / f64::from(1u32 << 31);
        let mut want = 0.0f64;
        for &c in &coeffs {
            want = want * xf + f64::from(c);
        }
        prop_assert!(
            (got - want).abs() < 8.0,
            "coeffs {:?} at x={}: got {}, want {}", coeffs, x, got, want
        );
    }

    /// exp2 is monotone nondecreasing over the whole i32 input range.
    #[test]
    fn exp2_is_monotone(a in any::<i32>(), b in any::<i32>()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(exp2_q15(lo) <= exp2_q15(hi));
    }

    /// A decay gain is always a proper fraction for nonzero T60.
    #[test]
    fn decay_gain_is_proper_fraction(loop_ms in 0u32..=500, t60 in 1u32..=20_000) {
        let g = decay_gain_q15(loop_ms, t60);
        prop_assert!((0..Q15_ONE).contains(&g));
    }

    /// Filter design yields bounded Q15 coefficients with a stable pole
    /// for any corner below Nyquist. The corner range is derived from
    /// the sampled rate so every drawn case is in domain.
    #[test]
    fn filter_designs_are_stable((corner, rate) in prop::sample::select(
        vec![8000u32, 11_025, 12_000, 16_000, 22_050, 24_000, 32_000, 44_100, 48_000],
    ).prop_flat_map(|rate| (1u32..rate / 2, Just(rate)))) {
        for coeffs in [design_low_pass(corner, rate), design_high_pass(corner, rate)] {
            prop_assert!(coeffs.a0.abs() <= Q15_ONE);
            prop_assert!(coeffs.a1.abs() <= Q15_ONE);
            prop_assert!(coeffs.b1.abs() < Q15_ONE, "pole on or outside the unit circle");
        }
    }

    /// A ramp from any start toward any target stays within the segment
    /// between them and eventually lands exactly on the target.
    #[test]
    fn mix_gain_converges_within_bounds(
        start in any::<i32>(),
        target in any::<i32>(),
        tc_ms in 1u32..=200,
    ) {
        let mut gain = MixGain::new(start);
        gain.set_time_constant(tc_ms, 48_000);
        gain.set_target(target);
        let (lo, hi) = if start <= target { (start, target) } else { (target, start) };
        for _ in 0..2_000_000 {
            gain.advance_tile();
            prop_assert!((lo..=hi).contains(&gain.gain()));
            if gain.is_settled() {
                break;
            }
        }
        prop_assert!(gain.is_settled());
        prop_assert_eq!(gain.gain(), target);
    }

    /// Block scaling never exceeds the input magnitude for gains at or
    /// below unity.
    #[test]
    fn unity_scaling_never_amplifies(
        input in prop::collection::vec(any::<i32>(), 1..=4 * MIX_TILE),
        target in 0i32..=GAIN_ONE_Q31,
    ) {
        let mut gain = MixGain::new(target);
        let mut data = input.clone();
        gain.process_block(&mut data, 31);
        for (out, inp) in data.iter().zip(&input) {
            prop_assert!(i64::from(out.unsigned_abs()) <= i64::from(inp.unsigned_abs()));
        }
    }
}
