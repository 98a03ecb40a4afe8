//! Fixed-point approximations of transcendental functions.
//!
//! Integer counterparts of the usual float helpers: each function trades
//! full precision for a short polynomial over a bounded domain, evaluated
//! by [`eval_polynomial`]. Accuracy is stated per function and verified
//! against `libm` references in the tests.
//!
//! | Function | Replaces | Use case | Max error |
//! |----------|----------|----------|-----------|
//! | [`exp2_q15`] | `exp2f` | mixer time constants, decay gains | < 0.2% ± ½ count |
//! | [`decay_gain_q15`] | `powf(10.0, ..)` | T60 → feedback gain | < 0.5% |
//! | [`tan_q26`] | `tanf` | bilinear filter design | < 1% for x ≤ 1.0 |

use crate::fixed::{Q15_ONE, mul32x32_shift, sat_abs};
use crate::poly::eval_polynomial;

/// `log2(10)` in Q15.
const LOG2_10_Q15: i64 = 108_853;

/// Minimax cubic for `2^f − 1`, f ∈ [0, 1), Q31 coefficients highest
/// degree first. Constant term is zero so integer inputs stay exact;
/// the remaining three coefficients are equiripple-fitted against the
/// relative error, < 0.02% across the interval.
const EXP2_FRAC_Q31: [i32; 4] = [163_437_970, 491_131_366, 1_492_236_890, 0];

/// One in Q26.
const ONE_Q26: i32 = 1 << 26;

/// Odd Taylor series for `tan(x)/x` in the squared argument `u = x²`:
/// `1 + u/3 + 2u²/15 + 17u³/315 + 62u⁴/2835`, Q26 coefficients highest
/// degree first.
const TAN_SERIES_Q26: [i32; 5] = [1_467_637, 3_621_748, 8_947_849, 22_369_621, ONE_Q26];

/// Base-2 exponential, Q15 in and out.
///
/// Splits the argument into integer and fractional parts:
/// `2^x = 2^⌊x⌋ · 2^frac(x)`. The integer part becomes a shift, the
/// fractional part a cubic polynomial. Inputs below −30 return 0; inputs
/// above +14 are clamped (the Q15 result saturates anyway).
///
/// The narrowing shift rounds to nearest, so the worst case is the
/// polynomial's < 0.02% plus half a count of the Q15 result. The half
/// count dominates for very negative arguments, where the result is only
/// a few counts wide.
pub fn exp2_q15(x_q15: i32) -> i32 {
    let x = x_q15.clamp(-30 * Q15_ONE, 14 * Q15_ONE);
    let i = x >> 15; // floor
    let frac_q15 = x - (i << 15); // in [0, Q15_ONE)
    let frac_q31 = eval_polynomial(&EXP2_FRAC_Q31, frac_q15 << 16, 31, 0);
    let p_q31 = (1i64 << 31) + i64::from(frac_q31);

    // 2^i in Q15 is a right shift of the Q31 mantissa by 16 − i; with
    // i ≤ 14 this is always a right shift, rounded to nearest.
    let shift = 16 - i;
    let shifted = (p_q31 + (1i64 << (shift - 1))) >> shift;
    if shifted > i64::from(i32::MAX) {
        i32::MAX
    } else {
        shifted as i32
    }
}

/// Feedback gain for a loop of `loop_ms` inside a tail that must decay
/// by 60 dB over `t60_ms`: `10^(−3·loop_ms/t60_ms)`, returned in Q15.
///
/// `t60_ms == 0` forces the gain to exactly zero — a zero decay time
/// means the tail dies within one loop traversal. The result is capped
/// one ulp below unity so a feedback path can never reach 1.0.
pub fn decay_gain_q15(loop_ms: u32, t60_ms: u32) -> i32 {
    if t60_ms == 0 {
        return 0;
    }
    // exponent in Q15: −3 · loop_ms · log2(10) / t60_ms
    let exp_q15 = -((3 * i64::from(loop_ms) * LOG2_10_Q15) / i64::from(t60_ms));
    let exp_q15 = exp_q15.clamp(i64::from(i32::MIN), 0) as i32;
    exp2_q15(exp_q15).min(Q15_ONE - 1)
}

/// Tangent for the bilinear transform, Q26 radians in and out.
///
/// Evaluates the odd series `x·(1 + x²/3 + 2x⁴/15 + 17x⁶/315 +
/// 62x⁸/2835)`. Valid for |x| ≤ ~1.1 rad; beyond that the truncation
/// error grows quickly as tan approaches its pole at π/2, so callers
/// gate the domain (see [`crate::tone`]) rather than extrapolate.
///
/// Evaluated on |x| with the sign restored afterward, so the result is
/// exactly odd despite the floor rounding of the fixed-point multiplies.
pub fn tan_q26(x_q26: i32) -> i32 {
    let mag = sat_abs(x_q26);
    let u_q26 = mul32x32_shift(mag, mag, 26);
    let series = eval_polynomial(&TAN_SERIES_Q26, u_q26, 26, 0);
    let y = mul32x32_shift(series, mag, 26);
    if x_q26 < 0 { -y } else { y }
}
