//! Saturating fixed-point arithmetic primitives.
//!
//! Every signal-path operation in resonar is built from two primitives:
//! a scaled multiply that widens to 64 bits before narrowing (the
//! intermediate product can never overflow), and saturating add/sub
//! (feedback loops whose gain transiently exceeds unity clamp instead
//! of wrapping).
//!
//! Gain values use Q formats: Q15 (`1.0 == 32768`) for filter and
//! density coefficients, Q31 (`1.0 ≈ i32::MAX`) for mixer gains.

/// Shift for Q15 gain values (`1.0 == 1 << 15`).
pub const Q15_SHIFT: u32 = 15;

/// One in Q15.
pub const Q15_ONE: i32 = 1 << Q15_SHIFT;

/// Shift for Q31 gain values.
pub const Q31_SHIFT: u32 = 31;

/// The closest representable value to 1.0 in Q31 (used as a full-scale
/// mixer gain; exact unity is not representable in signed Q31).
pub const GAIN_ONE_Q31: i32 = i32::MAX;

/// `(a * b) >> shift` for 32-bit operands, widened through i64 so the
/// intermediate product cannot overflow, then narrowed with saturation.
///
/// The arithmetic right shift rounds toward negative infinity, matching
/// the behavior the rest of the crate assumes for Q-format scaling.
#[inline]
pub fn mul32x32_shift(a: i32, b: i32, shift: u32) -> i32 {
    let wide = (i64::from(a) * i64::from(b)) >> shift;
    if wide > i64::from(i32::MAX) {
        i32::MAX
    } else if wide < i64::from(i32::MIN) {
        i32::MIN
    } else {
        wide as i32
    }
}

/// `(a * b) >> shift` for a 32-bit sample and a 16-bit coefficient.
///
/// Same widen-then-narrow contract as [`mul32x32_shift`]; the narrower
/// coefficient keeps the intermediate within 48 bits.
#[inline]
pub fn mul32x16_shift(a: i32, b: i16, shift: u32) -> i32 {
    let wide = (i64::from(a) * i64::from(b)) >> shift;
    if wide > i64::from(i32::MAX) {
        i32::MAX
    } else if wide < i64::from(i32::MIN) {
        i32::MIN
    } else {
        wide as i32
    }
}

/// Saturating addition: clamps to `i32::MIN..=i32::MAX` on overflow.
#[inline]
pub fn sat_add(a: i32, b: i32) -> i32 {
    a.saturating_add(b)
}

/// Saturating subtraction: clamps to `i32::MIN..=i32::MAX` on overflow.
#[inline]
pub fn sat_sub(a: i32, b: i32) -> i32 {
    a.saturating_sub(b)
}

/// Saturating absolute value; `sat_abs(i32::MIN) == i32::MAX` instead of
/// the negate-overflow a plain `abs()` would hit.
#[inline]
pub fn sat_abs(a: i32) -> i32 {
    if a == i32::MIN { i32::MAX } else { a.abs() }
}
