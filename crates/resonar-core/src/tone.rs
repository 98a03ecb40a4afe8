//! First-order shelving filter design via the bilinear transform.
//!
//! The corner frequency is prewarped with [`tan_q26`] and folded into a
//! three-tap recurrence `y[n] = a0·x[n] + a1·x[n−1] + b1·y[n−1]` with
//! Q15 coefficients. Filter state lives outside the coefficient set, in
//! caller-owned tap words, so one [`FirstOrderCoeffs`] can drive any
//! number of independent channels.

use crate::approx::tan_q26;
use crate::fixed::{Q15_ONE, mul32x32_shift, sat_add};

/// 2π in Q26.
pub const TAU_Q26: i32 = 421_657_428;

/// One radian in Q26. Corners whose prewarp argument `ω/2` exceeds this
/// are outside the tangent series' accurate range and collapse to the
/// identity filter instead.
pub const OMEGA_UNITY_Q26: i32 = 1 << 26;

const ONE_Q26: i32 = 1 << 26;

/// Q15 coefficients of a first-order IIR section.
///
/// The recurrence is `y[n] = a0·x[n] + a1·x[n−1] + b1·y[n−1]`, each
/// product taken in Q15 with saturation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirstOrderCoeffs {
    /// Feedforward gain on the current input.
    pub a0: i32,
    /// Feedforward gain on the previous input.
    pub a1: i32,
    /// Feedback gain on the previous output.
    pub b1: i32,
}

impl FirstOrderCoeffs {
    /// The filter that passes input through unchanged.
    #[must_use]
    pub const fn identity() -> Self {
        Self { a0: Q15_ONE, a1: 0, b1: 0 }
    }

    /// Runs one sample through the recurrence.
    ///
    /// `taps` holds `[x[n−1], y[n−1]]` and is updated in place. Must be
    /// at least two words long.
    #[inline]
    pub fn process_sample(&self, taps: &mut [i32], x: i32) -> i32 {
        debug_assert!(taps.len() >= 2);
        let y = sat_add(
            sat_add(
                mul32x32_shift(x, self.a0, 15),
                mul32x32_shift(taps[0], self.a1, 15),
            ),
            mul32x32_shift(taps[1], self.b1, 15),
        );
        taps[0] = x;
        taps[1] = y;
        y
    }

    /// Filters a block in place.
    pub fn process_block(&self, taps: &mut [i32], data: &mut [i32]) {
        for sample in data {
            *sample = self.process_sample(taps, *sample);
        }
    }
}

/// Digital angular frequency `ω = 2π·corner/rate` in Q26 radians.
#[must_use]
pub fn compute_omega(corner_hz: u32, sample_rate_hz: u32) -> i32 {
    let omega = i64::from(TAU_Q26) * i64::from(corner_hz) / i64::from(sample_rate_hz);
    if omega > i64::from(i32::MAX) {
        i32::MAX
    } else {
        omega as i32
    }
}

/// First-order low-pass with the given corner.
///
/// Corners at or above the series limit (see [`OMEGA_UNITY_Q26`]) sit in
/// the top octave below Nyquist where a first-order section barely
/// attenuates anyway, and degrade to [`FirstOrderCoeffs::identity`].
#[must_use]
pub fn design_low_pass(corner_hz: u32, sample_rate_hz: u32) -> FirstOrderCoeffs {
    let half_omega = compute_omega(corner_hz, sample_rate_hz) >> 1;
    if half_omega > OMEGA_UNITY_Q26 {
        return FirstOrderCoeffs::identity();
    }
    let w = tan_q26(half_omega);
    let denom = i64::from(ONE_Q26) + i64::from(w);
    let a0 = ((i64::from(w) << 15) / denom) as i32;
    let b1 = (((i64::from(ONE_Q26) - i64::from(w)) << 15) / denom) as i32;
    FirstOrderCoeffs { a0, a1: a0, b1 }
}

/// First-order high-pass with the given corner.
///
/// Shares the pole of the matching low-pass; only the zeros differ. The
/// same series-limit guard applies.
#[must_use]
pub fn design_high_pass(corner_hz: u32, sample_rate_hz: u32) -> FirstOrderCoeffs {
    let half_omega = compute_omega(corner_hz, sample_rate_hz) >> 1;
    if half_omega > OMEGA_UNITY_Q26 {
        return FirstOrderCoeffs::identity();
    }
    let w = tan_q26(half_omega);
    let denom = i64::from(ONE_Q26) + i64::from(w);
    let a0 = ((i64::from(ONE_Q26) << 15) / denom) as i32;
    let b1 = (((i64::from(ONE_Q26) - i64::from(w)) << 15) / denom) as i32;
    FirstOrderCoeffs { a0, a1: -a0, b1 }
}
