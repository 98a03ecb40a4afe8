//! Smoothed gain ramps for click-free parameter changes.
//!
//! A [`MixGain`] holds a current and a target Q31 gain and walks the
//! current value toward the target with a one-pole step taken once per
//! [`MIX_TILE`] samples. Block processing applies the settled-enough
//! gain to a whole tile at once, so the inner sample loop stays a plain
//! multiply.
//!
//! A [`CrossMixer`] pairs two gains that ramp in opposite directions,
//! for fading between two signal taps.

use alloc::boxed::Box;
use core::fmt;

use crate::approx::exp2_q15;
use crate::fixed::{Q15_ONE, mul32x32_shift};

/// Samples per smoothing step. Gain is constant within a tile.
pub const MIX_TILE: usize = 32;

/// Snap threshold: once |target − current| drops below this the ramp
/// jumps to the target exactly. Roughly −90 dB of Q31 full scale.
const SETTLE_EPS: i64 = 1 << 16;

/// `log2(e)` in Q15.
const LOG2_E_Q15: i64 = 47_274;

/// A Q31 gain that ramps exponentially toward its target.
pub struct MixGain {
    current: i32,
    target: i32,
    alpha_q15: i32,
    on_settled: Option<Box<dyn FnOnce()>>,
}

impl MixGain {
    /// A settled gain at `value`.
    #[must_use]
    pub fn new(value: i32) -> Self {
        Self { current: value, target: value, alpha_q15: Q15_ONE, on_settled: None }
    }

    /// The gain applied to the current tile.
    #[must_use]
    pub fn gain(&self) -> i32 {
        self.current
    }

    /// The value the ramp is heading toward.
    #[must_use]
    pub fn target(&self) -> i32 {
        self.target
    }

    /// True once the ramp has reached its target.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Sets the per-tile step so the ramp follows an exponential with
    /// time constant `tc_ms` at the given sample rate. A zero time
    /// constant makes every step land on the target.
    pub fn set_time_constant(&mut self, tc_ms: u32, sample_rate_hz: u32) {
        if tc_ms == 0 {
            self.alpha_q15 = Q15_ONE;
            return;
        }
        // decay per tile: exp(−tile/(rate·τ)) = 2^(−tile·log2(e)/(rate·τ))
        let x_q15 = (MIX_TILE as i64 * 1000 * LOG2_E_Q15)
            / (i64::from(tc_ms) * i64::from(sample_rate_hz));
        let x_q15 = x_q15.min(i64::from(i32::MAX)) as i32;
        let decay = exp2_q15(-x_q15);
        self.alpha_q15 = (Q15_ONE - decay).max(1);
    }

    /// Starts a ramp toward `target`, dropping any pending callback.
    pub fn set_target(&mut self, target: i32) {
        self.target = target;
        self.on_settled = None;
    }

    /// Starts a ramp toward `target` and registers a callback to run
    /// once when the ramp settles. Replaces any pending callback.
    pub fn set_target_with(&mut self, target: i32, on_settled: Box<dyn FnOnce()>) {
        self.target = target;
        self.on_settled = Some(on_settled);
    }

    /// Jumps to `value` with no ramp. Pending callbacks are discarded,
    /// not fired.
    pub fn set_immediate(&mut self, value: i32) {
        self.current = value;
        self.target = value;
        self.on_settled = None;
    }

    /// Takes one smoothing step. Call once per [`MIX_TILE`] samples.
    pub fn advance_tile(&mut self) {
        let delta = i64::from(self.target) - i64::from(self.current);
        if delta.abs() < SETTLE_EPS {
            self.current = self.target;
            if let Some(callback) = self.on_settled.take() {
                callback();
            }
            return;
        }
        let step = (delta * i64::from(self.alpha_q15)) >> 15;
        self.current = (i64::from(self.current) + step) as i32;
    }

    /// Scales `data` in place by the ramping gain.
    ///
    /// Each sample is multiplied by the current gain with the given
    /// right shift (31 for plain Q31 scaling), and the ramp advances at
    /// every tile boundary.
    pub fn process_block(&mut self, data: &mut [i32], shift: u32) {
        for tile in data.chunks_mut(MIX_TILE) {
            let gain = self.current;
            for sample in tile {
                *sample = mul32x32_shift(*sample, gain, shift);
            }
            self.advance_tile();
        }
    }
}

impl fmt::Debug for MixGain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MixGain")
            .field("current", &self.current)
            .field("target", &self.target)
            .field("alpha_q15", &self.alpha_q15)
            .field("on_settled", &self.on_settled.is_some())
            .finish()
    }
}

/// Two gain ramps moving in opposite directions, for fading between a
/// pair of signal taps.
#[derive(Debug)]
pub struct CrossMixer {
    /// Gain on the first tap.
    pub a: MixGain,
    /// Gain on the second tap.
    pub b: MixGain,
}

impl CrossMixer {
    /// A settled crossfade fully on the first tap.
    #[must_use]
    pub fn new(a: i32, b: i32) -> Self {
        Self { a: MixGain::new(a), b: MixGain::new(b) }
    }

    /// Sets the same time constant on both ramps.
    pub fn set_time_constant(&mut self, tc_ms: u32, sample_rate_hz: u32) {
        self.a.set_time_constant(tc_ms, sample_rate_hz);
        self.b.set_time_constant(tc_ms, sample_rate_hz);
    }

    /// Advances both ramps by one tile.
    pub fn advance_tile(&mut self) {
        self.a.advance_tile();
        self.b.advance_tile();
    }

    /// True once both ramps have settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.a.is_settled() && self.b.is_settled()
    }
}
