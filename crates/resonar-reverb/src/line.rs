//! Per-line delay state: one fixed-delay ring, one all-pass ring, a tap
//! crossfade, and the line's feedback, density, and damping settings.
//!
//! Each line addresses its rings through offset ranges into the region
//! slices bound at creation; the slices themselves stay with the engine.
//! Reads happen before writes within a sample, so a tap at delay `d`
//! sees the value written `d` samples earlier.

use core::ops::Range;

use resonar_core::{CrossMixer, FirstOrderCoeffs, MixGain, mul32x32_shift, sat_add, sat_sub};

/// Reads a ring at `delay` samples behind the write position.
fn ring_read(buf: &[i32], write: usize, delay: usize) -> i32 {
    let cap = buf.len();
    buf[(write + cap - delay) % cap]
}

pub(crate) struct LineState {
    /// This line's slice of the fixed-delay region.
    pub fixed_range: Range<usize>,
    /// This line's slice of the all-pass region.
    pub ap_range: Range<usize>,
    /// This line's damping tap words in the coefficient region.
    pub damp_taps: Range<usize>,

    fixed_write: usize,
    ap_write: usize,
    /// Read delays for the two alternating tap slots.
    fixed_delay: [usize; 2],
    ap_delay: [usize; 2],
    active_slot: usize,

    /// Crossfade between tap slots 0 (`a`) and 1 (`b`).
    pub cross: CrossMixer,
    /// Smoothed feedback gain, Q31. Target derived from T60.
    pub feedback: MixGain,
    /// All-pass coefficient, Q15. Derived from density.
    pub density_q15: i32,
    /// Per-line damping low-pass.
    pub damping: FirstOrderCoeffs,
}

impl LineState {
    pub fn new(
        fixed_range: Range<usize>,
        ap_range: Range<usize>,
        damp_taps: Range<usize>,
    ) -> Self {
        Self {
            fixed_range,
            ap_range,
            damp_taps,
            fixed_write: 0,
            ap_write: 0,
            fixed_delay: [4, 4],
            ap_delay: [2, 2],
            active_slot: 0,
            cross: CrossMixer::new(resonar_core::GAIN_ONE_Q31, 0),
            feedback: MixGain::new(0),
            density_q15: 0,
            damping: FirstOrderCoeffs::identity(),
        }
    }

    /// Moves the read taps to new segment lengths without a click: the
    /// new delays land in the inactive slot and the crossfade retargets
    /// toward it. Safe to call again mid-fade; the mixers just retarget.
    pub fn retarget_delays(&mut self, fixed_len: usize, ap_len: usize) {
        let incoming = 1 - self.active_slot;
        self.fixed_delay[incoming] = fixed_len;
        self.ap_delay[incoming] = ap_len;
        let (to_zero, to_one) = if incoming == 0 {
            (&mut self.cross.b, &mut self.cross.a)
        } else {
            (&mut self.cross.a, &mut self.cross.b)
        };
        to_zero.set_target(0);
        to_one.set_target(resonar_core::GAIN_ONE_Q31);
        self.active_slot = incoming;
    }

    /// The active slot's `(fixed, all-pass)` segment lengths. Retiring
    /// slot lengths are excluded; only the active taps bound the block
    /// ceiling.
    pub fn active_segments(&self) -> (usize, usize) {
        (
            self.fixed_delay[self.active_slot],
            self.ap_delay[self.active_slot],
        )
    }

    fn blend(&self, slot0: i32, slot1: i32) -> i32 {
        sat_add(
            mul32x32_shift(slot0, self.cross.a.gain(), 31),
            mul32x32_shift(slot1, self.cross.b.gain(), 31),
        )
    }

    /// Read phase: produces the damped line output `y` and the raw
    /// all-pass tap needed later by [`Self::write_input`].
    ///
    /// `fixed` and `ap` are this line's ring slices; `damp_taps` is this
    /// line's two-word damping state.
    pub fn read_output(&self, fixed: &[i32], ap: &[i32], damp_taps: &mut [i32]) -> LineTap {
        let ap_tap = self.blend(
            ring_read(ap, self.ap_write, self.ap_delay[0]),
            ring_read(ap, self.ap_write, self.ap_delay[1]),
        );
        let fixed_out = self.blend(
            ring_read(fixed, self.fixed_write, self.fixed_delay[0]),
            ring_read(fixed, self.fixed_write, self.fixed_delay[1]),
        );
        let y = self.damping.process_sample(damp_taps, fixed_out);
        LineTap { y, ap_tap }
    }

    /// Write phase: feeds the rotated injection through the all-pass
    /// section and into both rings, advancing the write positions.
    pub fn write_input(&mut self, fixed: &mut [i32], ap: &mut [i32], injection: i32, tap: LineTap) {
        let v = sat_add(injection, mul32x32_shift(tap.ap_tap, self.density_q15, 15));
        ap[self.ap_write] = v;
        self.ap_write = (self.ap_write + 1) % ap.len();

        let ap_out = sat_sub(tap.ap_tap, mul32x32_shift(v, self.density_q15, 15));
        fixed[self.fixed_write] = ap_out;
        self.fixed_write = (self.fixed_write + 1) % fixed.len();
    }

    /// Advances this line's smoothed gains by one tile.
    pub fn advance_tile(&mut self) {
        self.cross.advance_tile();
        self.feedback.advance_tile();
    }
}

/// One line's read-phase result, consumed by the write phase of the
/// same sample.
#[derive(Clone, Copy)]
pub(crate) struct LineTap {
    /// Damped line output entering the rotation matrix.
    pub y: i32,
    /// Raw crossfaded all-pass tap.
    pub ap_tap: i32,
}
