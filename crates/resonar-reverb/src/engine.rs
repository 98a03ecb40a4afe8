//! The reverb engine: parameter staging and application, block
//! processing, and stereo synthesis.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use resonar_core::{
    CrossMixer, FirstOrderCoeffs, GAIN_ONE_Q31, MIX_TILE, MixGain, decay_gain_q15,
    design_high_pass, design_low_pass, mul32x32_shift, sat_add,
};

use crate::error::ReverbError;
use crate::layout::{MemoryLayout, MemoryRegions};
use crate::line::{LineState, LineTap};
use crate::params::{ControlParams, InstanceParams, OperatingMode, SourceFormat};
use crate::tables::{
    LINE_SCALE_Q15, line_capacity, line_total_samples, loudness_correction_q15, room_size_ms,
    split_segments,
};

/// Input attenuation before the wet path, in bits. Restored by the
/// output stage at unity correction.
const HEADROOM_SHIFT: u32 = 2;
/// Right shift of the output-gain multiply. A gain of `1 << 29` here is
/// net unity after the headroom shift.
const OUTPUT_SHIFT: u32 = 27;
const OUTPUT_UNITY: i32 = 1 << 29;

/// Time constant for room-size tap crossfades, ms.
const CROSSFADE_TC_MS: u32 = 100;
/// Time constant for T60-driven feedback changes, ms.
const FEEDBACK_TC_MS: u32 = 100;
/// Time constant for the dry/wet level fade, ms.
const BYPASS_TC_MS: u32 = 50;
/// Time constant for loudness-correction changes, ms.
const OUTPUT_TC_MS: u32 = 100;

/// A reverb instance bound to caller-owned memory regions.
///
/// Created over a [`MemoryLayout`] plan, driven by staged
/// [`ControlParams`], and processed block by block. The engine performs
/// no allocation on the audio path; the only post-creation allocation is
/// the boxed settle callback built during a parameter apply.
pub struct ReverbEngine<'a> {
    instance: InstanceParams,
    layout: MemoryLayout,
    regions: MemoryRegions<'a>,

    current: Option<ControlParams>,
    staged: Option<ControlParams>,
    apply_pending: bool,

    room_ms: u32,
    max_block_len: usize,

    hpf: FirstOrderCoeffs,
    lpf: FirstOrderCoeffs,
    lines: Vec<LineState>,

    /// `a` is the wet gain, `b` the dry gain.
    bypass: CrossMixer,
    output_gain: MixGain,
    /// Set by the bypass fade-out callback once the wet level reaches
    /// zero; lets `process` skip the line network while silent.
    reverb_off: Rc<Cell<bool>>,

    tile_phase: usize,
}

impl<'a> ReverbEngine<'a> {
    /// Binds an engine into caller-owned regions.
    ///
    /// Validates the instance parameters, checks every region against
    /// the plan, and zero-fills them. The new instance has no audible
    /// effect until [`Self::set_control_parameters`] succeeds once:
    /// until then `process` copies input to output.
    pub fn create(
        instance: InstanceParams,
        mut regions: MemoryRegions<'a>,
    ) -> Result<Self, ReverbError> {
        let layout = MemoryLayout::plan(&instance)?;
        regions.check(&layout)?;
        regions.zero_fill();

        let count = instance.num_delay_lines.count();
        let mut lines = Vec::with_capacity(count);
        let mut slow_offset = 0;
        let mut fast_offset = 0;
        for k in 0..count {
            let (fixed_cap, ap_cap) = line_capacity(k);
            let damp = 4 + 2 * k..6 + 2 * k;
            lines.push(LineState::new(
                slow_offset..slow_offset + fixed_cap,
                fast_offset..fast_offset + ap_cap,
                damp,
            ));
            slow_offset += fixed_cap;
            fast_offset += ap_cap;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "create: {} lines, max block {}, {} bytes total",
            count,
            instance.max_block_size,
            layout.total_bytes()
        );

        Ok(Self {
            max_block_len: instance.max_block_size,
            instance,
            layout,
            regions,
            current: None,
            staged: None,
            apply_pending: false,
            room_ms: 0,
            hpf: FirstOrderCoeffs::identity(),
            lpf: FirstOrderCoeffs::identity(),
            lines,
            bypass: CrossMixer::new(0, GAIN_ONE_Q31),
            output_gain: MixGain::new(OUTPUT_UNITY),
            reverb_off: Rc::new(Cell::new(false)),
            tile_phase: 0,
        })
    }

    /// The exact layout this instance was bound over.
    #[must_use]
    pub fn memory_layout(&self) -> MemoryLayout {
        self.layout
    }

    /// The creation-time instance parameters.
    #[must_use]
    pub fn instance_params(&self) -> InstanceParams {
        self.instance
    }

    /// Current per-call chunk ceiling, bounded by the smallest active
    /// delay segment.
    #[must_use]
    pub fn max_block_len(&self) -> usize {
        self.max_block_len
    }

    /// Validates and stages a new parameter set.
    ///
    /// Nothing in the signal path changes here; the staged set takes
    /// effect at the start of the next `process` call. On a validation
    /// failure all state, including any previously staged set, is left
    /// untouched.
    pub fn set_control_parameters(&mut self, params: &ControlParams) -> Result<(), ReverbError> {
        params.validate()?;
        self.staged = Some(*params);
        self.apply_pending = true;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "stage: level {} room {} t60 {} ms",
            params.level,
            params.room_size,
            params.t60_ms
        );
        Ok(())
    }

    /// The most recently staged parameters, applied or not. `None`
    /// until the first successful [`Self::set_control_parameters`].
    #[must_use]
    pub fn get_control_parameters(&self) -> Option<ControlParams> {
        self.staged
    }

    /// Zeroes every delay-line sample and filter tap. Coefficients,
    /// parameters, and gain ramps are untouched. Must not be called
    /// concurrently with `process` on the same instance.
    pub fn clear_audio_buffers(&mut self) {
        self.regions.persistent_slow.fill(0);
        self.regions.persistent_fast.fill(0);
        self.regions.coefficients.fill(0);
    }

    /// Processes `num_samples` frames of `input` into interleaved
    /// stereo `output`.
    ///
    /// Applies any staged parameters first, then runs the pipeline in
    /// chunks of at most [`Self::max_block_len`]. A zero sample count
    /// is a no-op success that touches nothing, staged parameters
    /// included.
    pub fn process(
        &mut self,
        input: &[i32],
        output: &mut [i32],
        num_samples: usize,
    ) -> Result<(), ReverbError> {
        if num_samples == 0 {
            return Ok(());
        }
        if output.len() < 2 * num_samples {
            return Err(ReverbError::InvalidNumSamples);
        }

        // Buffer validation precedes the apply so a failing call leaves
        // the engine untouched.
        let Some(params) = self.staged.or(self.current) else {
            // No parameters yet: the stream passes through as stereo.
            if input.len() < 2 * num_samples {
                return Err(ReverbError::InvalidNumSamples);
            }
            output[..2 * num_samples].copy_from_slice(&input[..2 * num_samples]);
            return Ok(());
        };
        let channels = params.source_format.channels();
        if input.len() < channels * num_samples {
            return Err(ReverbError::InvalidNumSamples);
        }

        if self.apply_pending {
            self.apply_staged();
        }

        if params.mode == OperatingMode::Off {
            copy_through(input, output, num_samples, params.source_format);
            return Ok(());
        }

        let mut done = 0;
        while done < num_samples {
            let len = (num_samples - done).min(self.max_block_len);
            let in_chunk = &input[done * channels..(done + len) * channels];
            let out_chunk = &mut output[done * 2..(done + len) * 2];
            self.process_chunk(in_chunk, out_chunk, params.source_format);
            done += len;
        }
        Ok(())
    }

    /// Recomputes every derived quantity whose upstream parameter
    /// changed since the last apply.
    fn apply_staged(&mut self) {
        self.apply_pending = false;
        let Some(next) = self.staged else {
            return;
        };
        let prev = self.current;
        let fs = next.sample_rate.hz();

        let rate_changed = prev.is_none_or(|p| p.sample_rate != next.sample_rate);
        let room_changed = rate_changed || prev.is_none_or(|p| p.room_size != next.room_size);
        let t60_changed = prev.is_none_or(|p| p.t60_ms != next.t60_ms);

        if rate_changed {
            self.bypass.set_time_constant(BYPASS_TC_MS, fs);
            self.output_gain.set_time_constant(OUTPUT_TC_MS, fs);
            for line in &mut self.lines {
                line.cross.set_time_constant(CROSSFADE_TC_MS, fs);
                line.feedback.set_time_constant(FEEDBACK_TC_MS, fs);
            }
        }

        if rate_changed || prev.is_none_or(|p| p.hpf_hz != next.hpf_hz) {
            self.hpf = design_high_pass(u32::from(next.hpf_hz), fs);
        }
        if rate_changed || prev.is_none_or(|p| p.lpf_hz != next.lpf_hz) {
            self.lpf = design_low_pass(u32::from(next.lpf_hz), fs);
        }

        if room_changed {
            self.room_ms = room_size_ms(next.room_size);
            for (k, line) in self.lines.iter_mut().enumerate() {
                let total = line_total_samples(fs, self.room_ms, k);
                let (fixed, ap) = split_segments(total);
                let fixed = fixed.min(line.fixed_range.len());
                let ap = ap.min(line.ap_range.len());
                line.retarget_delays(fixed, ap);
            }
            self.recompute_max_block_len();
        }

        if room_changed || t60_changed {
            for (k, line) in self.lines.iter_mut().enumerate() {
                let loop_ms = (self.room_ms * LINE_SCALE_Q15[k] as u32) >> 15;
                let gain = decay_gain_q15(loop_ms, u32::from(next.t60_ms));
                line.feedback.set_target(gain << 16);
            }
            let correction = loudness_correction_q15(self.room_ms, u32::from(next.t60_ms));
            self.output_gain.set_target(correction << 14);
        }

        if rate_changed || prev.is_none_or(|p| p.damping != next.damping) {
            let corner = 24_000 - 235 * u32::from(next.damping);
            let damping = design_low_pass(corner, fs);
            for line in &mut self.lines {
                line.damping = damping;
            }
        }

        if prev.is_none_or(|p| p.density != next.density) {
            // Density maps linearly onto an all-pass coefficient of at
            // most 0.6.
            let g = i32::from(next.density) * 19_661 / 100;
            for line in &mut self.lines {
                line.density_q15 = g;
            }
        }

        if prev.is_none_or(|p| p.level != next.level) {
            let wet = (i64::from(GAIN_ONE_Q31) * i64::from(next.level) / 100) as i32;
            let dry = GAIN_ONE_Q31 - wet;
            if next.level == 0 {
                let latch = Rc::clone(&self.reverb_off);
                self.bypass.a.set_target_with(0, Box::new(move || latch.set(true)));
            } else {
                self.reverb_off.set(false);
                self.bypass.a.set_target(wet);
            }
            self.bypass.b.set_target(dry);
        }

        self.current = Some(next);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "apply: room {} ms, max block {}, rate {} Hz",
            self.room_ms,
            self.max_block_len,
            fs
        );
    }

    fn recompute_max_block_len(&mut self) {
        let mut min_segment = self.instance.max_block_size;
        for line in &self.lines {
            let (fixed, ap) = line.active_segments();
            min_segment = min_segment.min(fixed).min(ap);
        }
        self.max_block_len = min_segment.max(1);
    }

    /// Runs one chunk of at most `max_block_len` frames through the
    /// pipeline: downmix, headroom, tone filters, line network,
    /// rotation, dry/wet mix, output stage.
    fn process_chunk(&mut self, input: &[i32], output: &mut [i32], format: SourceFormat) {
        let len = output.len() / 2;
        let block = self.instance.max_block_size;
        let (mono_all, dry_all) = self.regions.scratch.split_at_mut(block);
        let mono = &mut mono_all[..len];
        let dry = &mut dry_all[..len];

        match format {
            SourceFormat::Mono => mono.copy_from_slice(&input[..len]),
            SourceFormat::MonoInStereo => {
                for (m, frame) in mono.iter_mut().zip(input.chunks_exact(2)) {
                    *m = frame[0];
                }
            }
            SourceFormat::Stereo => {
                for (m, frame) in mono.iter_mut().zip(input.chunks_exact(2)) {
                    *m = ((i64::from(frame[0]) + i64::from(frame[1])) >> 1) as i32;
                }
            }
        }
        for sample in mono.iter_mut() {
            *sample >>= HEADROOM_SHIFT;
        }
        dry.copy_from_slice(mono);

        let disabled = self.reverb_off.get();
        let slow = &mut *self.regions.persistent_slow;
        let fast = &mut *self.regions.persistent_fast;
        let coeffs = &mut *self.regions.coefficients;

        if !disabled {
            self.hpf.process_block(&mut coeffs[0..2], mono);
            self.lpf.process_block(&mut coeffs[2..4], mono);
        }

        let count = self.lines.len();
        for n in 0..len {
            let mut wet_l = 0;
            let mut wet_r = 0;
            if !disabled {
                let mut taps = [LineTap { y: 0, ap_tap: 0 }; 4];
                let mut ys = [0i32; 4];
                for k in 0..count {
                    let line = &self.lines[k];
                    taps[k] = line.read_output(
                        &slow[line.fixed_range.clone()],
                        &fast[line.ap_range.clone()],
                        &mut coeffs[line.damp_taps.clone()],
                    );
                    ys[k] = taps[k].y;
                }
                let rotated = rotate(&ys, count);
                wet_l = rotated.wet_l;
                wet_r = rotated.wet_r;
                for k in 0..count {
                    let fixed_range = self.lines[k].fixed_range.clone();
                    let ap_range = self.lines[k].ap_range.clone();
                    let feedback = self.lines[k].feedback.gain();
                    let injection = sat_add(mono[n], mul32x32_shift(rotated.r[k], feedback, 31));
                    self.lines[k].write_input(
                        &mut slow[fixed_range],
                        &mut fast[ap_range],
                        injection,
                        taps[k],
                    );
                }
            }

            let wet_gain = self.bypass.a.gain();
            let dry_gain = self.bypass.b.gain();
            let dry_part = mul32x32_shift(dry[n], dry_gain, 31);
            let mixed_l = sat_add(mul32x32_shift(wet_l, wet_gain, 31), dry_part);
            let mixed_r = sat_add(mul32x32_shift(wet_r, wet_gain, 31), dry_part);
            let og = self.output_gain.gain();
            output[2 * n] = mul32x32_shift(mixed_l, og, OUTPUT_SHIFT);
            output[2 * n + 1] = mul32x32_shift(mixed_r, og, OUTPUT_SHIFT);

            self.tile_phase += 1;
            if self.tile_phase == MIX_TILE {
                self.tile_phase = 0;
                for line in &mut self.lines {
                    line.advance_tile();
                }
                self.bypass.advance_tile();
                self.output_gain.advance_tile();
            }
        }
    }
}

/// Bypass copy: input to output untouched, mono duplicated to stereo.
fn copy_through(input: &[i32], output: &mut [i32], num_samples: usize, format: SourceFormat) {
    match format {
        SourceFormat::Mono => {
            for (out, &sample) in output.chunks_exact_mut(2).zip(&input[..num_samples]) {
                out[0] = sample;
                out[1] = sample;
            }
        }
        SourceFormat::MonoInStereo | SourceFormat::Stereo => {
            output[..2 * num_samples].copy_from_slice(&input[..2 * num_samples]);
        }
    }
}

struct Rotated {
    /// Per-line feedback injections.
    r: [i32; 4],
    wet_l: i32,
    wet_r: i32,
}

fn sat32(x: i64) -> i32 {
    x.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Combines the damped line outputs into per-line feedback signals and
/// a stereo pair. Each rotation has unit energy so the loop gain stays
/// below the feedback gain; the stereo rows alternate sign across lines
/// to decorrelate the image.
fn rotate(ys: &[i32; 4], count: usize) -> Rotated {
    let y = [i64::from(ys[0]), i64::from(ys[1]), i64::from(ys[2]), i64::from(ys[3])];
    match count {
        1 => Rotated { r: [ys[0], 0, 0, 0], wet_l: ys[0], wet_r: sat32(-y[0]) },
        2 => Rotated {
            r: [sat32((y[0] + y[1]) >> 1), sat32((y[0] - y[1]) >> 1), 0, 0],
            wet_l: sat32(y[0] + y[1]),
            wet_r: sat32(y[0] - y[1]),
        },
        _ => Rotated {
            r: [
                sat32((y[0] + y[1] + y[2] + y[3]) >> 1),
                sat32((y[0] - y[1] + y[2] - y[3]) >> 1),
                sat32((y[0] + y[1] - y[2] - y[3]) >> 1),
                sat32((y[0] - y[1] - y[2] + y[3]) >> 1),
            ],
            wet_l: sat32(y[0] - y[1] + y[2] - y[3]),
            wet_r: sat32(y[0] + y[1] - y[2] - y[3]),
        },
    }
}
