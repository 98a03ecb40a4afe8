//! Control and instance parameters with boundary validation.

use crate::error::ReverbError;

/// Whether the effect is active or passing audio through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// Input is copied to the output unmodified (mono duplicated).
    Off,
    /// The full reverb pipeline runs.
    On,
}

/// The sample rates the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRate {
    /// 8 kHz.
    Hz8000,
    /// 11.025 kHz.
    Hz11025,
    /// 12 kHz.
    Hz12000,
    /// 16 kHz.
    Hz16000,
    /// 22.05 kHz.
    Hz22050,
    /// 24 kHz.
    Hz24000,
    /// 32 kHz.
    Hz32000,
    /// 44.1 kHz.
    Hz44100,
    /// 48 kHz.
    Hz48000,
}

impl SampleRate {
    /// The rate in Hertz.
    #[must_use]
    pub const fn hz(self) -> u32 {
        match self {
            Self::Hz8000 => 8_000,
            Self::Hz11025 => 11_025,
            Self::Hz12000 => 12_000,
            Self::Hz16000 => 16_000,
            Self::Hz22050 => 22_050,
            Self::Hz24000 => 24_000,
            Self::Hz32000 => 32_000,
            Self::Hz44100 => 44_100,
            Self::Hz48000 => 48_000,
        }
    }

    /// Looks up the variant for a rate in Hertz.
    pub fn from_hz(hz: u32) -> Result<Self, ReverbError> {
        match hz {
            8_000 => Ok(Self::Hz8000),
            11_025 => Ok(Self::Hz11025),
            12_000 => Ok(Self::Hz12000),
            16_000 => Ok(Self::Hz16000),
            22_050 => Ok(Self::Hz22050),
            24_000 => Ok(Self::Hz24000),
            32_000 => Ok(Self::Hz32000),
            44_100 => Ok(Self::Hz44100),
            48_000 => Ok(Self::Hz48000),
            _ => Err(ReverbError::OutOfRange),
        }
    }
}

/// Layout of the input buffer handed to `process`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// One channel, one word per sample.
    Mono,
    /// Mono content carried in interleaved stereo frames; the left
    /// channel is used.
    MonoInStereo,
    /// Interleaved stereo, downmixed internally.
    Stereo,
}

impl SourceFormat {
    /// Input words per sample frame.
    #[must_use]
    pub const fn channels(self) -> usize {
        match self {
            Self::Mono => 1,
            Self::MonoInStereo | Self::Stereo => 2,
        }
    }
}

/// Number of parallel delay lines, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DelayLines {
    /// A single line: mono tail, polarity-flipped stereo image.
    One,
    /// Two lines combined by a 2x2 rotation.
    Two,
    /// Four lines combined by a Hadamard rotation.
    Four,
}

impl DelayLines {
    /// The line count as a plain number.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

/// Low-pass corner bounds in Hz.
pub const LPF_CORNER_HZ: core::ops::RangeInclusive<u16> = 50..=23_999;
/// High-pass corner bounds in Hz.
pub const HPF_CORNER_HZ: core::ops::RangeInclusive<u16> = 20..=1_000;
/// Decay time bounds in milliseconds.
pub const T60_MS: core::ops::RangeInclusive<u16> = 0..=7_000;
/// Upper bound shared by the percentage parameters.
pub const PERCENT_MAX: u16 = 100;

/// The full control surface, staged as one unit.
///
/// Every field is range-checked by [`ControlParams::validate`] before
/// the engine accepts it. Corners above the Nyquist frequency of the
/// selected rate are legal; the filter designer degrades them to
/// pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlParams {
    /// Bypass or active.
    pub mode: OperatingMode,
    /// Sample rate of the audio stream.
    pub sample_rate: SampleRate,
    /// Input buffer layout.
    pub source_format: SourceFormat,
    /// Wet mix, percent. Zero is fully dry.
    pub level: u16,
    /// Global low-pass corner in Hz.
    pub lpf_hz: u16,
    /// Global high-pass corner in Hz.
    pub hpf_hz: u16,
    /// Decay time to −60 dB, in milliseconds. Zero kills the tail
    /// within one delay-line traversal.
    pub t60_ms: u16,
    /// Echo density, percent. Drives the all-pass coefficient.
    pub density: u16,
    /// High-frequency damping, percent. Drives the per-line low-pass.
    pub damping: u16,
    /// Room size, percent. Mapped to total delay length in ms.
    pub room_size: u16,
}

impl ControlParams {
    /// Checks every field against its documented range.
    pub fn validate(&self) -> Result<(), ReverbError> {
        if !LPF_CORNER_HZ.contains(&self.lpf_hz)
            || !HPF_CORNER_HZ.contains(&self.hpf_hz)
            || !T60_MS.contains(&self.t60_ms)
            || self.level > PERCENT_MAX
            || self.density > PERCENT_MAX
            || self.damping > PERCENT_MAX
            || self.room_size > PERCENT_MAX
        {
            return Err(ReverbError::OutOfRange);
        }
        Ok(())
    }
}

impl Default for ControlParams {
    /// The conventional host preset: a large, dark-ish room at zero wet
    /// level, so enabling the effect is audible only once `level` is
    /// raised.
    fn default() -> Self {
        Self {
            mode: OperatingMode::On,
            sample_rate: SampleRate::Hz44100,
            source_format: SourceFormat::Stereo,
            level: 0,
            lpf_hz: 23_999,
            hpf_hz: 50,
            t60_ms: 1_490,
            density: 100,
            damping: 21,
            room_size: 100,
        }
    }
}

/// Parameters fixed for the life of an engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceParams {
    /// Largest sample count a single `process` call may carry.
    pub max_block_size: usize,
    /// Parallel delay line count.
    pub num_delay_lines: DelayLines,
}

impl InstanceParams {
    /// Checks the creation-time constraints.
    pub fn validate(&self) -> Result<(), ReverbError> {
        if self.max_block_size == 0 {
            return Err(ReverbError::OutOfRange);
        }
        Ok(())
    }
}
