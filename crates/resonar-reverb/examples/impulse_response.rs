//! Renders two seconds of the engine's impulse response to
//! `impulse_response.wav` in the current directory.
//!
//! Run with: cargo run -p resonar-reverb --example impulse_response

use hound::{SampleFormat, WavSpec, WavWriter};
use resonar_reverb::{
    ControlParams, DelayLines, InstanceParams, MemoryLayout, MemoryRegions, RegionKind,
    ReverbEngine, SampleRate, SourceFormat,
};

const RATE: u32 = 48_000;
const BLOCK: usize = 256;
const SECONDS: usize = 2;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let instance = InstanceParams { max_block_size: BLOCK, num_delay_lines: DelayLines::Four };
    let layout = MemoryLayout::plan(&instance)?;

    let mut slow = vec![0i32; layout.words(RegionKind::PersistentSlow)];
    let mut fast = vec![0i32; layout.words(RegionKind::PersistentFast)];
    let mut coeffs = vec![0i32; layout.words(RegionKind::Coefficients)];
    let mut scratch = vec![0i32; layout.words(RegionKind::Scratch)];
    let regions = MemoryRegions {
        persistent_slow: &mut slow,
        persistent_fast: &mut fast,
        coefficients: &mut coeffs,
        scratch: &mut scratch,
    };

    let mut engine = ReverbEngine::create(instance, regions)?;
    let params = ControlParams {
        sample_rate: SampleRate::Hz48000,
        source_format: SourceFormat::Mono,
        level: 60,
        t60_ms: 2_000,
        room_size: 80,
        ..ControlParams::default()
    };
    engine.set_control_parameters(&params)?;

    let spec = WavSpec {
        channels: 2,
        sample_rate: RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create("impulse_response.wav", spec)?;

    let mut input = vec![0i32; BLOCK];
    input[0] = 1 << 26;
    let mut output = vec![0i32; 2 * BLOCK];
    for _ in 0..(SECONDS * RATE as usize / BLOCK) {
        engine.process(&input, &mut output, BLOCK)?;
        input[0] = 0;
        for &sample in &output {
            writer.write_sample(sample)?;
        }
    }
    writer.finalize()?;

    println!("wrote impulse_response.wav ({SECONDS} s, {RATE} Hz stereo)");
    Ok(())
}
