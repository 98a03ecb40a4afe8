//! Response-level tests: decay behavior versus T60, stereo divergence
//! across line counts, and the room-size crossfade under stress.

use resonar_reverb::{
    ControlParams, DelayLines, InstanceParams, MemoryLayout, MemoryRegions, RegionKind,
    ReverbEngine, SampleRate, SourceFormat,
};

struct Storage {
    slow: Vec<i32>,
    fast: Vec<i32>,
    coeffs: Vec<i32>,
    scratch: Vec<i32>,
}

impl Storage {
    fn for_params(params: &InstanceParams) -> Self {
        let layout = MemoryLayout::plan(params).unwrap();
        Self {
            slow: vec![0; layout.words(RegionKind::PersistentSlow)],
            fast: vec![0; layout.words(RegionKind::PersistentFast)],
            coeffs: vec![0; layout.words(RegionKind::Coefficients)],
            scratch: vec![0; layout.words(RegionKind::Scratch)],
        }
    }

    fn regions(&mut self) -> MemoryRegions<'_> {
        MemoryRegions {
            persistent_slow: &mut self.slow,
            persistent_fast: &mut self.fast,
            coefficients: &mut self.coeffs,
            scratch: &mut self.scratch,
        }
    }
}

const BLOCK: usize = 128;

fn instance(lines: DelayLines) -> InstanceParams {
    InstanceParams { max_block_size: BLOCK, num_delay_lines: lines }
}

fn wet_mono_preset(t60_ms: u16) -> ControlParams {
    ControlParams {
        sample_rate: SampleRate::Hz8000,
        source_format: SourceFormat::Mono,
        level: 100,
        t60_ms,
        ..ControlParams::default()
    }
}

/// Renders `total` output frames of the engine's impulse response.
fn impulse_response(engine: &mut ReverbEngine<'_>, total: usize) -> Vec<i32> {
    let mut output = vec![0i32; 2 * total];
    let mut input = vec![0i32; BLOCK];
    input[0] = 1 << 26;
    let mut done = 0;
    while done < total {
        let len = (total - done).min(BLOCK);
        engine
            .process(&input[..len], &mut output[2 * done..2 * (done + len)], len)
            .unwrap();
        input[0] = 0;
        done += len;
    }
    output
}

fn energy(frames: &[i32]) -> u64 {
    frames.iter().map(|&s| u64::from(s.unsigned_abs())).sum()
}

/// At 8 kHz with a 120 ms room, the longest line traversal is under
/// 1000 samples. Leave margin for the initial tap crossfade.
const TAIL_START: usize = 2 * 3000;

#[test]
fn zero_t60_dies_within_one_traversal_nonzero_t60_rings() {
    let params = instance(DelayLines::Four);

    let mut storage = Storage::for_params(&params);
    let mut engine = ReverbEngine::create(params, storage.regions()).unwrap();
    engine.set_control_parameters(&wet_mono_preset(0)).unwrap();
    let dead = impulse_response(&mut engine, 6000);
    // Truncating IIR taps can idle on a ±1 limit cycle, so "silent"
    // means at most a few LSB per frame, not exact zero.
    let dead_tail = energy(&dead[TAIL_START..]);
    assert!(dead_tail < 100_000, "T60=0 tail must be silent, got {dead_tail}");
    // The early field still carries the reverberated impulse.
    assert!(energy(&dead[..TAIL_START]) > 1_000_000);

    let mut storage = Storage::for_params(&params);
    let mut engine = ReverbEngine::create(params, storage.regions()).unwrap();
    engine.set_control_parameters(&wet_mono_preset(1000)).unwrap();
    let ringing = energy(&impulse_response(&mut engine, 6000)[TAIL_START..]);
    assert!(
        ringing > 1000 * dead_tail.max(1),
        "T60=1000 must still have tail energy, got {ringing}"
    );
}

#[test]
fn longer_t60_holds_more_tail_energy() {
    let params = instance(DelayLines::Four);
    let mut tails = Vec::new();
    for t60 in [250u16, 1000, 4000] {
        let mut storage = Storage::for_params(&params);
        let mut engine = ReverbEngine::create(params, storage.regions()).unwrap();
        engine.set_control_parameters(&wet_mono_preset(t60)).unwrap();
        let response = impulse_response(&mut engine, 8000);
        tails.push(energy(&response[TAIL_START..]));
    }
    assert!(tails[0] < tails[1]);
    assert!(tails[1] < tails[2]);
}

#[test]
fn line_count_changes_the_stereo_image() {
    let controls = wet_mono_preset(1000);

    let one = instance(DelayLines::One);
    let mut storage = Storage::for_params(&one);
    let mut engine = ReverbEngine::create(one, storage.regions()).unwrap();
    engine.set_control_parameters(&controls).unwrap();
    let single = impulse_response(&mut engine, 4000);

    let four = instance(DelayLines::Four);
    let mut storage = Storage::for_params(&four);
    let mut engine = ReverbEngine::create(four, storage.regions()).unwrap();
    engine.set_control_parameters(&controls).unwrap();
    let quad = impulse_response(&mut engine, 4000);

    let first_chunk = 2 * BLOCK;
    assert_ne!(
        &single[first_chunk..],
        &quad[first_chunk..],
        "rotation matrices must differ by line count"
    );
}

#[test]
fn rapid_room_size_changes_stay_clean() {
    let params = instance(DelayLines::Four);
    let mut storage = Storage::for_params(&params);
    let mut engine = ReverbEngine::create(params, storage.regions()).unwrap();
    let mut controls = wet_mono_preset(1500);
    engine.set_control_parameters(&controls).unwrap();

    // Retarget the room well inside a single 100 ms crossfade window.
    let amplitude = 1 << 20;
    let input: Vec<i32> = (0..BLOCK).map(|n| if n % 2 == 0 { amplitude } else { -amplitude }).collect();
    let mut output = vec![0i32; 2 * BLOCK];
    for step in 0..200 {
        controls.room_size = (step * 13) % 101;
        engine.set_control_parameters(&controls).unwrap();
        engine.process(&input, &mut output, BLOCK).unwrap();
        for &sample in &output {
            assert!(
                sample.abs() < 1 << 27,
                "room-size stress produced an outsized sample: {sample}"
            );
        }
    }
}

#[test]
fn tail_decays_monotonically_in_coarse_windows() {
    let params = instance(DelayLines::Four);
    let mut storage = Storage::for_params(&params);
    let mut engine = ReverbEngine::create(params, storage.regions()).unwrap();
    engine.set_control_parameters(&wet_mono_preset(500)).unwrap();
    let response = impulse_response(&mut engine, 24_000);

    // 0.5 s windows starting after the crossfade settles.
    let windows: Vec<u64> = response[TAIL_START..]
        .chunks(2 * 4000)
        .map(energy)
        .collect();
    for pair in windows.windows(2) {
        assert!(pair[1] <= pair[0], "tail energy must not grow: {windows:?}");
    }
}
