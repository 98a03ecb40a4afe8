//! Derived-quantity tables: line length scaling, room-size mapping, and
//! loudness correction.

/// Per-line length scale `3^(−k/4)` in Q15. Spreading the four line
/// lengths over a non-integer ratio keeps their echo patterns from
/// lining up on common multiples.
pub const LINE_SCALE_Q15: [i32; 4] = [32_768, 24_898, 18_919, 14_376];

/// Smallest room in milliseconds of total delay.
pub const ROOM_MS_MIN: u32 = 10;
/// Largest room in milliseconds of total delay.
pub const ROOM_MS_MAX: u32 = 120;

/// Largest sample rate the engine accepts; capacities are planned here.
pub const MAX_SAMPLE_RATE_HZ: u32 = 48_000;

/// Fraction of a line's total delay given to its all-pass segment.
const ALLPASS_DIVISOR: usize = 15;
/// Floor on the all-pass segment, in samples.
const ALLPASS_MIN: usize = 2;
/// Floor on the fixed segment, in samples.
const FIXED_MIN: usize = 4;

/// Maps the 0..=100 room-size control to total delay in milliseconds.
#[must_use]
pub fn room_size_ms(room_size: u16) -> u32 {
    ROOM_MS_MIN + u32::from(room_size) * (ROOM_MS_MAX - ROOM_MS_MIN) / 100
}

/// Total delay of line `k` in samples at the given rate and room size.
#[must_use]
pub fn line_total_samples(sample_rate_hz: u32, room_ms: u32, line: usize) -> usize {
    let base = u64::from(sample_rate_hz) * u64::from(room_ms) / 1000;
    ((base * LINE_SCALE_Q15[line] as u64) >> 15) as usize
}

/// Splits a line's total delay into (fixed, all-pass) segment lengths.
///
/// The all-pass segment takes a fixed fraction of the total; both
/// segments have small floors so degenerate rooms still have somewhere
/// to read from.
#[must_use]
pub fn split_segments(total: usize) -> (usize, usize) {
    let allpass = (total / ALLPASS_DIVISOR).max(ALLPASS_MIN);
    let fixed = total.saturating_sub(allpass).max(FIXED_MIN);
    (fixed, allpass)
}

/// Worst-case (fixed, all-pass) capacity for line `k`, covering every
/// supported rate and room size. Planned once at creation so parameter
/// changes never need more memory.
#[must_use]
pub fn line_capacity(line: usize) -> (usize, usize) {
    split_segments(line_total_samples(MAX_SAMPLE_RATE_HZ, ROOM_MS_MAX, line))
}

/// Room-size grid for the loudness table, in milliseconds.
const LOUDNESS_ROOM_MS: [u32; 4] = [10, 40, 80, 120];
/// T60 grid for the loudness table, in milliseconds.
const LOUDNESS_T60_MS: [u32; 4] = [0, 500, 2_000, 7_000];

/// Output correction gain in Q15, indexed `[room][t60]`. Small dead
/// rooms carry little tail energy and get the most makeup; large, long
/// tails stack the most delayed copies and get the least.
const LOUDNESS_GAIN_Q15: [[i32; 4]; 4] = [
    [32_767, 29_500, 26_000, 22_000],
    [29_000, 26_000, 22_500, 18_500],
    [26_000, 22_500, 19_000, 15_500],
    [24_000, 20_500, 17_000, 14_000],
];

fn axis_segment(grid: &[u32; 4], value: u32) -> (usize, i64) {
    if value <= grid[0] {
        return (0, 0);
    }
    for i in 0..3 {
        if value <= grid[i + 1] {
            let span = i64::from(grid[i + 1] - grid[i]);
            let frac = (i64::from(value - grid[i]) << 15) / span;
            return (i, frac);
        }
    }
    (2, 1 << 15)
}

/// Bilinear lookup of the output correction gain for a room/decay
/// combination, Q15. Inputs outside the grid clamp to its edges.
#[must_use]
pub fn loudness_correction_q15(room_ms: u32, t60_ms: u32) -> i32 {
    let (ri, rf) = axis_segment(&LOUDNESS_ROOM_MS, room_ms);
    let (ti, tf) = axis_segment(&LOUDNESS_T60_MS, t60_ms);

    let lerp = |a: i32, b: i32, frac: i64| -> i64 {
        i64::from(a) + ((i64::from(b) - i64::from(a)) * frac >> 15)
    };
    let low = lerp(LOUDNESS_GAIN_Q15[ri][ti], LOUDNESS_GAIN_Q15[ri][ti + 1], tf);
    let high = lerp(LOUDNESS_GAIN_Q15[ri + 1][ti], LOUDNESS_GAIN_Q15[ri + 1][ti + 1], tf);
    (low + ((high - low) * rf >> 15)) as i32
}
