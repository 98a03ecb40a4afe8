//! Two-pass arena layout over caller-owned storage.
//!
//! Pass one, [`MemoryLayout::plan`], computes the size of four named
//! regions from the instance parameters alone. Pass two binds
//! caller-supplied slices matching that plan into the engine, which then
//! addresses sub-buffers through stored offset ranges. The engine never
//! owns, allocates, or frees the storage.

use crate::error::ReverbError;
use crate::params::InstanceParams;
use crate::tables::line_capacity;

/// The four storage classes the engine needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// Fixed-delay ring buffers. Large, touched once per sample.
    PersistentSlow,
    /// All-pass ring buffers. Smaller, touched twice per sample.
    PersistentFast,
    /// Filter tap state: global tone filters plus per-line damping.
    Coefficients,
    /// Per-call work buffers; contents do not survive a `process` call.
    Scratch,
}

impl RegionKind {
    /// All regions, in binding order.
    pub const ALL: [Self; 4] =
        [Self::PersistentSlow, Self::PersistentFast, Self::Coefficients, Self::Scratch];

    const fn index(self) -> usize {
        match self {
            Self::PersistentSlow => 0,
            Self::PersistentFast => 1,
            Self::Coefficients => 2,
            Self::Scratch => 3,
        }
    }
}

/// Planned region sizes for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryLayout {
    words: [usize; 4],
}

impl MemoryLayout {
    /// Plans the regions for the given instance parameters.
    ///
    /// Pure: no memory is touched. Delay capacities cover the largest
    /// supported rate and room size, so the plan is valid for every
    /// control setting the instance will ever see.
    pub fn plan(params: &InstanceParams) -> Result<Self, ReverbError> {
        params.validate()?;
        let lines = params.num_delay_lines.count();

        let mut slow = 0;
        let mut fast = 0;
        for line in 0..lines {
            let (fixed_cap, ap_cap) = line_capacity(line);
            slow += fixed_cap;
            fast += ap_cap;
        }
        // Two tap words per filter: global HPF, global LPF, one damping
        // filter per line.
        let coefficients = 2 * (2 + lines);
        // Mono work buffer plus the saved dry signal.
        let scratch = 2 * params.max_block_size;

        Ok(Self { words: [slow, fast, coefficients, scratch] })
    }

    /// Size of one region in i32 words.
    #[must_use]
    pub fn words(&self, kind: RegionKind) -> usize {
        self.words[kind.index()]
    }

    /// Size of one region in bytes.
    #[must_use]
    pub fn bytes(&self, kind: RegionKind) -> usize {
        self.words(kind) * core::mem::size_of::<i32>()
    }

    /// Total bytes across all regions.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        RegionKind::ALL.iter().map(|&k| self.bytes(k)).sum()
    }
}

/// Caller-owned storage for one engine instance, one slice per region.
///
/// Each slice must be at least as long as the corresponding planned
/// region; extra length is ignored.
#[derive(Debug)]
pub struct MemoryRegions<'a> {
    /// Backing store for [`RegionKind::PersistentSlow`].
    pub persistent_slow: &'a mut [i32],
    /// Backing store for [`RegionKind::PersistentFast`].
    pub persistent_fast: &'a mut [i32],
    /// Backing store for [`RegionKind::Coefficients`].
    pub coefficients: &'a mut [i32],
    /// Backing store for [`RegionKind::Scratch`].
    pub scratch: &'a mut [i32],
}

impl MemoryRegions<'_> {
    /// Verifies every region meets the plan.
    pub fn check(&self, layout: &MemoryLayout) -> Result<(), ReverbError> {
        if self.persistent_slow.len() < layout.words(RegionKind::PersistentSlow)
            || self.persistent_fast.len() < layout.words(RegionKind::PersistentFast)
            || self.coefficients.len() < layout.words(RegionKind::Coefficients)
            || self.scratch.len() < layout.words(RegionKind::Scratch)
        {
            return Err(ReverbError::NullAddress);
        }
        Ok(())
    }

    pub(crate) fn zero_fill(&mut self) {
        self.persistent_slow.fill(0);
        self.persistent_fast.fill(0);
        self.coefficients.fill(0);
        self.scratch.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::DelayLines;

    fn params(lines: DelayLines) -> InstanceParams {
        InstanceParams { max_block_size: 256, num_delay_lines: lines }
    }

    #[test]
    fn plan_rejects_invalid_instance_params() {
        let bad = InstanceParams { max_block_size: 0, num_delay_lines: DelayLines::One };
        assert_eq!(MemoryLayout::plan(&bad), Err(ReverbError::OutOfRange));
    }

    #[test]
    fn plan_is_monotone_in_line_count() {
        let one = MemoryLayout::plan(&params(DelayLines::One)).unwrap();
        let two = MemoryLayout::plan(&params(DelayLines::Two)).unwrap();
        let four = MemoryLayout::plan(&params(DelayLines::Four)).unwrap();
        for kind in RegionKind::ALL {
            assert!(one.words(kind) <= two.words(kind));
            assert!(two.words(kind) <= four.words(kind));
        }
        assert!(one.total_bytes() < two.total_bytes());
        assert!(two.total_bytes() < four.total_bytes());
    }

    #[test]
    fn coefficient_region_counts_filters() {
        let layout = MemoryLayout::plan(&params(DelayLines::Four)).unwrap();
        assert_eq!(layout.words(RegionKind::Coefficients), 12);
    }

    #[test]
    fn check_flags_short_regions() {
        let layout = MemoryLayout::plan(&params(DelayLines::One)).unwrap();
        let mut slow = vec![0i32; layout.words(RegionKind::PersistentSlow)];
        let mut fast = vec![0i32; layout.words(RegionKind::PersistentFast)];
        let mut coeffs = vec![0i32; layout.words(RegionKind::Coefficients)];
        let mut scratch = vec![0i32; layout.words(RegionKind::Scratch) - 1];
        let regions = MemoryRegions {
            persistent_slow: &mut slow,
            persistent_fast: &mut fast,
            coefficients: &mut coeffs,
            scratch: &mut scratch,
        };
        assert_eq!(regions.check(&layout), Err(ReverbError::NullAddress));
    }
}
