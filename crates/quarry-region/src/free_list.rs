//! Sector free list with first-fit allocation and two-sided coalescing.
//!
//! Entries are kept sorted by offset and never overlap or touch: a released
//! range is merged with both its lower and upper neighbor when adjacent.

/// A contiguous run of sectors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SectorRange {
    /// First sector of the run.
    pub offset: u32,
    /// Number of sectors in the run.
    pub count: u32,
}

impl SectorRange {
    /// Creates a new range.
    pub fn new(offset: u32, count: u32) -> Self {
        Self { offset, count }
    }

    /// One past the last sector of the run.
    pub fn end(self) -> u32 {
        self.offset + self.count
    }

    /// Whether the two ranges share at least one sector.
    pub fn overlaps(self, other: SectorRange) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// Unused sector runs beyond the region header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FreeList {
    ranges: Vec<SectorRange>,
}

impl FreeList {
    /// Creates an empty free list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the list from a per-sector usage map: every maximal run of
    /// `false` entries becomes one free range.
    pub fn from_usage(used: &[bool]) -> Self {
        let mut ranges = Vec::new();
        let mut start = None;
        for (sector, &in_use) in used.iter().enumerate() {
            match (in_use, start) {
                (false, None) => start = Some(sector),
                (true, Some(s)) => {
                    ranges.push(SectorRange::new(s as u32, (sector - s) as u32));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            ranges.push(SectorRange::new(s as u32, (used.len() - s) as u32));
        }
        Self { ranges }
    }

    /// Takes `count` sectors from the first range large enough to hold them.
    ///
    /// A larger range is split and its remainder stays in the list. Returns
    /// the allocated offset, or `None` when no range fits.
    pub fn allocate(&mut self, count: u32) -> Option<u32> {
        let index = self.ranges.iter().position(|r| r.count >= count)?;
        let range = &mut self.ranges[index];
        let offset = range.offset;
        if range.count > count {
            range.offset += count;
            range.count -= count;
        } else {
            self.ranges.remove(index);
        }
        Some(offset)
    }

    /// Returns `range` to the list, merging it with adjacent neighbors.
    pub fn release(&mut self, range: SectorRange) {
        if range.count == 0 {
            return;
        }
        let index = self.ranges.partition_point(|r| r.offset < range.offset);
        debug_assert!(
            self.ranges.iter().all(|r| !r.overlaps(range)),
            "released {range:?} overlaps free list"
        );

        let merges_prev = index > 0 && self.ranges[index - 1].end() == range.offset;
        let merges_next = index < self.ranges.len() && range.end() == self.ranges[index].offset;

        match (merges_prev, merges_next) {
            (true, true) => {
                let next = self.ranges.remove(index);
                self.ranges[index - 1].count += range.count + next.count;
            }
            (true, false) => self.ranges[index - 1].count += range.count,
            (false, true) => {
                let next = &mut self.ranges[index];
                next.offset = range.offset;
                next.count += range.count;
            }
            (false, false) => self.ranges.insert(index, range),
        }
    }

    /// The free ranges, sorted by offset.
    pub fn ranges(&self) -> &[SectorRange] {
        &self.ranges
    }

    /// Total number of free sectors.
    pub fn free_sectors(&self) -> u32 {
        self.ranges.iter().map(|r| r.count).sum()
    }

    /// Returns `true` if no sector is free.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
