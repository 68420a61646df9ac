use super::arena::{BucketArena, NIL};
use super::config::Config;
use super::types::Extent;
use smallvec::SmallVec;

pub(crate) type BucketList = SmallVec<[u32; 16]>;

/// Inclusive range of unwrapped cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CellRange {
    pub(crate) min_x: i64,
    pub(crate) min_y: i64,
    pub(crate) max_x: i64,
    pub(crate) max_y: i64,
}

/// The wrapped bucket table: `rows x rows` list heads into the arena.
#[derive(Debug)]
pub(crate) struct CellGrid {
    heads: Vec<u32>,
    cell_shift: u32,
    row_bits: u32,
    mask: i64,
}

impl CellGrid {
    pub(crate) fn new(config: &Config) -> Self {
        let rows = config.rows();
        Self {
            heads: vec![NIL; rows * rows],
            cell_shift: config.cell_shift,
            row_bits: config.row_bits,
            mask: rows as i64 - 1,
        }
    }

    #[inline(always)]
    pub(crate) fn rows(&self) -> i64 {
        self.mask + 1
    }

    #[inline(always)]
    pub(crate) fn bucket_count(&self) -> usize {
        self.heads.len()
    }

    #[inline(always)]
    pub(crate) fn cell_width(&self) -> f32 {
        (1u32 << self.cell_shift) as f32
    }

    /// `floor(v) >> cell_shift`; saturates for coordinates far outside the window.
    #[inline(always)]
    pub(crate) fn cell_coord(&self, v: f32) -> i64 {
        (v.floor() as i64) >> self.cell_shift
    }

    /// Cells covered by `extent`, clamped to one table width per axis so
    /// each wrapped bucket appears at most once.
    pub(crate) fn cell_range(&self, extent: &Extent) -> CellRange {
        let rows = self.rows();
        let min_x = self.cell_coord(extent.min_x);
        let min_y = self.cell_coord(extent.min_y);
        let max_x = self.cell_coord(extent.max_x).min(min_x + rows - 1);
        let max_y = self.cell_coord(extent.max_y).min(min_y + rows - 1);
        CellRange {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    #[inline(always)]
    pub(crate) fn bucket_index(&self, cx: i64, cy: i64) -> usize {
        (((cy & self.mask) << self.row_bits) | (cx & self.mask)) as usize
    }

    pub(crate) fn bucket_coords(&self, bucket: usize) -> (usize, usize) {
        let mask = self.mask as usize;
        (bucket & mask, bucket >> self.row_bits)
    }

    pub(crate) fn covered_buckets(&self, extent: &Extent) -> BucketList {
        let range = self.cell_range(extent);
        let mut buckets = BucketList::new();
        for cy in range.min_y..=range.max_y {
            for cx in range.min_x..=range.max_x {
                buckets.push(self.bucket_index(cx, cy) as u32);
            }
        }
        buckets
    }

    #[inline(always)]
    pub(crate) fn head(&self, bucket: usize) -> u32 {
        self.heads[bucket]
    }

    /// Prepends an entry for `slot` to the bucket's list.
    #[inline(always)]
    pub(crate) fn link(&mut self, arena: &mut BucketArena, bucket: usize, slot: u32) {
        let head = self.heads[bucket];
        self.heads[bucket] = arena.acquire(slot, head);
    }

    /// Unlinks the entry for `slot` from the bucket's list, returning its node to the arena.
    pub(crate) fn unlink(&mut self, arena: &mut BucketArena, bucket: usize, slot: u32) -> bool {
        let mut prev = NIL;
        let mut node = self.heads[bucket];
        while node != NIL {
            let entry = arena.entry(node);
            if entry.slot == slot {
                if prev == NIL {
                    self.heads[bucket] = entry.next;
                } else {
                    arena.set_next(prev, entry.next);
                }
                arena.release(node);
                return true;
            }
            prev = node;
            node = entry.next;
        }
        false
    }

    pub(crate) fn release_all(&mut self, arena: &mut BucketArena) {
        for head in &mut self.heads {
            let mut node = *head;
            while node != NIL {
                let next = arena.entry(node).next;
                arena.release(node);
                node = next;
            }
            *head = NIL;
        }
    }

    pub(crate) fn bucket_len(&self, arena: &BucketArena, bucket: usize) -> usize {
        let mut len = 0;
        let mut node = self.heads[bucket];
        while node != NIL {
            len += 1;
            node = arena.entry(node).next;
        }
        len
    }

    pub(crate) fn bucket_contains(&self, arena: &BucketArena, bucket: usize, slot: u32) -> bool {
        let mut node = self.heads[bucket];
        while node != NIL {
            let entry = arena.entry(node);
            if entry.slot == slot {
                return true;
            }
            node = entry.next;
        }
        false
    }
}
