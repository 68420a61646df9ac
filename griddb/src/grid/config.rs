use crate::error::{GridError, GridResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Cells are `1 << cell_shift` world units wide.
    pub cell_shift: u32,
    /// The bucket table is `1 << row_bits` buckets on each side.
    pub row_bits: u32,
    /// Bucket entries added to the arena each time it runs dry.
    pub arena_chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            // 256-unit cells in a 16 x 16 table
            cell_shift: 8,
            row_bits: 4,
            arena_chunk_size: 512,
        }
    }
}

impl Config {
    pub fn validate(&self) -> GridResult<()> {
        if !(1..=24).contains(&self.cell_shift) {
            return Err(GridError::InvalidCellShift {
                cell_shift: self.cell_shift,
            });
        }
        if !(1..=10).contains(&self.row_bits) {
            return Err(GridError::InvalidRowBits {
                row_bits: self.row_bits,
            });
        }
        if self.arena_chunk_size == 0 {
            return Err(GridError::InvalidChunkSize {
                chunk_size: self.arena_chunk_size,
            });
        }
        Ok(())
    }

    pub fn cell_width(&self) -> f32 {
        (1u32 << self.cell_shift) as f32
    }

    pub fn rows(&self) -> usize {
        1usize << self.row_bits
    }
}
