use crate::grid::EntityKey;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error(
        "extent must be finite with min <= max (min_x: {min_x}, min_y: {min_y}, max_x: {max_x}, max_y: {max_y})"
    )]
    InvalidExtent {
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    },
    #[error("entity {key:?} is not stored in this index")]
    UnknownEntity { key: EntityKey },
    #[error("cell shift must be within 1..=24 (cell_shift: {cell_shift})")]
    InvalidCellShift { cell_shift: u32 },
    #[error("row bits must be within 1..=10 (row_bits: {row_bits})")]
    InvalidRowBits { row_bits: u32 },
    #[error("arena chunk size must be non-zero (chunk_size: {chunk_size})")]
    InvalidChunkSize { chunk_size: usize },
}

pub type GridResult<T> = Result<T, GridError>;
