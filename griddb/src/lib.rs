pub mod error;
pub mod grid;

pub use error::{GridError, GridResult};
pub use grid::{
    ArenaStats, Config, EditorIndex, EntityKey, Extent, GridContext, GridEntity, GridIndex,
    QueryCounter, RayHit, TypeFilter,
};
