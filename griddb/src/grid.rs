mod arena;
mod cells;
mod config;
mod context;
mod editor;
mod query;
mod raycast;
mod storage;
mod types;

pub use arena::{ArenaStats, BucketArena};
pub use config::Config;
pub use context::{GridContext, QueryCounter};
pub use editor::EditorIndex;
pub use types::{EntityKey, Extent, RayHit, TypeFilter};

use cells::CellGrid;
use common::shapes::ShapeEnum;
use context::SharedState;
use std::cell::Cell;

/// Capabilities an object needs to live in a [`GridIndex`].
pub trait GridEntity {
    /// Small integer used for fast filtering. Read once, at insertion.
    fn type_tag(&self) -> u8;

    /// Axis-aligned bounds; must enclose the collision geometry.
    fn extent(&self) -> Extent;

    /// Exact outline for narrow-phase tests, or `None` if the entity has none.
    fn collision_geometry(&self) -> Option<ShapeEnum>;

    fn is_collision_enabled(&self) -> bool {
        true
    }
}

/// Bucketed spatial hash over a wrapped grid of cells.
///
/// Every stored entity has one bucket entry per covered cell and exactly one
/// place in the flat master list used for counting and positional access.
/// Queries stamp visited entities with the context's query id so an entity
/// spanning several cells is reported once.
pub struct GridIndex<T> {
    id: u32,
    shared: SharedState,
    cells: CellGrid,
    slots: Vec<Slot<T>>,
    query_marks: Vec<Cell<u32>>,
    all: Vec<u32>,
    free_slots: Vec<u32>,
}

pub(crate) struct Slot<T> {
    generation: u32,
    record: Option<Record<T>>,
}

pub(crate) struct Record<T> {
    value: T,
    extent: Extent,
    type_tag: u8,
    /// Position in `GridIndex::all`.
    position: u32,
}
