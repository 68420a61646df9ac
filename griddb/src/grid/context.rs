use super::arena::{ArenaStats, BucketArena};
use super::config::Config;
use super::editor::EditorIndex;
use super::{GridEntity, GridIndex};
use crate::error::GridResult;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Query generation counter shared by every index of a context.
///
/// Cloning shares the counter. Tests can build one with
/// [`QueryCounter::starting_at`] and hand it to [`GridContext::with_counter`].
#[derive(Clone, Debug, Default)]
pub struct QueryCounter(Rc<Cell<u32>>);

impl QueryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(value: u32) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn current(&self) -> u32 {
        self.0.get()
    }

    /// Moves to the next query id. Zero is skipped: it is the stamp of an
    /// entity no query has visited yet.
    pub fn advance(&self) -> u32 {
        let mut next = self.0.get().wrapping_add(1);
        if next == 0 {
            next = 1;
        }
        self.0.set(next);
        next
    }
}

/// State an index shares with its context and sibling indices.
#[derive(Clone, Debug)]
pub(crate) struct SharedState {
    pub(crate) arena: Rc<RefCell<BucketArena>>,
    pub(crate) counter: QueryCounter,
    next_index_id: Rc<Cell<u32>>,
    pub(crate) config: Config,
}

impl SharedState {
    pub(crate) fn allocate_index_id(&self) -> u32 {
        let id = self.next_index_id.get();
        self.next_index_id.set(id.wrapping_add(1));
        id
    }
}

/// Application-lifetime owner of the bucket arena and the query counter.
///
/// Every index built from a context shares both. The arena is freed once the
/// context and all of its indices are dropped, in any order.
#[derive(Debug)]
pub struct GridContext {
    shared: SharedState,
}

impl GridContext {
    pub fn new() -> Self {
        let config = Config::default();
        Self {
            shared: SharedState {
                arena: Rc::new(RefCell::new(BucketArena::new(config.arena_chunk_size))),
                counter: QueryCounter::new(),
                next_index_id: Rc::new(Cell::new(1)),
                config,
            },
        }
    }

    pub fn with_config(config: Config) -> GridResult<Self> {
        Self::with_counter(config, QueryCounter::new())
    }

    pub fn with_counter(config: Config, counter: QueryCounter) -> GridResult<Self> {
        config.validate()?;
        log::debug!(
            "grid context: {} unit cells, {}x{} buckets",
            config.cell_width(),
            config.rows(),
            config.rows()
        );
        Ok(Self {
            shared: SharedState {
                arena: Rc::new(RefCell::new(BucketArena::new(config.arena_chunk_size))),
                counter,
                next_index_id: Rc::new(Cell::new(1)),
                config,
            },
        })
    }

    pub fn create_index<T>(&self) -> GridIndex<T>
    where
        T: GridEntity,
    {
        GridIndex::new(self.shared.clone())
    }

    pub fn create_editor_index<T>(&self) -> EditorIndex<T>
    where
        T: GridEntity + Clone,
    {
        EditorIndex::from_grid(self.create_index())
    }

    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    pub fn query_counter(&self) -> &QueryCounter {
        &self.shared.counter
    }

    pub fn arena_stats(&self) -> ArenaStats {
        self.shared.arena.borrow().stats()
    }

    /// Number of indices currently sharing this context's arena.
    pub fn live_indices(&self) -> usize {
        Rc::strong_count(&self.shared.arena) - 1
    }
}

impl Default for GridContext {
    fn default() -> Self {
        Self::new()
    }
}
