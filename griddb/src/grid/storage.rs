use super::cells::CellGrid;
use super::context::SharedState;
use super::types::{EntityKey, Extent};
use super::{GridEntity, GridIndex, Record, Slot};
use crate::error::{GridError, GridResult};
use fxhash::FxHashMap;
use std::cell::Cell;
use std::fmt;

impl<T> GridIndex<T> {
    pub(crate) fn new(shared: SharedState) -> Self {
        let id = shared.allocate_index_id();
        let cells = CellGrid::new(&shared.config);
        Self {
            id,
            shared,
            cells,
            slots: Vec::new(),
            query_marks: Vec::new(),
            all: Vec::new(),
            free_slots: Vec::new(),
        }
    }

    /// Creates an empty index in the same context as this one.
    pub fn empty_like(&self) -> Self {
        Self::new(self.shared.clone())
    }

    /// Identifier carried by every key this index hands out.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn count(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.resolve(key).is_some()
    }

    pub fn get(&self, key: EntityKey) -> Option<&T> {
        let slot = self.resolve(key)?;
        self.record(slot).map(|record| &record.value)
    }

    /// Mutable access to a stored value. Moving its geometry requires a
    /// follow-up [`update_extent`](Self::update_extent).
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut T> {
        let slot = self.resolve(key)?;
        self.slots[slot]
            .record
            .as_mut()
            .map(|record| &mut record.value)
    }

    pub fn extent_of(&self, key: EntityKey) -> Option<Extent> {
        let slot = self.resolve(key)?;
        self.record(slot).map(|record| record.extent)
    }

    pub fn type_tag_of(&self, key: EntityKey) -> Option<u8> {
        let slot = self.resolve(key)?;
        self.record(slot).map(|record| record.type_tag)
    }

    /// Positional access into the master list. Positions are dense but not
    /// stable across removals.
    pub fn get_by_index(&self, index: usize) -> Option<(EntityKey, &T)> {
        let slot = *self.all.get(index)? as usize;
        self.record(slot)
            .map(|record| (self.key_for(slot), &record.value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &T)> + '_ {
        self.all.iter().filter_map(move |&slot| {
            let slot = slot as usize;
            self.record(slot)
                .map(|record| (self.key_for(slot), &record.value))
        })
    }

    /// Unlinks the entity from every bucket it covers and hands the value back.
    ///
    /// Stale, foreign or unknown keys are ignored.
    pub fn remove(&mut self, key: EntityKey) -> Option<T> {
        let Some(slot) = self.resolve(key) else {
            log::debug!("index {}: ignored removal of non-member {:?}", self.id, key);
            return None;
        };
        let record = self.slots[slot].record.take()?;
        {
            let mut arena = self.shared.arena.borrow_mut();
            for bucket in self.cells.covered_buckets(&record.extent) {
                let unlinked = self.cells.unlink(&mut arena, bucket as usize, slot as u32);
                debug_assert!(unlinked, "{:?} missing from bucket {}", key, bucket);
            }
        }
        self.detach_from_master(record.position);
        let entry = &mut self.slots[slot];
        entry.generation = entry.generation.wrapping_add(1);
        self.query_marks[slot].set(0);
        self.free_slots.push(slot as u32);
        log::trace!("index {}: removed {:?}", self.id, key);
        Some(record.value)
    }

    /// Moves an entity to a new extent, touching only the buckets that stop
    /// or start being covered.
    pub fn update_extent(&mut self, key: EntityKey, extent: Extent) -> GridResult<()> {
        let Some(slot) = self.resolve(key) else {
            log::warn!("index {}: extent update for unknown {:?}", self.id, key);
            return Err(GridError::UnknownEntity { key });
        };
        if let Err(err) = extent.validate() {
            log::warn!("index {}: rejected extent update for {:?}: {}", self.id, key, err);
            return Err(err);
        }
        let Some(old_extent) = self.record(slot).map(|record| record.extent) else {
            return Err(GridError::UnknownEntity { key });
        };

        let old_buckets = self.cells.covered_buckets(&old_extent);
        let new_buckets = self.cells.covered_buckets(&extent);
        {
            let mut arena = self.shared.arena.borrow_mut();
            for &bucket in &old_buckets {
                if !new_buckets.contains(&bucket) {
                    self.cells.unlink(&mut arena, bucket as usize, slot as u32);
                }
            }
            for &bucket in &new_buckets {
                if !old_buckets.contains(&bucket) {
                    self.cells.link(&mut arena, bucket as usize, slot as u32);
                }
            }
        }
        if let Some(record) = self.slots[slot].record.as_mut() {
            record.extent = extent;
        }
        log::trace!("index {}: moved {:?} to {:?}", self.id, key, extent);
        Ok(())
    }

    /// Removes every entity and returns all bucket entries to the arena.
    pub fn clear(&mut self) {
        {
            let mut arena = self.shared.arena.borrow_mut();
            self.cells.release_all(&mut arena);
        }
        for (slot, entry) in self.slots.iter_mut().enumerate() {
            if entry.record.take().is_some() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free_slots.push(slot as u32);
            }
        }
        for mark in &self.query_marks {
            mark.set(0);
        }
        log::debug!("index {}: cleared {} objects", self.id, self.all.len());
        self.all.clear();
    }

    /// Bucket coordinates currently holding an entry for `key`.
    pub fn buckets_holding(&self, key: EntityKey) -> Vec<(usize, usize)> {
        let Some(slot) = self.resolve(key) else {
            return Vec::new();
        };
        let arena = self.shared.arena.borrow();
        (0..self.cells.bucket_count())
            .filter(|&bucket| self.cells.bucket_contains(&arena, bucket, slot as u32))
            .map(|bucket| self.cells.bucket_coords(bucket))
            .collect()
    }

    /// Bucket coordinates an entity with `extent` would occupy.
    pub fn covered_buckets(&self, extent: &Extent) -> Vec<(usize, usize)> {
        self.cells
            .covered_buckets(extent)
            .into_iter()
            .map(|bucket| self.cells.bucket_coords(bucket as usize))
            .collect()
    }

    pub fn bucket_len(&self, x: usize, y: usize) -> usize {
        let bucket = self.cells.bucket_index(x as i64, y as i64);
        let arena = self.shared.arena.borrow();
        self.cells.bucket_len(&arena, bucket)
    }

    #[inline(always)]
    pub(crate) fn resolve(&self, key: EntityKey) -> Option<usize> {
        if key.index != self.id {
            return None;
        }
        let slot = key.slot as usize;
        let entry = self.slots.get(slot)?;
        (entry.generation == key.generation && entry.record.is_some()).then_some(slot)
    }

    #[inline(always)]
    pub(crate) fn record(&self, slot: usize) -> Option<&Record<T>> {
        self.slots.get(slot).and_then(|entry| entry.record.as_ref())
    }

    #[inline(always)]
    pub(crate) fn key_for(&self, slot: usize) -> EntityKey {
        EntityKey {
            index: self.id,
            slot: slot as u32,
            generation: self.slots[slot].generation,
        }
    }

    pub(crate) fn insert_validated(&mut self, value: T, extent: Extent, type_tag: u8) -> EntityKey {
        let slot = match self.free_slots.pop() {
            Some(slot) => slot as usize,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    record: None,
                });
                self.query_marks.push(Cell::new(0));
                self.slots.len() - 1
            }
        };
        {
            let mut arena = self.shared.arena.borrow_mut();
            for bucket in self.cells.covered_buckets(&extent) {
                self.cells.link(&mut arena, bucket as usize, slot as u32);
            }
        }
        let position = self.all.len() as u32;
        self.all.push(slot as u32);
        self.slots[slot].record = Some(Record {
            value,
            extent,
            type_tag,
            position,
        });
        self.query_marks[slot].set(0);
        let key = self.key_for(slot);
        log::trace!("index {}: inserted {:?} at {:?}", self.id, key, extent);
        key
    }

    fn detach_from_master(&mut self, position: u32) {
        let position = position as usize;
        self.all.swap_remove(position);
        if let Some(&moved) = self.all.get(position) {
            if let Some(record) = self.slots[moved as usize].record.as_mut() {
                record.position = position as u32;
            }
        }
    }
}

impl<T: GridEntity> GridIndex<T> {
    /// Inserts `value` under the extent it reports.
    pub fn insert(&mut self, value: T) -> GridResult<EntityKey> {
        let extent = value.extent();
        self.insert_with_extent(value, extent)
    }

    /// Inserts `value`, adding one bucket entry per cell `extent` covers.
    ///
    /// Malformed extents are rejected and leave the index untouched.
    pub fn insert_with_extent(&mut self, value: T, extent: Extent) -> GridResult<EntityKey> {
        if let Err(err) = extent.validate() {
            log::warn!("index {}: rejected insert: {}", self.id, err);
            return Err(err);
        }
        let type_tag = value.type_tag();
        Ok(self.insert_validated(value, extent, type_tag))
    }

    /// Re-reads the extent the stored value reports.
    pub fn refresh_extent(&mut self, key: EntityKey) -> GridResult<()> {
        let extent = self
            .get(key)
            .map(|value| value.extent())
            .ok_or(GridError::UnknownEntity { key })?;
        self.update_extent(key, extent)
    }
}

impl<T: Clone> GridIndex<T> {
    /// Clones every entity of `other` into this index.
    ///
    /// Returns the mapping from `other`'s keys to the new keys.
    pub fn copy_from(&mut self, other: &GridIndex<T>) -> FxHashMap<EntityKey, EntityKey> {
        let mut remap = FxHashMap::default();
        remap.reserve(other.count());
        for (key, _) in other.iter() {
            if let Some(new_key) = self.clone_entry_from(other, key) {
                remap.insert(key, new_key);
            }
        }
        remap
    }

    pub(crate) fn clone_entry_from(&mut self, other: &GridIndex<T>, key: EntityKey) -> Option<EntityKey> {
        let slot = other.resolve(key)?;
        let record = other.record(slot)?;
        Some(self.insert_validated(record.value.clone(), record.extent, record.type_tag))
    }
}

impl<T: fmt::Debug> GridIndex<T> {
    /// Logs every stored entity at info level.
    pub fn dump_objects(&self) {
        log::info!("index {}: {} objects", self.id, self.count());
        for (position, &slot) in self.all.iter().enumerate() {
            let slot = slot as usize;
            if let Some(record) = self.record(slot) {
                log::info!(
                    "  [{}] {:?} type {} {:?} {:?}",
                    position,
                    self.key_for(slot),
                    record.type_tag,
                    record.extent,
                    record.value
                );
            }
        }
    }
}

impl<T> Drop for GridIndex<T> {
    fn drop(&mut self) {
        match self.shared.arena.try_borrow_mut() {
            Ok(mut arena) => self.cells.release_all(&mut arena),
            Err(_) => log::error!(
                "index {}: arena busy during drop, leaking its bucket entries",
                self.id
            ),
        }
    }
}

impl<T> fmt::Debug for GridIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridIndex")
            .field("id", &self.id)
            .field("count", &self.all.len())
            .field("slots", &self.slots.len())
            .field("free_slots", &self.free_slots.len())
            .field("buckets", &self.cells.bucket_count())
            .field("cell_width", &self.cells.cell_width())
            .finish_non_exhaustive()
    }
}
