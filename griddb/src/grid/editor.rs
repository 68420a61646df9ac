use super::types::{EntityKey, Extent};
use super::{GridEntity, GridIndex};
use crate::error::GridResult;
use std::fmt;
use std::ops::Deref;

/// A [`GridIndex`] that also remembers insertion order and can be deep-copied.
///
/// Mutations go through the editor so the order stays in step with the grid;
/// every read-only query is available through `Deref`.
pub struct EditorIndex<T> {
    grid: GridIndex<T>,
    order: Vec<EntityKey>,
}

impl<T> EditorIndex<T> {
    pub(crate) fn from_grid(grid: GridIndex<T>) -> Self {
        Self {
            grid,
            order: Vec::new(),
        }
    }

    /// Removes the entity and its one entry in the insertion order.
    pub fn remove(&mut self, key: EntityKey) -> Option<T> {
        let value = self.grid.remove(key)?;
        match self.order.iter().position(|&ordered| ordered == key) {
            Some(position) => {
                self.order.remove(position);
            }
            None => log::error!("editor index {}: {:?} missing from order", self.grid.id(), key),
        }
        Some(value)
    }

    pub fn update_extent(&mut self, key: EntityKey, extent: Extent) -> GridResult<()> {
        self.grid.update_extent(key, extent)
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.order.clear();
    }

    /// Entities in the order they were inserted.
    pub fn objects(&self) -> impl Iterator<Item = (EntityKey, &T)> + '_ {
        self.order
            .iter()
            .filter_map(move |&key| self.grid.get(key).map(|value| (key, value)))
    }

    pub fn object_at(&self, position: usize) -> Option<(EntityKey, &T)> {
        let key = *self.order.get(position)?;
        self.grid.get(key).map(|value| (key, value))
    }

    /// Mutable access to a stored value; see [`GridIndex::get_mut`].
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut T> {
        self.grid.get_mut(key)
    }

    pub fn keys(&self) -> &[EntityKey] {
        &self.order
    }
}

impl<T: GridEntity> EditorIndex<T> {
    pub fn insert(&mut self, value: T) -> GridResult<EntityKey> {
        let key = self.grid.insert(value)?;
        self.order.push(key);
        Ok(key)
    }

    pub fn insert_with_extent(&mut self, value: T, extent: Extent) -> GridResult<EntityKey> {
        let key = self.grid.insert_with_extent(value, extent)?;
        self.order.push(key);
        Ok(key)
    }

    pub fn refresh_extent(&mut self, key: EntityKey) -> GridResult<()> {
        self.grid.refresh_extent(key)
    }
}

impl<T: Clone> EditorIndex<T> {
    /// Appends a clone of every entity of `other`, in `other`'s order and
    /// with its cached extent. The two indices share nothing afterwards.
    pub fn copy_from(&mut self, other: &EditorIndex<T>) {
        self.order.reserve(other.order.len());
        for &key in &other.order {
            if let Some(new_key) = self.grid.clone_entry_from(&other.grid, key) {
                self.order.push(new_key);
            }
        }
        log::debug!(
            "editor index {}: copied {} objects from index {}",
            self.grid.id(),
            other.order.len(),
            other.grid.id()
        );
    }

    /// Replaces the contents of this index with copies of `other`'s.
    pub fn assign_from(&mut self, other: &EditorIndex<T>) {
        self.clear();
        self.copy_from(other);
    }
}

impl<T: Clone> Clone for EditorIndex<T> {
    fn clone(&self) -> Self {
        let mut copy = Self::from_grid(self.grid.empty_like());
        copy.copy_from(self);
        copy
    }
}

impl<T> Deref for EditorIndex<T> {
    type Target = GridIndex<T>;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}

impl<T> fmt::Debug for EditorIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorIndex")
            .field("grid", &self.grid)
            .field("order", &self.order.len())
            .finish()
    }
}
