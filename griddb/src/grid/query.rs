use super::arena::NIL;
use super::types::{EntityKey, Extent, TypeFilter};
use super::{GridEntity, GridIndex};
use common::shapes::{Point, ShapeEnum};
use smallvec::SmallVec;

pub(crate) type Candidates = SmallVec<[u32; 64]>;

impl<T> GridIndex<T> {
    /// Entities passing `filter`, limited to those whose extent intersects
    /// `region` when one is given. Each entity is reported at most once; order
    /// is unspecified.
    pub fn query(&self, filter: TypeFilter<'_>, region: Option<&Extent>) -> Vec<EntityKey> {
        let mut found = Vec::new();
        self.query_with(filter, region, |key, _| found.push(key));
        found
    }

    /// Like [`query`](Self::query) but hands each match to `f`.
    ///
    /// `f` runs after the bucket walk has finished.
    pub fn query_with<F>(&self, filter: TypeFilter<'_>, region: Option<&Extent>, mut f: F)
    where
        F: FnMut(EntityKey, &T),
    {
        for slot in self.collect_candidates(filter, region) {
            let slot = slot as usize;
            if let Some(record) = self.record(slot) {
                f(self.key_for(slot), &record.value);
            }
        }
    }

    /// Every entity whose extent intersects `region`, regardless of type.
    pub fn query_fast(&self, region: &Extent) -> Vec<EntityKey> {
        self.query(TypeFilter::All, Some(region))
    }

    /// Broad phase shared by the region queries. Advances the query id once.
    pub(crate) fn collect_candidates(
        &self,
        filter: TypeFilter<'_>,
        region: Option<&Extent>,
    ) -> Candidates {
        let query_id = self.shared.counter.advance();
        let mut candidates = Candidates::new();
        match region {
            None => {
                for &slot in &self.all {
                    let Some(record) = self.record(slot as usize) else {
                        continue;
                    };
                    self.query_marks[slot as usize].set(query_id);
                    if filter.matches(record.type_tag) {
                        candidates.push(slot);
                    }
                }
            }
            Some(region) => {
                let arena = self.shared.arena.borrow();
                for bucket in self.cells.covered_buckets(region) {
                    let mut node = self.cells.head(bucket as usize);
                    while node != NIL {
                        let entry = arena.entry(node);
                        node = entry.next;
                        let mark = &self.query_marks[entry.slot as usize];
                        if mark.get() == query_id {
                            continue;
                        }
                        mark.set(query_id);
                        let Some(record) = self.record(entry.slot as usize) else {
                            continue;
                        };
                        if filter.matches(record.type_tag) && record.extent.intersects(region) {
                            candidates.push(entry.slot);
                        }
                    }
                }
            }
        }
        candidates
    }
}

impl<T: GridEntity> GridIndex<T> {
    /// Entities whose exact geometry contains `point`.
    pub fn objects_under_point(&self, point: Point, filter: TypeFilter<'_>) -> Vec<EntityKey> {
        let region = Extent::around_point(point);
        self.collect_candidates(filter, Some(&region))
            .into_iter()
            .filter_map(|slot| {
                let slot = slot as usize;
                let geometry = self.record(slot)?.value.collision_geometry()?;
                collisions::shape_contains_point(&geometry, point.x, point.y)
                    .then(|| self.key_for(slot))
            })
            .collect()
    }

    /// Entities whose exact geometry overlaps `shape`.
    pub fn query_overlapping(&self, shape: &ShapeEnum, filter: TypeFilter<'_>) -> Vec<EntityKey> {
        let region = Extent::of_shape(shape);
        self.collect_candidates(filter, Some(&region))
            .into_iter()
            .filter_map(|slot| {
                let slot = slot as usize;
                let geometry = self.record(slot)?.value.collision_geometry()?;
                collisions::shape_shape(&geometry, shape).then(|| self.key_for(slot))
            })
            .collect()
    }
}
