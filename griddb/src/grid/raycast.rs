use super::arena::NIL;
use super::cells::CellGrid;
use super::types::{RayHit, TypeFilter};
use super::{GridEntity, GridIndex};
use common::shapes::Point;
use smallvec::SmallVec;

impl<T: GridEntity> GridIndex<T> {
    /// Nearest exact intersection of the segment `start -> end` among
    /// collision-enabled entities passing `filter`.
    ///
    /// Walks the cells the segment crosses in order and stops once the best
    /// hit lies before the next cell's entry point. A walk longer than the
    /// bucket table would only revisit buckets, so past that budget the
    /// remaining unvisited entities are resolved in one pass.
    pub fn ray_cast(&self, start: Point, end: Point, filter: TypeFilter<'_>) -> Option<RayHit> {
        if !(start.x.is_finite() && start.y.is_finite() && end.x.is_finite() && end.y.is_finite())
            || start == end
        {
            return None;
        }
        let query_id = self.shared.counter.advance();
        let mut best: Option<RayHit> = None;
        let mut candidates: SmallVec<[u32; 32]> = SmallVec::new();
        let mut walk = CellWalk::new(&self.cells, start, end);
        let mut previous_entry = 0.0f32;
        let mut stopped = false;

        for (cx, cy, t_entry) in walk.by_ref().take(self.cells.bucket_count()) {
            // One cell of slack absorbs rounding in the accumulated boundaries
            if let Some(hit) = &best {
                if hit.time < previous_entry {
                    stopped = true;
                    break;
                }
            }
            previous_entry = t_entry;

            candidates.clear();
            {
                let arena = self.shared.arena.borrow();
                let mut node = self.cells.head(self.cells.bucket_index(cx, cy));
                while node != NIL {
                    let entry = arena.entry(node);
                    node = entry.next;
                    let mark = &self.query_marks[entry.slot as usize];
                    if mark.get() == query_id {
                        continue;
                    }
                    mark.set(query_id);
                    candidates.push(entry.slot);
                }
            }
            self.nearest_hit(&candidates, start, end, filter, &mut best);
        }

        if !stopped && !walk.is_finished() {
            log::trace!(
                "index {}: ray walk over budget, resolving {} objects directly",
                self.id,
                self.all.len()
            );
            candidates.clear();
            for &slot in &self.all {
                let mark = &self.query_marks[slot as usize];
                if mark.get() != query_id {
                    mark.set(query_id);
                    candidates.push(slot);
                }
            }
            self.nearest_hit(&candidates, start, end, filter, &mut best);
        }
        best
    }

    fn nearest_hit(
        &self,
        slots: &[u32],
        start: Point,
        end: Point,
        filter: TypeFilter<'_>,
        best: &mut Option<RayHit>,
    ) {
        for &slot in slots {
            let slot = slot as usize;
            let Some(record) = self.record(slot) else {
                continue;
            };
            if !filter.matches(record.type_tag)
                || !record.extent.intersects_segment(start, end)
                || !record.value.is_collision_enabled()
            {
                continue;
            }
            let Some(geometry) = record.value.collision_geometry() else {
                continue;
            };
            let Some(hit) = collisions::intersect_segment(&geometry, start, end) else {
                continue;
            };
            if best.map_or(true, |current| hit.time < current.time) {
                *best = Some(RayHit {
                    key: self.key_for(slot),
                    time: hit.time,
                    point: hit.point,
                    normal: hit.normal,
                });
            }
        }
    }

    /// True when no collision-enabled entity passing `filter` blocks the
    /// segment between the two points.
    pub fn point_can_see_point(&self, from: Point, to: Point, filter: TypeFilter<'_>) -> bool {
        self.ray_cast(from, to, filter).is_none()
    }
}

/// Grid traversal over unwrapped cell coordinates, yielding each cell the
/// segment passes through together with the segment parameter where it enters.
struct CellWalk {
    cx: i64,
    cy: i64,
    end_x: i64,
    end_y: i64,
    step_x: i64,
    step_y: i64,
    t_max_x: f32,
    t_max_y: f32,
    t_delta_x: f32,
    t_delta_y: f32,
    t_entry: f32,
    remaining: u64,
    started: bool,
}

impl CellWalk {
    fn is_finished(&self) -> bool {
        self.remaining == 0
    }

    fn new(cells: &CellGrid, start: Point, end: Point) -> Self {
        let width = cells.cell_width();
        let cx = cells.cell_coord(start.x);
        let cy = cells.cell_coord(start.y);
        let end_x = cells.cell_coord(end.x);
        let end_y = cells.cell_coord(end.y);
        let (step_x, t_delta_x, t_max_x) = walk_axis(start.x, end.x - start.x, cx, width);
        let (step_y, t_delta_y, t_max_y) = walk_axis(start.y, end.y - start.y, cy, width);
        Self {
            cx,
            cy,
            end_x,
            end_y,
            step_x,
            step_y,
            t_max_x,
            t_max_y,
            t_delta_x,
            t_delta_y,
            t_entry: 0.0,
            // Every step moves one axis one cell toward the end cell
            remaining: (end_x - cx).unsigned_abs() + (end_y - cy).unsigned_abs() + 1,
            started: false,
        }
    }
}

/// Step direction, parameter span of one cell, and parameter of the first boundary.
fn walk_axis(origin: f32, delta: f32, cell: i64, width: f32) -> (i64, f32, f32) {
    if delta > 0.0 {
        let boundary = (cell + 1) as f32 * width;
        (1, width / delta, (boundary - origin) / delta)
    } else if delta < 0.0 {
        let boundary = cell as f32 * width;
        (-1, width / -delta, (boundary - origin) / delta)
    } else {
        (0, f32::INFINITY, f32::INFINITY)
    }
}

impl Iterator for CellWalk {
    type Item = (i64, i64, f32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.started {
            let advance_x = if self.cx == self.end_x {
                false
            } else if self.cy == self.end_y {
                true
            } else {
                self.t_max_x < self.t_max_y
            };
            if advance_x {
                self.t_entry = self.t_max_x.clamp(0.0, 1.0);
                self.cx += self.step_x;
                self.t_max_x += self.t_delta_x;
            } else {
                self.t_entry = self.t_max_y.clamp(0.0, 1.0);
                self.cy += self.step_y;
                self.t_max_y += self.t_delta_y;
            }
        } else {
            self.started = true;
        }
        Some((self.cx, self.cy, self.t_entry))
    }
}
