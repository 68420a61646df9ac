use crate::error::{GridError, GridResult};
use common::shapes::{Point, Rectangle, Shape, ShapeEnum};
use std::fmt;

/// Axis-aligned bounding rectangle used for broad-phase membership.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Extent {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> GridResult<Self> {
        let extent = Self::new_unchecked(min_x, min_y, max_x, max_y);
        extent.validate()?;
        Ok(extent)
    }

    /// Builds an extent without checking it; the index validates on insert.
    #[inline(always)]
    pub fn new_unchecked(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn from_rectangle(rect: &Rectangle) -> Self {
        Self::new_unchecked(rect.left(), rect.top(), rect.right(), rect.bottom())
    }

    pub fn of_shape(shape: &ShapeEnum) -> Self {
        Self::from_rectangle(&shape.bounding_box())
    }

    pub fn around_point(point: Point) -> Self {
        Self::new_unchecked(point.x, point.y, point.x, point.y)
    }

    /// Smallest extent holding both endpoints of a segment.
    pub fn of_segment(start: Point, end: Point) -> Self {
        Self::new_unchecked(
            start.x.min(end.x),
            start.y.min(end.y),
            start.x.max(end.x),
            start.y.max(end.y),
        )
    }

    pub fn validate(&self) -> GridResult<()> {
        validate_extent_bounds(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn to_rectangle(&self) -> Rectangle {
        Rectangle::from_min_max(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Touching edges count as intersecting.
    #[inline(always)]
    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    #[inline(always)]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Slab test of the segment `start -> end` against this extent, edges inclusive.
    pub fn intersects_segment(&self, start: Point, end: Point) -> bool {
        let mut t_min = 0.0f32;
        let mut t_max = 1.0f32;
        let axes = [
            (start.x, end.x - start.x, self.min_x, self.max_x),
            (start.y, end.y - start.y, self.min_y, self.max_y),
        ];
        for (origin, delta, lo, hi) in axes {
            if delta == 0.0 {
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / delta;
            let mut t0 = (lo - origin) * inv;
            let mut t1 = (hi - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}

/// Handle to an entity stored in a [`GridIndex`](crate::GridIndex).
///
/// `index` names the owning index; `generation` turns keys of removed
/// entities stale so they can never reach a reused slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub(crate) index: u32,
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl EntityKey {
    pub fn index_id(&self) -> u32 {
        self.index
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Type filter applied to an entity's cached type tag.
#[derive(Clone, Copy)]
pub enum TypeFilter<'a> {
    All,
    Type(u8),
    Test(&'a dyn Fn(u8) -> bool),
}

impl TypeFilter<'_> {
    #[inline(always)]
    pub fn matches(&self, type_tag: u8) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Type(wanted) => *wanted == type_tag,
            TypeFilter::Test(test) => test(type_tag),
        }
    }
}

impl From<u8> for TypeFilter<'_> {
    fn from(type_tag: u8) -> Self {
        TypeFilter::Type(type_tag)
    }
}

impl fmt::Debug for TypeFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => f.write_str("All"),
            TypeFilter::Type(type_tag) => f.debug_tuple("Type").field(type_tag).finish(),
            TypeFilter::Test(_) => f.write_str("Test(..)"),
        }
    }
}

/// Nearest exact intersection found by a ray cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub key: EntityKey,
    /// Parameter along the segment, 0 at the start and 1 at the end.
    pub time: f32,
    pub point: Point,
    pub normal: Point,
}

pub(crate) fn validate_extent_bounds(
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
) -> GridResult<()> {
    if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite())
        || min_x > max_x
        || min_y > max_y
    {
        return Err(GridError::InvalidExtent {
            min_x,
            min_y,
            max_x,
            max_y,
        });
    }
    Ok(())
}
