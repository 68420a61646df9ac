use common::shapes::{Circle, Point, Polygon, Rectangle, ShapeEnum};
use nalgebra::{Isometry2, Point2, Vector2};
use parry2d::query::{Ray, RayCast};
use parry2d::shape::SharedShape;

pub struct ShapeWithPosition {
    pub shape: SharedShape,
    pub position: Isometry2<f32>,
}

impl ShapeWithPosition {
    /// Converts exact game geometry into a positioned parry shape.
    ///
    /// Polygons become closed polylines so casts resolve edge by edge and
    /// concave outlines are handled. Degenerate input yields `None`.
    pub fn from_shape(shape: &ShapeEnum) -> Option<Self> {
        match shape {
            ShapeEnum::Circle(circle) => {
                if !(circle.radius > 0.0) {
                    return None;
                }
                Some(Self {
                    shape: SharedShape::ball(circle.radius),
                    position: Isometry2::translation(circle.x, circle.y),
                })
            }
            ShapeEnum::Rectangle(rect) => {
                if !(rect.width >= 0.0 && rect.height >= 0.0) {
                    return None;
                }
                Some(Self {
                    shape: SharedShape::cuboid(rect.width * 0.5, rect.height * 0.5),
                    position: Isometry2::translation(rect.x, rect.y),
                })
            }
            ShapeEnum::Polygon(polygon) => {
                let n = polygon.points.len();
                if n < 2 {
                    return None;
                }
                let vertices: Vec<Point2<f32>> = polygon
                    .points
                    .iter()
                    .map(|p| Point2::new(p.x, p.y))
                    .collect();
                let indices: Vec<[u32; 2]> = (0..n)
                    .map(|i| [i as u32, ((i + 1) % n) as u32])
                    .collect();
                Some(Self {
                    shape: SharedShape::polyline(vertices, Some(indices)),
                    position: Isometry2::identity(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentHit {
    /// Parameter along the segment, 0 at the start and 1 at the end.
    pub time: f32,
    pub point: Point,
    /// Unit surface normal facing back toward the segment start.
    pub normal: Point,
}

/// Earliest intersection of the segment `start -> end` with the outline of `shape`.
///
/// Shapes are hollow: a segment starting inside a circle or rectangle reports
/// the point where it leaves.
pub fn intersect_segment(shape: &ShapeEnum, start: Point, end: Point) -> Option<SegmentHit> {
    let dir = end - start;
    if dir.x == 0.0 && dir.y == 0.0 {
        return None;
    }
    let positioned = ShapeWithPosition::from_shape(shape)?;
    let ray = Ray::new(Point2::new(start.x, start.y), Vector2::new(dir.x, dir.y));
    let hit = positioned
        .shape
        .cast_ray_and_get_normal(&positioned.position, &ray, 1.0, false)?;

    let time = hit.time_of_impact;
    if !(0.0..=1.0).contains(&time) {
        return None;
    }
    let mut normal = Point::new(hit.normal.x, hit.normal.y);
    if normal.dot(dir) > 0.0 {
        normal = -normal;
    }
    let len = normal.length();
    if len > 0.0 {
        normal = Point::new(normal.x / len, normal.y / len);
    }
    Some(SegmentHit {
        time,
        point: start.lerp(end, time),
        normal,
    })
}

pub fn shape_contains_point(shape: &ShapeEnum, x: f32, y: f32) -> bool {
    match shape {
        ShapeEnum::Circle(circle) => circle.contains_point(x, y),
        ShapeEnum::Rectangle(rect) => rect.contains_point(x, y),
        ShapeEnum::Polygon(polygon) => polygon.contains_point(x, y),
    }
}

pub fn shape_overlaps_rectangle(shape: &ShapeEnum, rect: &Rectangle) -> bool {
    match shape {
        ShapeEnum::Circle(circle) => circle_rectangle(circle, rect),
        ShapeEnum::Rectangle(other) => rectangle_rectangle(other, rect),
        ShapeEnum::Polygon(polygon) => polygon_rectangle(polygon, rect),
    }
}

pub fn shape_shape(a: &ShapeEnum, b: &ShapeEnum) -> bool {
    match (a, b) {
        (ShapeEnum::Circle(circle_a), ShapeEnum::Circle(circle_b)) => {
            circle_circle(circle_a, circle_b)
        }
        (ShapeEnum::Circle(circle), ShapeEnum::Rectangle(rectangle))
        | (ShapeEnum::Rectangle(rectangle), ShapeEnum::Circle(circle)) => {
            circle_rectangle(circle, rectangle)
        }
        (ShapeEnum::Rectangle(rectangle_a), ShapeEnum::Rectangle(rectangle_b)) => {
            rectangle_rectangle(rectangle_a, rectangle_b)
        }
        (ShapeEnum::Polygon(polygon), ShapeEnum::Rectangle(rectangle))
        | (ShapeEnum::Rectangle(rectangle), ShapeEnum::Polygon(polygon)) => {
            polygon_rectangle(polygon, rectangle)
        }
        (ShapeEnum::Polygon(polygon), ShapeEnum::Circle(circle))
        | (ShapeEnum::Circle(circle), ShapeEnum::Polygon(polygon)) => {
            polygon_circle(polygon, circle)
        }
        (ShapeEnum::Polygon(polygon_a), ShapeEnum::Polygon(polygon_b)) => {
            polygon_polygon(polygon_a, polygon_b)
        }
    }
}

// Touching edges count as overlapping
pub fn rectangle_rectangle(a: &Rectangle, b: &Rectangle) -> bool {
    a.left() <= b.right() && a.right() >= b.left() && a.top() <= b.bottom() && a.bottom() >= b.top()
}

pub fn circle_circle(a: &Circle, b: &Circle) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let distance_sq = dx * dx + dy * dy;
    let collision_distance = a.radius + b.radius;
    distance_sq <= collision_distance * collision_distance
}

pub fn circle_rectangle(circle: &Circle, rectangle: &Rectangle) -> bool {
    rectangle.contains_circle(circle.x, circle.y, circle.radius)
}

pub fn polygon_rectangle(polygon: &Polygon, rectangle: &Rectangle) -> bool {
    if polygon.points.is_empty() || !rectangle_rectangle(&polygon.bounding_box, rectangle) {
        return false;
    }
    if polygon
        .points
        .iter()
        .any(|p| rectangle.contains_point(p.x, p.y))
    {
        return true;
    }
    let corners = rectangle.corners();
    if polygon.contains_point(corners[0].x, corners[0].y) {
        return true;
    }
    polygon.edges().any(|(a, b)| {
        (0..4).any(|i| segments_intersect(a, b, corners[i], corners[(i + 1) % 4]))
    })
}

pub fn polygon_circle(polygon: &Polygon, circle: &Circle) -> bool {
    if polygon.points.is_empty() {
        return false;
    }
    if polygon.contains_point(circle.x, circle.y) {
        return true;
    }
    let center = circle.center();
    let radius_sq = circle.radius * circle.radius;
    polygon
        .edges()
        .any(|(a, b)| point_segment_distance_sq(center, a, b) <= radius_sq)
}

pub fn polygon_polygon(a: &Polygon, b: &Polygon) -> bool {
    if a.points.is_empty()
        || b.points.is_empty()
        || !rectangle_rectangle(&a.bounding_box, &b.bounding_box)
    {
        return false;
    }
    if b.contains_point(a.points[0].x, a.points[0].y)
        || a.contains_point(b.points[0].x, b.points[0].y)
    {
        return true;
    }
    a.edges()
        .any(|(a0, a1)| b.edges().any(|(b0, b1)| segments_intersect(a0, a1, b0, b1)))
}

pub fn segments_intersect(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
    let d1 = cross(q2 - q1, p1 - q1);
    let d2 = cross(q2 - q1, p2 - q1);
    let d3 = cross(p2 - p1, q1 - p1);
    let d4 = cross(p2 - p1, q2 - p1);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

pub fn point_segment_distance_sq(p: Point, a: Point, b: Point) -> f32 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return p.distance_squared(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_squared(a.lerp(b, t))
}

fn cross(a: Point, b: Point) -> f32 {
    a.x * b.y - a.y * b.x
}

// Assumes p is collinear with a-b
fn on_segment(a: Point, b: Point, p: Point) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}
