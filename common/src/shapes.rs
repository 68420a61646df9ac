use rand::Rng;
use std::fmt::Debug;

pub trait Shape: Debug {
    fn bounding_box(&self) -> Rectangle;
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn dot(self, other: Point) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn distance_squared(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub bounding_box: Rectangle,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        let bounding_box = Rectangle {
            x,
            y,
            width: radius * 2.0,
            height: radius * 2.0,
        };
        Self {
            x,
            y,
            radius,
            bounding_box,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn update(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.update_bounding_box();
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        let dx = x - self.x;
        let dy = y - self.y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    // Bounding box stays centre based like every other Rectangle
    fn update_bounding_box(&mut self) {
        self.bounding_box = Rectangle {
            x: self.x,
            y: self.y,
            width: self.radius * 2.0,
            height: self.radius * 2.0,
        };
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            radius: 0.0,
            bounding_box: Rectangle::default(),
        }
    }
}

impl Shape for Circle {
    fn bounding_box(&self) -> Rectangle {
        self.bounding_box
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_min_max(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            x: (min_x + max_x) * 0.5,
            y: (min_y + max_y) * 0.5,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.y - self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn top_left(&self) -> (f32, f32) {
        (self.left(), self.top())
    }

    pub fn top_right(&self) -> (f32, f32) {
        (self.right(), self.top())
    }

    pub fn bottom_left(&self) -> (f32, f32) {
        (self.left(), self.bottom())
    }

    pub fn bottom_right(&self) -> (f32, f32) {
        (self.right(), self.bottom())
    }

    /// Corners in outline order, starting top-left and going clockwise (y down).
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.left(), self.top()),
            Point::new(self.right(), self.top()),
            Point::new(self.right(), self.bottom()),
            Point::new(self.left(), self.bottom()),
        ]
    }

    pub fn distance_to_point(&self, x: f32, y: f32) -> f32 {
        let dx = (x - self.x).abs() - self.width / 2.0;
        let dy = (y - self.y).abs() - self.height / 2.0;
        f32::max(dx, 0.0).powi(2) + f32::max(dy, 0.0).powi(2)
    }

    pub fn contains_circle(&self, x: f32, y: f32, radius: f32) -> bool {
        let dx = (x - self.x).abs();
        let dy = (y - self.y).abs();
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        if dx > half_width + radius || dy > half_height + radius {
            return false;
        }
        if dx <= half_width || dy <= half_height {
            return true;
        }
        let corner_distance_sq = (dx - half_width).powi(2) + (dy - half_height).powi(2);
        corner_distance_sq <= radius.powi(2)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }

    pub fn expand_to_include(&mut self, other: &Rectangle) {
        let left = f32::min(self.left(), other.left());
        let right = f32::max(self.right(), other.right());
        let top = f32::min(self.top(), other.top());
        let bottom = f32::max(self.bottom(), other.bottom());
        self.x = (left + right) / 2.0;
        self.y = (top + bottom) / 2.0;
        self.width = right - left;
        self.height = bottom - top;
    }

    pub fn get_random_circle_coords_inside<R: Rng>(&self, radius: f32, rng: &mut R) -> (f32, f32) {
        // Increase radius by 1 in calculations to add a minimal margin.
        let radius = radius + 1.0;
        (
            self._safe_randf32(rng, self.left() + radius, self.right() - radius),
            self._safe_randf32(rng, self.top() + radius, self.bottom() - radius),
        )
    }

    fn _safe_randf32<R: Rng>(&self, rng: &mut R, min: f32, max: f32) -> f32 {
        if min > max {
            return min;
        }
        rng.gen_range(min..=max)
    }
}

impl Shape for Rectangle {
    fn bounding_box(&self) -> Rectangle {
        *self
    }
}

/// Closed outline; the last point connects back to the first.
#[derive(Debug, Clone, Default)]
pub struct Polygon {
    pub points: Vec<Point>,
    pub bounding_box: Rectangle,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        let bounding_box = Self::compute_bounding_box(&points);
        Self {
            points,
            bounding_box,
        }
    }

    pub fn from_coords(coords: &[(f32, f32)]) -> Self {
        Self::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        for point in &mut self.points {
            point.x += dx;
            point.y += dy;
        }
        self.bounding_box.x += dx;
        self.bounding_box.y += dy;
    }

    /// Outline edges including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Even-odd rule; points exactly on an edge may land either way.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        if self.points.len() < 3 {
            return false;
        }
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > y) != (b.y > y) {
                let cross_x = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
                if x < cross_x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn compute_bounding_box(points: &[Point]) -> Rectangle {
        let Some(first) = points.first() else {
            return Rectangle::default();
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for point in &points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Rectangle::from_min_max(min_x, min_y, max_x, max_y)
    }
}

impl Shape for Polygon {
    fn bounding_box(&self) -> Rectangle {
        self.bounding_box
    }
}

#[derive(Clone, Debug)]
pub enum ShapeEnum {
    Circle(Circle),
    Rectangle(Rectangle),
    Polygon(Polygon),
}

impl Shape for ShapeEnum {
    fn bounding_box(&self) -> Rectangle {
        match self {
            ShapeEnum::Circle(circle) => circle.bounding_box(),
            ShapeEnum::Rectangle(rectangle) => rectangle.bounding_box(),
            ShapeEnum::Polygon(polygon) => polygon.bounding_box(),
        }
    }
}

impl From<Circle> for ShapeEnum {
    fn from(circle: Circle) -> Self {
        ShapeEnum::Circle(circle)
    }
}

impl From<Rectangle> for ShapeEnum {
    fn from(rectangle: Rectangle) -> Self {
        ShapeEnum::Rectangle(rectangle)
    }
}

impl From<Polygon> for ShapeEnum {
    fn from(polygon: Polygon) -> Self {
        ShapeEnum::Polygon(polygon)
    }
}
