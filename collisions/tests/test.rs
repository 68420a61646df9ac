use collisions::*;
use common::shapes::{Circle, Point, Polygon, Rectangle, ShapeEnum};

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn test_segment_misses_circle() {
    let shape = ShapeEnum::Circle(Circle::new(0.0, 10.0, 2.0));
    let hit = intersect_segment(&shape, Point::new(-10.0, 0.0), Point::new(10.0, 0.0));
    assert_eq!(hit, None);
}

#[test]
fn test_segment_hits_circle() {
    let shape = ShapeEnum::Circle(Circle::new(0.0, 0.0, 2.0));
    let hit = intersect_segment(&shape, Point::new(-10.0, 0.0), Point::new(10.0, 0.0))
        .expect("segment crosses the circle");
    assert!(approx_eq(hit.time, 0.4));
    assert!(approx_eq(hit.point.x, -2.0));
    assert!(approx_eq(hit.point.y, 0.0));
    assert!(approx_eq(hit.normal.x, -1.0));
}

#[test]
fn test_segment_stops_short_of_rectangle() {
    let shape = ShapeEnum::Rectangle(Rectangle::new(20.0, 0.0, 4.0, 4.0));
    let hit = intersect_segment(&shape, Point::new(0.0, 0.0), Point::new(10.0, 0.0));
    assert_eq!(hit, None);
}

#[test]
fn test_segment_hits_rectangle_face() {
    let shape = ShapeEnum::Rectangle(Rectangle::new(0.0, 10.0, 4.0, 4.0));
    let hit = intersect_segment(&shape, Point::new(0.0, 0.0), Point::new(0.0, 20.0))
        .expect("segment crosses the rectangle");
    assert!(approx_eq(hit.point.y, 8.0));
    assert!(approx_eq(hit.time, 0.4));
    assert!(approx_eq(hit.normal.y, -1.0));
}

#[test]
fn test_segment_hits_polygon_first_edge() {
    let shape = ShapeEnum::Polygon(Polygon::from_coords(&[
        (10.0, -5.0),
        (20.0, -5.0),
        (20.0, 5.0),
        (10.0, 5.0),
    ]));
    let hit = intersect_segment(&shape, Point::new(0.0, 0.0), Point::new(40.0, 0.0))
        .expect("segment crosses the polygon");
    assert!(approx_eq(hit.time, 0.25));
    assert!(approx_eq(hit.point.x, 10.0));
    assert!(approx_eq(hit.normal.x, -1.0));
}

#[test]
fn test_segment_through_concave_notch_misses() {
    // U shape; the segment runs down the open notch without touching an edge
    let shape = ShapeEnum::Polygon(Polygon::from_coords(&[
        (0.0, 0.0),
        (4.0, 0.0),
        (4.0, 6.0),
        (6.0, 6.0),
        (6.0, 0.0),
        (10.0, 0.0),
        (10.0, 10.0),
        (0.0, 10.0),
    ]));
    let hit = intersect_segment(&shape, Point::new(5.0, -10.0), Point::new(5.0, 5.0));
    assert_eq!(hit, None);
    let hit = intersect_segment(&shape, Point::new(5.0, -10.0), Point::new(5.0, 9.0))
        .expect("segment reaches the bottom of the notch");
    assert!(approx_eq(hit.point.y, 6.0));
}

#[test]
fn test_zero_length_segment_never_hits() {
    let shape = ShapeEnum::Circle(Circle::new(0.0, 0.0, 5.0));
    assert_eq!(
        intersect_segment(&shape, Point::new(1.0, 1.0), Point::new(1.0, 1.0)),
        None
    );
}

#[test]
fn test_shape_contains_point() {
    assert!(shape_contains_point(
        &ShapeEnum::Circle(Circle::new(0.0, 0.0, 1.0)),
        0.5,
        0.5
    ));
    assert!(!shape_contains_point(
        &ShapeEnum::Rectangle(Rectangle::new(0.0, 0.0, 2.0, 2.0)),
        1.5,
        0.0
    ));
    let triangle = ShapeEnum::Polygon(Polygon::from_coords(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]));
    assert!(shape_contains_point(&triangle, 2.0, 2.0));
    assert!(!shape_contains_point(&triangle, 8.0, 8.0));
}

#[test]
fn test_polygon_rectangle_overlap() {
    let triangle = Polygon::from_coords(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
    // Inside the triangle's bounding box but past the hypotenuse
    assert!(!polygon_rectangle(
        &triangle,
        &Rectangle::from_min_max(8.0, 8.0, 9.0, 9.0)
    ));
    assert!(polygon_rectangle(
        &triangle,
        &Rectangle::from_min_max(1.0, 1.0, 2.0, 2.0)
    ));
    // Rectangle swallowing the triangle
    assert!(polygon_rectangle(
        &triangle,
        &Rectangle::from_min_max(-5.0, -5.0, 20.0, 20.0)
    ));
    // Edges crossing with no vertex inside either shape
    let bar = Polygon::from_coords(&[(-5.0, 4.0), (15.0, 4.0), (15.0, 6.0), (-5.0, 6.0)]);
    assert!(polygon_rectangle(
        &bar,
        &Rectangle::from_min_max(2.0, 0.0, 4.0, 10.0)
    ));
}

#[test]
fn test_polygon_circle_overlap() {
    let square = Polygon::from_coords(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
    assert!(polygon_circle(&square, &Circle::new(12.0, 5.0, 2.5)));
    assert!(!polygon_circle(&square, &Circle::new(13.0, 5.0, 2.5)));
    assert!(polygon_circle(&square, &Circle::new(5.0, 5.0, 1.0)));
}

#[test]
fn test_shape_shape_dispatch() {
    let circle = ShapeEnum::Circle(Circle::new(0.0, 0.0, 1.0));
    let rect = ShapeEnum::Rectangle(Rectangle::new(1.5, 0.0, 1.0, 1.0));
    let far = ShapeEnum::Rectangle(Rectangle::new(5.0, 0.0, 1.0, 1.0));
    assert!(shape_shape(&circle, &rect));
    assert!(shape_shape(&rect, &circle));
    assert!(!shape_shape(&circle, &far));
}

#[test]
fn test_segments_intersect_collinear_overlap() {
    assert!(segments_intersect(
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(6.0, 0.0)
    ));
    assert!(!segments_intersect(
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(6.0, 0.0)
    ));
}

#[test]
fn test_shape_overlaps_rectangle_circle() {
    let circle = ShapeEnum::Circle(Circle::new(0.0, 0.0, 5.0));
    // Left edge at x = 5 touches the circle
    assert!(shape_overlaps_rectangle(&circle, &Rectangle::new(7.5, 0.0, 5.0, 5.0)));
    assert!(shape_overlaps_rectangle(&circle, &Rectangle::new(0.0, 0.0, 20.0, 20.0)));
    assert!(!shape_overlaps_rectangle(&circle, &Rectangle::new(20.0, 0.0, 4.0, 4.0)));
}

#[test]
fn test_shape_overlaps_rectangle_rectangle() {
    let rect = ShapeEnum::Rectangle(Rectangle::new(0.0, 0.0, 10.0, 10.0));
    assert!(shape_overlaps_rectangle(&rect, &Rectangle::new(10.0, 0.0, 10.0, 10.0)));
    assert!(shape_overlaps_rectangle(&rect, &Rectangle::new(0.0, 0.0, 2.0, 2.0)));
    assert!(!shape_overlaps_rectangle(&rect, &Rectangle::new(30.0, 0.0, 10.0, 10.0)));
}

#[test]
fn test_shape_overlaps_rectangle_polygon() {
    let triangle = ShapeEnum::Polygon(Polygon::from_coords(&[(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]));
    // Shares the vertex (10, 0)
    assert!(shape_overlaps_rectangle(&triangle, &Rectangle::new(12.0, 0.0, 4.0, 4.0)));
    assert!(shape_overlaps_rectangle(&triangle, &Rectangle::new(2.0, 2.0, 1.0, 1.0)));
    // Inside the bounding box but beyond the hypotenuse
    assert!(!shape_overlaps_rectangle(&triangle, &Rectangle::new(9.0, 9.0, 2.0, 2.0)));
}
