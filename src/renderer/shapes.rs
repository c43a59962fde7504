//! Point generation for polygon shapes
//!
//! All shapes are built around a center in canvas coordinates (y down).

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Turns a five-point star so one point faces straight up
const STAR_ROTATION_CORRECTION: f32 = -18.0;

/// Ten alternating outer/inner points of a five-point star.
///
/// Outer points sit at `length` from the center, inner points at `2/5` of it.
pub fn star(center: Vec2, length: f32) -> Vec<Vec2> {
    let correction = STAR_ROTATION_CORRECTION.to_radians();
    let inner = length * 2.0 / 5.0;
    let mut points = Vec::with_capacity(10);
    for i in 0..5 {
        let theta = TAU * i as f32 / 5.0 + correction;
        points.push(center + Vec2::from_angle(theta) * length);
        points.push(center + Vec2::from_angle(theta + PI / 5.0) * inner);
    }
    points
}

/// Regular hexagon with side `length`, flat top and bottom
pub fn hexagon(center: Vec2, length: f32) -> Vec<Vec2> {
    let h = 3f32.sqrt() * length / 2.0;
    let half = length / 2.0;
    vec![
        center + Vec2::new(-half, -h),
        center + Vec2::new(half, -h),
        center + Vec2::new(length, 0.0),
        center + Vec2::new(half, h),
        center + Vec2::new(-half, h),
        center + Vec2::new(-length, 0.0),
    ]
}

/// Equilateral triangle pointing up, centroid at `center`
pub fn equilateral_triangle(center: Vec2, length: f32) -> Vec<Vec2> {
    isosceles_triangle(center, length, 3f32.sqrt() * length / 2.0)
}

/// Isosceles triangle pointing up, centroid at `center`
pub fn isosceles_triangle(center: Vec2, base: f32, height: f32) -> Vec<Vec2> {
    vec![
        center + Vec2::new(-base / 2.0, height / 3.0),
        center + Vec2::new(0.0, -2.0 * height / 3.0),
        center + Vec2::new(base / 2.0, height / 3.0),
    ]
}

/// Right triangle with legs `length`, right angle bottom-left
pub fn right_triangle(center: Vec2, length: f32) -> Vec<Vec2> {
    let third = length / 3.0;
    vec![
        center + Vec2::new(-third, third),
        center + Vec2::new(-third, -2.0 * third),
        center + Vec2::new(2.0 * third, third),
    ]
}

/// Average of the points (origin for an empty slice)
pub fn find_center(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().copied().sum::<Vec2>() / points.len() as f32
}

/// Rotate `point` about `anchor`; positive degrees turn clockwise on screen
pub fn rotate_point(point: Vec2, anchor: Vec2, degrees: f32) -> Vec2 {
    anchor + Vec2::from_angle(degrees.to_radians()).rotate(point - anchor)
}

/// Points on a circle, for hosts that only draw polygons
pub fn circle(center: Vec2, radius: f32, segments: u32) -> Vec<Vec2> {
    (0..segments)
        .map(|i| {
            let theta = (i as f32 / segments as f32) * TAU;
            center + Vec2::from_angle(theta) * radius
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_star_has_point_straight_up() {
        let c = Vec2::new(100.0, 100.0);
        let points = star(c, 20.0);
        assert_eq!(points.len(), 10);
        assert!(points.iter().any(|p| close(*p, Vec2::new(100.0, 80.0))));
        assert!(((points[1] - c).length() - 8.0).abs() < 1e-3);
        assert!(close(find_center(&points), c));
    }

    #[test]
    fn test_hexagon() {
        let c = Vec2::new(50.0, 50.0);
        let points = hexagon(c, 10.0);
        assert_eq!(points.len(), 6);
        for p in &points {
            assert!(((*p - c).length() - 10.0).abs() < 1e-3);
        }
        assert!(close(find_center(&points), c));
    }

    #[test]
    fn test_triangles_centered() {
        let c = Vec2::new(30.0, 40.0);
        assert!(close(find_center(&equilateral_triangle(c, 12.0)), c));
        assert!(close(find_center(&isosceles_triangle(c, 10.0, 30.0)), c));
        assert!(close(find_center(&right_triangle(c, 9.0)), c));

        let eq = equilateral_triangle(c, 12.0);
        assert!(((eq[0] - eq[1]).length() - 12.0).abs() < 1e-3);
        assert!(((eq[1] - eq[2]).length() - 12.0).abs() < 1e-3);
    }

    #[test]
    fn test_rotate_point() {
        let anchor = Vec2::new(10.0, 10.0);
        let p = rotate_point(Vec2::new(20.0, 10.0), anchor, 90.0);
        assert!(close(p, Vec2::new(10.0, 20.0)));
        assert!(close(rotate_point(p, anchor, -90.0), Vec2::new(20.0, 10.0)));
    }

    #[test]
    fn test_circle() {
        let points = circle(Vec2::ZERO, 5.0, 8);
        assert_eq!(points.len(), 8);
        assert!(close(points[0], Vec2::new(5.0, 0.0)));
        assert!(close(points[2], Vec2::new(0.0, 5.0)));
    }
}
