//! Axis-aligned bodies and spatial predicates
//!
//! A body is a center point plus half-extents. Positions are canvas
//! coordinates: x grows to the right, y grows downward.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{COLLISION_EPSILON_X, COLLISION_EPSILON_Y, HIT_BUFFER};
use crate::error::GameError;

/// How a body takes part in collision dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Receives `on_collision*` events; callers treat it as blocking
    Solid,
    /// Receives `on_trigger*` events; never blocks movement
    Trigger,
    /// Excluded from dispatch altogether
    None,
}

/// Side of a body that is touching another body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Top,
    Bottom,
    Left,
    Right,
}

/// Axis-aligned rectangle used for overlap testing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center position
    pub pos: Vec2,
    /// Half width / half height
    half: Vec2,
    pub kind: CollisionKind,
}

impl Body {
    /// Default face tolerance (horizontal, vertical)
    pub const EPSILON: Vec2 = Vec2::new(COLLISION_EPSILON_X, COLLISION_EPSILON_Y);

    /// Create a body centered at `pos`. Width and height must be positive.
    pub fn new(pos: Vec2, width: f32, height: f32, kind: CollisionKind) -> Result<Self, GameError> {
        check_extent(width, height)?;
        Ok(Self {
            pos,
            half: Vec2::new(width / 2.0, height / 2.0),
            kind,
        })
    }

    /// Change the size in place, keeping the center
    pub fn resize(&mut self, width: f32, height: f32) -> Result<(), GameError> {
        check_extent(width, height)?;
        self.half = Vec2::new(width / 2.0, height / 2.0);
        Ok(())
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        self.half
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.half.x * 2.0
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.half.y * 2.0
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x - self.half.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.half.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.half.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.half.y
    }

    /// Extents overlap on the x axis (touching counts)
    pub fn in_horizontal_bounds(&self, other: &Body) -> bool {
        (self.pos.x - other.pos.x).abs() <= self.half.x + other.half.x
    }

    /// Extents overlap on the y axis (touching counts)
    pub fn in_vertical_bounds(&self, other: &Body) -> bool {
        (self.pos.y - other.pos.y).abs() <= self.half.y + other.half.y
    }

    /// Extents overlap on both axes
    pub fn overlaps(&self, other: &Body) -> bool {
        self.in_horizontal_bounds(other) && self.in_vertical_bounds(other)
    }

    /// Overlap test with both bodies grown by `pad` on every side
    pub fn overlaps_padded(&self, other: &Body, pad: f32) -> bool {
        (self.pos.x - other.pos.x).abs() <= self.half.x + other.half.x + 2.0 * pad
            && (self.pos.y - other.pos.y).abs() <= self.half.y + other.half.y + 2.0 * pad
    }

    /// Hit padding used by tower-defense contact tests (shrinks as the body grows)
    pub fn hit_padding(&self) -> f32 {
        HIT_BUFFER / self.width()
    }

    /// Our top edge rests against the other's bottom edge
    pub fn touches_top(&self, other: &Body, eps: f32) -> bool {
        within(self.top(), other.bottom(), eps)
    }

    /// Our bottom edge rests against the other's top edge
    pub fn touches_bottom(&self, other: &Body, eps: f32) -> bool {
        within(self.bottom(), other.top(), eps)
    }

    /// Our left edge rests against the other's right edge
    pub fn touches_left(&self, other: &Body, eps: f32) -> bool {
        within(self.left(), other.right(), eps)
    }

    /// Our right edge rests against the other's left edge
    pub fn touches_right(&self, other: &Body, eps: f32) -> bool {
        within(self.right(), other.left(), eps)
    }

    /// Which of our faces touches an overlapping body.
    ///
    /// Faces are tested top, bottom, left, right; the first match wins so a
    /// corner contact resolves to exactly one face per frame.
    pub fn contact_face(&self, other: &Body, eps: Vec2) -> Option<Face> {
        if !self.overlaps(other) {
            return None;
        }
        if self.touches_top(other, eps.y) {
            Some(Face::Top)
        } else if self.touches_bottom(other, eps.y) {
            Some(Face::Bottom)
        } else if self.touches_left(other, eps.x) {
            Some(Face::Left)
        } else if self.touches_right(other, eps.x) {
            Some(Face::Right)
        } else {
            None
        }
    }
}

#[inline]
fn within(edge: f32, target: f32, eps: f32) -> bool {
    edge >= target - eps && edge <= target + eps
}

fn check_extent(width: f32, height: f32) -> Result<(), GameError> {
    // Written as a negation so NaN is rejected too
    if !(width > 0.0 && height > 0.0) {
        return Err(GameError::DegenerateBody { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn solid(x: f32, y: f32, w: f32, h: f32) -> Body {
        Body::new(Vec2::new(x, y), w, h, CollisionKind::Solid).unwrap()
    }

    #[test]
    fn test_rejects_degenerate_bodies() {
        let zero_w = Body::new(Vec2::ZERO, 0.0, 10.0, CollisionKind::Solid);
        assert_eq!(
            zero_w,
            Err(GameError::DegenerateBody {
                width: 0.0,
                height: 10.0
            })
        );
        assert!(Body::new(Vec2::ZERO, 10.0, -1.0, CollisionKind::Trigger).is_err());
        assert!(Body::new(Vec2::ZERO, f32::NAN, 1.0, CollisionKind::Trigger).is_err());

        let mut body = solid(0.0, 0.0, 10.0, 10.0);
        assert!(body.resize(0.0, 5.0).is_err());
        assert_eq!(body.size(), Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_edges() {
        let b = solid(50.0, 100.0, 20.0, 10.0);
        assert_eq!(b.left(), 40.0);
        assert_eq!(b.right(), 60.0);
        assert_eq!(b.top(), 95.0);
        assert_eq!(b.bottom(), 105.0);
    }

    // +----+----+
    // | a  | b  |
    // +----+----+
    //      +----+
    //      | c  |   (gap below b)
    #[test]
    fn test_overlap_touching_and_apart() {
        let a = solid(5.0, 5.0, 10.0, 10.0);
        let b = solid(15.0, 5.0, 10.0, 10.0);
        let c = solid(15.0, 20.0, 10.0, 10.0);
        assert!(a.overlaps(&b), "shared edge counts as overlap");
        assert!(!a.overlaps(&c));
        assert!(!b.overlaps(&c));
        assert!(b.in_horizontal_bounds(&c));
        assert!(!b.in_vertical_bounds(&c));
    }

    #[test]
    fn test_contact_face_floor_and_wall() {
        let player = solid(100.0, 85.0, 30.0, 30.0); // bottom at 100
        let floor = solid(100.0, 110.0, 200.0, 20.0); // top at 100
        assert_eq!(player.contact_face(&floor, Body::EPSILON), Some(Face::Bottom));

        let wall = solid(130.0, 85.0, 30.0, 200.0); // left at 115, player right at 115
        assert_eq!(player.contact_face(&wall, Body::EPSILON), Some(Face::Right));

        let ceiling = solid(100.0, 60.0, 200.0, 20.0); // bottom at 70, player top at 70
        assert_eq!(player.contact_face(&ceiling, Body::EPSILON), Some(Face::Top));
    }

    #[test]
    fn test_corner_contact_prefers_vertical_faces() {
        // Player sunk 2px into the top-left corner of a block: both the
        // bottom and right faces are within tolerance.
        let player = solid(0.0, 0.0, 20.0, 20.0);
        let block = solid(18.0, 18.0, 20.0, 20.0);
        assert!(player.touches_bottom(&block, COLLISION_EPSILON_Y));
        assert!(player.touches_right(&block, COLLISION_EPSILON_X));
        assert_eq!(player.contact_face(&block, Body::EPSILON), Some(Face::Bottom));
    }

    #[test]
    fn test_deep_overlap_has_no_face() {
        let big = solid(0.0, 0.0, 100.0, 100.0);
        let small = solid(0.0, 0.0, 10.0, 10.0);
        assert!(small.overlaps(&big));
        assert_eq!(small.contact_face(&big, Body::EPSILON), None);
    }

    #[test]
    fn test_hit_padding_scales_with_width() {
        assert_eq!(solid(0.0, 0.0, 10.0, 10.0).hit_padding(), 2.0);
        assert_eq!(solid(0.0, 0.0, 40.0, 10.0).hit_padding(), 0.5);

        let a = solid(0.0, 0.0, 10.0, 10.0);
        let b = solid(13.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps_padded(&b, a.hit_padding()));
    }

    fn any_body() -> impl Strategy<Value = Body> {
        (
            -500.0f32..500.0,
            -500.0f32..500.0,
            0.5f32..200.0,
            0.5f32..200.0,
        )
            .prop_map(|(x, y, w, h)| solid(x, y, w, h))
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(a in any_body(), b in any_body()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn prop_body_overlaps_itself(a in any_body()) {
            prop_assert!(a.overlaps(&a));
        }

        #[test]
        fn prop_face_implies_overlap(a in any_body(), b in any_body()) {
            if a.contact_face(&b, Body::EPSILON).is_some() {
                prop_assert!(a.overlaps(&b));
            }
        }
    }
}
