//! View translation and the two coordinate frames.
//!
//! Pointer events arrive in *screen* space (origin at the viewport's top-left).
//! Nodes live in *world* space. The only way between the two is
//! [`Viewport::to_world`] and [`Viewport::to_screen`].

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// A point in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint(pub Point);

/// A point in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint(pub Point);

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point::new(x, y))
    }

    /// Shift by a screen-space delta.
    pub fn offset_by(self, delta: Vec2) -> Self {
        Self(self.0 + delta)
    }
}

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point::new(x, y))
    }
}

impl Sub for ScreenPoint {
    type Output = Vec2;

    fn sub(self, rhs: Self) -> Vec2 {
        self.0 - rhs.0
    }
}

impl Sub<Vec2> for ScreenPoint {
    type Output = ScreenPoint;

    fn sub(self, rhs: Vec2) -> ScreenPoint {
        ScreenPoint(self.0 - rhs)
    }
}

/// Translation applied to the whole content layer.
///
/// Session-only: it is not part of a saved diagram.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    offset: Vec2,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current translation of world content on screen.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Transform for rendering world content to the screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset)
    }

    /// Transform mapping screen input back into the world.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(-self.offset)
    }

    /// Unapply the view offset.
    pub fn to_world(&self, point: ScreenPoint) -> WorldPoint {
        WorldPoint(self.inverse_transform() * point.0)
    }

    /// Apply the view offset.
    pub fn to_screen(&self, point: WorldPoint) -> ScreenPoint {
        ScreenPoint(self.transform() * point.0)
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_by_default() {
        let viewport = Viewport::new();
        let world = viewport.to_world(ScreenPoint::new(100.0, 200.0));
        assert_eq!(world, WorldPoint::new(100.0, 200.0));
    }

    #[test]
    fn test_to_world_with_offset() {
        let mut viewport = Viewport::new();
        viewport.set_offset(Vec2::new(50.0, 100.0));
        let world = viewport.to_world(ScreenPoint::new(100.0, 200.0));
        assert!((world.0.x - 50.0).abs() < f64::EPSILON);
        assert!((world.0.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.set_offset(Vec2::new(30.0, -20.0));
        let original = ScreenPoint::new(123.0, 456.0);
        let back = viewport.to_screen(viewport.to_world(original));
        assert!((back.0.x - original.0.x).abs() < 1e-10);
        assert!((back.0.y - original.0.y).abs() < 1e-10);
    }

    #[test]
    fn test_offset_and_reset() {
        let mut viewport = Viewport::new();
        viewport.set_offset(Vec2::new(6.0, 21.0));
        assert_eq!(viewport.to_screen(WorldPoint::new(0.0, 0.0)), ScreenPoint::new(6.0, 21.0));
        viewport.reset();
        assert_eq!(viewport.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_screen_point_arithmetic() {
        let a = ScreenPoint::new(10.0, 10.0);
        let b = ScreenPoint::new(4.0, 7.0);
        assert_eq!(a - b, Vec2::new(6.0, 3.0));
        assert_eq!(a - Vec2::new(1.0, 1.0), ScreenPoint::new(9.0, 9.0));
        assert_eq!(b.offset_by(Vec2::new(1.0, 1.0)), ScreenPoint::new(5.0, 8.0));
    }
}
