//! Mapping between presentation space (origin top-left, Y down) and physics
//! space (Y up).
//!
//! `physics_y = height - presentation_y` and back. X passes through untouched.
//! Vectors (velocity, force, impulse) only negate Y; angles negate and switch
//! between degrees and radians.

use glam::Vec2;

/// The world height that anchors the Y flip. Captured once per body; changing
/// it while bodies exist is unsupported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordSpace {
    height: f32,
}

impl CoordSpace {
    pub fn new(height: f32) -> Self {
        Self { height }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn to_physics_y(&self, y: f32) -> f32 {
        self.height - y
    }

    #[inline]
    pub fn to_presentation_y(&self, y: f32) -> f32 {
        self.height - y
    }

    #[inline]
    pub fn point_to_physics(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x, self.to_physics_y(p.y))
    }

    #[inline]
    pub fn point_to_presentation(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x, self.to_presentation_y(p.y))
    }

    /// Velocities, forces and impulses: Y negates, no offset.
    #[inline]
    pub fn vector_to_physics(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x, -v.y)
    }

    #[inline]
    pub fn vector_to_presentation(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x, -v.y)
    }

    /// Presentation degrees (positive = visually clockwise) to physics radians.
    #[inline]
    pub fn angle_to_physics(&self, degrees: f32) -> f32 {
        -degrees.to_radians()
    }

    #[inline]
    pub fn angle_to_presentation(&self, radians: f32) -> f32 {
        -radians.to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn y_flip_is_involutive() {
        let space = CoordSpace::new(600.0);
        assert_eq!(space.to_physics_y(100.0), 500.0);
        assert_eq!(space.to_presentation_y(space.to_physics_y(100.0)), 100.0);
    }

    #[test]
    fn x_is_untouched() {
        let space = CoordSpace::new(1200.0);
        let p = space.point_to_physics(Vec2::new(37.5, 200.0));
        assert_eq!(p, Vec2::new(37.5, 1000.0));
        assert_eq!(space.point_to_presentation(p), Vec2::new(37.5, 200.0));
    }

    #[test]
    fn downward_velocity_is_negative_in_physics() {
        let space = CoordSpace::new(1200.0);
        let v = space.vector_to_physics(Vec2::new(3.0, 40.0));
        assert_eq!(v, Vec2::new(3.0, -40.0));
        assert_eq!(space.vector_to_presentation(v), Vec2::new(3.0, 40.0));
    }

    #[test]
    fn clockwise_degrees_are_negative_radians() {
        let space = CoordSpace::new(1200.0);
        let r = space.angle_to_physics(90.0);
        assert!((r + std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((space.angle_to_presentation(r) - 90.0).abs() < 1e-4);
    }
}
