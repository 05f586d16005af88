//! Picking rays and their hit records.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A picking ray: origin plus unit direction.
///
/// Constructed by the rendering subsystem from screen coordinates; this
/// crate only consumes rays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// World-space origin.
    pub origin: DVec3,
    /// Unit direction. A zero vector passed to [`Ray::new`] stays zero and
    /// the ray simply never hits anything (every triangle rejects it as
    /// parallel); no error is raised for it.
    pub direction: DVec3,
}

impl Ray {
    /// Ray from `origin` along `direction`, which is normalized here.
    #[must_use]
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `a` pointing toward `b`.
    #[must_use]
    pub fn between(a: DVec3, b: DVec3) -> Self {
        Self::new(a, b - a)
    }

    /// Point at signed distance `t` along the ray.
    #[inline]
    #[must_use]
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Closest interception between a ray and one triangulated surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayHit {
    /// Distance from the ray origin, always positive.
    pub distance: f64,
    /// Index of the intercepted triangle within its surface.
    pub triangle: usize,
    /// Barycentric coordinates of the interception point with respect to
    /// the triangle's three vertices, in vertex order.
    pub barycentric: [f64; 3],
    /// World-space interception point.
    pub point: DVec3,
    /// Unit normal of the intercepted triangle (counter-clockwise winding).
    pub normal: DVec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray::new(DVec3::ZERO, DVec3::new(0.0, 3.0, 4.0));
        assert!((ray.direction.length() - 1.0).abs() < 1e-12);
        assert!((ray.at(5.0) - DVec3::new(0.0, 3.0, 4.0)).length() < 1e-12);
    }

    #[test]
    fn test_zero_direction_stays_zero() {
        let ray = Ray::new(DVec3::ONE, DVec3::ZERO);
        assert_eq!(ray.direction, DVec3::ZERO);
        assert_eq!(ray.at(10.0), DVec3::ONE);
    }

    #[test]
    fn test_between_points_at_target() {
        let ray = Ray::between(DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0));
        assert!((ray.at(2.0) - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);
    }
}
