//! Ray/triangle interception.
//!
//! The inside-triangle test computes the barycentric coordinates of the
//! projected point after Heidrich, "Computing the Barycentric Coordinates
//! of a Projected Point", JGT 10.3 (2005). All math is double precision.

use glam::DVec3;

use crate::config::RayCastConfig;
use crate::geometry::ray::{Ray, RayHit};
use crate::geometry::surface::TriangulatedSurface;

/// Per-triangle data precomputed once per synchronization so repeated ray
/// queries avoid re-deriving edge vectors and areas.
#[derive(Debug, Clone)]
pub(crate) struct InterceptTriangle {
    /// First corner; the barycentric origin.
    a: DVec3,
    /// Edge `b - a`.
    u: DVec3,
    /// Edge `c - a`.
    v: DVec3,
    /// `u × v`, unnormalized (length is twice the area).
    scaled_normal: DVec3,
    /// Unit normal, counter-clockwise winding.
    unit_normal: DVec3,
    /// `1 / |u × v|²`, i.e. `1 / 4A²`.
    inv_four_area_sq: f64,
    /// Zero-area triangles never register a hit.
    degenerate: bool,
}

impl InterceptTriangle {
    pub(crate) fn new(a: DVec3, b: DVec3, c: DVec3) -> Self {
        let u = b - a;
        let v = c - a;
        let scaled_normal = u.cross(v);
        let four_area_sq = scaled_normal.length_squared();
        let degenerate = !four_area_sq.is_normal();
        Self {
            a,
            u,
            v,
            scaled_normal,
            unit_normal: scaled_normal.normalize_or_zero(),
            inv_four_area_sq: if degenerate { 0.0 } else { 1.0 / four_area_sq },
            degenerate,
        }
    }

    /// Signed distance and barycentric coordinates of the interception, or
    /// `None` for parallel rays, hits behind the origin, and points outside
    /// the triangle (within `barycentric_tolerance` of its edges counts as
    /// inside; the caller's tie-break disambiguates edge grazes).
    pub(crate) fn intersect(
        &self,
        ray: &Ray,
        parallel_epsilon: f64,
        barycentric_tolerance: f64,
    ) -> Option<(f64, [f64; 3])> {
        if self.degenerate {
            return None;
        }
        let rn = ray.direction.dot(self.unit_normal);
        if rn.abs() <= parallel_epsilon {
            return None;
        }
        // Distance along the normal to the plane, then along the ray.
        let d = self.unit_normal.dot(self.a - ray.origin);
        let s = d / rn;
        if s <= 0.0 || !s.is_finite() {
            return None;
        }

        let w = ray.at(s) - self.a;
        let b2 = self.u.cross(w).dot(self.scaled_normal)
            * self.inv_four_area_sq;
        let b1 = w.cross(self.v).dot(self.scaled_normal)
            * self.inv_four_area_sq;
        let b0 = 1.0 - b1 - b2;

        let t = barycentric_tolerance;
        (b0 >= -t && b1 >= -t && b2 >= -t).then_some((s, [b0, b1, b2]))
    }

    pub(crate) fn corners(&self) -> [DVec3; 3] {
        [self.a, self.a + self.u, self.a + self.v]
    }

    pub(crate) fn unit_normal(&self) -> DVec3 {
        self.unit_normal
    }
}

/// Closest-hit ray caster over one triangulated surface.
///
/// Pure queries: never fails, never mutates; a ray that misses every
/// triangle simply yields `None`.
#[derive(Debug, Clone, Default)]
pub struct RayCaster {
    config: RayCastConfig,
}

impl RayCaster {
    /// Caster with explicit tolerances.
    #[must_use]
    pub const fn new(config: RayCastConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &RayCastConfig {
        &self.config
    }

    /// Closest interception of `ray` with `surface`, testing every
    /// triangle.
    ///
    /// Determinism: when two triangles intercept within the scaled epsilon
    /// of each other, the lower triangle index wins.
    #[must_use]
    pub fn cast(
        &self,
        surface: &TriangulatedSurface,
        ray: &Ray,
    ) -> Option<RayHit> {
        let epsilon = self.config.scaled_epsilon(&surface.bounds());
        let mut best: Option<RayHit> = None;
        for t in 0..surface.triangle_count() {
            let [a, b, c] = surface.triangle_vertices(t);
            let triangle = InterceptTriangle::new(a, b, c);
            self.consider(&triangle, t, ray, epsilon, &mut best);
        }
        best
    }

    /// Closest interception among the prepared triangles selected by
    /// `indices`. Shared by the brute-force path and the grid-pruned path
    /// so both produce identical results.
    pub(crate) fn cast_prepared<I>(
        &self,
        triangles: &[InterceptTriangle],
        indices: I,
        ray: &Ray,
        epsilon: f64,
    ) -> Option<RayHit>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut best: Option<RayHit> = None;
        for t in indices {
            self.consider(&triangles[t], t, ray, epsilon, &mut best);
        }
        best
    }

    fn consider(
        &self,
        triangle: &InterceptTriangle,
        index: usize,
        ray: &Ray,
        epsilon: f64,
        best: &mut Option<RayHit>,
    ) {
        let Some((distance, barycentric)) = triangle.intersect(
            ray,
            epsilon,
            self.config.barycentric_tolerance,
        ) else {
            return;
        };
        if self.config.max_range.is_some_and(|max| distance > max) {
            return;
        }
        let replace = match best {
            None => true,
            Some(current) => {
                nearer_or_lower_index(
                    distance,
                    index,
                    current.distance,
                    current.triangle,
                    epsilon,
                )
            }
        };
        if replace {
            *best = Some(RayHit {
                distance,
                triangle: index,
                barycentric,
                point: ray.at(distance),
                normal: triangle.unit_normal(),
            });
        }
    }
}

/// Deterministic hit ordering: strictly nearer wins; within `epsilon` the
/// lower triangle index wins.
pub(crate) fn nearer_or_lower_index(
    distance: f64,
    index: usize,
    best_distance: f64,
    best_index: usize,
    epsilon: f64,
) -> bool {
    if distance < best_distance - epsilon {
        return true;
    }
    (distance - best_distance).abs() <= epsilon && index < best_index
}
