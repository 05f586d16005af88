//! Axis-aligned bounding boxes.
//!
//! Used two ways: whole-surface culling before any per-triangle work, and
//! as the extent of the uniform acceleration grid.

use glam::DVec3;

/// Axis-aligned bounding box in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb {
    /// The empty box: grows to fit the first point added.
    pub const EMPTY: Self = Self {
        min: DVec3::INFINITY,
        max: DVec3::NEG_INFINITY,
    };

    /// Box from explicit corners.
    #[must_use]
    pub const fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point in the iterator.
    #[must_use]
    pub fn from_points<I: IntoIterator<Item = DVec3>>(points: I) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.grow(p);
        }
        aabb
    }

    /// Expand to contain `point`.
    pub fn grow(&mut self, point: DVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// True if no point has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> DVec3 {
        0.5 * (self.min + self.max)
    }

    /// Per-axis side lengths.
    #[must_use]
    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    /// Length of the main diagonal; zero for the empty box.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.max - self.min).length()
        }
    }

    /// Closed-interval containment test.
    #[must_use]
    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Slab-method ray/box overlap.
    ///
    /// Returns the `(entry, exit)` distances along the ray, with entry
    /// clamped to zero for origins inside the box, or `None` when the ray
    /// misses or the box lies entirely behind the origin. `inv_direction`
    /// is the component-wise reciprocal of the ray direction; infinities
    /// from zero components fall out of the min/max reduction.
    #[must_use]
    pub fn ray_interval(
        &self,
        origin: DVec3,
        inv_direction: DVec3,
    ) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let t0 = (self.min - origin) * inv_direction;
        let t1 = (self.max - origin) * inv_direction;
        let near = t0.min(t1);
        let far = t0.max(t1);
        let entry = near.max_element().max(0.0);
        let exit = far.min_element();
        (entry <= exit).then_some((entry, exit))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
