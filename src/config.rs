//! Numeric and acceleration-structure configuration.
//!
//! Both structs deserialize with `#[serde(default)]` so a host application
//! can override individual fields from its own settings file.

use serde::{Deserialize, Serialize};

use crate::geometry::aabb::Aabb;

/// Tolerances and limits for ray/triangle interception.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RayCastConfig {
    /// Relative epsilon for parallel-ray rejection and distance tie-breaks.
    ///
    /// Scaled by the mesh bounding-box diagonal at query time, so meshes in
    /// voxel units and meshes in normalized units behave the same.
    pub relative_epsilon: f64,
    /// Slack on the barycentric inside-triangle test. Points within this
    /// tolerance of an edge still register as hits, so a ray aimed exactly
    /// at a shared edge intercepts both triangles and the tie-break decides.
    pub barycentric_tolerance: f64,
    /// Maximum hit distance along the ray; `None` means unbounded.
    pub max_range: Option<f64>,
}

impl Default for RayCastConfig {
    fn default() -> Self {
        Self {
            relative_epsilon: 64.0 * f64::EPSILON,
            barycentric_tolerance: 1e-10,
            max_range: None,
        }
    }
}

impl RayCastConfig {
    /// Absolute distance epsilon for a mesh occupying `bounds`.
    ///
    /// Falls back to the unscaled relative epsilon for degenerate (empty or
    /// single-point) bounds.
    #[must_use]
    pub fn scaled_epsilon(&self, bounds: &Aabb) -> f64 {
        let diagonal = bounds.diagonal();
        if diagonal.is_finite() && diagonal > 0.0 {
            self.relative_epsilon * diagonal
        } else {
            self.relative_epsilon
        }
    }
}

/// Sizing policy for the uniform acceleration grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridConfig {
    /// Average triangle count a cell is sized to hold.
    pub target_triangles_per_cell: f64,
    /// Upper bound on cells per axis.
    pub max_resolution: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            target_triangles_per_cell: 4.0,
            max_resolution: 64,
        }
    }
}

impl GridConfig {
    /// Cells per axis for a mesh with `triangle_count` triangles.
    #[must_use]
    pub fn resolution(&self, triangle_count: usize) -> u32 {
        if triangle_count == 0 {
            return 1;
        }
        let per_cell = self.target_triangles_per_cell.max(1.0);
        let cells = (triangle_count as f64 / per_cell).cbrt().ceil();
        (cells as u32).clamp(1, self.max_resolution.max(1))
    }
}
