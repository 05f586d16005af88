//! Accelerated per-surface ray queries.
//!
//! [`InterceptingSurface`] snapshots a surface's triangles at
//! [`synchronize`](InterceptingSurface::synchronize) time and answers
//! repeated ray queries against that snapshot through a uniform grid. The
//! grid only prunes candidate triangles; results are identical to testing
//! every triangle (see `test_grid_matches_brute_force`).
//!
//! # Staleness contract
//!
//! The snapshot is *not* tied to the live surface. After the deformation
//! subsystem mutates vertex positions it must call `synchronize` again
//! before the next query; the engine does not detect stale state. A stale
//! wrapper answers self-consistently against its last snapshot.

use glam::DVec3;

use crate::config::{GridConfig, RayCastConfig};
use crate::geometry::aabb::Aabb;
use crate::geometry::ray::{Ray, RayHit};
use crate::geometry::raycast::{InterceptTriangle, RayCaster};
use crate::geometry::surface::{SurfaceId, TriangulatedSurface};

/// One pickable surface wrapped with acceleration state.
#[derive(Debug, Clone)]
pub struct InterceptingSurface {
    surface_id: SurfaceId,
    caster: RayCaster,
    grid_config: GridConfig,
    triangles: Vec<InterceptTriangle>,
    bounds: Aabb,
    scaled_epsilon: f64,
    grid: UniformGrid,
}

impl InterceptingSurface {
    /// Wrap `surface` with default tolerances and grid sizing.
    #[must_use]
    pub fn new(surface: &TriangulatedSurface) -> Self {
        Self::with_config(
            surface,
            RayCastConfig::default(),
            GridConfig::default(),
        )
    }

    /// Wrap `surface` with explicit configuration.
    #[must_use]
    pub fn with_config(
        surface: &TriangulatedSurface,
        raycast: RayCastConfig,
        grid: GridConfig,
    ) -> Self {
        let mut intercepting = Self {
            surface_id: surface.id(),
            caster: RayCaster::new(raycast),
            grid_config: grid,
            triangles: Vec::new(),
            bounds: Aabb::EMPTY,
            scaled_epsilon: 0.0,
            grid: UniformGrid::empty(),
        };
        intercepting.synchronize(surface);
        intercepting
    }

    /// Rebuild the snapshot and acceleration grid from the surface's
    /// current vertex state.
    ///
    /// Must be called after every deformation step and before the next
    /// [`query`](Self::query). `surface` must be the surface this wrapper
    /// was built for; a different one is adopted with a warning.
    pub fn synchronize(&mut self, surface: &TriangulatedSurface) {
        if surface.id() != self.surface_id {
            log::warn!(
                "synchronize: wrapper for {} rebound to {}",
                self.surface_id,
                surface.id()
            );
            self.surface_id = surface.id();
        }
        self.triangles.clear();
        self.triangles.extend((0..surface.triangle_count()).map(|t| {
            let [a, b, c] = surface.triangle_vertices(t);
            InterceptTriangle::new(a, b, c)
        }));
        self.bounds = surface.bounds();
        self.scaled_epsilon =
            self.caster.config().scaled_epsilon(&self.bounds);
        let resolution = self.grid_config.resolution(self.triangles.len());
        self.grid =
            UniformGrid::build(&self.triangles, &self.bounds, resolution);
    }

    /// Identity of the wrapped surface.
    #[must_use]
    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    /// Bounding box of the snapshot.
    #[must_use]
    pub const fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Triangle count of the snapshot.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Distance epsilon in effect for this snapshot (relative epsilon
    /// scaled by the snapshot bounds).
    #[must_use]
    pub const fn scaled_epsilon(&self) -> f64 {
        self.scaled_epsilon
    }

    /// Closest interception of `ray` with the snapshot, or `None`.
    ///
    /// Restricted to triangles in grid cells the ray passes through;
    /// otherwise identical to the brute-force caster.
    #[must_use]
    pub fn query(&self, ray: &Ray) -> Option<RayHit> {
        let mut candidates = Vec::new();
        self.grid.candidates(ray, &mut candidates);
        candidates.sort_unstable();
        candidates.dedup();
        self.caster.cast_prepared(
            &self.triangles,
            candidates.into_iter().map(|t| t as usize),
            ray,
            self.scaled_epsilon,
        )
    }

    /// Reference result testing every snapshot triangle; the grid path must
    /// agree with this exactly.
    pub(crate) fn query_unaccelerated(&self, ray: &Ray) -> Option<RayHit> {
        self.caster.cast_prepared(
            &self.triangles,
            0..self.triangles.len(),
            ray,
            self.scaled_epsilon,
        )
    }
}

/// Uniform spatial partition over the snapshot bounds.
///
/// Cells hold indices of every triangle whose bounding box overlaps them;
/// a ray visits cells with a 3D DDA walk (Amanatides & Woo).
#[derive(Debug, Clone)]
struct UniformGrid {
    bounds: Aabb,
    dims: [usize; 3],
    cell_extent: DVec3,
    cells: Vec<Vec<u32>>,
}

impl UniformGrid {
    fn empty() -> Self {
        Self {
            bounds: Aabb::EMPTY,
            dims: [1, 1, 1],
            cell_extent: DVec3::ONE,
            cells: vec![Vec::new()],
        }
    }

    fn build(
        triangles: &[InterceptTriangle],
        mesh_bounds: &Aabb,
        resolution: u32,
    ) -> Self {
        if triangles.is_empty() || mesh_bounds.is_empty() {
            return Self::empty();
        }
        // Pad so flat meshes still get positive cell extents and boundary
        // vertices land strictly inside.
        let pad = (mesh_bounds.diagonal() * 1e-9).max(1e-12);
        let bounds = Aabb::new(
            mesh_bounds.min - DVec3::splat(pad),
            mesh_bounds.max + DVec3::splat(pad),
        );

        let n = resolution.max(1) as usize;
        let dims = [n, n, n];
        let cell_extent = bounds.extent() / n as f64;
        let mut cells = vec![Vec::new(); n * n * n];

        for (t, triangle) in triangles.iter().enumerate() {
            let tri_bounds = Aabb::from_points(triangle.corners());
            let lo = cell_coords(&bounds, cell_extent, dims, tri_bounds.min);
            let hi = cell_coords(&bounds, cell_extent, dims, tri_bounds.max);
            for x in lo[0]..=hi[0] {
                for y in lo[1]..=hi[1] {
                    for z in lo[2]..=hi[2] {
                        cells[(x * n + y) * n + z].push(t as u32);
                    }
                }
            }
        }

        Self {
            bounds,
            dims,
            cell_extent,
            cells,
        }
    }

    fn cell_index(&self, c: [usize; 3]) -> usize {
        (c[0] * self.dims[1] + c[1]) * self.dims[2] + c[2]
    }

    /// Append the triangle indices of every cell the ray passes through.
    /// May contain duplicates; callers dedupe.
    fn candidates(&self, ray: &Ray, out: &mut Vec<u32>) {
        // A zero direction hits nothing and cannot drive the DDA walk.
        if ray.direction.cmpeq(DVec3::ZERO).all() {
            return;
        }
        let inv_direction = ray.direction.recip();
        let Some((t_enter, t_exit)) =
            self.bounds.ray_interval(ray.origin, inv_direction)
        else {
            return;
        };

        let mut cell = cell_coords(
            &self.bounds,
            self.cell_extent,
            self.dims,
            ray.at(t_enter),
        );

        // Per-axis DDA state.
        let mut step = [0isize; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];
        for axis in 0..3 {
            let dir = ray.direction[axis];
            let extent = self.cell_extent[axis];
            if dir > 0.0 {
                step[axis] = 1;
                let boundary = self.bounds.min[axis]
                    + (cell[axis] + 1) as f64 * extent;
                t_max[axis] = (boundary - ray.origin[axis]) / dir;
                t_delta[axis] = extent / dir;
            } else if dir < 0.0 {
                step[axis] = -1;
                let boundary =
                    self.bounds.min[axis] + cell[axis] as f64 * extent;
                t_max[axis] = (boundary - ray.origin[axis]) / dir;
                t_delta[axis] = -extent / dir;
            }
        }

        loop {
            out.extend_from_slice(&self.cells[self.cell_index(cell)]);

            let axis = min_axis(&t_max);
            if t_max[axis] > t_exit {
                return;
            }
            let next = cell[axis] as isize + step[axis];
            if next < 0 || next as usize >= self.dims[axis] {
                return;
            }
            cell[axis] = next as usize;
            t_max[axis] += t_delta[axis];
        }
    }
}

fn cell_coords(
    bounds: &Aabb,
    cell_extent: DVec3,
    dims: [usize; 3],
    point: DVec3,
) -> [usize; 3] {
    let relative = (point - bounds.min) / cell_extent;
    let mut cell = [0usize; 3];
    for axis in 0..3 {
        let c = relative[axis].floor();
        cell[axis] = if c.is_finite() && c > 0.0 {
            (c as usize).min(dims[axis] - 1)
        } else {
            0
        };
    }
    cell
}

fn min_axis(t_max: &[f64; 3]) -> usize {
    let mut axis = 0;
    if t_max[1] < t_max[axis] {
        axis = 1;
    }
    if t_max[2] < t_max[axis] {
        axis = 2;
    }
    axis
}
