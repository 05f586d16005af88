//! Triangulated surfaces: the unit being picked and tracked.
//!
//! A surface is created by the deformation subsystem at mesh-generation
//! time, mutated in place as vertices move each deformation step, and owned
//! by exactly one track at a time (or parked unowned in the track manager's
//! registry during reassignment).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::geometry::aabb::Aabb;

/// Process-unique, stable identity of one surface.
///
/// Identity survives vertex mutation; it is how tracks, composites, and the
/// scripting layer refer to a surface without aliasing its storage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct SurfaceId(u64);

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

impl SurfaceId {
    fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

/// A deformable triangulated surface: vertex positions plus triangle
/// connectivity, with a lazily cached per-vertex normal field.
///
/// Shared vertices across triangles are expected; every triangle index is
/// validated against the vertex sequence at construction.
#[derive(Debug)]
pub struct TriangulatedSurface {
    id: SurfaceId,
    vertices: Vec<DVec3>,
    triangles: Vec<[u32; 3]>,
    /// Area-weighted vertex normals; dropped by any mutable vertex access.
    normal_cache: Option<Vec<DVec3>>,
}

impl TriangulatedSurface {
    /// Build a surface, validating triangle connectivity.
    ///
    /// # Errors
    ///
    /// [`GeometryError::TriangleOutOfBounds`] when any triangle references
    /// a vertex index at or past `vertices.len()`.
    pub fn new(
        vertices: Vec<DVec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Result<Self, GeometryError> {
        let vertex_count = vertices.len();
        for (t, tri) in triangles.iter().enumerate() {
            for &index in tri {
                if index as usize >= vertex_count {
                    return Err(GeometryError::TriangleOutOfBounds {
                        triangle: t,
                        index,
                        vertex_count,
                    });
                }
            }
        }
        Ok(Self::from_parts(vertices, triangles))
    }

    /// Construction for generators that produce indices valid by
    /// construction (see [`crate::geometry::shapes`]).
    pub(crate) fn from_parts(
        vertices: Vec<DVec3>,
        triangles: Vec<[u32; 3]>,
    ) -> Self {
        debug_assert!(triangles
            .iter()
            .flatten()
            .all(|&i| (i as usize) < vertices.len()));
        Self {
            id: SurfaceId::next(),
            vertices,
            triangles,
            normal_cache: None,
        }
    }

    /// Stable identity of this surface.
    #[must_use]
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Vertex positions.
    #[must_use]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Triangle connectivity as vertex-index triples.
    #[must_use]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// The three corner positions of triangle `t`.
    ///
    /// # Panics
    ///
    /// Panics if `t` is out of bounds, like slice indexing.
    #[must_use]
    pub fn triangle_vertices(&self, t: usize) -> [DVec3; 3] {
        let [a, b, c] = self.triangles[t];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Mutable access to vertex positions for the deformation subsystem.
    ///
    /// Invalidates the normal cache. Callers holding an
    /// [`InterceptingSurface`](crate::geometry::intercept::InterceptingSurface)
    /// over this surface must re-`synchronize` it before the next query;
    /// the engine does not detect stale acceleration state.
    pub fn vertices_mut(&mut self) -> &mut [DVec3] {
        self.normal_cache = None;
        &mut self.vertices
    }

    /// Rigid translation of every vertex.
    pub fn translate(&mut self, offset: DVec3) {
        for v in self.vertices_mut() {
            *v += offset;
        }
    }

    /// Bounding box of the current vertex state.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().copied())
    }

    /// Area-weighted centroid of the surface.
    ///
    /// Falls back to the bounding-box center when total triangle area is
    /// zero (a broken mesh, logged at `warn`).
    #[must_use]
    pub fn centroid(&self) -> DVec3 {
        let mut weighted = DVec3::ZERO;
        let mut total_area = 0.0;
        for t in 0..self.triangles.len() {
            let [a, b, c] = self.triangle_vertices(t);
            let area = 0.5 * (b - a).cross(c - a).length();
            weighted += area * (a + b + c);
            total_area += 3.0 * area;
        }
        if total_area > 0.0 {
            weighted / total_area
        } else {
            log::warn!(
                "{}: zero total area, centroid falls back to bounds center",
                self.id
            );
            self.bounds().center()
        }
    }

    /// Area-weighted per-vertex normals, cached until the next mutation.
    ///
    /// Vertices not referenced by any non-degenerate triangle get a zero
    /// normal.
    pub fn vertex_normals(&mut self) -> &[DVec3] {
        if self.normal_cache.is_none() {
            self.normal_cache = Some(compute_vertex_normals(
                &self.vertices,
                &self.triangles,
            ));
        }
        // Just populated above.
        self.normal_cache.as_deref().unwrap_or(&[])
    }
}

/// Area-weighted vertex normals for the given geometry.
#[must_use]
pub fn compute_vertex_normals(
    vertices: &[DVec3],
    triangles: &[[u32; 3]],
) -> Vec<DVec3> {
    let mut normals = vec![DVec3::ZERO; vertices.len()];
    for tri in triangles {
        let [a, b, c] = [
            vertices[tri[0] as usize],
            vertices[tri[1] as usize],
            vertices[tri[2] as usize],
        ];
        // Cross product length is twice the area, so summing the raw cross
        // products area-weights the accumulation.
        let weighted_normal = (b - a).cross(c - a);
        for &index in tri {
            normals[index as usize] += weighted_normal;
        }
    }
    for n in &mut normals {
        *n = n.normalize_or_zero();
    }
    normals
}
