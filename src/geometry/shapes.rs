//! Sphere seed meshes and triangle subdivision.
//!
//! The deformation subsystem seeds every new object from a subdivided unit
//! sphere centered on the user's pick, then lets image forces pull it onto
//! the cell boundary. Only the seed generation lives here.

use std::f64::consts::PI;

use glam::DVec3;
use rustc_hash::FxHashMap;

use crate::geometry::surface::TriangulatedSurface;

/// Twenty-triangle sphere approximation used as the subdivision seed.
///
/// One pole vertex, a ring of five at 60° latitude, a ring of five at 120°
/// (offset half a step), and the opposite pole.
#[must_use]
pub fn five_triangle_sphere() -> TriangulatedSurface {
    let mut vertices = Vec::with_capacity(12);
    let mut triangles = Vec::with_capacity(20);

    vertices.push(DVec3::Z);
    for i in 0..5 {
        vertices.push(ring_point(PI / 3.0, 2.0 * PI / 5.0 * f64::from(i)));
    }
    for i in 0..5 {
        vertices.push(ring_point(
            2.0 * PI / 3.0,
            2.0 * PI / 5.0 * (f64::from(i) + 0.5),
        ));
    }
    vertices.push(DVec3::NEG_Z);

    for i in 0..5u32 {
        let first = i + 1;
        let second = (i + 1) % 5 + 1;
        triangles.push([0, first, second]);
    }
    for i in 0..5u32 {
        let above_behind = i + 1;
        let above_forward = (i + 1) % 5 + 1;
        let current = i + 6;
        let next = (i + 1) % 5 + 6;
        triangles.push([current, above_forward, above_behind]);
        triangles.push([current, next, above_forward]);
    }
    let bottom = 11;
    for i in 0..5u32 {
        let current = i + 6;
        let next = (i + 1) % 5 + 6;
        triangles.push([current, bottom, next]);
    }

    TriangulatedSurface::from_parts(vertices, triangles)
}

fn ring_point(phi: f64, theta: f64) -> DVec3 {
    let rho = phi.sin();
    DVec3::new(theta.cos() * rho, theta.sin() * rho, phi.cos())
}

/// One 4-to-1 subdivision pass: each triangle splits at its edge midpoints.
///
/// Midpoint vertices are shared between the two triangles flanking an edge,
/// keyed by the sorted endpoint pair.
#[must_use]
pub fn subdivide(surface: &TriangulatedSurface) -> TriangulatedSurface {
    let mut vertices = surface.vertices().to_vec();
    let mut midpoints: FxHashMap<(u32, u32), u32> = FxHashMap::default();
    let mut triangles =
        Vec::with_capacity(surface.triangle_count() * 4);

    let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<DVec3>| -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        *midpoints.entry(key).or_insert_with(|| {
            let index = vertices.len() as u32;
            let mid =
                0.5 * (vertices[a as usize] + vertices[b as usize]);
            vertices.push(mid);
            index
        })
    };

    for &[a, b, c] in surface.triangles() {
        let ab = midpoint(a, b, &mut vertices);
        let bc = midpoint(b, c, &mut vertices);
        let ca = midpoint(c, a, &mut vertices);
        triangles.push([a, ab, ca]);
        triangles.push([ab, b, bc]);
        triangles.push([ca, bc, c]);
        triangles.push([ab, bc, ca]);
    }

    TriangulatedSurface::from_parts(vertices, triangles)
}

/// Unit sphere mesh: the twenty-triangle seed subdivided `divisions` times,
/// vertices renormalized onto the sphere after each pass.
#[must_use]
pub fn unit_sphere(divisions: u32) -> TriangulatedSurface {
    let mut sphere = five_triangle_sphere();
    for _ in 0..divisions {
        sphere = subdivide(&sphere);
        for v in sphere.vertices_mut() {
            *v = v.normalize_or_zero();
        }
    }
    sphere
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_counts() {
        let seed = five_triangle_sphere();
        assert_eq!(seed.vertex_count(), 12);
        assert_eq!(seed.triangle_count(), 20);
    }

    #[test]
    fn test_subdivision_quadruples_triangles() {
        let seed = five_triangle_sphere();
        let once = subdivide(&seed);
        assert_eq!(once.triangle_count(), 80);
        // Shared midpoints: E = 30 edges on the seed, one new vertex each.
        assert_eq!(once.vertex_count(), 42);
    }

    #[test]
    fn test_unit_sphere_vertices_on_sphere() {
        let sphere = unit_sphere(3);
        for v in sphere.vertices() {
            assert!((v.length() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        // Every triangle normal should point away from the origin.
        let sphere = unit_sphere(1);
        for t in 0..sphere.triangle_count() {
            let [a, b, c] = sphere.triangle_vertices(t);
            let normal = (b - a).cross(c - a);
            let outward = (a + b + c) / 3.0;
            assert!(
                normal.dot(outward) > 0.0,
                "triangle {t} winds inward"
            );
        }
    }
}
