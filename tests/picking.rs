//! Picking behavior through the public API.

use glam::DVec3;

use meshtrack::geometry::shapes::unit_sphere;
use meshtrack::{Composite, InterceptingSurface, Ray, RayCaster};

#[test]
fn rays_missing_every_triangle_return_no_hit() {
    let sphere = unit_sphere(2);
    let caster = RayCaster::default();

    let misses = [
        // Outside, aimed away.
        Ray::new(DVec3::new(3.0, 0.0, 0.0), DVec3::X),
        // Outside, passing beside the sphere.
        Ray::new(DVec3::new(3.0, 3.0, 3.0), DVec3::Y),
        // Parallel to a tangent plane, above the pole.
        Ray::new(DVec3::new(0.0, 0.0, 2.0), DVec3::X),
    ];
    for ray in &misses {
        assert!(caster.cast(&sphere, ray).is_none(), "{ray:?} should miss");
    }
}

#[test]
fn centroid_ray_along_inward_normal_hits_its_triangle() {
    let sphere = unit_sphere(2);
    let caster = RayCaster::default();

    for t in 0..sphere.triangle_count() {
        let [a, b, c] = sphere.triangle_vertices(t);
        let centroid = (a + b + c) / 3.0;
        let normal = (b - a).cross(c - a).normalize();
        // Start outside the facet and shoot straight back at it.
        let ray = Ray::new(centroid + normal * 0.5, -normal);

        let hit = caster
            .cast(&sphere, &ray)
            .unwrap_or_else(|| panic!("triangle {t} not hit"));
        assert_eq!(hit.triangle, t);
        assert!(hit.distance > 0.0);
        assert!((hit.distance - 0.5).abs() < 1e-9);
        assert!((hit.point - centroid).length() < 1e-9);
    }
}

#[test]
fn nearer_surface_always_wins_along_a_shared_ray() {
    let mut near = unit_sphere(2);
    near.translate(DVec3::new(0.0, 0.0, 2.0));
    let mut far = unit_sphere(2);
    far.translate(DVec3::new(0.0, 0.0, 6.0));

    // Far surface inserted first; distance, not order, must decide.
    let mut composite = Composite::new();
    composite.add(InterceptingSurface::new(&far));
    composite.add(InterceptingSurface::new(&near));

    let ray = Ray::new(DVec3::new(0.0, 0.0, -3.0), DVec3::Z);
    let pick = composite.pick(&ray).expect("shared ray must hit");
    assert_eq!(pick.surface, near.id());
    assert!(pick.hit.distance < 5.0);
}

#[test]
fn empty_composite_misses_any_ray() {
    let composite = Composite::new();
    for direction in [DVec3::X, DVec3::NEG_Y, DVec3::new(1.0, 1.0, 1.0)] {
        let ray = Ray::new(DVec3::ZERO, direction);
        assert!(composite.pick(&ray).is_none());
    }
}

#[test]
fn accelerated_queries_agree_with_brute_force_casting() {
    let sphere = unit_sphere(3);
    let intercepting = InterceptingSurface::new(&sphere);
    let caster = RayCaster::default();

    for i in -3i32..=3 {
        for j in -3i32..=3 {
            let origin =
                DVec3::new(f64::from(i) * 0.4, f64::from(j) * 0.4, 2.5);
            let ray = Ray::new(origin, DVec3::NEG_Z);
            let accelerated = intercepting.query(&ray);
            let brute = caster.cast(&sphere, &ray);
            assert_eq!(accelerated, brute, "divergence for {ray:?}");
        }
    }
}
