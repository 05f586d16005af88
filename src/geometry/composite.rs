//! Nearest-hit resolution across many pickable surfaces.

use crate::geometry::intercept::InterceptingSurface;
use crate::geometry::ray::{Ray, RayHit};
use crate::geometry::raycast::nearer_or_lower_index;
use crate::geometry::surface::SurfaceId;

/// A pick result: which surface won, and where it was struck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    /// Identity of the winning surface.
    pub surface: SurfaceId,
    /// The interception on that surface.
    pub hit: RayHit,
}

/// Insertion-ordered set of intercepting surfaces resolving one ray to the
/// single nearest hit.
///
/// The composite holds snapshots, not surface borrows; membership reflects
/// exactly the surfaces pickable in the current frame context and is
/// maintained by whoever builds it (usually
/// [`TrackManager::composite_at`](crate::track::manager::TrackManager::composite_at)).
#[derive(Debug, Clone, Default)]
pub struct Composite {
    /// Insertion order is the documented tie-break order.
    entries: Vec<InterceptingSurface>,
}

impl Composite {
    /// Empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a surface; it ranks after everything already present when
    /// hits tie within epsilon.
    pub fn add(&mut self, surface: InterceptingSurface) {
        self.entries.push(surface);
    }

    /// Remove a surface by identity, returning it if present.
    pub fn remove(&mut self, id: SurfaceId) -> Option<InterceptingSurface> {
        let position =
            self.entries.iter().position(|e| e.surface_id() == id)?;
        Some(self.entries.remove(position))
    }

    /// Number of member surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no surfaces are pickable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Member surface identities in insertion order.
    pub fn surface_ids(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.entries.iter().map(InterceptingSurface::surface_id)
    }

    /// Globally nearest interception of `ray` across all members.
    ///
    /// Ties within epsilon go to the earliest-inserted surface; the empty
    /// composite and all-miss rays yield `None`.
    #[must_use]
    pub fn pick(&self, ray: &Ray) -> Option<Pick> {
        let mut best: Option<(usize, Pick)> = None;
        for (order, entry) in self.entries.iter().enumerate() {
            let Some(hit) = entry.query(ray) else {
                continue;
            };
            let replace = match &best {
                None => true,
                Some((best_order, current)) => {
                    // Symmetric tie window: the larger of the two
                    // surfaces' scaled epsilons.
                    let epsilon = entry
                        .scaled_epsilon()
                        .max(surface_epsilon(&self.entries, *best_order));
                    nearer_or_lower_index(
                        hit.distance,
                        order,
                        current.hit.distance,
                        *best_order,
                        epsilon,
                    )
                }
            };
            if replace {
                best = Some((
                    order,
                    Pick {
                        surface: entry.surface_id(),
                        hit,
                    },
                ));
            }
        }
        best.map(|(_, pick)| pick)
    }
}

fn surface_epsilon(entries: &[InterceptingSurface], order: usize) -> f64 {
    entries[order].scaled_epsilon()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    use crate::geometry::shapes::unit_sphere;
    use crate::geometry::surface::TriangulatedSurface;

    fn sphere_at(offset: DVec3) -> TriangulatedSurface {
        let mut sphere = unit_sphere(2);
        sphere.translate(offset);
        sphere
    }

    #[test]
    fn test_empty_composite_never_hits() {
        let composite = Composite::new();
        let ray = Ray::new(DVec3::ZERO, DVec3::X);
        assert!(composite.pick(&ray).is_none());
    }

    #[test]
    fn test_nearest_surface_wins() {
        let near = sphere_at(DVec3::new(0.0, 0.0, 2.0));
        let far = sphere_at(DVec3::new(0.0, 0.0, 6.0));

        // Insert the far one first; distance must still decide.
        let mut composite = Composite::new();
        composite.add(InterceptingSurface::new(&far));
        composite.add(InterceptingSurface::new(&near));

        let ray = Ray::new(DVec3::new(0.0, 0.0, -2.0), DVec3::Z);
        let pick = composite.pick(&ray).unwrap();
        assert_eq!(pick.surface, near.id());
        assert!((pick.hit.distance - 3.0).abs() < 0.05);
    }

    #[test]
    fn test_tied_surfaces_resolve_by_insertion_order() {
        // Two copies of the same geometry: every hit ties exactly.
        let first = sphere_at(DVec3::ZERO);
        let second = sphere_at(DVec3::ZERO);

        let mut composite = Composite::new();
        composite.add(InterceptingSurface::new(&first));
        composite.add(InterceptingSurface::new(&second));

        let ray = Ray::new(DVec3::new(0.0, 0.0, 4.0), DVec3::NEG_Z);
        let pick = composite.pick(&ray).unwrap();
        assert_eq!(pick.surface, first.id());
    }

    #[test]
    fn test_remove_changes_the_winner() {
        let near = sphere_at(DVec3::new(0.0, 0.0, 2.0));
        let far = sphere_at(DVec3::new(0.0, 0.0, 6.0));

        let mut composite = Composite::new();
        composite.add(InterceptingSurface::new(&near));
        composite.add(InterceptingSurface::new(&far));
        assert_eq!(composite.len(), 2);

        let ray = Ray::new(DVec3::new(0.0, 0.0, -2.0), DVec3::Z);
        assert!(composite.remove(near.id()).is_some());
        let pick = composite.pick(&ray).unwrap();
        assert_eq!(pick.surface, far.id());
        assert!((pick.hit.distance - 7.0).abs() < 0.05);

        assert!(composite.remove(near.id()).is_none());
    }
}
