//! Global track bookkeeping and cross-track reassignment.
//!
//! One `TrackManager` instance owns every registered surface and every
//! track; there is no ambient global state. Operations reference surfaces
//! by [`SurfaceId`] and the manager resolves identities, so a surface is
//! owned by exactly one track at a time or parked unowned in the registry
//! between reassignments.
//!
//! # Locking
//!
//! The whole table sits behind one `parking_lot::RwLock`. Mutating
//! operations take the write lock for the duration of the in-memory update
//! only, so `move_surface` and `delete_track` are atomic to every reader:
//! no observer can see a surface in zero or two tracks. Reads (`pick`,
//! lookups, summaries) share the read lock and never block each other.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::config::{GridConfig, RayCastConfig};
use crate::error::TrackError;
use crate::geometry::composite::Composite;
use crate::geometry::intercept::InterceptingSurface;
use crate::geometry::ray::{Ray, RayHit};
use crate::geometry::surface::{SurfaceId, TriangulatedSurface};
use crate::track::color::TrackColor;
use crate::track::track::{Track, TrackId};
use crate::track::Frame;

/// A pick resolved to its owning track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPick {
    /// Track owning the winning surface.
    pub track: TrackId,
    /// The winning surface.
    pub surface: SurfaceId,
    /// Where the ray struck it.
    pub hit: RayHit,
}

/// Read-only snapshot of one track's extent, for display layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Track identifier.
    pub id: TrackId,
    /// Display name.
    pub name: String,
    /// Display color.
    pub color: TrackColor,
    /// Earliest occupied frame, if any.
    pub first_frame: Option<Frame>,
    /// Latest occupied frame, if any.
    pub last_frame: Option<Frame>,
    /// Number of occupied frames.
    pub frames: usize,
}

#[derive(Debug, Default)]
struct TrackTable {
    tracks: BTreeMap<TrackId, Track>,
    /// Every registered surface, owned or not.
    surfaces: FxHashMap<SurfaceId, TriangulatedSurface>,
    /// Owned subset: which track holds each surface.
    owners: FxHashMap<SurfaceId, TrackId>,
    next_track: u64,
}

impl TrackTable {
    fn track(&self, id: TrackId) -> Result<&Track, TrackError> {
        self.tracks
            .get(&id)
            .ok_or(TrackError::UnknownTrack { track: id })
    }

    fn track_mut(&mut self, id: TrackId) -> Result<&mut Track, TrackError> {
        self.tracks
            .get_mut(&id)
            .ok_or(TrackError::UnknownTrack { track: id })
    }

    /// A registered surface that is not currently owned by any track.
    fn unowned(&self, id: SurfaceId) -> Result<(), TrackError> {
        if !self.surfaces.contains_key(&id) {
            return Err(TrackError::UnknownSurface { surface: id });
        }
        if let Some(&owner) = self.owners.get(&id) {
            return Err(TrackError::SurfaceAlreadyTracked {
                surface: id,
                owner,
            });
        }
        Ok(())
    }
}

/// Process-scoped registry of tracks and surfaces (see module docs).
#[derive(Debug, Default)]
pub struct TrackManager {
    raycast: RayCastConfig,
    grid: GridConfig,
    state: RwLock<TrackTable>,
}

impl TrackManager {
    /// Manager with default picking configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager with explicit picking configuration, applied to every
    /// composite it builds.
    #[must_use]
    pub fn with_config(raycast: RayCastConfig, grid: GridConfig) -> Self {
        Self {
            raycast,
            grid,
            state: RwLock::new(TrackTable::default()),
        }
    }

    // ── Surface registry ────────────────────────────────────────────────

    /// Register a surface produced by the deformation subsystem. It starts
    /// unowned; assign it with [`start_track`](Self::start_track) or
    /// [`extend_track`](Self::extend_track).
    pub fn register_surface(&self, surface: TriangulatedSurface) -> SurfaceId {
        let id = surface.id();
        let mut table = self.state.write();
        let _ = table.surfaces.insert(id, surface);
        id
    }

    /// Remove an *unowned* surface from the registry, transferring it to
    /// the caller, typically for disposal after
    /// [`delete_track`](Self::delete_track) or
    /// [`clear_frame`](Self::clear_frame).
    ///
    /// # Errors
    ///
    /// [`TrackError::UnknownSurface`] for unregistered ids;
    /// [`TrackError::SurfaceAlreadyTracked`] while a track still owns it.
    pub fn take_surface(
        &self,
        surface: SurfaceId,
    ) -> Result<TriangulatedSurface, TrackError> {
        let mut table = self.state.write();
        table.unowned(surface)?;
        table
            .surfaces
            .remove(&surface)
            .ok_or(TrackError::UnknownSurface { surface })
    }

    /// Read access to a registered surface's geometry.
    ///
    /// # Errors
    ///
    /// [`TrackError::UnknownSurface`] for unregistered ids.
    pub fn with_surface<R>(
        &self,
        surface: SurfaceId,
        f: impl FnOnce(&TriangulatedSurface) -> R,
    ) -> Result<R, TrackError> {
        let table = self.state.read();
        table
            .surfaces
            .get(&surface)
            .map(f)
            .ok_or(TrackError::UnknownSurface { surface })
    }

    /// Scoped mutable access for the deformation subsystem.
    ///
    /// Holds the write lock while `f` runs, so picks never read a
    /// half-updated vertex buffer. Composites built before this call are
    /// stale afterwards; rebuild them before querying (see
    /// [`InterceptingSurface::synchronize`]).
    ///
    /// # Errors
    ///
    /// [`TrackError::UnknownSurface`] for unregistered ids.
    pub fn update_surface<R>(
        &self,
        surface: SurfaceId,
        f: impl FnOnce(&mut TriangulatedSurface) -> R,
    ) -> Result<R, TrackError> {
        let mut table = self.state.write();
        table
            .surfaces
            .get_mut(&surface)
            .map(f)
            .ok_or(TrackError::UnknownSurface { surface })
    }

    // ── Track operations ────────────────────────────────────────────────

    /// Create a new track owning `surface` at `frame`.
    ///
    /// The track's color (and name) is suggested from the colors already
    /// in use.
    ///
    /// # Errors
    ///
    /// [`TrackError::UnknownSurface`] for unregistered surfaces;
    /// [`TrackError::SurfaceAlreadyTracked`] when another track owns the
    /// surface at any frame. Nothing changes on error.
    pub fn start_track(
        &self,
        frame: Frame,
        surface: SurfaceId,
    ) -> Result<TrackId, TrackError> {
        let mut table = self.state.write();
        table.unowned(surface)?;

        let id = TrackId(table.next_track);
        table.next_track += 1;
        let used: Vec<TrackColor> =
            table.tracks.values().map(|t| t.color().clone()).collect();
        let color = TrackColor::suggest(&used);
        let mut track = Track::new(id, color.name.clone(), color);
        track.assign(frame, surface)?;

        let _ = table.owners.insert(surface, id);
        let _ = table.tracks.insert(id, track);
        log::debug!("{id}: started at frame {frame} with {surface}");
        Ok(id)
    }

    /// Assign an unowned surface to an existing track at `frame`.
    ///
    /// # Errors
    ///
    /// [`TrackError::UnknownTrack`], [`TrackError::UnknownSurface`],
    /// [`TrackError::SurfaceAlreadyTracked`], or
    /// [`TrackError::FrameOccupied`]. Nothing changes on error.
    pub fn extend_track(
        &self,
        track: TrackId,
        frame: Frame,
        surface: SurfaceId,
    ) -> Result<(), TrackError> {
        let mut table = self.state.write();
        let _ = table.track(track)?;
        table.unowned(surface)?;
        table.track_mut(track)?.assign(frame, surface)?;
        let _ = table.owners.insert(surface, track);
        log::debug!("{track}: extended to frame {frame} with {surface}");
        Ok(())
    }

    /// Clear `frame` on `track`; the surface returns to the unowned
    /// registry and its id is handed back.
    ///
    /// # Errors
    ///
    /// [`TrackError::UnknownTrack`] or [`TrackError::FrameEmpty`]. The
    /// track itself stays alive even if this empties it.
    pub fn clear_frame(
        &self,
        track: TrackId,
        frame: Frame,
    ) -> Result<SurfaceId, TrackError> {
        let mut table = self.state.write();
        let surface = table.track_mut(track)?.clear(frame)?;
        let _ = table.owners.remove(&surface);
        log::debug!("{track}: cleared frame {frame}, released {surface}");
        Ok(surface)
    }

    /// Atomically move the surface at `frame` from one track to another.
    ///
    /// Validate-then-commit under the write lock: no reader ever observes
    /// the surface in neither or both tracks.
    ///
    /// # Errors
    ///
    /// [`TrackError::UnknownTrack`] for either track,
    /// [`TrackError::NothingToMove`] when `from` has no surface at
    /// `frame`, [`TrackError::FrameOccupied`] when `to` already holds one
    /// there (clear the destination first; no implicit overwrite). Nothing
    /// changes on error.
    pub fn move_surface(
        &self,
        from: TrackId,
        to: TrackId,
        frame: Frame,
    ) -> Result<(), TrackError> {
        let mut table = self.state.write();

        // Validate everything before touching state.
        let moved = table.track(from)?.surface_at(frame).ok_or(
            TrackError::NothingToMove { track: from, frame },
        )?;
        if table.track(to)?.contains_frame(frame) {
            return Err(TrackError::FrameOccupied { track: to, frame });
        }

        // Commit; validated above, neither step can fail.
        let _ = table.track_mut(from)?.clear(frame)?;
        table.track_mut(to)?.assign(frame, moved)?;
        let _ = table.owners.insert(moved, to);
        log::debug!("{moved}: moved {from} -> {to} at frame {frame}");
        Ok(())
    }

    /// Recreate a track from persisted state.
    ///
    /// Persistence itself is the host's concern; this is the lossless load
    /// path for its track → {frame → surface} mapping, with the name and
    /// color the track was saved with.
    ///
    /// # Errors
    ///
    /// [`TrackError::UnknownSurface`] or
    /// [`TrackError::SurfaceAlreadyTracked`] for any listed surface
    /// (including one listed twice), [`TrackError::FrameOccupied`] for a
    /// frame listed twice. Nothing changes on error.
    pub fn restore_track(
        &self,
        name: String,
        color: TrackColor,
        assignments: &[(Frame, SurfaceId)],
    ) -> Result<TrackId, TrackError> {
        let mut table = self.state.write();

        let id = TrackId(table.next_track);
        let mut seen: FxHashSet<SurfaceId> = FxHashSet::default();
        for &(_, surface) in assignments {
            table.unowned(surface)?;
            if !seen.insert(surface) {
                return Err(TrackError::SurfaceAlreadyTracked {
                    surface,
                    owner: id,
                });
            }
        }
        // Building the track catches duplicate frames before any commit.
        let mut track = Track::new(id, name, color);
        for &(frame, surface) in assignments {
            track.assign(frame, surface)?;
        }

        table.next_track += 1;
        for &(_, surface) in assignments {
            let _ = table.owners.insert(surface, id);
        }
        let _ = table.tracks.insert(id, track);
        log::debug!(
            "{id}: restored with {} assignment(s)",
            assignments.len()
        );
        Ok(id)
    }

    /// Delete a track, releasing every surface it held back to the unowned
    /// registry. Returns the released surface ids.
    ///
    /// # Errors
    ///
    /// [`TrackError::UnknownTrack`] for unrecognized identifiers.
    pub fn delete_track(
        &self,
        track: TrackId,
    ) -> Result<Vec<SurfaceId>, TrackError> {
        let mut table = self.state.write();
        let removed = table
            .tracks
            .remove(&track)
            .ok_or(TrackError::UnknownTrack { track })?;
        let released: Vec<SurfaceId> = removed
            .frames()
            .filter_map(|frame| removed.surface_at(frame))
            .collect();
        for surface in &released {
            let _ = table.owners.remove(surface);
        }
        log::debug!(
            "{track}: deleted, released {} surface(s)",
            released.len()
        );
        Ok(released)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Pick the track under `ray` at `frame`.
    ///
    /// Builds a frame-scoped composite over every track's surface at that
    /// frame and resolves the winning surface back to its owner. `None` is
    /// a normal miss, never an error.
    #[must_use]
    pub fn pick_track_at(&self, frame: Frame, ray: &Ray) -> Option<TrackPick> {
        let table = self.state.read();
        let composite = build_composite(&table, frame, self.raycast, self.grid);
        let pick = composite.pick(ray)?;
        let track = *table.owners.get(&pick.surface)?;
        Some(TrackPick {
            track,
            surface: pick.surface,
            hit: pick.hit,
        })
    }

    /// Frame-scoped composite snapshot for callers issuing many picks
    /// against one frame. Rebuild after any deformation step or track
    /// edit; the snapshot does not follow later changes.
    #[must_use]
    pub fn composite_at(&self, frame: Frame) -> Composite {
        let table = self.state.read();
        build_composite(&table, frame, self.raycast, self.grid)
    }

    /// Track currently owning `surface`, if any.
    #[must_use]
    pub fn track_of(&self, surface: SurfaceId) -> Option<TrackId> {
        self.state.read().owners.get(&surface).copied()
    }

    /// Every `(track, surface)` pair occupying `frame`, in track order,
    /// observed under one consistent read lock.
    #[must_use]
    pub fn owners_at(&self, frame: Frame) -> Vec<(TrackId, SurfaceId)> {
        let table = self.state.read();
        table
            .tracks
            .values()
            .filter_map(|t| t.surface_at(frame).map(|s| (t.id(), s)))
            .collect()
    }

    /// Read access to one track.
    ///
    /// # Errors
    ///
    /// [`TrackError::UnknownTrack`] for unrecognized identifiers.
    pub fn with_track<R>(
        &self,
        track: TrackId,
        f: impl FnOnce(&Track) -> R,
    ) -> Result<R, TrackError> {
        let table = self.state.read();
        table.track(track).map(f)
    }

    /// Snapshot of every track's extent, in track order.
    #[must_use]
    pub fn summaries(&self) -> Vec<TrackSummary> {
        let table = self.state.read();
        table
            .tracks
            .values()
            .map(|t| TrackSummary {
                id: t.id(),
                name: t.name().to_owned(),
                color: t.color().clone(),
                first_frame: t.first_frame(),
                last_frame: t.last_frame(),
                frames: t.len(),
            })
            .collect()
    }

    /// Number of live tracks.
    #[must_use]
    pub fn track_count(&self) -> usize {
        self.state.read().tracks.len()
    }
}

fn build_composite(
    table: &TrackTable,
    frame: Frame,
    raycast: RayCastConfig,
    grid: GridConfig,
) -> Composite {
    let mut composite = Composite::new();
    for track in table.tracks.values() {
        let Some(surface_id) = track.surface_at(frame) else {
            continue;
        };
        if let Some(surface) = table.surfaces.get(&surface_id) {
            composite.add(InterceptingSurface::with_config(
                surface, raycast, grid,
            ));
        }
    }
    composite
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    use crate::geometry::shapes::unit_sphere;

    fn sphere_at(manager: &TrackManager, offset: DVec3) -> SurfaceId {
        let mut sphere = unit_sphere(2);
        sphere.translate(offset);
        manager.register_surface(sphere)
    }

    #[test]
    fn test_start_track_owns_surface() {
        let manager = TrackManager::new();
        let surface = sphere_at(&manager, DVec3::ZERO);

        let track = manager.start_track(0, surface).unwrap();
        assert_eq!(manager.track_of(surface), Some(track));
        assert_eq!(manager.track_count(), 1);

        let err = manager.start_track(1, surface).unwrap_err();
        assert_eq!(
            err,
            TrackError::SurfaceAlreadyTracked {
                surface,
                owner: track,
            }
        );
        // Failed start leaves nothing behind.
        assert_eq!(manager.track_count(), 1);
    }

    #[test]
    fn test_unregistered_surface_is_rejected() {
        let manager = TrackManager::new();
        let other = TrackManager::new();
        let foreign = sphere_at(&other, DVec3::ZERO);
        assert_eq!(
            manager.start_track(0, foreign).unwrap_err(),
            TrackError::UnknownSurface { surface: foreign }
        );
    }

    #[test]
    fn test_move_surface_transfers_ownership() {
        let manager = TrackManager::new();
        let a_surface = sphere_at(&manager, DVec3::ZERO);
        let b_surface = sphere_at(&manager, DVec3::X * 4.0);
        let a = manager.start_track(3, a_surface).unwrap();
        let b = manager.start_track(1, b_surface).unwrap();

        manager.move_surface(a, b, 3).unwrap();
        assert_eq!(manager.track_of(a_surface), Some(b));
        let a_empty = manager.with_track(a, Track::is_empty).unwrap();
        assert!(a_empty, "source track keeps living, but empty");
        assert_eq!(manager.owners_at(3), vec![(b, a_surface)]);
    }

    #[test]
    fn test_move_to_occupied_frame_fails_without_change() {
        let manager = TrackManager::new();
        let m = sphere_at(&manager, DVec3::ZERO);
        let other = sphere_at(&manager, DVec3::X * 4.0);
        let a = manager.start_track(3, m).unwrap();
        let b = manager.start_track(3, other).unwrap();

        let err = manager.move_surface(a, b, 3).unwrap_err();
        assert_eq!(err, TrackError::FrameOccupied { track: b, frame: 3 });
        // Track A still holds M at frame 3.
        assert_eq!(
            manager.with_track(a, |t| t.surface_at(3)).unwrap(),
            Some(m)
        );
        assert_eq!(manager.track_of(m), Some(a));
    }

    #[test]
    fn test_move_nothing_fails() {
        let manager = TrackManager::new();
        let a = manager
            .start_track(0, sphere_at(&manager, DVec3::ZERO))
            .unwrap();
        let b = manager
            .start_track(0, sphere_at(&manager, DVec3::X * 4.0))
            .unwrap();
        assert_eq!(
            manager.move_surface(a, b, 7).unwrap_err(),
            TrackError::NothingToMove { track: a, frame: 7 }
        );
    }

    #[test]
    fn test_delete_track_releases_surfaces() {
        let manager = TrackManager::new();
        let first = sphere_at(&manager, DVec3::ZERO);
        let second = sphere_at(&manager, DVec3::X * 4.0);
        let track = manager.start_track(0, first).unwrap();
        manager.extend_track(track, 1, second).unwrap();

        let released = manager.delete_track(track).unwrap();
        assert_eq!(released, vec![first, second]);
        assert_eq!(manager.track_count(), 0);
        assert_eq!(manager.track_of(first), None);

        // Released surfaces are unowned and reclaimable.
        let reclaimed = manager.take_surface(first).unwrap();
        assert_eq!(reclaimed.id(), first);

        assert_eq!(
            manager.delete_track(track).unwrap_err(),
            TrackError::UnknownTrack { track }
        );
    }

    #[test]
    fn test_take_owned_surface_is_refused() {
        let manager = TrackManager::new();
        let surface = sphere_at(&manager, DVec3::ZERO);
        let track = manager.start_track(0, surface).unwrap();
        assert_eq!(
            manager.take_surface(surface).unwrap_err(),
            TrackError::SurfaceAlreadyTracked {
                surface,
                owner: track,
            }
        );
    }

    #[test]
    fn test_pick_resolves_owning_track() {
        let manager = TrackManager::new();
        let near = sphere_at(&manager, DVec3::new(0.0, 0.0, 2.0));
        let far = sphere_at(&manager, DVec3::new(0.0, 0.0, 6.0));
        let near_track = manager.start_track(0, near).unwrap();
        let far_track = manager.start_track(0, far).unwrap();

        let ray = Ray::new(DVec3::new(0.0, 0.0, -2.0), DVec3::Z);
        let pick = manager.pick_track_at(0, &ray).unwrap();
        assert_eq!(pick.track, near_track);
        assert_eq!(pick.surface, near);
        assert!((pick.hit.distance - 3.0).abs() < 0.05);

        // Nothing is pickable at a frame with no surfaces.
        assert!(manager.pick_track_at(5, &ray).is_none());

        // The far track is pickable from the other side.
        let back = Ray::new(DVec3::new(0.0, 0.0, 10.0), DVec3::NEG_Z);
        let pick = manager.pick_track_at(0, &back).unwrap();
        assert_eq!(pick.track, far_track);
    }

    #[test]
    fn test_restore_track_rebuilds_the_timeline() {
        let manager = TrackManager::new();
        let first = sphere_at(&manager, DVec3::ZERO);
        let second = sphere_at(&manager, DVec3::X * 4.0);

        let color = TrackColor::suggest(&[]);
        let track = manager
            .restore_track(
                "saved".to_owned(),
                color.clone(),
                &[(2, first), (5, second)],
            )
            .unwrap();

        assert_eq!(manager.track_of(first), Some(track));
        assert_eq!(
            manager.with_track(track, |t| t.frames().collect::<Vec<_>>()),
            Ok(vec![2, 5])
        );
        let summary = &manager.summaries()[0];
        assert_eq!(summary.name, "saved");
        assert_eq!(summary.color, color);
    }

    #[test]
    fn test_restore_rejects_duplicates_without_change() {
        let manager = TrackManager::new();
        let surface = sphere_at(&manager, DVec3::ZERO);
        let color = TrackColor::suggest(&[]);

        let err = manager
            .restore_track(
                "dup".to_owned(),
                color.clone(),
                &[(0, surface), (1, surface)],
            )
            .unwrap_err();
        assert!(matches!(err, TrackError::SurfaceAlreadyTracked { .. }));
        assert_eq!(manager.track_count(), 0);
        assert_eq!(manager.track_of(surface), None);

        // The surface is still usable after the failed restore.
        let track = manager
            .restore_track("ok".to_owned(), color, &[(0, surface)])
            .unwrap();
        assert_eq!(manager.track_of(surface), Some(track));
    }

    #[test]
    fn test_colors_are_distinct_across_tracks() {
        let manager = TrackManager::new();
        let a = manager
            .start_track(0, sphere_at(&manager, DVec3::ZERO))
            .unwrap();
        let b = manager
            .start_track(0, sphere_at(&manager, DVec3::X * 4.0))
            .unwrap();
        let colors: Vec<TrackColor> = [a, b]
            .iter()
            .map(|&t| manager.with_track(t, |t| t.color().clone()).unwrap())
            .collect();
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn test_deformation_updates_next_pick() {
        let manager = TrackManager::new();
        let surface = sphere_at(&manager, DVec3::ZERO);
        let track = manager.start_track(0, surface).unwrap();

        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), DVec3::NEG_Z);
        let before = manager.pick_track_at(0, &ray).unwrap();

        manager
            .update_surface(surface, |s| {
                s.translate(DVec3::new(0.0, 0.0, -1.0));
            })
            .unwrap();

        let after = manager.pick_track_at(0, &ray).unwrap();
        assert_eq!(after.track, track);
        assert!((after.hit.distance - (before.hit.distance + 1.0)).abs()
            < 1e-9);
    }
}
