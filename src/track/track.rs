//! One track: the identity timeline of a single deforming object.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::geometry::surface::SurfaceId;
use crate::track::color::TrackColor;
use crate::track::Frame;

/// Stable identity of a track, assigned by the
/// [`TrackManager`](crate::track::manager::TrackManager).
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
pub struct TrackId(pub(crate) u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "track-{}", self.0)
    }
}

/// Ordered mapping from frame index to the surface representing one object
/// in that frame.
///
/// Identifier, name, and color are immutable after creation. A track that
/// becomes empty after [`clear`](Self::clear) stays alive — a user may be
/// mid-edit — until the manager explicitly deletes it.
#[derive(Debug, Clone)]
pub struct Track {
    id: TrackId,
    name: String,
    color: TrackColor,
    timeline: BTreeMap<Frame, SurfaceId>,
}

impl Track {
    pub(crate) fn new(id: TrackId, name: String, color: TrackColor) -> Self {
        Self {
            id,
            name,
            color,
            timeline: BTreeMap::new(),
        }
    }

    /// Track identifier.
    #[must_use]
    pub fn id(&self) -> TrackId {
        self.id
    }

    /// Display name (derived from the color at creation).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display color.
    #[must_use]
    pub const fn color(&self) -> &TrackColor {
        &self.color
    }

    /// Map `frame` to `surface`.
    ///
    /// # Errors
    ///
    /// [`TrackError::FrameOccupied`] when the frame already holds a
    /// surface; assignment never silently overwrites — callers must
    /// [`clear`](Self::clear) first.
    pub fn assign(
        &mut self,
        frame: Frame,
        surface: SurfaceId,
    ) -> Result<(), TrackError> {
        if self.timeline.contains_key(&frame) {
            return Err(TrackError::FrameOccupied {
                track: self.id,
                frame,
            });
        }
        let _ = self.timeline.insert(frame, surface);
        Ok(())
    }

    /// Remove the mapping at `frame`, returning the surface it held.
    ///
    /// # Errors
    ///
    /// [`TrackError::FrameEmpty`] when nothing is mapped at `frame`.
    pub fn clear(&mut self, frame: Frame) -> Result<SurfaceId, TrackError> {
        self.timeline
            .remove(&frame)
            .ok_or(TrackError::FrameEmpty {
                track: self.id,
                frame,
            })
    }

    /// Surface at `frame`, if any.
    #[must_use]
    pub fn surface_at(&self, frame: Frame) -> Option<SurfaceId> {
        self.timeline.get(&frame).copied()
    }

    /// True if `frame` holds a surface.
    #[must_use]
    pub fn contains_frame(&self, frame: Frame) -> bool {
        self.timeline.contains_key(&frame)
    }

    /// Occupied frame indices in increasing order. Restartable: each call
    /// yields a fresh iterator over the current state.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        self.timeline.keys().copied()
    }

    /// Earliest occupied frame.
    #[must_use]
    pub fn first_frame(&self) -> Option<Frame> {
        self.timeline.keys().next().copied()
    }

    /// Latest occupied frame.
    #[must_use]
    pub fn last_frame(&self) -> Option<Frame> {
        self.timeline.keys().next_back().copied()
    }

    /// Number of occupied frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    /// True when no frames are occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    /// Frame at which this track holds `surface`, if it does.
    #[must_use]
    pub fn frame_of(&self, surface: SurfaceId) -> Option<Frame> {
        self.timeline
            .iter()
            .find(|(_, &s)| s == surface)
            .map(|(&frame, _)| frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::surface::TriangulatedSurface;
    use glam::DVec3;

    fn test_track() -> Track {
        Track::new(
            TrackId(7),
            "red".to_owned(),
            TrackColor::suggest(&[]),
        )
    }

    fn fresh_surface_id() -> SurfaceId {
        TriangulatedSurface::new(vec![DVec3::ZERO], Vec::new())
            .unwrap()
            .id()
    }

    #[test]
    fn test_assign_then_clear_round_trips() {
        let mut track = test_track();
        let surface = fresh_surface_id();

        track.assign(3, surface).unwrap();
        assert_eq!(track.surface_at(3), Some(surface));
        assert_eq!(track.len(), 1);

        let cleared = track.clear(3).unwrap();
        assert_eq!(cleared, surface);
        assert!(track.is_empty());
        assert_eq!(track.surface_at(3), None);
    }

    #[test]
    fn test_assign_never_overwrites() {
        let mut track = test_track();
        let first = fresh_surface_id();
        let second = fresh_surface_id();

        track.assign(5, first).unwrap();
        let err = track.assign(5, second).unwrap_err();
        assert_eq!(
            err,
            TrackError::FrameOccupied {
                track: TrackId(7),
                frame: 5,
            }
        );
        // The original mapping is untouched.
        assert_eq!(track.surface_at(5), Some(first));
    }

    #[test]
    fn test_clear_empty_frame_fails() {
        let mut track = test_track();
        let err = track.clear(2).unwrap_err();
        assert_eq!(
            err,
            TrackError::FrameEmpty {
                track: TrackId(7),
                frame: 2,
            }
        );
    }

    #[test]
    fn test_frames_iterate_in_order_and_restart() {
        let mut track = test_track();
        for frame in [9, 2, 5] {
            track.assign(frame, fresh_surface_id()).unwrap();
        }
        let first_pass: Vec<Frame> = track.frames().collect();
        assert_eq!(first_pass, vec![2, 5, 9]);
        // Restartable: a second call starts over.
        assert_eq!(track.frames().next(), Some(2));
        assert_eq!(track.first_frame(), Some(2));
        assert_eq!(track.last_frame(), Some(9));
    }

    #[test]
    fn test_reverse_lookup() {
        let mut track = test_track();
        let surface = fresh_surface_id();
        track.assign(4, surface).unwrap();
        assert_eq!(track.frame_of(surface), Some(4));
        assert_eq!(track.frame_of(fresh_surface_id()), None);
    }
}
