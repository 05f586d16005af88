//! The scripting layer's complete vocabulary.
//!
//! The console/scripting host owns no mesh or track state; it constructs a
//! [`Command`] and passes it to [`dispatch`], which calls into the stable
//! operation set of the track manager. Both enums are serde-serializable so
//! a host can ship them over its own console protocol unchanged.

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::geometry::ray::Ray;
use crate::geometry::surface::SurfaceId;
use crate::track::manager::{TrackManager, TrackPick, TrackSummary};
use crate::track::{Frame, TrackId};

/// One user-issued operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Create a new track owning `surface` at `frame`.
    StartTrack {
        /// Frame of the first observation.
        frame: Frame,
        /// The surface to track; must be registered and unowned.
        surface: SurfaceId,
    },
    /// Move the surface at `frame` from one track to another.
    MoveSurface {
        /// Source track.
        from: TrackId,
        /// Destination track.
        to: TrackId,
        /// Frame being reassigned.
        frame: Frame,
    },
    /// Clear one frame of a track, releasing its surface.
    ClearFrame {
        /// Track to edit.
        track: TrackId,
        /// Frame to clear.
        frame: Frame,
    },
    /// Delete a track and release every surface it held.
    DeleteTrack {
        /// Track to delete.
        track: TrackId,
    },
    /// Pick the track under a ray at a frame.
    PickTrackAt {
        /// Frame context for the pick.
        frame: Frame,
        /// Screen ray from the rendering subsystem.
        ray: Ray,
    },
    /// List every track's extent.
    ListTracks,
}

/// Result of a dispatched [`Command`], for the host to display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommandOutput {
    /// The identifier of a newly started track.
    TrackStarted(TrackId),
    /// A surface was moved between tracks.
    SurfaceMoved,
    /// A frame was cleared; the released surface is now unowned.
    FrameCleared(SurfaceId),
    /// A track was deleted; these surfaces are now unowned.
    TrackDeleted(Vec<SurfaceId>),
    /// Pick result; `None` is a normal miss.
    Picked(Option<PickOutput>),
    /// Extents of every live track.
    Tracks(Vec<TrackSummary>),
}

/// Serializable subset of a [`TrackPick`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickOutput {
    /// Track owning the picked surface.
    pub track: TrackId,
    /// The picked surface.
    pub surface: SurfaceId,
    /// Distance along the ray to the interception.
    pub distance: f64,
}

impl From<TrackPick> for PickOutput {
    fn from(pick: TrackPick) -> Self {
        Self {
            track: pick.track,
            surface: pick.surface,
            distance: pick.hit.distance,
        }
    }
}

/// Execute one command against `manager`.
///
/// # Errors
///
/// Propagates the [`TrackError`] of the underlying operation; geometric
/// misses are a normal [`CommandOutput::Picked`]`(None)`, never an error.
pub fn dispatch(
    manager: &TrackManager,
    command: Command,
) -> Result<CommandOutput, TrackError> {
    match command {
        Command::StartTrack { frame, surface } => manager
            .start_track(frame, surface)
            .map(CommandOutput::TrackStarted),
        Command::MoveSurface { from, to, frame } => manager
            .move_surface(from, to, frame)
            .map(|()| CommandOutput::SurfaceMoved),
        Command::ClearFrame { track, frame } => manager
            .clear_frame(track, frame)
            .map(CommandOutput::FrameCleared),
        Command::DeleteTrack { track } => manager
            .delete_track(track)
            .map(CommandOutput::TrackDeleted),
        Command::PickTrackAt { frame, ray } => Ok(CommandOutput::Picked(
            manager.pick_track_at(frame, &ray).map(PickOutput::from),
        )),
        Command::ListTracks => Ok(CommandOutput::Tracks(manager.summaries())),
    }
}
