//! Crate-level error types.

use std::fmt;

use crate::geometry::surface::SurfaceId;
use crate::track::{Frame, TrackId};

/// Errors produced when constructing geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// A triangle references a vertex index outside the vertex sequence.
    TriangleOutOfBounds {
        /// Index of the offending triangle.
        triangle: usize,
        /// The out-of-bounds vertex index.
        index: u32,
        /// Number of vertices in the surface.
        vertex_count: usize,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TriangleOutOfBounds {
                triangle,
                index,
                vertex_count,
            } => {
                write!(
                    f,
                    "triangle {triangle} references vertex {index} but the \
                     surface has {vertex_count} vertices"
                )
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Caller-contract violations reported by track operations.
///
/// Every variant is synchronous and recoverable; geometric queries never
/// produce these ("no hit" is a normal result, not an error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackError {
    /// The destination frame already holds a surface; clear it first.
    FrameOccupied {
        /// Track whose frame is occupied.
        track: TrackId,
        /// The occupied frame.
        frame: Frame,
    },
    /// The frame holds no surface to clear.
    FrameEmpty {
        /// Track whose frame is empty.
        track: TrackId,
        /// The empty frame.
        frame: Frame,
    },
    /// The source track has no surface at the frame being moved.
    NothingToMove {
        /// The source track.
        track: TrackId,
        /// The frame with nothing to move.
        frame: Frame,
    },
    /// The surface is already owned by a track; surfaces are
    /// unique-ownership and cannot be shared across tracks.
    SurfaceAlreadyTracked {
        /// The surface that is already tracked.
        surface: SurfaceId,
        /// The track that currently owns it.
        owner: TrackId,
    },
    /// No track exists with the given identifier.
    UnknownTrack {
        /// The unrecognized identifier.
        track: TrackId,
    },
    /// No surface is registered with the given identifier.
    UnknownSurface {
        /// The unrecognized identifier.
        surface: SurfaceId,
    },
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameOccupied { track, frame } => {
                write!(f, "{track} already holds a surface at frame {frame}")
            }
            Self::FrameEmpty { track, frame } => {
                write!(f, "{track} holds no surface at frame {frame}")
            }
            Self::NothingToMove { track, frame } => {
                write!(f, "{track} has nothing to move at frame {frame}")
            }
            Self::SurfaceAlreadyTracked { surface, owner } => {
                write!(f, "{surface} is already tracked by {owner}")
            }
            Self::UnknownTrack { track } => {
                write!(f, "unknown track: {track}")
            }
            Self::UnknownSurface { surface } => {
                write!(f, "unknown surface: {surface}")
            }
        }
    }
}

impl std::error::Error for TrackError {}
