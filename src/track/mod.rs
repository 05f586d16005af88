//! Cross-frame identity tracking.
//!
//! A [`track::Track`] is the persistent identity of one deforming object
//! across the time-lapse; the [`manager::TrackManager`] enforces the global
//! invariant that a surface belongs to at most one track at a time.

pub mod color;
pub mod manager;
pub mod track;

/// One time-step / volume index in the time-lapse dataset.
pub type Frame = u32;

pub use track::TrackId;
