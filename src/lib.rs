// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
// Numeric allowances — geometry code casts and compares floats on purpose
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::suboptimal_flops)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]
#![allow(clippy::missing_const_for_fn)]

//! Mesh ray-interception and cross-frame identity tracking for time-lapse
//! volumetric microscopy.
//!
//! A segmentation tool deforms triangulated surfaces onto cell boundaries
//! in a volumetric image stack; this crate is the engine underneath its
//! interactive picking and tracking: resolving which surface a screen ray
//! strikes, and keeping a consistent identity for each deforming object as
//! it is followed frame by frame.
//!
//! # Key entry points
//!
//! - [`track::manager::TrackManager`] - the process-scoped registry of
//!   tracks and surfaces, and the target of every editing operation
//! - [`geometry::composite::Composite`] - nearest-hit resolution across
//!   many pickable surfaces
//! - [`geometry::intercept::InterceptingSurface`] - one surface with its
//!   acceleration grid
//! - [`command`] - the scripting/console vocabulary
//!
//! # Caller contracts
//!
//! Rendering, image I/O, deformation physics, and the console itself live
//! in the host application. Two contracts bind the host: rays arrive with
//! normalized directions in world coordinates, and any vertex mutation
//! must be followed by a fresh synchronization of the affected
//! acceleration state before the next query — staleness is documented,
//! not detected.

pub mod command;
pub mod config;
pub mod error;
pub mod geometry;
pub mod track;

pub use command::{dispatch, Command, CommandOutput};
pub use config::{GridConfig, RayCastConfig};
pub use error::{GeometryError, TrackError};
pub use geometry::composite::{Composite, Pick};
pub use geometry::intercept::InterceptingSurface;
pub use geometry::ray::{Ray, RayHit};
pub use geometry::raycast::RayCaster;
pub use geometry::surface::{SurfaceId, TriangulatedSurface};
pub use track::manager::{TrackManager, TrackPick, TrackSummary};
pub use track::{Frame, TrackId};
