//! Geometry: surfaces, rays, and interception.
//!
//! The picking path flows [`composite::Composite`] →
//! [`intercept::InterceptingSurface`] → [`raycast::RayCaster`] and returns
//! the nearest [`ray::RayHit`] with the winning
//! [`surface::SurfaceId`].

pub mod aabb;
pub mod composite;
pub mod intercept;
pub mod ray;
pub mod raycast;
pub mod shapes;
pub mod surface;
