//! Geodesy and per-image camera math.
//!
//! Everything in here is pure: a [`Transform`] is derived from a [`Node`](crate::graph::Node)
//! and a geodetic reference, and a [`Camera`] is derived from a [`Transform`]. The navigation
//! state owns one of each per trajectory slot.

pub mod camera;
pub mod coords;
pub mod transform;

pub use camera::Camera;
pub use coords::LatLonAlt;
pub use transform::Transform;
