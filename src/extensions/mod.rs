//! Optional extensions to the navigator.

#[cfg(feature = "extension_trajectory_indicator")]
pub mod trajectory_indicator;
