//! Trajectory navigation for street-level panoramic image viewers.
//!
//! A viewer shows one geolocated image at a time and moves between images by blending a camera
//! from the previous image to the current one. This crate owns that motion: the ordered
//! trajectory of images, a camera and transform derived per image, and the blend fraction between
//! the previous and current image.
//!
//! Fetching images, rendering them, and capturing input are left to the application. It hands
//! loaded [`Node`](graph::Node)s to the navigator, forwards gestures, and reads back the blended
//! camera every frame.
//!
//! ## Usage
//!
//! Add the [`DefaultNavigationPlugins`] to your app and a [`Navigator`](prelude::Navigator) to
//! your camera entity. The navigator writes the blended camera to the entity's `Transform` every
//! frame.
//!
//! The state machine itself does not depend on the ECS and can be driven directly through
//! [`CurrentState`](state::CurrentState) or the individual states in [`state`].

pub mod controller;
pub mod error;
pub mod extensions;
pub mod geo;
pub mod graph;
pub mod state;

/// Common imports.
pub mod prelude {
    #[cfg(feature = "extension_trajectory_indicator")]
    pub use crate::extensions::trajectory_indicator::{
        TrajectoryIndicator, TrajectoryIndicatorPlugin,
    };
    pub use crate::{
        controller::component::{NavigationPlugin, NavigationSystems, Navigator},
        error::NavigationError,
        geo::LatLonAlt,
        graph::{Node, NodeFill, NodeId},
        state::{
            CurrentState, NavigationSettings, NavigationState, Rotation, RotationSettings,
            StateSnapshot, StateView, TraversingState, WaitingState,
        },
        DefaultNavigationPlugins,
    };
}

use bevy_app::{prelude::*, PluginGroupBuilder};

/// Adds [`NavigationPlugin`](prelude::NavigationPlugin) and every enabled extension.
pub struct DefaultNavigationPlugins;

impl PluginGroup for DefaultNavigationPlugins {
    fn build(self) -> PluginGroupBuilder {
        let group =
            PluginGroupBuilder::start::<Self>().add(controller::component::NavigationPlugin);

        #[cfg(feature = "extension_trajectory_indicator")]
        let group = group.add(extensions::trajectory_indicator::TrajectoryIndicatorPlugin);

        group
    }
}
