//! A `bevy_street_nav` extension that draws the trajectory of a [`Navigator`] with gizmos: one
//! marker per image, the look direction of each image camera, and the path between them. Useful
//! when debugging loading and navigation.

use bevy_app::prelude::*;
use bevy_color::Color;
use bevy_ecs::prelude::*;
use bevy_gizmos::prelude::*;
use bevy_math::{Isometry3d, Vec3};
use bevy_reflect::prelude::*;

use crate::{controller::component::NavigationSystems, prelude::*};

/// See the [module](self) docs.
pub struct TrajectoryIndicatorPlugin;

impl Plugin for TrajectoryIndicatorPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, draw_trajectory.after(NavigationSystems))
            .register_type::<TrajectoryIndicator>();
    }
}

/// Optional. Configures whether a [`Navigator`] draws its trajectory. The indicator is disabled if
/// this component is not present.
#[derive(Debug, Component, Reflect)]
pub struct TrajectoryIndicator {
    /// Should the trajectory be drawn?
    pub enabled: bool,
    /// Radius of the marker drawn at each image.
    pub marker_radius: f32,
}

impl Default for TrajectoryIndicator {
    fn default() -> Self {
        Self {
            enabled: true,
            marker_radius: 0.3,
        }
    }
}

/// Which part of the trajectory a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Past,
    Previous,
    Current,
    Future,
}

impl Slot {
    fn of(index: usize, current_index: usize) -> Self {
        match index {
            i if i == current_index => Slot::Current,
            i if i + 1 == current_index => Slot::Previous,
            i if i < current_index => Slot::Past,
            _ => Slot::Future,
        }
    }

    fn color(self) -> Color {
        match self {
            Slot::Past => Color::srgb(0.4, 0.4, 0.4),
            Slot::Previous => Color::srgb(1.0, 0.8, 0.2),
            Slot::Current => Color::srgb(0.2, 1.0, 0.4),
            Slot::Future => Color::srgb(1.0, 1.0, 1.0),
        }
    }
}

/// Use gizmos to draw the trajectory of every navigator with an enabled [`TrajectoryIndicator`].
pub fn draw_trajectory(navigators: Query<(&Navigator, &TrajectoryIndicator)>, mut gizmos: Gizmos) {
    for (navigator, indicator) in navigators.iter().filter(|(_, i)| i.enabled) {
        let base = navigator.state.base();
        let current_index = base.current_index();
        let cameras = base.cameras();

        for (index, camera) in cameras.iter().enumerate() {
            let color = Slot::of(index, current_index).color();
            let position = camera.position.as_vec3();
            let direction = camera.relative_lookat().normalize_or_zero().as_vec3();

            gizmos.sphere(
                Isometry3d::from_translation(position),
                indicator.marker_radius,
                color,
            );
            gizmos.ray(position, direction * indicator.marker_radius * 4.0, color);
        }

        for (index, pair) in cameras.windows(2).enumerate() {
            let color = Slot::of(index + 1, current_index).color();
            gizmos.line(pair[0].position.as_vec3(), pair[1].position.as_vec3(), color);
        }

        let blended = navigator.camera();
        let position = blended.position.as_vec3();
        let up: Vec3 = blended.up.normalize_or_zero().as_vec3();
        gizmos.ray(position, up * indicator.marker_radius * 2.0, Color::srgb(0.2, 0.6, 1.0));
    }
}
