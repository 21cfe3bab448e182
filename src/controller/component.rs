//! The primary [`Component`] of the crate, [`Navigator`].

use std::sync::Arc;

use bevy_app::prelude::*;
use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_time::prelude::*;
use bevy_transform::{prelude::*, TransformSystem};
use bevy_window::RequestRedraw;

use crate::{
    error::NavigationError,
    geo::Camera as NavCamera,
    graph::Node,
    state::{
        CurrentState, NavigationSettings, NavigationState, Rotation, RotationSettings, StateView,
    },
};

/// Adds the systems that advance every [`Navigator`] once per frame.
pub struct NavigationPlugin;

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RequestRedraw>()
            .add_systems(
                PostUpdate,
                Navigator::update_navigators
                    .in_set(NavigationSystems)
                    .before(TransformSystem::TransformPropagate),
            )
            .register_type::<NavigationSettings>()
            .register_type::<RotationSettings>();
    }
}

/// The system set in which navigators are updated and their camera transforms written.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct NavigationSystems;

/// Moves a camera entity along a trajectory of images.
///
/// Every frame the active navigation state is updated with the frame time, and the blended camera
/// is written to the entity's [`Transform`]. The world frame is the east-north-up frame of the
/// navigation reference: x points east, y north, and z up.
///
/// # Driving the navigator
///
/// 1. Once nodes have finished loading, hand them over with [`Navigator::set`] or
///    [`Navigator::append`].
/// 2. Call [`Navigator::traverse`] to animate toward the end of the trajectory, or
///    [`Navigator::wait`] to hold still while the next node loads.
/// 3. Forward gestures with [`Navigator::rotate`] and [`Navigator::move_by`].
#[derive(Debug, Clone, Default, Component)]
pub struct Navigator {
    /// The active navigation state. Exposed to allow inspecting or replacing it directly.
    pub state: CurrentState,
}

impl Navigator {
    /// Create a navigator with an empty trajectory.
    pub fn new(settings: NavigationSettings) -> Self {
        Self {
            state: CurrentState::new(settings),
        }
    }

    /// The blended camera of the active state.
    pub fn camera(&self) -> &NavCamera {
        self.state.camera()
    }

    /// Start animating along the trajectory.
    pub fn traverse(&mut self) {
        debug!("Navigator traversing");
        self.state.start_traversing();
    }

    /// Stop animating and hold the current blend.
    pub fn wait(&mut self) {
        debug!("Navigator waiting");
        self.state.start_waiting();
    }

    /// See [`NavigationState::set`].
    pub fn set(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError> {
        self.state.set(nodes).inspect_err(|error| {
            warn!("Rejected trajectory: {error}");
        })
    }

    /// See [`NavigationState::append`].
    pub fn append(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError> {
        self.state.append(nodes).inspect_err(|error| {
            warn!("Rejected nodes: {error}");
        })
    }

    /// See [`NavigationState::remove`].
    pub fn remove(&mut self, n: usize) -> Result<(), NavigationError> {
        self.state.remove(n).inspect_err(|error| {
            warn!("Rejected removal: {error}");
        })
    }

    /// Drop everything but the current node and hold still there.
    pub fn stop(&mut self) {
        self.state.cut();
        self.wait();
    }

    /// See [`NavigationState::move_by`].
    pub fn move_by(&mut self, delta: f64) {
        self.state.move_by(delta);
    }

    /// See [`NavigationState::rotate`].
    pub fn rotate(&mut self, delta: Rotation) {
        self.state.rotate(delta);
    }

    /// Update all navigators and their transforms. Called once per frame.
    pub fn update_navigators(
        mut navigators: Query<(&mut Navigator, &mut Transform)>,
        mut redraw: EventWriter<RequestRedraw>,
        time: Res<Time>,
    ) {
        for (mut navigator, mut transform) in navigators.iter_mut() {
            let previous = navigator.camera().clone();
            navigator.state.update(time.delta());

            let camera = navigator.camera();
            if camera.diff(&previous) > f64::EPSILON {
                redraw.send(RequestRedraw);
            }
            apply_camera(camera, &mut transform);
        }
    }
}

/// Place `transform` at the camera position, looking at the camera target.
pub fn apply_camera(camera: &NavCamera, transform: &mut Transform) {
    let position = camera.position.as_vec3();
    let target = camera.lookat.as_vec3();
    transform.translation = position;
    if (target - position).length_squared() <= f32::EPSILON {
        warn_once!("Navigation camera has no look direction");
        return;
    }
    transform.look_at(target, camera.up.as_vec3());
}

#[cfg(test)]
mod tests {
    use bevy_math::{DVec3, Vec3};

    use super::*;
    use crate::state::test_nodes::loaded;

    #[test]
    fn camera_is_applied_to_transform() {
        let camera = NavCamera {
            position: DVec3::new(1.0, 2.0, 3.0),
            lookat: DVec3::new(1.0, 12.0, 3.0),
            up: DVec3::Z,
            focal: 1.0,
        };
        let mut transform = Transform::default();
        apply_camera(&camera, &mut transform);

        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert!(transform.forward().abs_diff_eq(Vec3::Y, 1e-6));
        assert!(transform.up().abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn stop_cuts_and_waits() {
        let mut navigator = Navigator::default();
        navigator.set(&[loaded("a", 0.0, false)]).unwrap();
        navigator.set(&[loaded("b", 5.0, false)]).unwrap();
        assert!(navigator.state.is_traversing());

        navigator.stop();
        assert!(navigator.state.is_waiting());
        assert_eq!(navigator.state.trajectory().len(), 1);
        assert_eq!(navigator.state.trajectory()[0].id().0, "b");
    }

    #[test]
    fn rejected_operations_are_reported() {
        let mut navigator = Navigator::default();
        assert!(navigator.set(&[]).is_err());
        assert!(navigator.remove(1).is_err());
        assert!(navigator.state.trajectory().is_empty());
    }
}
