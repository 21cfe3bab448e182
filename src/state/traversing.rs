//! Provides [`TraversingState`].

use std::{sync::Arc, time::Duration};

use bevy_log::prelude::*;

use super::{NavigationSettings, NavigationState, Rotation, StateBase, StateView, WaitingState};
use crate::{
    error::NavigationError,
    geo::{Camera, LatLonAlt},
    graph::Node,
};

/// Animates the blended camera along the trajectory.
///
/// Each update moves the transition progress forward by
/// [`NavigationSettings::animation_speed`] times the frame time, eases it into `alpha`, and blends
/// the camera between the previous and current node. Once `alpha` reaches 1 and another node is
/// waiting in the trajectory, the state steps to it and the next transition starts from 0.
#[derive(Debug, Clone)]
pub struct TraversingState {
    base: StateBase,
    alpha: f64,
    base_alpha: f64,
    motionless: bool,
    rotation_delta: Rotation,
    requested_rotation_delta: Option<Rotation>,
}

impl TraversingState {
    /// Seed a traversing state from any other state.
    pub fn from_view(view: &(impl StateView + ?Sized)) -> Self {
        let mut base = StateBase::from_view(view);
        base.adjust_cameras();
        let alpha = view.alpha().clamp(0.0, 1.0);
        let motionless = base.motionless_transition();

        Self {
            base,
            alpha,
            base_alpha: alpha,
            motionless,
            rotation_delta: Rotation::ZERO,
            requested_rotation_delta: None,
        }
    }

    /// The rotation applied to the cameras on every update.
    pub fn rotation_delta(&self) -> Rotation {
        self.rotation_delta
    }

    /// Is the current transition a cut rather than a blend?
    pub fn motionless(&self) -> bool {
        self.motionless
    }

    fn reset_transition(&mut self) {
        self.alpha = 0.0;
        self.base_alpha = 0.0;
        self.motionless = self.base.motionless_transition();
    }

    fn update_rotation(&mut self) {
        let settings = self.base.settings().rotation;

        if let Some(requested) = self.requested_rotation_delta.take() {
            let smoothing = if requested.length_squared() > self.rotation_delta.length_squared() {
                settings.increase_alpha
            } else {
                settings.decrease_alpha
            };
            self.rotation_delta = self.rotation_delta.lerp(requested, smoothing);
            return;
        }

        if self.rotation_delta.is_zero() {
            return;
        }
        self.rotation_delta =
            (self.rotation_delta * settings.acceleration).threshold(settings.threshold);
    }

    fn apply_rotation(&mut self) {
        if self.rotation_delta.is_zero() {
            return;
        }
        let delta = self.rotation_delta;
        let min_theta = self.base.settings().rotation.min_theta;
        if let Some((previous, current)) = self.base.previous_and_current_cameras_mut() {
            previous.rotate(delta.phi, delta.theta, min_theta);
            current.rotate(delta.phi, delta.theta, min_theta);
        }
    }
}

impl StateView for TraversingState {
    fn alpha(&self) -> f64 {
        if self.motionless {
            self.alpha.ceil()
        } else {
            self.alpha
        }
    }

    fn camera(&self) -> &Camera {
        self.base.camera()
    }

    fn trajectory(&self) -> &[Arc<Node>] {
        self.base.trajectory()
    }

    fn current_index(&self) -> usize {
        self.base.current_index()
    }

    fn reference(&self) -> Option<LatLonAlt> {
        self.base.reference()
    }

    fn settings(&self) -> &NavigationSettings {
        self.base.settings()
    }
}

impl NavigationState for TraversingState {
    fn base(&self) -> &StateBase {
        &self.base
    }

    fn traverse(&self) -> TraversingState {
        TraversingState::from_view(self)
    }

    fn wait(&self) -> WaitingState {
        WaitingState::from_view(self)
    }

    fn append(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError> {
        let was_empty = self.base.trajectory().is_empty();
        self.base.append(nodes)?;
        if was_empty {
            self.reset_transition();
        }
        Ok(())
    }

    fn remove(&mut self, n: usize) -> Result<(), NavigationError> {
        self.base.remove(n)
    }

    fn cut(&mut self) {
        self.base.cut();
        self.motionless = self.base.motionless_transition();
    }

    fn set(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError> {
        self.base.set(nodes)?;
        self.reset_transition();
        Ok(())
    }

    /// The transition is driven by [`NavigationState::update`] alone, so this does nothing.
    fn move_by(&mut self, delta: f64) {
        trace!("Ignoring move of {delta} while traversing");
    }

    /// Queue a rotation. Only panoramas can be turned while traversing; the rotation is smoothed
    /// and applied over the following updates.
    fn rotate(&mut self, delta: Rotation) {
        if !delta.is_finite() {
            warn!("Ignoring non-finite rotation {delta:?}");
            return;
        }
        if !self.base.current_node().is_some_and(|node| node.pano()) {
            return;
        }
        self.requested_rotation_delta = Some(match self.requested_rotation_delta {
            Some(requested) => requested + delta,
            None => delta,
        });
    }

    fn update(&mut self, delta_time: Duration) {
        if self.alpha >= 1.0 && self.base.advance() {
            self.reset_transition();
        }

        self.update_rotation();
        self.apply_rotation();

        let step = self.base.settings().animation_speed * delta_time.as_secs_f64();
        self.base_alpha = (self.base_alpha + step).min(1.0);
        self.alpha = self.base.settings().ease(self.base_alpha);

        let alpha = self.alpha();
        self.base.blend(alpha);
    }
}
