//! Provides [`WaitingState`].

use std::{sync::Arc, time::Duration};

use bevy_log::prelude::*;

use super::{NavigationSettings, NavigationState, Rotation, StateBase, StateView, TraversingState};
use crate::{
    error::NavigationError,
    geo::{Camera, LatLonAlt},
    graph::Node,
};

/// Holds the blend still while the next node loads.
///
/// `alpha` is inherited from the state this one was created from and only changes through
/// [`NavigationState::move_by`] or [`NavigationState::set`]. Updates keep the blended camera in
/// sync with the previous and current cameras without animating anything.
#[derive(Debug, Clone)]
pub struct WaitingState {
    base: StateBase,
    alpha: f64,
    motionless: bool,
}

impl WaitingState {
    /// Seed a waiting state from any other state.
    pub fn from_view(view: &(impl StateView + ?Sized)) -> Self {
        let mut base = StateBase::from_view(view);
        base.adjust_cameras();
        let motionless = base.motionless_transition();

        Self {
            base,
            alpha: view.alpha().clamp(0.0, 1.0),
            motionless,
        }
    }

    fn rest_on_current(&mut self) {
        self.alpha = 1.0;
        self.motionless = self.base.motionless_transition();
        self.base.blend(1.0);
    }
}

impl StateView for WaitingState {
    fn alpha(&self) -> f64 {
        if self.motionless {
            self.alpha.round()
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

impl NavigationState for WaitingState {
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
            self.rest_on_current();
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

    /// Replace the trajectory and rest the camera on the new current node.
    fn set(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError> {
        self.base.set(nodes)?;
        self.rest_on_current();
        Ok(())
    }

    /// Scrub the blend by `delta`, staying within `[0, 1]`. Non-finite deltas are ignored.
    fn move_by(&mut self, delta: f64) {
        if !delta.is_finite() {
            warn!("Ignoring non-finite move of {delta}");
            return;
        }
        self.alpha = (self.alpha + delta).clamp(0.0, 1.0);
    }

    /// Turn the previous, current, and blended cameras right away.
    fn rotate(&mut self, delta: Rotation) {
        if !delta.is_finite() {
            warn!("Ignoring non-finite rotation {delta:?}");
            return;
        }
        let min_theta = self.base.settings().rotation.min_theta;
        let Some((previous, current)) = self.base.previous_and_current_cameras_mut() else {
            return;
        };
        previous.rotate(delta.phi, delta.theta, min_theta);
        current.rotate(delta.phi, delta.theta, min_theta);

        let alpha = self.alpha();
        self.base.blend(alpha);
    }

    fn update(&mut self, _delta_time: Duration) {
        let alpha = self.alpha();
        self.base.blend(alpha);
    }
}
