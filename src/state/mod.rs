//! The navigation state machine.
//!
//! A navigation state owns a trajectory of [`Node`]s, one [`Transform`] and one [`Camera`] per
//! node, the index of the current node, and a blended [`Camera`] that sits `alpha` of the way
//! between the previous and the current node. Two states implement [`NavigationState`]:
//!
//! - [`TraversingState`] animates `alpha` from 0 to 1 and steps to the next node whenever a
//!   transition completes.
//! - [`WaitingState`] holds `alpha` still. It is used while the next node is loading, and lets
//!   the user scrub the blend with [`NavigationState::move_by`].
//!
//! Switching state never changes a state in place: [`NavigationState::traverse`] and
//! [`NavigationState::wait`] build a new state from a snapshot of the current one, and the caller
//! drops the old one. [`CurrentState`] wraps whichever state is active.
//!
//! All operations are synchronous and must be called from a single driver in frame order.
//! Mutating operations take `&mut self`, so calling one from inside another, for example
//! appending from within [`NavigationState::update`], is not possible.

use std::{sync::Arc, time::Duration};

use crate::{
    error::NavigationError,
    geo::{Camera, LatLonAlt, Transform},
    graph::Node,
};

pub mod base;
pub mod settings;
pub mod traversing;
pub mod waiting;

pub use base::StateBase;
pub use settings::{NavigationSettings, RotationSettings};
pub use traversing::TraversingState;
pub use waiting::WaitingState;

/// A change of look direction, in radians.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rotation {
    /// Rotation about the camera up axis.
    pub phi: f64,
    /// Change of the polar angle, measured from the up axis.
    pub theta: f64,
}

impl Rotation {
    /// No rotation.
    pub const ZERO: Self = Self {
        phi: 0.0,
        theta: 0.0,
    };

    pub fn new(phi: f64, theta: f64) -> Self {
        Self { phi, theta }
    }

    pub fn is_zero(&self) -> bool {
        self.phi == 0.0 && self.theta == 0.0
    }

    /// Are both angles finite?
    pub fn is_finite(&self) -> bool {
        self.phi.is_finite() && self.theta.is_finite()
    }

    pub fn length_squared(&self) -> f64 {
        self.phi * self.phi + self.theta * self.theta
    }

    /// Move `alpha` of the way toward `target`.
    pub fn lerp(self, target: Self, alpha: f64) -> Self {
        Self {
            phi: self.phi + (target.phi - self.phi) * alpha,
            theta: self.theta + (target.theta - self.theta) * alpha,
        }
    }

    /// Zero out components whose magnitude is below `threshold`.
    pub fn threshold(self, threshold: f64) -> Self {
        let cut = |value: f64| if value.abs() < threshold { 0.0 } else { value };
        Self {
            phi: cut(self.phi),
            theta: cut(self.theta),
        }
    }
}

impl std::ops::Add for Rotation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            phi: self.phi + rhs.phi,
            theta: self.theta + rhs.theta,
        }
    }
}

impl std::ops::Mul<f64> for Rotation {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            phi: self.phi * rhs,
            theta: self.theta * rhs,
        }
    }
}

/// Read-only view of a navigation state. New states are built from any `StateView`.
pub trait StateView {
    /// Blend fraction between the previous and the current camera, in `[0, 1]`.
    fn alpha(&self) -> f64;
    /// The blended camera.
    fn camera(&self) -> &Camera;
    fn trajectory(&self) -> &[Arc<Node>];
    fn current_index(&self) -> usize;
    /// Geodetic origin of the world frame, if known.
    fn reference(&self) -> Option<LatLonAlt>;
    fn settings(&self) -> &NavigationSettings;
}

/// A plain owned snapshot, used to seed the first state.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub alpha: f64,
    pub camera: Camera,
    pub current_index: usize,
    pub trajectory: Vec<Arc<Node>>,
    pub reference: Option<LatLonAlt>,
    pub settings: NavigationSettings,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            camera: Camera::default(),
            current_index: 0,
            trajectory: Vec::new(),
            reference: None,
            settings: NavigationSettings::default(),
        }
    }
}

impl StateSnapshot {
    /// An empty snapshot with the given settings.
    pub fn new(settings: NavigationSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Copy the public view of any state.
    pub fn of(view: &(impl StateView + ?Sized)) -> Self {
        Self {
            alpha: view.alpha(),
            camera: view.camera().clone(),
            current_index: view.current_index(),
            trajectory: view.trajectory().to_vec(),
            reference: view.reference(),
            settings: view.settings().clone(),
        }
    }
}

impl StateView for StateSnapshot {
    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn trajectory(&self) -> &[Arc<Node>] {
        &self.trajectory
    }

    fn current_index(&self) -> usize {
        self.current_index
    }

    fn reference(&self) -> Option<LatLonAlt> {
        self.reference
    }

    fn settings(&self) -> &NavigationSettings {
        &self.settings
    }
}

/// The operations every navigation state supports.
pub trait NavigationState: StateView {
    /// The shared trajectory bookkeeping.
    fn base(&self) -> &StateBase;

    fn current_node(&self) -> Option<&Arc<Node>> {
        self.base().current_node()
    }

    /// The node before the current one. `None` exactly when the current index is 0.
    fn previous_node(&self) -> Option<&Arc<Node>> {
        self.base().previous_node()
    }

    fn current_transform(&self) -> Option<&Transform> {
        self.base().current_transform()
    }

    fn previous_transform(&self) -> Option<&Transform> {
        self.base().previous_transform()
    }

    fn current_camera(&self) -> &Camera {
        self.base().current_camera()
    }

    /// The previous node's camera, or a copy of the current camera if there is no previous node.
    fn previous_camera(&self) -> &Camera {
        self.base().previous_camera()
    }

    /// A new [`TraversingState`] seeded from this state.
    fn traverse(&self) -> TraversingState;

    /// A new [`WaitingState`] seeded from this state.
    fn wait(&self) -> WaitingState;

    /// Add loaded nodes to the end of the trajectory.
    fn append(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError>;

    /// Drop `n` nodes from the end of the trajectory, never reaching the current node.
    fn remove(&mut self, n: usize) -> Result<(), NavigationError>;

    /// Reduce the trajectory to the current node.
    fn cut(&mut self);

    /// Replace the trajectory, keeping the current node, if any, as the previous node.
    fn set(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError>;

    /// Shift the blend by `delta`.
    fn move_by(&mut self, delta: f64);

    /// Turn the view without changing the position in the trajectory.
    fn rotate(&mut self, delta: Rotation);

    /// Advance one frame.
    fn update(&mut self, delta_time: Duration);
}

/// The active navigation state.
#[derive(Debug, Clone)]
pub enum CurrentState {
    /// Animating toward the end of the trajectory.
    Traversing(TraversingState),
    /// Holding the blend still.
    Waiting(WaitingState),
}

impl Default for CurrentState {
    fn default() -> Self {
        Self::new(NavigationSettings::default())
    }
}

impl CurrentState {
    /// An empty traversing state.
    pub fn new(settings: NavigationSettings) -> Self {
        Self::Traversing(TraversingState::from_view(&StateSnapshot::new(settings)))
    }

    pub fn is_traversing(&self) -> bool {
        matches!(self, Self::Traversing(_))
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Waiting(_))
    }

    /// Replace the active state with a [`TraversingState`] seeded from it.
    pub fn start_traversing(&mut self) {
        *self = Self::Traversing(self.traverse());
    }

    /// Replace the active state with a [`WaitingState`] seeded from it.
    pub fn start_waiting(&mut self) {
        *self = Self::Waiting(self.wait());
    }

    fn state(&self) -> &dyn NavigationState {
        match self {
            Self::Traversing(state) => state,
            Self::Waiting(state) => state,
        }
    }

    fn state_mut(&mut self) -> &mut dyn NavigationState {
        match self {
            Self::Traversing(state) => state,
            Self::Waiting(state) => state,
        }
    }
}

impl StateView for CurrentState {
    fn alpha(&self) -> f64 {
        self.state().alpha()
    }

    fn camera(&self) -> &Camera {
        self.state().camera()
    }

    fn trajectory(&self) -> &[Arc<Node>] {
        self.state().trajectory()
    }

    fn current_index(&self) -> usize {
        self.state().current_index()
    }

    fn reference(&self) -> Option<LatLonAlt> {
        self.state().reference()
    }

    fn settings(&self) -> &NavigationSettings {
        self.state().settings()
    }
}

impl NavigationState for CurrentState {
    fn base(&self) -> &StateBase {
        self.state().base()
    }

    fn traverse(&self) -> TraversingState {
        self.state().traverse()
    }

    fn wait(&self) -> WaitingState {
        self.state().wait()
    }

    fn append(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError> {
        self.state_mut().append(nodes)
    }

    fn remove(&mut self, n: usize) -> Result<(), NavigationError> {
        self.state_mut().remove(n)
    }

    fn cut(&mut self) {
        self.state_mut().cut()
    }

    fn set(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError> {
        self.state_mut().set(nodes)
    }

    fn move_by(&mut self, delta: f64) {
        self.state_mut().move_by(delta)
    }

    fn rotate(&mut self, delta: Rotation) {
        self.state_mut().rotate(delta)
    }

    fn update(&mut self, delta_time: Duration) {
        self.state_mut().update(delta_time)
    }
}

#[cfg(test)]
pub(crate) mod test_nodes {
    //! Node fixtures shared by the state tests.

    use std::sync::Arc;

    use crate::{
        geo::LatLonAlt,
        graph::{Node, NodeFill},
    };

    pub const ORIGIN: LatLonAlt = LatLonAlt {
        lat: 55.6,
        lon: 13.0,
        alt: 0.0,
    };

    /// A loaded node `north` meters north of [`ORIGIN`], in merge component 1.
    pub fn loaded(id: &str, north: f64, pano: bool) -> Arc<Node> {
        Arc::new(unloaded(id, north).with_fill(NodeFill {
            pano,
            merge_cc: Some(1),
            ..Default::default()
        }))
    }

    pub fn unloaded(id: &str, north: f64) -> Node {
        // Roughly 1.11 meters per 1e-5 degrees of latitude.
        let lat = ORIGIN.lat + north / 111_320.0;
        Node::new(id, LatLonAlt::new(lat, ORIGIN.lon, ORIGIN.alt))
    }

    pub fn ids(trajectory: &[Arc<Node>]) -> Vec<&str> {
        trajectory.iter().map(|node| node.id().0.as_str()).collect()
    }
}
