//! Provides [`StateBase`], the trajectory bookkeeping shared by every navigation state.

use std::sync::Arc;

use bevy_log::prelude::*;

use super::{NavigationSettings, StateView};
use crate::{
    error::NavigationError,
    geo::{Camera, LatLonAlt, Transform},
    graph::Node,
};

/// The trajectory and its derived per-slot data.
///
/// Holds the ordered nodes, one [`Transform`] and one [`Camera`] per node, the index of the
/// current node, and the blended camera observed by the outside world. The blended camera is a
/// separate value and is never one of the per-slot cameras.
///
/// Concrete states compose a `StateBase` and decide which of its operations they expose and when.
#[derive(Debug, Clone)]
pub struct StateBase {
    camera: Camera,
    current_index: usize,
    trajectory: Vec<Arc<Node>>,
    transforms: Vec<Transform>,
    cameras: Vec<Camera>,
    /// Stands in for the previous camera while the current node is the first one, and for the
    /// current camera while the trajectory is empty.
    fallback_camera: Camera,
    reference: Option<LatLonAlt>,
    settings: NavigationSettings,
}

impl StateBase {
    /// Build a new base from a snapshot of another state.
    ///
    /// The camera is cloned, the trajectory copied, and every transform and camera rebuilt from
    /// the nodes. Nothing is shared with `view` except the nodes themselves.
    pub fn from_view(view: &(impl StateView + ?Sized)) -> Self {
        let trajectory = view.trajectory().to_vec();
        let reference = view
            .reference()
            .or_else(|| trajectory.first().map(|node| node.lat_lon_alt()));
        let (transforms, cameras) = match reference {
            Some(reference) => build_slots(&trajectory, &reference),
            None => (Vec::new(), Vec::new()),
        };

        let current_index = match trajectory.len() {
            0 => 0,
            len if view.current_index() >= len => {
                warn!(
                    "Snapshot index {} is outside a trajectory of {len} nodes",
                    view.current_index()
                );
                len - 1
            }
            _ => view.current_index(),
        };
        let fallback_camera = cameras.get(current_index).cloned().unwrap_or_default();

        Self {
            camera: view.camera().clone(),
            current_index,
            trajectory,
            transforms,
            cameras,
            fallback_camera,
            reference,
            settings: view.settings().clone(),
        }
    }

    /// The blended camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The nodes of the trajectory, oldest first.
    pub fn trajectory(&self) -> &[Arc<Node>] {
        &self.trajectory
    }

    /// The per-slot transforms, parallel to [`StateBase::trajectory`].
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// The per-slot cameras, parallel to [`StateBase::trajectory`].
    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    /// Index of the current node in the trajectory.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The geodetic origin of the world frame, set once the first node arrives.
    pub fn reference(&self) -> Option<LatLonAlt> {
        self.reference
    }

    /// The settings this state was built with.
    pub fn settings(&self) -> &NavigationSettings {
        &self.settings
    }

    /// The node being navigated to, if any.
    pub fn current_node(&self) -> Option<&Arc<Node>> {
        self.trajectory.get(self.current_index)
    }

    /// The node before the current one, if any.
    pub fn previous_node(&self) -> Option<&Arc<Node>> {
        match self.current_index {
            0 => None,
            index => self.trajectory.get(index - 1),
        }
    }

    /// The transform of the current node.
    pub fn current_transform(&self) -> Option<&Transform> {
        self.transforms.get(self.current_index)
    }

    /// The transform of the previous node.
    pub fn previous_transform(&self) -> Option<&Transform> {
        match self.current_index {
            0 => None,
            index => self.transforms.get(index - 1),
        }
    }

    /// The camera of the current node, or a default camera on an empty trajectory.
    pub fn current_camera(&self) -> &Camera {
        self.cameras
            .get(self.current_index)
            .unwrap_or(&self.fallback_camera)
    }

    /// The camera of the previous node, or a copy of the current camera if there is none.
    pub fn previous_camera(&self) -> &Camera {
        match self.current_index {
            0 => &self.fallback_camera,
            index => &self.cameras[index - 1],
        }
    }

    /// Number of nodes after the current node.
    pub fn remaining(&self) -> usize {
        self.trajectory
            .len()
            .saturating_sub(self.current_index + 1)
    }

    /// Replace the trajectory.
    ///
    /// If there is a current node it is kept as the first node, followed by `nodes`, and becomes
    /// the previous node. Otherwise the trajectory becomes `nodes`. All transforms and cameras are
    /// rebuilt. Fails without changing anything if `nodes` is empty or holds an unloaded node.
    pub fn set(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError> {
        validate_nodes(nodes)?;

        let (trajectory, current_index): (Vec<_>, _) = match self.current_node() {
            Some(current) => (
                std::iter::once(current.clone())
                    .chain(nodes.iter().cloned())
                    .collect(),
                1,
            ),
            None => (nodes.to_vec(), 0),
        };
        let reference = *self
            .reference
            .get_or_insert_with(|| trajectory[0].lat_lon_alt());
        let (transforms, cameras) = build_slots(&trajectory, &reference);

        self.trajectory = trajectory;
        self.transforms = transforms;
        self.cameras = cameras;
        self.current_index = current_index;
        self.set_current();

        debug!(
            "Trajectory set to {} nodes, current {:?}",
            self.trajectory.len(),
            self.current_node().map(|node| node.id())
        );
        Ok(())
    }

    /// Extend the end of the trajectory. An empty trajectory is populated as with
    /// [`StateBase::set`].
    pub fn append(&mut self, nodes: &[Arc<Node>]) -> Result<(), NavigationError> {
        validate_nodes(nodes)?;

        let reference = match self.reference {
            Some(reference) if !self.trajectory.is_empty() => reference,
            _ => return self.set(nodes),
        };

        for node in nodes {
            let transform = Transform::new(node, &reference);
            self.cameras.push(Camera::new(&transform));
            self.transforms.push(transform);
            self.trajectory.push(node.clone());
        }

        debug!(
            "Appended {} nodes, trajectory has {}",
            nodes.len(),
            self.trajectory.len()
        );
        Ok(())
    }

    /// Drop `n` nodes from the end of the trajectory. Only nodes after the current node can be
    /// removed.
    pub fn remove(&mut self, n: usize) -> Result<(), NavigationError> {
        let available = self.remaining();
        if n > available {
            return Err(NavigationError::OutOfRange {
                requested: n,
                available,
            });
        }

        let len = self.trajectory.len() - n;
        self.trajectory.truncate(len);
        self.transforms.truncate(len);
        self.cameras.truncate(len);

        debug!("Removed {n} nodes, trajectory has {len}");
        Ok(())
    }

    /// Reduce the trajectory to the current node alone.
    pub fn cut(&mut self) {
        if self.trajectory.is_empty() {
            return;
        }

        let index = self.current_index;
        self.trajectory.drain(..index);
        self.trajectory.truncate(1);
        self.transforms.drain(..index);
        self.transforms.truncate(1);
        self.cameras.drain(..index);
        self.cameras.truncate(1);
        self.current_index = 0;
        self.set_current();

        debug!("Trajectory cut to {:?}", self.current_node().map(|node| node.id()));
    }

    /// Step to the next node. Returns `false` if the current node is the last one.
    pub(crate) fn advance(&mut self) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        self.current_index += 1;
        self.set_current();

        trace!(
            "Advanced to {:?} at index {}",
            self.current_node().map(|node| node.id()),
            self.current_index
        );
        true
    }

    /// Recompute everything derived from the current index.
    pub(crate) fn set_current(&mut self) {
        self.fallback_camera = self
            .cameras
            .get(self.current_index)
            .cloned()
            .unwrap_or_default();
        self.adjust_cameras();
    }

    /// Carry the blended look direction over to the previous camera, and to the current camera if
    /// the current node is a panorama.
    ///
    /// The relative look vector of the blended camera is moved onto the other camera positions,
    /// so the view direction stays continuous when the trajectory steps from one node to the
    /// next instead of snapping back to the direction the previous image was captured in.
    pub(crate) fn adjust_cameras(&mut self) {
        let index = self.current_index;
        if index == 0 || index >= self.trajectory.len() {
            return;
        }

        let lookat = self.camera.relative_lookat();

        let previous = &mut self.cameras[index - 1];
        previous.lookat = previous.position + lookat;

        if self.trajectory[index].pano() {
            let current = &mut self.cameras[index];
            current.lookat = current.position + lookat;
        }
    }

    /// Should the move from the previous to the current node be a cut rather than a blend?
    ///
    /// Only images in the same reconstruction, close to each other, are blended between.
    pub(crate) fn motionless_transition(&self) -> bool {
        let (Some(previous), Some(current)) = (self.previous_node(), self.current_node()) else {
            return false;
        };

        let same_component =
            previous.merged() && current.merged() && previous.merge_cc() == current.merge_cc();
        let distance = self
            .previous_camera()
            .position
            .distance(self.current_camera().position);

        !(same_component && distance < self.settings.max_transition_distance)
    }

    /// Set the blended camera to `alpha` of the way from the previous to the current camera.
    pub(crate) fn blend(&mut self, alpha: f64) {
        let index = self.current_index;
        let Some(current) = self.cameras.get(index) else {
            return;
        };
        let previous = match index {
            0 => &self.fallback_camera,
            _ => &self.cameras[index - 1],
        };
        self.camera.lerp_cameras(previous, current, alpha);
    }

    /// Mutable access to the previous and current cameras, if there is a current node.
    pub(crate) fn previous_and_current_cameras_mut(
        &mut self,
    ) -> Option<(&mut Camera, &mut Camera)> {
        let index = self.current_index;
        if index >= self.cameras.len() {
            return None;
        }
        if index == 0 {
            return Some((&mut self.fallback_camera, &mut self.cameras[0]));
        }
        let (head, tail) = self.cameras.split_at_mut(index);
        Some((&mut head[index - 1], &mut tail[0]))
    }
}

fn validate_nodes(nodes: &[Arc<Node>]) -> Result<(), NavigationError> {
    if nodes.is_empty() {
        return Err(NavigationError::InvalidArgument(
            "trajectory can not be empty".to_owned(),
        ));
    }
    if let Some(node) = nodes.iter().find(|node| !node.loaded()) {
        return Err(NavigationError::InvalidArgument(format!(
            "node {} must be loaded when added to the trajectory",
            node.id()
        )));
    }
    Ok(())
}

fn build_slots(trajectory: &[Arc<Node>], reference: &LatLonAlt) -> (Vec<Transform>, Vec<Camera>) {
    trajectory
        .iter()
        .map(|node| {
            let transform = Transform::new(node, reference);
            let camera = Camera::new(&transform);
            (transform, camera)
        })
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{test_nodes::*, StateSnapshot};

    fn base_with(nodes: &[Arc<Node>]) -> StateBase {
        let mut base = StateBase::from_view(&StateSnapshot::default());
        base.set(nodes).unwrap();
        base
    }

    #[test]
    fn advance_stops_at_last_node() {
        let mut base = base_with(&[loaded("a", 0.0, false), loaded("b", 5.0, false)]);
        assert!(base.advance());
        assert_eq!(base.current_index(), 1);
        assert!(!base.advance());
        assert_eq!(base.current_index(), 1);
        assert_eq!(base.remaining(), 0);
    }

    #[test]
    fn snapshot_index_is_clamped() {
        let snapshot = StateSnapshot {
            current_index: 9,
            trajectory: vec![loaded("a", 0.0, false), loaded("b", 5.0, false)],
            ..Default::default()
        };
        let base = StateBase::from_view(&snapshot);
        assert_eq!(base.current_index(), 1);
        assert_eq!(base.cameras().len(), 2);
        assert_eq!(base.reference(), Some(snapshot.trajectory[0].lat_lon_alt()));
    }

    #[test]
    fn reference_survives_replacing_trajectory() {
        let mut base = base_with(&[loaded("a", 0.0, false)]);
        let reference = base.reference();
        base.cut();
        base.set(&[loaded("b", 50.0, false)]).unwrap();
        assert_eq!(base.reference(), reference);
        let b = base.current_camera().position;
        assert!((b.y - 50.0).abs() < 0.1, "{b:?}");
    }

    #[test]
    fn motionless_rules() {
        let base = base_with(&[loaded("a", 0.0, false)]);
        assert!(!base.motionless_transition());

        let mut near = base.clone();
        near.set(&[loaded("b", 5.0, false)]).unwrap();
        assert!(!near.motionless_transition());

        let mut far = base.clone();
        far.set(&[loaded("b", 30.0, false)]).unwrap();
        assert!(far.motionless_transition());

        let mut unmerged = base.clone();
        let node = Arc::new(unloaded("b", 5.0).with_fill(Default::default()));
        unmerged.set(&[node]).unwrap();
        assert!(unmerged.motionless_transition());
    }

    #[test]
    fn blend_interpolates_slot_cameras() {
        let mut base = base_with(&[loaded("a", 0.0, false)]);
        base.set(&[loaded("b", 8.0, false)]).unwrap();
        base.blend(0.25);
        let y = base.camera().position.y;
        assert!((y - 2.0).abs() < 0.01, "{y}");
    }
}
