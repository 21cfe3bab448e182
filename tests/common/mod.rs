#![allow(dead_code)]

use std::sync::Arc;

use bevy_street_nav::prelude::*;

pub const ORIGIN: LatLonAlt = LatLonAlt {
    lat: 40.7,
    lon: -74.0,
    alt: 2.0,
};

/// A loaded node `north` meters north of [`ORIGIN`], facing north.
pub fn node(id: &str, north: f64) -> Arc<Node> {
    Arc::new(unloaded(id, north).with_fill(NodeFill {
        merge_cc: Some(7),
        ..Default::default()
    }))
}

/// A loaded panorama `north` meters north of [`ORIGIN`].
pub fn pano(id: &str, north: f64) -> Arc<Node> {
    Arc::new(unloaded(id, north).with_fill(NodeFill {
        pano: true,
        merge_cc: Some(7),
        ..Default::default()
    }))
}

pub fn unloaded(id: &str, north: f64) -> Node {
    Node::new(
        id,
        LatLonAlt::new(ORIGIN.lat + north / 111_000.0, ORIGIN.lon, ORIGIN.alt),
    )
}

pub fn ids(state: &impl StateView) -> Vec<String> {
    state
        .trajectory()
        .iter()
        .map(|node| node.id().to_string())
        .collect()
}

/// Check the invariants every state must uphold after a successful operation.
pub fn assert_consistent(state: &impl NavigationState) {
    let len = state.trajectory().len();
    assert_eq!(state.base().transforms().len(), len);
    assert_eq!(state.base().cameras().len(), len);
    if len > 0 {
        assert!(state.current_index() < len);
    }
    assert_eq!(state.previous_node().is_none(), state.current_index() == 0);
    assert_eq!(
        state.previous_transform().is_none(),
        state.current_index() == 0
    );
    assert!((0.0..=1.0).contains(&state.alpha()));
}
