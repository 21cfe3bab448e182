//! The navigator driven by a headless app.

mod common;

use std::time::Duration;

use bevy_app::prelude::*;
use bevy_math::Vec3;
use bevy_street_nav::prelude::*;
use bevy_time::{TimePlugin, TimeUpdateStrategy};
use bevy_transform::prelude::*;
use common::*;

fn app() -> App {
    let mut app = App::new();
    app.add_plugins((TimePlugin, NavigationPlugin))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)));
    app
}

#[test]
fn navigator_writes_blended_camera_to_transform() {
    let mut app = app();

    let mut navigator = Navigator::default();
    navigator.set(&[node("a", 0.0)]).unwrap();
    let entity = app.world_mut().spawn((navigator, Transform::default())).id();

    app.update();

    let transform = app.world().get::<Transform>(entity).unwrap();
    assert!(transform.translation.abs_diff_eq(Vec3::ZERO, 1e-3));
    assert!(transform.forward().abs_diff_eq(Vec3::Y, 1e-4));
}

#[test]
fn navigator_traverses_over_frames() {
    let mut app = app();

    let mut navigator = Navigator::default();
    navigator.set(&[node("a", 0.0)]).unwrap();
    navigator.append(&[node("b", 6.0), node("c", 12.0)]).unwrap();
    let entity = app.world_mut().spawn((navigator, Transform::default())).id();

    for _ in 0..40 {
        app.update();
    }

    let navigator = app.world().get::<Navigator>(entity).unwrap();
    assert_eq!(navigator.state.current_index(), 2);
    assert_eq!(navigator.state.alpha(), 1.0);

    let transform = app.world().get::<Transform>(entity).unwrap();
    let expected = navigator.state.current_camera().position.as_vec3();
    assert!(transform.translation.abs_diff_eq(expected, 1e-3));
    assert!(transform.translation.y > 11.0);
}

#[test]
fn waiting_navigator_holds_position() {
    let mut app = app();

    let mut navigator = Navigator::default();
    navigator.set(&[node("a", 0.0)]).unwrap();
    navigator.set(&[node("b", 6.0)]).unwrap();
    navigator.wait();
    navigator.move_by(0.5);
    let entity = app.world_mut().spawn((navigator, Transform::default())).id();

    for _ in 0..10 {
        app.update();
    }

    let navigator = app.world().get::<Navigator>(entity).unwrap();
    assert_eq!(navigator.state.current_index(), 1);
    assert_eq!(navigator.state.alpha(), 0.5);
    let transform = app.world().get::<Transform>(entity).unwrap();
    assert!((transform.translation.y - 3.0).abs() < 0.05, "{transform:?}");
}
