//! Provides [`NavigationSettings`].

use bevy_math::{cubic_splines::CubicSegment, Vec2};
use bevy_reflect::Reflect;

/// Tunes how the navigation states animate between images.
#[derive(Debug, Clone, Reflect)]
pub struct NavigationSettings {
    /// How much of a transition is completed per second, before easing. A value of `1.5` moves
    /// between two images in two thirds of a second.
    pub animation_speed: f64,
    /// Easing curve applied to the linear transition progress. `None` blends linearly.
    #[reflect(ignore)]
    pub easing: Option<CubicSegment<Vec2>>,
    /// Images further apart than this, in meters, are not blended between. The view cuts to the
    /// next image instead.
    pub max_transition_distance: f64,
    /// Rotation smoothing.
    pub rotation: RotationSettings,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            animation_speed: 1.5,
            easing: Some(CubicSegment::new_bezier((0.74, 0.67), (0.38, 0.96))),
            max_transition_distance: 25.0,
            rotation: Default::default(),
        }
    }
}

impl NavigationSettings {
    /// Map linear transition progress in `[0, 1]` to the blend fraction.
    pub fn ease(&self, progress: f64) -> f64 {
        if progress >= 1.0 {
            return 1.0;
        }
        match &self.easing {
            Some(curve) => (curve.ease(progress as f32) as f64).clamp(0.0, 1.0),
            None => progress.clamp(0.0, 1.0),
        }
    }
}

/// Smoothing of rotation requests while traversing.
#[derive(Debug, Clone, Copy, Reflect)]
pub struct RotationSettings {
    /// Per-update decay of the rotation velocity once requests stop.
    pub acceleration: f64,
    /// How quickly the velocity approaches a larger requested rotation.
    pub increase_alpha: f64,
    /// How quickly the velocity approaches a smaller requested rotation.
    pub decrease_alpha: f64,
    /// Rotation components below this magnitude, in radians, are dropped.
    pub threshold: f64,
    /// Smallest allowed angle, in radians, between the look direction and the up or down
    /// direction.
    pub min_theta: f64,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            acceleration: 0.86,
            increase_alpha: 0.97,
            decrease_alpha: 0.9,
            threshold: 0.001,
            min_theta: 0.1,
        }
    }
}
