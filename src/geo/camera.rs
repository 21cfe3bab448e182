//! Provides [`Camera`], a viewpoint that can be blended between images.

use std::f64::consts::PI;

use bevy_math::{DQuat, DVec2, DVec3};

use super::Transform;

/// Distance in meters along the optical axis used to place the initial look target.
const LOOKAT_DEPTH: f64 = 10.0;

/// A viewpoint defined by a position, a look target, an up direction, and a focal length.
///
/// Cameras are plain values. Cloning one never shares state with the original, which is what lets
/// the navigation state blend into a scratch camera without touching the per-image cameras.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera center in world space.
    pub position: DVec3,
    /// The point the camera is looking at.
    pub lookat: DVec3,
    /// Up direction of the camera.
    pub up: DVec3,
    /// Normalized focal length.
    pub focal: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            lookat: DVec3::Z,
            up: DVec3::NEG_Y,
            focal: 1.0,
        }
    }
}

impl Camera {
    /// Place a camera at the center of `transform`, looking along its optical axis.
    pub fn new(transform: &Transform) -> Self {
        Self {
            position: transform.unproject_sfm(DVec2::ZERO, 0.0),
            lookat: transform.unproject_sfm(DVec2::ZERO, LOOKAT_DEPTH),
            up: transform.up_vector(),
            focal: transform.focal(),
        }
    }

    /// The look target relative to the position.
    pub fn relative_lookat(&self) -> DVec3 {
        self.lookat - self.position
    }

    /// Set `self` to the linear interpolation between `a` and `b`.
    pub fn lerp_cameras(&mut self, a: &Camera, b: &Camera, alpha: f64) {
        self.position = a.position.lerp(b.position, alpha);
        self.lookat = a.lookat.lerp(b.lookat, alpha);
        self.up = a.up.lerp(b.up, alpha);
        self.focal = a.focal * (1.0 - alpha) + b.focal * alpha;
    }

    /// Summed difference of all parameters. Zero when the cameras are equal.
    pub fn diff(&self, other: &Camera) -> f64 {
        self.position.distance(other.position)
            + self.lookat.distance(other.lookat)
            + self.up.distance(other.up)
            + (self.focal - other.focal).abs()
    }

    /// Turn the look target around the position.
    ///
    /// `phi` rotates about the up axis and `theta` changes the polar angle measured from up. The
    /// resulting polar angle is kept within `[min_theta, PI - min_theta]` so the camera never looks
    /// straight up or down.
    pub fn rotate(&mut self, phi: f64, theta: f64, min_theta: f64) {
        let up = self.up.normalize_or_zero();
        if up == DVec3::ZERO {
            return;
        }

        let to_z_up = DQuat::from_rotation_arc(up, DVec3::Z);
        let offset = to_z_up * self.relative_lookat();
        let length = offset.length();
        if length <= f64::EPSILON {
            return;
        }

        let phi = offset.y.atan2(offset.x) + phi;
        let theta =
            (offset.x.hypot(offset.y).atan2(offset.z) + theta).clamp(min_theta, PI - min_theta);

        let direction = DVec3::new(
            theta.sin() * phi.cos(),
            theta.sin() * phi.sin(),
            theta.cos(),
        );
        self.lookat = self.position + to_z_up.inverse() * direction * length;
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn north_camera() -> Camera {
        Camera {
            position: DVec3::new(1.0, 2.0, 3.0),
            lookat: DVec3::new(1.0, 12.0, 3.0),
            up: DVec3::Z,
            focal: 0.8,
        }
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = north_camera();
        let b = Camera {
            position: DVec3::new(3.0, 2.0, 3.0),
            focal: 1.2,
            ..north_camera()
        };
        let mut blended = Camera::default();

        blended.lerp_cameras(&a, &b, 0.0);
        assert!(blended.diff(&a) < 1e-12);
        blended.lerp_cameras(&a, &b, 1.0);
        assert!(blended.diff(&b) < 1e-12);
        blended.lerp_cameras(&a, &b, 0.5);
        assert!(blended.position.abs_diff_eq(DVec3::new(2.0, 2.0, 3.0), 1e-12));
        assert!((blended.focal - 1.0).abs() < 1e-12);
    }

    #[test]
    fn clone_is_independent() {
        let original = north_camera();
        let mut copy = original.clone();
        copy.lookat = DVec3::ZERO;
        assert_eq!(original.lookat, DVec3::new(1.0, 12.0, 3.0));
        assert!(copy.diff(&original) > 0.0);
    }

    #[test]
    fn yaw_keeps_distance_and_height() {
        let mut camera = north_camera();
        camera.rotate(-FRAC_PI_2, 0.0, 0.1);
        let relative = camera.relative_lookat();
        assert!(relative.abs_diff_eq(DVec3::new(10.0, 0.0, 0.0), 1e-9), "{relative:?}");
        assert_eq!(camera.position, north_camera().position);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = north_camera();
        camera.rotate(0.0, -PI, 0.1);
        let relative = camera.relative_lookat().normalize();
        let polar = relative.angle_between(DVec3::Z);
        assert!((polar - 0.1).abs() < 1e-9, "{polar}");
    }
}
