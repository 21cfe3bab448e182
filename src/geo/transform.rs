//! Provides [`Transform`], the pose and projection of a single image.

use std::f64::consts::TAU;

use bevy_math::{DMat3, DQuat, DVec2, DVec3};

use super::LatLonAlt;
use crate::graph::Node;

/// Pose and projection parameters of one image, derived from a [`Node`].
///
/// Rotation and translation follow the structure-from-motion convention: `x_cam = R * x_world +
/// t`, with the camera looking down its positive z axis, x pointing right, and y pointing down.
/// The world frame is the ENU frame of the geodetic reference the transform was created with.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    rotation: DMat3,
    translation: DVec3,
    focal: f64,
    orientation: u8,
    pano: bool,
}

impl Transform {
    /// Derive the transform of `node` relative to `reference`. Deterministic and side-effect
    /// free.
    pub fn new(node: &Node, reference: &LatLonAlt) -> Self {
        let rotation = match node.rotation() {
            Some(axis_angle) => DMat3::from_quat(DQuat::from_scaled_axis(axis_angle)),
            None => rotation_from_compass(node.compass_angle()),
        };
        let center = node.lat_lon_alt().to_enu(reference);

        Self {
            rotation,
            translation: -(rotation * center),
            focal: node.focal(),
            orientation: node.orientation(),
            pano: node.pano(),
        }
    }

    /// World to camera rotation.
    pub fn rotation(&self) -> DMat3 {
        self.rotation
    }

    /// World to camera translation.
    pub fn translation(&self) -> DVec3 {
        self.translation
    }

    /// Focal length, normalized by the largest image dimension.
    pub fn focal(&self) -> f64 {
        self.focal
    }

    /// EXIF orientation of the image.
    pub fn orientation(&self) -> u8 {
        self.orientation
    }

    /// Does the image cover a full sphere?
    pub fn pano(&self) -> bool {
        self.pano
    }

    /// The camera center in world space.
    pub fn position(&self) -> DVec3 {
        -(self.rotation.transpose() * self.translation)
    }

    /// The world space direction that appears up in the image as it should be displayed.
    pub fn up_vector(&self) -> DVec3 {
        match self.orientation {
            3 => self.rotation.row(1),
            6 => -self.rotation.row(0),
            8 => self.rotation.row(0),
            _ => -self.rotation.row(1),
        }
    }

    /// Map a point in SfM image coordinates, at `depth` meters along its bearing, to world space.
    pub fn unproject_sfm(&self, sfm: DVec2, depth: f64) -> DVec3 {
        let bearing = self.sfm_to_bearing(sfm);
        self.rotation.transpose() * (bearing * depth - self.translation)
    }

    /// Map a world space point to SfM image coordinates.
    ///
    /// For perspective images the result is mirrored for points behind the camera.
    pub fn project_sfm(&self, point: DVec3) -> DVec2 {
        let v = self.rotation * point + self.translation;

        if self.pano {
            let lon = v.x.atan2(v.z);
            let lat = (-v.y).atan2(v.x.hypot(v.z));
            DVec2::new(lon / TAU, -lat / TAU)
        } else {
            DVec2::new(v.x * self.focal / v.z, v.y * self.focal / v.z)
        }
    }

    fn sfm_to_bearing(&self, sfm: DVec2) -> DVec3 {
        if self.pano {
            let lon = sfm.x * TAU;
            let lat = -sfm.y * TAU;
            DVec3::new(lat.cos() * lon.sin(), -lat.sin(), lat.cos() * lon.cos())
        } else {
            DVec3::new(sfm.x, sfm.y, self.focal).normalize()
        }
    }
}

/// Rotation of a level camera facing `compass_angle` degrees clockwise from north.
fn rotation_from_compass(compass_angle: f64) -> DMat3 {
    let (sin, cos) = compass_angle.to_radians().sin_cos();
    let forward = DVec3::new(sin, cos, 0.0);
    let down = DVec3::NEG_Z;
    let right = down.cross(forward);

    // Rows are the camera axes expressed in world space.
    DMat3::from_cols(right, down, forward).transpose()
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;
    use crate::graph::NodeFill;

    const REFERENCE: LatLonAlt = LatLonAlt {
        lat: 55.6,
        lon: 13.0,
        alt: 0.0,
    };

    fn node(fill: NodeFill) -> Node {
        Node::new("n", REFERENCE).with_fill(fill)
    }

    #[test]
    fn compass_north_looks_along_y() {
        let transform = Transform::new(&node(NodeFill::default()), &REFERENCE);

        assert!(transform.position().abs_diff_eq(DVec3::ZERO, 1e-9));
        let lookat = transform.unproject_sfm(DVec2::ZERO, 10.0);
        assert!(lookat.abs_diff_eq(DVec3::new(0.0, 10.0, 0.0), 1e-9), "{lookat:?}");
        assert!(transform.up_vector().abs_diff_eq(DVec3::Z, 1e-9));
    }

    #[test]
    fn compass_east_looks_along_x() {
        let fill = NodeFill {
            compass_angle: 90.0,
            ..Default::default()
        };
        let transform = Transform::new(&node(fill), &REFERENCE);
        let lookat = transform.unproject_sfm(DVec2::ZERO, 1.0);
        assert!(lookat.abs_diff_eq(DVec3::X, 1e-9), "{lookat:?}");
    }

    #[test]
    fn sfm_rotation_takes_precedence_over_compass() {
        // A world to camera rotation of 90 degrees about x turns the camera from +z to +y.
        let fill = NodeFill {
            compass_angle: 90.0,
            rotation: Some(DVec3::new(FRAC_PI_2, 0.0, 0.0)),
            ..Default::default()
        };
        let transform = Transform::new(&node(fill), &REFERENCE);
        let lookat = transform.unproject_sfm(DVec2::ZERO, 1.0);
        assert!(lookat.abs_diff_eq(DVec3::Y, 1e-9), "{lookat:?}");
    }

    #[test]
    fn position_is_relative_to_reference() {
        let offset = LatLonAlt::new(REFERENCE.lat, REFERENCE.lon, 3.0);
        let node = Node::new("n", offset).with_fill(NodeFill::default());
        let transform = Transform::new(&node, &REFERENCE);
        assert!(transform.position().abs_diff_eq(DVec3::new(0.0, 0.0, 3.0), 1e-6));
    }

    #[test]
    fn rotated_orientations_change_up() {
        let fill = |orientation| NodeFill {
            orientation,
            ..Default::default()
        };
        let up = |orientation| Transform::new(&node(fill(orientation)), &REFERENCE).up_vector();

        assert!(up(1).abs_diff_eq(DVec3::Z, 1e-9));
        assert!(up(3).abs_diff_eq(DVec3::NEG_Z, 1e-9));
        assert!(up(6).abs_diff_eq(DVec3::NEG_X, 1e-9));
        assert!(up(8).abs_diff_eq(DVec3::X, 1e-9));
    }

    #[test]
    fn project_inverts_unproject() {
        for pano in [false, true] {
            let fill = NodeFill {
                compass_angle: 30.0,
                pano,
                ..Default::default()
            };
            let transform = Transform::new(&node(fill), &REFERENCE);
            let sfm = DVec2::new(0.1, -0.05);
            let world = transform.unproject_sfm(sfm, 7.0);
            let projected = transform.project_sfm(world);
            assert!(projected.abs_diff_eq(sfm, 1e-9), "pano: {pano}, {projected:?}");
        }
    }
}
