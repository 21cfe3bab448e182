use std::fmt;

use bevy_math::DVec3;

use crate::geo::LatLonAlt;

/// Unique identifier of an image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The detailed properties of an image, fetched after its position is known.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFill {
    /// Compass angle of the camera in degrees, clockwise from north.
    pub compass_angle: f64,
    /// Axis-angle world to camera rotation from the reconstruction, if the image has been
    /// reconstructed.
    pub rotation: Option<DVec3>,
    /// Focal length normalized by the largest image dimension.
    pub focal: f64,
    /// EXIF orientation.
    pub orientation: u8,
    /// Is this a full spherical panorama?
    pub pano: bool,
    /// The connected component of the reconstruction this image was merged into.
    pub merge_cc: Option<u64>,
}

impl Default for NodeFill {
    fn default() -> Self {
        Self {
            compass_angle: 0.0,
            rotation: None,
            focal: 0.85,
            orientation: 1,
            pano: false,
            merge_cc: None,
        }
    }
}

/// One geolocated image in the navigation graph.
///
/// A node starts out with only its identity and position. It is considered loaded once its
/// [`NodeFill`] has been attached with [`Node::with_fill`], and only loaded nodes may enter a
/// trajectory. Nodes are shared through `Arc` and never modified after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    lat_lon_alt: LatLonAlt,
    fill: Option<NodeFill>,
}

impl Node {
    /// Create an unloaded node.
    pub fn new(id: impl Into<NodeId>, lat_lon_alt: LatLonAlt) -> Self {
        Self {
            id: id.into(),
            lat_lon_alt,
            fill: None,
        }
    }

    /// Attach the fill data, marking the node as loaded.
    #[must_use = "with_fill returns the loaded node"]
    pub fn with_fill(self, fill: NodeFill) -> Self {
        Self {
            fill: Some(fill),
            ..self
        }
    }

    /// The unique image key.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Where the image was taken.
    pub fn lat_lon_alt(&self) -> LatLonAlt {
        self.lat_lon_alt
    }

    /// Has the fill data arrived?
    pub fn loaded(&self) -> bool {
        self.fill.is_some()
    }

    /// The fill data, if loaded.
    pub fn fill(&self) -> Option<&NodeFill> {
        self.fill.as_ref()
    }

    /// Compass heading in degrees, clockwise from north.
    pub fn compass_angle(&self) -> f64 {
        self.fill.as_ref().map_or(0.0, |fill| fill.compass_angle)
    }

    /// The reconstructed axis-angle rotation, if the image has one.
    pub fn rotation(&self) -> Option<DVec3> {
        self.fill.as_ref().and_then(|fill| fill.rotation)
    }

    /// Focal length, normalized by the larger image dimension.
    pub fn focal(&self) -> f64 {
        self.fill
            .as_ref()
            .map_or_else(|| NodeFill::default().focal, |fill| fill.focal)
    }

    /// EXIF orientation tag.
    pub fn orientation(&self) -> u8 {
        self.fill.as_ref().map_or(1, |fill| fill.orientation)
    }

    /// Is this a full spherical panorama?
    pub fn pano(&self) -> bool {
        self.fill.as_ref().is_some_and(|fill| fill.pano)
    }

    /// The reconstruction component the image belongs to.
    pub fn merge_cc(&self) -> Option<u64> {
        self.fill.as_ref().and_then(|fill| fill.merge_cc)
    }

    /// Has the image been merged into a reconstruction?
    pub fn merged(&self) -> bool {
        self.merge_cc().is_some()
    }
}
