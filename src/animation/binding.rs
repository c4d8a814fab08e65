use crate::scene::NodeHandle;

/// Node property an animation track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation, // transform.position
    Rotation,    // transform.rotation
    Scale,       // transform.scale
}

impl TargetPath {
    /// Property name used in track paths.
    #[must_use]
    pub fn property_name(self) -> &'static str {
        match self {
            Self::Translation => "position",
            Self::Rotation => "quaternion",
            Self::Scale => "scale",
        }
    }

    #[must_use]
    pub fn from_property_name(name: &str) -> Option<Self> {
        match name {
            "position" | "translation" => Some(Self::Translation),
            "quaternion" | "rotation" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }
}

/// Maps track `track_index` of a clip onto a node property.
#[derive(Debug, Clone)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_handle: NodeHandle,
    pub target: TargetPath,
}
