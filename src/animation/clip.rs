use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::KeyframeTrack;
use crate::errors::{Result, RetargetError};

/// Which node and property a track animates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

impl TrackMeta {
    #[must_use]
    pub fn new(node_name: &str, target: TargetPath) -> Self {
        Self {
            node_name: node_name.to_string(),
            target,
        }
    }

    /// Track path in `.bones[Name].property` form.
    #[must_use]
    pub fn path(&self) -> String {
        format!(".bones[{}].{}", self.node_name, self.target.property_name())
    }

    /// Parses `.bones[Name].property` or `Name.property`.
    pub fn from_path(path: &str) -> Result<Self> {
        let invalid = || RetargetError::InvalidTrackPath(path.to_string());

        let (node_name, property) = if let Some(rest) = path.strip_prefix(".bones[") {
            let (name, property) = rest.split_once("].").ok_or_else(invalid)?;
            (name, property)
        } else {
            path.rsplit_once('.').ok_or_else(invalid)?
        };

        if node_name.is_empty() {
            return Err(invalid());
        }
        let target = TargetPath::from_property_name(property).ok_or_else(invalid)?;

        Ok(Self::new(node_name, target))
    }
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Vector3(t) => t.len(),
            Self::Quaternion(t) => t.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn times(&self) -> &[f32] {
        match self {
            Self::Vector3(t) => &t.times,
            Self::Quaternion(t) => &t.times,
        }
    }

    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times().last().copied().unwrap_or(0.0)
    }
}

/// A track: metadata plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds.
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Creates a clip whose duration is derived from its longest track.
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            tracks,
        }
    }

    /// Creates a clip with an explicit duration.
    #[must_use]
    pub fn with_duration(name: String, duration: f32, tracks: Vec<Track>) -> Self {
        Self {
            name,
            duration,
            tracks,
        }
    }

    #[must_use]
    pub fn find_track(&self, node_name: &str, target: TargetPath) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.meta.node_name == node_name && t.meta.target == target)
    }
}
