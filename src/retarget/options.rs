//! Retargeting configuration
//!
//! Every option struct carries its documented defaults in `Default` and
//! deserializes with `#[serde(default)]`, so a JSON preset only needs the
//! keys it changes:
//!
//! ```rust,ignore
//! let options = RetargetOptions::from_json(r#"{
//!     "hip": "mixamorig:Hips",
//!     "names": { "Pelvis": "mixamorig:Hips", "Spine01": "mixamorig:Spine" },
//!     "preserve_hip_position": true
//! }"#)?;
//! ```

use glam::Affine3A;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Target joint name -> source joint name.
pub type NameMap = FxHashMap<String, String>;

/// Default name of the root (hip) joint.
pub const DEFAULT_ROOT: &str = "hip";

/// Default clip sample rate.
pub const DEFAULT_FPS: f32 = 30.0;

/// Source joint name paired with a target joint name.
///
/// An explicit non-empty rename wins; otherwise the names must match.
#[inline]
#[must_use]
pub fn source_name_for<'a>(names: &'a NameMap, target_name: &'a str) -> &'a str {
    names
        .get(target_name)
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(target_name)
}

/// How the bind-relative resolver transfers joint orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationMode {
    /// Transfer each joint's rotation relative to its own bind pose.
    #[default]
    Relative,
    /// Match each joint's world rotation to the source joint's world rotation.
    Absolute,
}

/// Options for [`resolve_pose_v2`](crate::retarget::resolve_pose_v2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetV2Options {
    /// Source root joint; the only joint that receives translation.
    pub root: String,
    /// Left-multiplied onto the root joint's result.
    pub root_offset: Option<Affine3A>,
    pub names: NameMap,
    pub orientation_mode: OrientationMode,
}

impl Default for RetargetV2Options {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            root_offset: None,
            names: NameMap::default(),
            orientation_mode: OrientationMode::Relative,
        }
    }
}

impl RetargetV2Options {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Options for [`resolve_pose_legacy`](crate::retarget::resolve_pose_legacy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetOptions {
    /// Keep the target placement node's world matrix out of the computation
    /// and restore it afterwards.
    pub preserve_matrix: bool,
    /// Restore every non-hip joint's position after resolving.
    pub preserve_position: bool,
    /// Zero the hip joint's horizontal position, keeping its height.
    pub preserve_hip_position: bool,
    /// Use source world matrices as-is instead of relative to the target
    /// placement node.
    pub use_target_matrix: bool,
    /// Source name of the hip joint.
    pub hip: String,
    pub names: NameMap,
    /// Per source-name correction applied to the target's bind pose.
    pub offsets: Option<FxHashMap<String, Affine3A>>,
}

impl Default for RetargetOptions {
    fn default() -> Self {
        Self {
            preserve_matrix: true,
            preserve_position: true,
            preserve_hip_position: false,
            use_target_matrix: false,
            hip: DEFAULT_ROOT.to_string(),
            names: NameMap::default(),
            offsets: None,
        }
    }
}

impl RetargetOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Options for [`retarget_clip`](crate::retarget::retarget_clip).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetClipOptions {
    /// Shift the hip track so its first sample sits at the origin.
    pub use_first_frame_position: bool,
    /// Samples per second of clip time.
    pub fps: f32,
    /// Pose options applied at every sample.
    pub pose: RetargetOptions,
}

impl Default for RetargetClipOptions {
    fn default() -> Self {
        Self {
            use_first_frame_position: false,
            fps: DEFAULT_FPS,
            pose: RetargetOptions::default(),
        }
    }
}

impl RetargetClipOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
