//! Skeletal retargeting
//!
//! Transfers poses and clips between joint hierarchies that differ in bone
//! count, naming, bind pose and rest orientation.
//!
//! - [`resolve_pose_v2`]: bind-relative pose transfer (preferred)
//! - [`resolve_pose_legacy`]: world-space rotation matching
//! - [`retarget_clip`]: resamples a source clip into keyframes for the target
//!
//! Joints are paired by name. [`NameMap`] renames target joints to source
//! joints; anything without a counterpart is skipped and keeps its pose.
//! Both skeletons must store joints parent-before-child, which
//! [`Scene::add_skeleton`](crate::scene::Scene::add_skeleton) enforces.

mod clip;
mod legacy;
mod lookup;
pub mod options;
mod pose;
pub mod rig;

pub use clip::retarget_clip;
pub use legacy::resolve_pose_legacy;
pub use lookup::find_bone_by_name;
pub use options::{
    NameMap, OrientationMode, RetargetClipOptions, RetargetOptions, RetargetV2Options,
};
pub use pose::resolve_pose_v2;
pub use rig::Rig;
