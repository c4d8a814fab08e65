//! Skeletal retargeting.
//!
//! Transfers poses and animation clips from a source skeleton onto a target
//! skeleton whose rest orientations, bone lengths and joint names may differ.
//! See [`retarget`] for the resolvers and [`scene::clone_hierarchy`] for
//! cloning skinned hierarchies.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod errors;
pub mod retarget;
pub mod scene;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
pub use errors::{Result, RetargetError};
pub use retarget::{
    Rig, RetargetClipOptions, RetargetOptions, RetargetV2Options, resolve_pose_legacy,
    resolve_pose_v2, retarget_clip,
};
pub use scene::{Node, NodeHandle, Scene, Skeleton, SkeletonKey, clone_hierarchy};
