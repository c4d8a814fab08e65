//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`RetargetError`] covers:
//! - Rig lookup failures (stale handles, meshes without a skin)
//! - Skeleton construction errors (joint ordering, bind matrix count)
//! - Retargeting failures (missing root joint, degenerate joint scale)
//! - Configuration parsing errors
//!
//! Structural divergence while cloning a hierarchy is not represented here:
//! the clone is produced from the source, so a mismatch is a bug and panics.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, RetargetError>`.
//!
//! ```rust,ignore
//! use rigshift::errors::{RetargetError, Result};
//!
//! fn retarget_frame(scene: &mut Scene) -> Result<()> {
//!     rigshift::retarget::resolve_pose_v2(scene, target, source, &options)?;
//!     Ok(())
//! }
//! ```

use glam::Vec3;
use thiserror::Error;

use crate::scene::NodeHandle;

/// The main error type for retargeting operations.
#[derive(Error, Debug)]
pub enum RetargetError {
    // ========================================================================
    // Rig Lookup Errors
    // ========================================================================
    /// The skeleton key does not refer to a live skeleton.
    #[error("Skeleton not found")]
    SkeletonNotFound,

    /// The node handle does not refer to a live node.
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeHandle),

    /// The node was used as a rig but carries no skin binding.
    #[error("Node {0:?} has no skin binding")]
    NotSkinned(NodeHandle),

    // ========================================================================
    // Skeleton Construction Errors
    // ========================================================================
    /// Joint list and inverse bind matrix list differ in length.
    #[error("Skeleton has {bones} joints but {matrices} inverse bind matrices")]
    BindMatrixCount {
        /// Number of joints
        bones: usize,
        /// Number of inverse bind matrices
        matrices: usize,
    },

    /// A joint is stored before its parent joint.
    #[error("Joint {joint} is stored before its parent joint {parent}")]
    JointOrder {
        /// Index of the offending joint
        joint: usize,
        /// Index of its parent joint
        parent: usize,
    },

    // ========================================================================
    // Retargeting Errors
    // ========================================================================
    /// The designated root (hip) joint does not exist in the source skeleton.
    #[error("Root joint not found in source skeleton: {name}")]
    RootNotFound {
        /// The root joint name that was looked up
        name: String,
    },

    /// A source joint's world matrix has a (near) zero scale component,
    /// so its rotation cannot be isolated.
    #[error("Degenerate joint scale on '{joint}': {scale}")]
    DegenerateScale {
        /// Source joint name
        joint: String,
        /// The extracted scale
        scale: Vec3,
    },

    /// Sample rate for clip resampling is not a positive finite number.
    #[error("Invalid sample rate: {0} fps")]
    InvalidFps(f32),

    /// Track path does not follow the `.bones[Name].property` form.
    #[error("Invalid track path: {0}")]
    InvalidTrackPath(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Options document failed to parse.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Alias for `Result<T, RetargetError>`.
pub type Result<T> = std::result::Result<T, RetargetError>;
