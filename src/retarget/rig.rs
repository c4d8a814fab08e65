use crate::errors::{Result, RetargetError};
use crate::scene::{NodeHandle, Scene, SkeletonKey};

/// Anything that exposes an ordered joint list with inverse bind matrices.
///
/// Implemented for:
/// - `SkeletonKey`: a bare skeleton, with no placement node.
/// - `NodeHandle`: a skinned node; forwards to its bound skeleton and
///   acts as the rig's aggregate placement.
pub trait Rig {
    fn skeleton_key(&self, scene: &Scene) -> Result<SkeletonKey>;

    /// Node whose world matrix places the whole rig, if any.
    fn placement(&self) -> Option<NodeHandle> {
        None
    }
}

impl Rig for SkeletonKey {
    fn skeleton_key(&self, scene: &Scene) -> Result<SkeletonKey> {
        if scene.skeletons.contains_key(*self) {
            Ok(*self)
        } else {
            Err(RetargetError::SkeletonNotFound)
        }
    }
}

impl Rig for NodeHandle {
    fn skeleton_key(&self, scene: &Scene) -> Result<SkeletonKey> {
        if !scene.nodes.contains_key(*self) {
            return Err(RetargetError::NodeNotFound(*self));
        }
        let binding = scene
            .skins
            .get(*self)
            .ok_or(RetargetError::NotSkinned(*self))?;
        binding.skeleton.skeleton_key(scene)
    }

    fn placement(&self) -> Option<NodeHandle> {
        Some(*self)
    }
}
