//! Bind-relative pose resolver.
//!
//! Every paired joint receives the source joint's deviation from *its own*
//! bind pose, expressed in the source joint's local frame and composed onto
//! the target joint's bind pose. Differences in rest orientation and bone
//! length between the two rigs cancel out. Only the root joint receives
//! translation; all other joints keep the target's own proportions.

use glam::{Affine3A, Quat};
use slotmap::SlotMap;

use crate::errors::{Result, RetargetError};
use crate::retarget::lookup::{JointLookup, pair_joints};
use crate::retarget::options::{OrientationMode, RetargetV2Options};
use crate::retarget::rig::Rig;
use crate::scene::{Node, NodeHandle, Scene, Skeleton, transform_system};

/// Poses `target` so that each paired joint reproduces the source joint's
/// current pose relative to the source bind pose.
///
/// Unpaired target joints keep their local transforms. Target joint world
/// matrices are current on return.
pub fn resolve_pose_v2(
    scene: &mut Scene,
    target: &impl Rig,
    source: &impl Rig,
    options: &RetargetV2Options,
) -> Result<()> {
    let target_key = target.skeleton_key(scene)?;
    let source_key = source.skeleton_key(scene)?;

    let Scene {
        nodes,
        names,
        skeletons,
        ..
    } = scene;
    let target_skeleton = skeletons
        .get(target_key)
        .ok_or(RetargetError::SkeletonNotFound)?;
    let source_skeleton = skeletons
        .get(source_key)
        .ok_or(RetargetError::SkeletonNotFound)?;

    let lookup = JointLookup::new(source_skeleton, names);
    let source_root = lookup.root(&options.root)?;

    let source_parents = source_skeleton.joint_parents(nodes);
    let target_parents = target_skeleton.joint_parents(nodes);
    let pairs = pair_joints(target_skeleton, names, &lookup, &options.names);

    for pair in &pairs {
        target_skeleton.pose_joint(pair.target, &target_parents, nodes);
    }

    let absolute = options.orientation_mode == OrientationMode::Absolute;
    if absolute {
        source_skeleton.update_world_matrices(nodes);
        target_skeleton.update_world_matrices(nodes);
    }

    for pair in &pairs {
        let delta = bind_delta(source_skeleton, &source_parents, pair.source, nodes);
        let bone = target_skeleton.bones[pair.target];
        let is_root = pair.source == source_root;
        let root_offset = options.root_offset.filter(|_| is_root);

        let world_rotation = if absolute {
            Some(absolute_local_rotation(
                nodes,
                bone,
                source_skeleton.bones[pair.source],
            ))
        } else {
            None
        };

        let Some(node) = nodes.get_mut(bone) else {
            continue;
        };

        let mut result = node.transform.trs_matrix() * delta;
        if let Some(offset) = root_offset {
            result = offset * result;
        }
        let (scale, rotation, position) = result.to_scale_rotation_translation();

        let rotation = match (world_rotation, root_offset) {
            (Some(world), Some(offset)) => offset.to_scale_rotation_translation().1 * world,
            (Some(world), None) => world,
            (None, _) => rotation,
        };

        if is_root {
            node.transform.position = position;
            node.transform.scale = scale;
        }
        node.transform.rotation = rotation;
        node.transform.mark_dirty();

        if absolute {
            transform_system::update_node_world(nodes, bone);
        }
    }

    target_skeleton.update_world_matrices(nodes);
    Ok(())
}

/// Source joint `index`'s current local transform relative to its bind local.
fn bind_delta(
    skeleton: &Skeleton,
    parents: &[Option<usize>],
    index: usize,
    nodes: &SlotMap<NodeHandle, Node>,
) -> Affine3A {
    let bind_world = skeleton.bind_world(index);
    let parent_bind_world_inv = parents[index]
        .map_or(Affine3A::IDENTITY, |p| skeleton.inverse_bind_matrices[p]);
    let bind_local = parent_bind_world_inv * bind_world;

    let current_local = nodes
        .get(skeleton.bones[index])
        .map_or(bind_local, |n| n.transform.trs_matrix());

    bind_local.inverse() * current_local
}

/// Local rotation that gives `target` the world rotation of `source`.
fn absolute_local_rotation(
    nodes: &SlotMap<NodeHandle, Node>,
    target: NodeHandle,
    source: NodeHandle,
) -> Quat {
    let source_world = nodes
        .get(source)
        .map_or(Quat::IDENTITY, |n| n.transform.world_matrix.to_scale_rotation_translation().1);
    let parent_world = nodes
        .get(target)
        .and_then(|n| n.parent)
        .and_then(|p| nodes.get(p))
        .map_or(Quat::IDENTITY, |p| p.transform.world_matrix.to_scale_rotation_translation().1);

    (parent_world.inverse() * source_world).normalize()
}
