//! World-matching pose resolver.
//!
//! Each paired target joint takes the source joint's world rotation (with
//! scale removed), combined with the target joint's own bind-world matrix so
//! the target keeps its proportions, and the source joint's position. This
//! is more sensitive to differences between rigs than the bind-relative
//! resolver and is kept for existing presets and for clip resampling.

use glam::{Affine3A, Mat3A, Quat, Vec3, Vec3A};
use slotmap::SlotMap;

use crate::errors::{Result, RetargetError};
use crate::retarget::lookup::{JointLookup, joint_name, pair_joints};
use crate::retarget::options::{RetargetOptions, source_name_for};
use crate::retarget::rig::Rig;
use crate::scene::{Node, NodeHandle, Scene, transform_system};

/// Scale components below this are treated as degenerate.
const MIN_SCALE: f32 = 1e-8;

/// Matches target joint world rotations to the source joints.
///
/// When `target` has no placement node (a bare skeleton), the source world
/// matrices are used directly, the placement is not preserved, and the
/// target is not reset to its bind pose first.
///
/// Unpaired target joints keep their local transforms. Target world
/// matrices are current on return.
pub fn resolve_pose_legacy(
    scene: &mut Scene,
    target: &impl Rig,
    source: &impl Rig,
    options: &RetargetOptions,
) -> Result<()> {
    let target_key = target.skeleton_key(scene)?;
    let source_key = source.skeleton_key(scene)?;
    let placement = target.placement();

    let use_target_matrix = options.use_target_matrix || placement.is_none();
    let preserve_matrix = options.preserve_matrix && placement.is_some();

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
    lookup.root(&options.hip)?;

    let target_parents = target_skeleton.joint_parents(nodes);
    let pairs = pair_joints(target_skeleton, names, &lookup, &options.names);

    // Mapped (source-side) name per target joint
    let mapped_names: Vec<&str> = target_skeleton
        .bones
        .iter()
        .map(|&bone| source_name_for(&options.names, joint_name(names, bone)))
        .collect();

    // Source side first: a degenerate joint fails the call before the
    // target is touched.
    source_skeleton.update_world_matrices(nodes);
    let placement_world_inv = placement.filter(|_| !use_target_matrix).map(|p| {
        if preserve_matrix {
            Affine3A::IDENTITY
        } else {
            world_of(nodes, p).inverse()
        }
    });

    let mut sources: Vec<Option<(Quat, Vec3A)>> = vec![None; target_skeleton.bones.len()];
    for pair in &pairs {
        let source_bone = source_skeleton.bones[pair.source];
        let source_world = world_of(nodes, source_bone);
        let relative = match placement_world_inv {
            Some(inv) => inv * source_world,
            None => source_world,
        };
        let rotation = strip_scale(relative, || joint_name(names, source_bone).to_string())?;
        sources[pair.target] = Some((rotation, relative.translation));
    }

    // 1. Reset paired joints to bind pose
    if placement.is_some() {
        for pair in &pairs {
            target_skeleton.pose_joint(pair.target, &target_parents, nodes);
        }
        target_skeleton.update_world_matrices(nodes);
    }

    let saved_positions: Option<Vec<Vec3>> = options.preserve_position.then(|| {
        target_skeleton
            .bones
            .iter()
            .map(|&bone| nodes.get(bone).map_or(Vec3::ZERO, |n| n.transform.position))
            .collect()
    });

    // 2. Take the placement out of the computation
    if preserve_matrix && let Some(root) = placement {
        transform_system::update_subtree(nodes, root);
        nodes[root].transform.set_world_matrix(Affine3A::IDENTITY);
        let children = nodes[root].children().to_vec();
        for child in children {
            transform_system::update_subtree(nodes, child);
        }
    }

    // 3. Offsets redefine the bind pose of paired joints for this call
    let bind_snapshot: Option<Vec<Affine3A>> = options.offsets.as_ref().map(|offsets| {
        target_skeleton
            .bones
            .iter()
            .enumerate()
            .map(|(i, &bone)| {
                if sources[i].is_some()
                    && let Some(offset) = offsets.get(mapped_names[i])
                {
                    let local = nodes[bone].transform.trs_matrix() * *offset;
                    nodes[bone].transform.apply_local_matrix(local);
                    transform_system::update_subtree(nodes, bone);
                }
                nodes[bone].transform.world_matrix
            })
            .collect()
    });

    // 4. Resolve joints parent-before-child
    for (i, &bone) in target_skeleton.bones.iter().enumerate() {
        let Some((rotation, translation)) = sources[i] else {
            continue;
        };

        let mut global = Affine3A::from_quat(rotation);
        if placement.is_some() {
            let bind_world = match &bind_snapshot {
                Some(snapshot) => snapshot[i],
                None => target_skeleton.bind_world(i),
            };
            global = global * bind_world;
        }
        global.translation = translation;

        let mut local = match target_parents[i] {
            Some(parent) => world_of(nodes, target_skeleton.bones[parent]).inverse() * global,
            None => global,
        };

        if options.preserve_hip_position && mapped_names[i] == options.hip {
            local.translation = Vec3A::new(0.0, local.translation.y, 0.0);
        }

        nodes[bone].transform.apply_local_matrix(local);
        transform_system::update_subtree(nodes, bone);
    }

    // 5. Restore positions and placement
    if let Some(saved) = saved_positions {
        for (i, &bone) in target_skeleton.bones.iter().enumerate() {
            if mapped_names[i] == options.hip {
                continue;
            }
            if let Some(node) = nodes.get_mut(bone) {
                node.transform.position = saved[i];
                node.transform.mark_dirty();
            }
        }
    }

    if preserve_matrix && let Some(root) = placement {
        transform_system::update_subtree(nodes, root);
    }
    target_skeleton.update_world_matrices(nodes);

    Ok(())
}

#[inline]
fn world_of(nodes: &SlotMap<NodeHandle, Node>, handle: NodeHandle) -> Affine3A {
    nodes
        .get(handle)
        .map_or(Affine3A::IDENTITY, |n| n.transform.world_matrix)
}

/// Rotation of `relative` with its per-axis scale divided out.
fn strip_scale(relative: Affine3A, joint: impl FnOnce() -> String) -> Result<Quat> {
    let m = relative.matrix3;
    let scale = Vec3::new(m.x_axis.length(), m.y_axis.length(), m.z_axis.length());

    if !scale.is_finite() || scale.min_element() < MIN_SCALE {
        return Err(RetargetError::DegenerateScale {
            joint: joint(),
            scale,
        });
    }

    let unscaled = m * Mat3A::from_diagonal(scale.recip());
    Ok(Quat::from_mat3a(&unscaled).normalize())
}
