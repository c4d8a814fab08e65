//! Hierarchy cloning with skeleton remapping.
//!
//! A plain deep copy of a subtree duplicates joints but leaves every cloned
//! skin bound to the *original* skeleton, whose joints are the original
//! nodes. [`clone_hierarchy`] repairs that: each cloned skinned node gets its
//! own skeleton whose joint list is mapped through the original-to-clone
//! correspondence.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::errors::{Result, RetargetError};
use crate::scene::{Node, NodeHandle, Scene};

/// Clones the subtree at `source` and rebinds cloned skins to cloned joints.
///
/// Returns the handle of the cloned root, which is added as a root node.
pub fn clone_hierarchy(scene: &mut Scene, source: NodeHandle) -> Result<NodeHandle> {
    let cloned = scene
        .clone_subtree(source)
        .ok_or(RetargetError::NodeNotFound(source))?;

    let mut source_lookup: FxHashMap<NodeHandle, NodeHandle> = FxHashMap::default();
    let mut clone_lookup: FxHashMap<NodeHandle, NodeHandle> = FxHashMap::default();

    parallel_traverse(&scene.nodes, source, cloned, &mut |original, copy| {
        source_lookup.insert(copy, original);
        clone_lookup.insert(original, copy);
    });

    for copy in scene.collect_subtree(cloned) {
        if !scene.skins.contains_key(copy) {
            continue;
        }
        let original = source_lookup[&copy];

        let Some(source_binding) = scene.skins.get(original).cloned() else {
            continue;
        };
        let Some(source_skeleton) = scene.skeletons.get(source_binding.skeleton) else {
            continue;
        };

        let mut skeleton = source_skeleton.clone_with_new_id();
        skeleton.bones = source_skeleton
            .bones
            .iter()
            .map(|bone| {
                clone_lookup.get(bone).copied().unwrap_or_else(|| {
                    log::warn!(
                        "Joint {bone:?} of skeleton '{}' lies outside the cloned hierarchy",
                        source_skeleton.name
                    );
                    *bone
                })
            })
            .collect();

        let key = scene.skeletons.insert(skeleton);
        if let Some(binding) = scene.skins.get_mut(copy) {
            binding.rebind(key, source_binding.bind_matrix);
        }
    }

    Ok(cloned)
}

/// Visits `a` and `b` in lock-step, depth first.
///
/// The two trees must have identical shape; anything else is a bug in the
/// caller and panics.
fn parallel_traverse(
    nodes: &SlotMap<NodeHandle, Node>,
    a: NodeHandle,
    b: NodeHandle,
    callback: &mut impl FnMut(NodeHandle, NodeHandle),
) {
    callback(a, b);

    let a_children = nodes[a].children();
    let b_children = nodes[b].children();
    assert_eq!(
        a_children.len(),
        b_children.len(),
        "cloned hierarchy diverged from its source"
    );

    for (&ac, &bc) in a_children.iter().zip(b_children) {
        parallel_traverse(nodes, ac, bc, callback);
    }
}
