//! Transform System
//!
//! World matrix propagation for the scene graph, decoupled from `Scene` so
//! callers can borrow the node storage alone while other component maps
//! (skeletons, names) stay borrowed elsewhere.
//!
//! Retargeting relies on two flavours of update:
//! - full or subtree propagation (parent before child, forced below a change)
//! - single-node refresh from the parent's *cached* world matrix, used while
//!   walking a skeleton's joints in storage order

use glam::Affine3A;
use slotmap::SlotMap;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Updates the world matrices of every hierarchy under `roots`.
///
/// Uses an explicit stack instead of recursion so deep rigs cannot
/// overflow the call stack. A node's world matrix is rebuilt when its
/// local matrix changed or any ancestor's world matrix changed.
pub fn update_hierarchy_iterative(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    // (node, parent world, parent changed)
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root in roots.iter().rev() {
        stack.push((root, Affine3A::IDENTITY, false));
    }

    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_changed = local_changed || parent_changed;

        if world_changed {
            let world = parent_world * node.transform.local_matrix;
            node.transform.world_matrix = world;
        }

        let world = node.transform.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, world, world_changed));
        }
    }
}

/// Forces a world matrix update of `root` and all of its descendants.
///
/// `root`'s parent world matrix is read from the cache, so ancestors are
/// assumed to be up to date.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, root: NodeHandle) {
    let Some(node) = nodes.get(root) else {
        return;
    };
    let parent_world = parent_world_matrix(nodes, node);

    let mut stack: Vec<(NodeHandle, Affine3A)> = vec![(root, parent_world)];

    while let Some((handle, parent_world)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        node.transform.update_local_matrix();
        let world = parent_world * node.transform.local_matrix;
        node.transform.world_matrix = world;

        for &child in node.children.iter().rev() {
            stack.push((child, world));
        }
    }
}

/// Refreshes one node's world matrix from its parent's cached world matrix.
///
/// Descendants are not touched.
pub fn update_node_world(nodes: &mut SlotMap<NodeHandle, Node>, handle: NodeHandle) {
    let Some(node) = nodes.get(handle) else {
        return;
    };
    let parent_world = parent_world_matrix(nodes, node);

    if let Some(node) = nodes.get_mut(handle) {
        node.transform.update_local_matrix();
        let world = parent_world * node.transform.local_matrix;
        node.transform.world_matrix = world;
    }
}

#[inline]
fn parent_world_matrix(nodes: &SlotMap<NodeHandle, Node>, node: &Node) -> Affine3A {
    node.parent
        .and_then(|p| nodes.get(p))
        .map_or(Affine3A::IDENTITY, |p| p.transform.world_matrix)
}
