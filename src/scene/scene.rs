use glam::Affine3A;
use slotmap::{SecondaryMap, SlotMap};

use crate::errors::{Result, RetargetError};
use crate::scene::node::Node;
use crate::scene::skeleton::{SkinBinding, Skeleton};
use crate::scene::transform_system;
use crate::scene::{NodeHandle, SkeletonKey};

/// Scene graph container
///
/// Pure data: node storage, the list of root nodes, and the component maps
/// that retargeting needs (node names, skin bindings, skeletons).
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Components ====
    pub names: SecondaryMap<NodeHandle, String>,
    pub skins: SecondaryMap<NodeHandle, SkinBinding>,

    pub skeletons: SlotMap<SkeletonKey, Skeleton>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Node API
    // ========================================================================

    /// Adds a parentless node.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        child.parent = Some(parent);
        let handle = self.nodes.insert(child);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
        }

        handle
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.add_node(Node::new());
        self.names.insert(handle, name.to_string());
        handle
    }

    /// Adds a named child node.
    pub fn create_child(&mut self, name: &str, node: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.add_to_parent(node, parent);
        self.names.insert(handle, name.to_string());
        handle
    }

    /// Re-parents `child` under `parent`.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(parent) {
            log::error!("Parent node not found during attach!");
            return;
        }

        // 1. Detach from old
        let old_parent = self.nodes.get(child).and_then(|n| n.parent);
        if let Some(p) = old_parent {
            if let Some(n) = self.nodes.get_mut(p)
                && let Some(i) = n.children.iter().position(|&x| x == child)
            {
                n.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }

        // 2. Attach to new
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.names.get(handle).map(String::as_str)
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if self.nodes.contains_key(handle) {
            self.names.insert(handle, name.to_string());
        }
    }

    /// Depth-first search for a node named `name` in the subtree at `root`.
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            if self.get_name(handle) == Some(name) {
                return Some(handle);
            }
            if let Some(node) = self.nodes.get(handle) {
                stack.extend(node.children.iter().rev());
            }
        }
        None
    }

    /// Collects `root` and its descendants in depth-first pre-order.
    #[must_use]
    pub fn collect_subtree(&self, root: NodeHandle) -> Vec<NodeHandle> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            out.push(handle);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Deep-copies the subtree at `root` as a new parentless hierarchy.
    ///
    /// Transforms, names and skin bindings are copied by value, so cloned
    /// skinned nodes still reference the original skeleton. Use
    /// [`clone_hierarchy`](crate::scene::clone_hierarchy) to get a clone
    /// whose skeletons point at the cloned joints.
    pub fn clone_subtree(&mut self, root: NodeHandle) -> Option<NodeHandle> {
        if !self.nodes.contains_key(root) {
            return None;
        }

        let cloned_root = self.copy_node(root, None);
        self.root_nodes.push(cloned_root);
        Some(cloned_root)
    }

    fn copy_node(&mut self, source: NodeHandle, parent: Option<NodeHandle>) -> NodeHandle {
        let mut node = self.nodes[source].clone();
        let children = std::mem::take(&mut node.children);
        node.parent = parent;
        node.transform.mark_dirty();

        let handle = self.nodes.insert(node);
        if let Some(name) = self.names.get(source).cloned() {
            self.names.insert(handle, name);
        }
        if let Some(skin) = self.skins.get(source).cloned() {
            self.skins.insert(handle, skin);
        }

        for child in children {
            let copied = self.copy_node(child, Some(handle));
            self.nodes[handle].children.push(copied);
        }

        handle
    }

    // ========================================================================
    // Skeleton API
    // ========================================================================

    /// Registers a skeleton after checking its bind matrices and joint order.
    pub fn add_skeleton(&mut self, skeleton: Skeleton) -> Result<SkeletonKey> {
        skeleton.validate(&self.nodes)?;
        Ok(self.skeletons.insert(skeleton))
    }

    /// Binds the mesh node to a skeleton using the node's current world matrix.
    pub fn bind_skin(&mut self, mesh: NodeHandle, skeleton: SkeletonKey) -> Result<()> {
        let node = self
            .nodes
            .get(mesh)
            .ok_or(RetargetError::NodeNotFound(mesh))?;
        if !self.skeletons.contains_key(skeleton) {
            return Err(RetargetError::SkeletonNotFound);
        }

        let bind_matrix = node.transform.world_matrix;
        self.skins.insert(mesh, SkinBinding::new(skeleton, bind_matrix));
        Ok(())
    }

    /// Binds with an explicit bind matrix.
    pub fn bind_skin_with_matrix(
        &mut self,
        mesh: NodeHandle,
        skeleton: SkeletonKey,
        bind_matrix: Affine3A,
    ) -> Result<()> {
        if !self.nodes.contains_key(mesh) {
            return Err(RetargetError::NodeNotFound(mesh));
        }
        if !self.skeletons.contains_key(skeleton) {
            return Err(RetargetError::SkeletonNotFound);
        }
        self.skins.insert(mesh, SkinBinding::new(skeleton, bind_matrix));
        Ok(())
    }

    #[must_use]
    pub fn skeleton(&self, key: SkeletonKey) -> Option<&Skeleton> {
        self.skeletons.get(key)
    }

    /// Resets a skeleton to its bind pose.
    pub fn pose_skeleton(&mut self, key: SkeletonKey) -> Result<()> {
        let skeleton = self
            .skeletons
            .get(key)
            .ok_or(RetargetError::SkeletonNotFound)?;
        skeleton.pose(&mut self.nodes);
        Ok(())
    }

    /// Refreshes the world matrices of a skeleton's joints in storage order.
    pub fn update_skeleton_world(&mut self, key: SkeletonKey) -> Result<()> {
        let skeleton = self
            .skeletons
            .get(key)
            .ok_or(RetargetError::SkeletonNotFound)?;
        skeleton.update_world_matrices(&mut self.nodes);
        Ok(())
    }

    // ========================================================================
    // Matrix update pipeline
    // ========================================================================

    /// Updates the world matrices of the whole scene.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy_iterative(&mut self.nodes, &self.root_nodes);
    }

    /// Forces an update of one subtree.
    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, root);
    }
}
