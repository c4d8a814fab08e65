use glam::Affine3A;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use uuid::Uuid;

use crate::errors::{Result, RetargetError};
use crate::scene::{Node, NodeHandle, SkeletonKey, transform_system};

/// Skin component: ties a mesh node to a skeleton.
#[derive(Debug, Clone)]
pub struct SkinBinding {
    pub skeleton: SkeletonKey,
    /// Mesh world matrix at bind time.
    pub bind_matrix: Affine3A,
}

impl SkinBinding {
    #[must_use]
    pub fn new(skeleton: SkeletonKey, bind_matrix: Affine3A) -> Self {
        Self {
            skeleton,
            bind_matrix,
        }
    }

    /// Points the binding at another skeleton.
    pub fn rebind(&mut self, skeleton: SkeletonKey, bind_matrix: Affine3A) {
        self.skeleton = skeleton;
        self.bind_matrix = bind_matrix;
    }
}

/// An ordered joint list plus one inverse bind matrix per joint.
///
/// # Invariants
///
/// - `inverse_bind_matrices[i]` is the inverse of joint `i`'s world matrix
///   in the bind pose, so the bind pose can always be recovered from it.
/// - Joints are stored parent-before-child. Both retargeting resolvers walk
///   the joint list once and expect ancestors to be resolved first.
///   [`Scene::add_skeleton`](crate::scene::Scene::add_skeleton) rejects
///   skeletons that break either rule.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    pub bones: Vec<NodeHandle>,

    pub(crate) inverse_bind_matrices: Vec<Affine3A>,
}

impl Skeleton {
    #[must_use]
    pub fn new(
        name: &str,
        bones: Vec<NodeHandle>,
        inverse_bind_matrices: Vec<Affine3A>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
        }
    }

    /// Builds a skeleton whose bind pose is the joints' current world pose.
    ///
    /// World matrices must be up to date.
    #[must_use]
    pub fn from_current_pose(
        name: &str,
        bones: Vec<NodeHandle>,
        nodes: &SlotMap<NodeHandle, Node>,
    ) -> Self {
        let mut skeleton = Self::new(name, bones, Vec::new());
        skeleton.calculate_inverses(nodes);
        skeleton
    }

    /// Re-derives every inverse bind matrix from the joints' world matrices.
    pub fn calculate_inverses(&mut self, nodes: &SlotMap<NodeHandle, Node>) {
        self.inverse_bind_matrices = self
            .bones
            .iter()
            .map(|&bone| {
                nodes
                    .get(bone)
                    .map_or(Affine3A::IDENTITY, |n| n.transform.world_matrix.inverse())
            })
            .collect();
    }

    /// Copy of this skeleton with a fresh id. Joint handles are shared
    /// until the caller remaps them.
    #[must_use]
    pub fn clone_with_new_id(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }

    #[inline]
    #[must_use]
    pub fn inverse_bind_matrices(&self) -> &[Affine3A] {
        &self.inverse_bind_matrices
    }

    /// Bind-pose world matrix of joint `index`.
    #[inline]
    #[must_use]
    pub fn bind_world(&self, index: usize) -> Affine3A {
        self.inverse_bind_matrices[index].inverse()
    }

    /// For each joint, the index of its parent joint when the parent
    /// node belongs to this skeleton.
    #[must_use]
    pub fn joint_parents(&self, nodes: &SlotMap<NodeHandle, Node>) -> Vec<Option<usize>> {
        let index: FxHashMap<NodeHandle, usize> = self
            .bones
            .iter()
            .enumerate()
            .map(|(i, &b)| (b, i))
            .collect();

        self.bones
            .iter()
            .map(|&bone| {
                nodes
                    .get(bone)
                    .and_then(|n| n.parent)
                    .and_then(|p| index.get(&p).copied())
            })
            .collect()
    }

    /// Checks the bind matrix count and the parent-before-child ordering.
    pub fn validate(&self, nodes: &SlotMap<NodeHandle, Node>) -> Result<()> {
        if self.bones.len() != self.inverse_bind_matrices.len() {
            return Err(RetargetError::BindMatrixCount {
                bones: self.bones.len(),
                matrices: self.inverse_bind_matrices.len(),
            });
        }

        for (joint, parent) in self.joint_parents(nodes).into_iter().enumerate() {
            if let Some(parent) = parent
                && parent > joint
            {
                return Err(RetargetError::JointOrder { joint, parent });
            }
        }

        Ok(())
    }

    /// Resets every joint to the bind pose and refreshes their world matrices.
    pub fn pose(&self, nodes: &mut SlotMap<NodeHandle, Node>) {
        let parents = self.joint_parents(nodes);
        for index in 0..self.bones.len() {
            self.pose_joint(index, &parents, nodes);
        }
        self.update_world_matrices(nodes);
    }

    /// Writes the bind-pose local transform of joint `index`.
    ///
    /// The local transform depends only on inverse bind matrices, never on
    /// the current pose of other joints. World matrices are not refreshed.
    pub fn pose_joint(
        &self,
        index: usize,
        parents: &[Option<usize>],
        nodes: &mut SlotMap<NodeHandle, Node>,
    ) {
        let bind_world = self.bind_world(index);
        let local = match parents[index] {
            Some(parent) => self.inverse_bind_matrices[parent] * bind_world,
            None => bind_world,
        };

        if let Some(node) = nodes.get_mut(self.bones[index]) {
            node.transform.apply_local_matrix(local);
        }
    }

    /// Refreshes joint world matrices in storage order.
    ///
    /// Each joint reads its parent's cached world matrix, so non-joint
    /// ancestors must already be current.
    pub fn update_world_matrices(&self, nodes: &mut SlotMap<NodeHandle, Node>) {
        for &bone in &self.bones {
            transform_system::update_node_world(nodes, bone);
        }
    }
}
