//! Scene graph module
//!
//! Hosts the joint hierarchies that retargeting reads and writes:
//! - Node: scene node (parent/child links plus a transform)
//! - Transform: TRS component with cached local and world matrices
//! - Scene: node storage and component maps (names, skins, skeletons)
//! - Skeleton: ordered joints with their inverse bind matrices
//! - transform_system: world matrix propagation, decoupled from `Scene`
//! - clone: hierarchy cloning with skeleton remapping

pub mod clone;
pub mod node;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use clone::clone_hierarchy;
pub use node::Node;
pub use scene::Scene;
pub use skeleton::{SkinBinding, Skeleton};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct SkeletonKey;
}
