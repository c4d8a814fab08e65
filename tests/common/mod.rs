//! Rig builders shared by the integration tests.

#![allow(dead_code)]

use glam::{Affine3A, Quat, Vec3};
use rigshift::scene::Transform;
use rigshift::{Node, NodeHandle, Scene, Skeleton, SkeletonKey};

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

/// Same rotation, either quaternion sign.
pub fn quat_approx(a: Quat, b: Quat) -> bool {
    a.angle_between(b) < EPSILON * 10.0
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Rig Description
// ============================================================================

#[derive(Debug, Clone)]
pub struct JointSpec {
    pub name: &'static str,
    pub parent: Option<usize>,
    pub position: Vec3,
    pub rotation: Quat,
}

pub fn joint(name: &'static str, parent: Option<usize>, position: Vec3) -> JointSpec {
    JointSpec {
        name,
        parent,
        position,
        rotation: Quat::IDENTITY,
    }
}

/// `hip -> spine -> head`, `hip -> leg_l`, `hip -> leg_r`.
pub fn humanoid() -> Vec<JointSpec> {
    vec![
        joint("hip", None, Vec3::new(0.0, 1.0, 0.0)),
        joint("spine", Some(0), Vec3::new(0.0, 0.5, 0.0)),
        joint("head", Some(1), Vec3::new(0.0, 0.5, 0.0)),
        joint("leg_l", Some(0), Vec3::new(0.2, -0.5, 0.0)),
        joint("leg_r", Some(0), Vec3::new(-0.2, -0.5, 0.0)),
    ]
}

pub const HIP: usize = 0;
pub const SPINE: usize = 1;
pub const HEAD: usize = 2;

// ============================================================================
// Rig Construction
// ============================================================================

/// A skinned node with its skeleton. The joints hang below the skinned node.
#[derive(Debug, Clone)]
pub struct TestRig {
    pub mesh: NodeHandle,
    pub skeleton: SkeletonKey,
    pub bones: Vec<NodeHandle>,
}

pub fn build_rig(scene: &mut Scene, name: &str, joints: &[JointSpec]) -> TestRig {
    build_rig_at(scene, name, joints, Affine3A::IDENTITY)
}

/// Builds a rig whose skinned node sits at `placement`. The current pose
/// becomes the bind pose.
pub fn build_rig_at(
    scene: &mut Scene,
    name: &str,
    joints: &[JointSpec],
    placement: Affine3A,
) -> TestRig {
    let mesh = scene.create_node_with_name(name);
    scene
        .get_node_mut(mesh)
        .unwrap()
        .transform
        .apply_local_matrix(placement);

    let mut bones: Vec<NodeHandle> = Vec::with_capacity(joints.len());
    for spec in joints {
        let parent = spec.parent.map_or(mesh, |p| bones[p]);
        let node = Node::with_transform(Transform::from_trs(spec.position, spec.rotation, Vec3::ONE));
        bones.push(scene.create_child(spec.name, node, parent));
    }

    scene.update_matrix_world();
    let skeleton = Skeleton::from_current_pose(name, bones.clone(), &scene.nodes);
    let skeleton = scene.add_skeleton(skeleton).unwrap();
    scene.bind_skin(mesh, skeleton).unwrap();

    TestRig {
        mesh,
        skeleton,
        bones,
    }
}

// ============================================================================
// Accessors
// ============================================================================

pub fn local(scene: &Scene, handle: NodeHandle) -> Transform {
    scene.get_node(handle).unwrap().transform.clone()
}

pub fn local_mut(scene: &mut Scene, handle: NodeHandle) -> &mut Transform {
    &mut scene.get_node_mut(handle).unwrap().transform
}

pub fn world(scene: &Scene, handle: NodeHandle) -> Affine3A {
    *scene.get_node(handle).unwrap().world_matrix()
}

pub fn world_position(scene: &Scene, handle: NodeHandle) -> Vec3 {
    world(scene, handle).translation.into()
}

pub fn world_rotation(scene: &Scene, handle: NodeHandle) -> Quat {
    world(scene, handle).to_scale_rotation_translation().1
}
