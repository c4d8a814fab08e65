//! Pose retargeting tests
//!
//! Tests for:
//! - Bind-relative resolver: identity retarget, root offset, rest
//!   orientation and proportion invariance, rename maps, absolute mode
//! - World-matching resolver: rotation matching and every option
//! - Unmapped joints keep their pose under both resolvers
//! - Error paths: missing root, degenerate scale, unskinned rigs

mod common;

use common::*;
use glam::{Affine3A, Quat, Vec3};
use rigshift::retarget::{
    NameMap, OrientationMode, RetargetOptions, RetargetV2Options, find_bone_by_name,
    resolve_pose_legacy, resolve_pose_v2,
};
use rigshift::{RetargetError, Scene};

fn names(pairs: &[(&str, &str)]) -> NameMap {
    pairs
        .iter()
        .map(|&(t, s)| (t.to_string(), s.to_string()))
        .collect()
}

/// Source and target built from the same joint description.
fn twin_rigs() -> (Scene, TestRig, TestRig) {
    init_logger();
    let mut scene = Scene::new();
    let source = build_rig(&mut scene, "source", &humanoid());
    let target = build_rig(&mut scene, "target", &humanoid());
    (scene, source, target)
}

/// Hip moved and turned, spine bent.
fn pose_source(scene: &mut Scene, source: &TestRig) {
    let hip = local_mut(scene, source.bones[HIP]);
    hip.position = Vec3::new(0.5, 1.2, 0.3);
    hip.rotation = Quat::from_rotation_y(0.3);
    local_mut(scene, source.bones[SPINE]).rotation = Quat::from_rotation_z(0.5);
}

// ============================================================================
// Bind-Relative Resolver
// ============================================================================

#[test]
fn v2_identical_rigs_in_bind_pose_stay_in_bind_pose() {
    let (mut scene, source, target) = twin_rigs();

    for &bone in &target.bones {
        local_mut(&mut scene, bone).rotation = Quat::from_rotation_x(0.7);
    }

    resolve_pose_v2(&mut scene, &target.mesh, &source.mesh, &RetargetV2Options::default()).unwrap();

    let skeleton = scene.skeleton(target.skeleton).unwrap();
    for (i, &bone) in target.bones.iter().enumerate() {
        assert!(
            world(&scene, bone).abs_diff_eq(skeleton.bind_world(i), EPSILON),
            "joint {i} left its bind pose"
        );
    }
}

#[test]
fn v2_root_offset_is_a_left_multiplication() {
    let (mut scene, source, target) = twin_rigs();
    pose_source(&mut scene, &source);

    let mut options = RetargetV2Options::default();
    resolve_pose_v2(&mut scene, &target.mesh, &source.mesh, &options).unwrap();
    let plain_root = world(&scene, target.bones[HIP]);
    let plain_spine = local(&scene, target.bones[SPINE]);

    let offset = Affine3A::from_rotation_translation(Quat::from_rotation_y(0.5), Vec3::new(0.0, 0.0, 2.0));
    options.root_offset = Some(offset);
    resolve_pose_v2(&mut scene, &target.mesh, &source.mesh, &options).unwrap();

    assert!(world(&scene, target.bones[HIP]).abs_diff_eq(offset * plain_root, EPSILON));

    let spine = local(&scene, target.bones[SPINE]);
    assert!(quat_approx(spine.rotation, plain_spine.rotation));
    assert!(vec3_approx(spine.position, plain_spine.position));
}

#[test]
fn v2_transfers_deltas_onto_target_rest_pose() {
    init_logger();
    let mut scene = Scene::new();
    let source = build_rig(&mut scene, "source", &humanoid());

    // Longer spine with a different rest orientation
    let mut joints = humanoid();
    joints[SPINE].position = Vec3::new(0.0, 1.0, 0.0);
    joints[SPINE].rotation = Quat::from_rotation_y(0.4);
    let target = build_rig(&mut scene, "target", &joints);

    local_mut(&mut scene, source.bones[HIP]).position = Vec3::new(1.0, 1.0, 0.0);
    local_mut(&mut scene, source.bones[SPINE]).rotation = Quat::from_rotation_z(0.5);

    resolve_pose_v2(&mut scene, &target.mesh, &source.mesh, &RetargetV2Options::default()).unwrap();

    let spine = local(&scene, target.bones[SPINE]);
    assert!(quat_approx(
        spine.rotation,
        Quat::from_rotation_y(0.4) * Quat::from_rotation_z(0.5)
    ));
    // Non-root joints keep the target's proportions
    assert!(vec3_approx(spine.position, Vec3::new(0.0, 1.0, 0.0)));

    // The root carries the source's translation delta
    let hip = local(&scene, target.bones[HIP]);
    assert!(vec3_approx(hip.position, Vec3::new(1.0, 1.0, 0.0)));
}

#[test]
fn v2_rename_map_pairs_differently_named_joints() {
    init_logger();
    let mut scene = Scene::new();
    let source = build_rig(&mut scene, "source", &humanoid());
    let target = build_rig(
        &mut scene,
        "target",
        &[
            joint("Pelvis", None, Vec3::new(0.0, 1.0, 0.0)),
            joint("Chest", Some(0), Vec3::new(0.0, 0.5, 0.0)),
            joint("Skull", Some(1), Vec3::new(0.0, 0.5, 0.0)),
        ],
    );
    local_mut(&mut scene, target.bones[2]).rotation = Quat::from_rotation_x(0.25);
    local_mut(&mut scene, source.bones[SPINE]).rotation = Quat::from_rotation_z(0.5);

    let options = RetargetV2Options {
        names: names(&[("Pelvis", "hip"), ("Chest", "spine")]),
        ..RetargetV2Options::default()
    };
    resolve_pose_v2(&mut scene, &target.mesh, &source.mesh, &options).unwrap();

    assert!(quat_approx(
        local(&scene, target.bones[1]).rotation,
        Quat::from_rotation_z(0.5)
    ));
    // "Skull" has no counterpart
    assert!(quat_approx(
        local(&scene, target.bones[2]).rotation,
        Quat::from_rotation_x(0.25)
    ));
}

#[test]
fn v2_absolute_mode_matches_world_rotations() {
    init_logger();
    let mut scene = Scene::new();
    let source = build_rig(&mut scene, "source", &humanoid());

    let mut joints = humanoid();
    joints[HIP].rotation = Quat::from_rotation_x(0.6);
    joints[SPINE].rotation = Quat::from_rotation_y(0.4);
    let target = build_rig(&mut scene, "target", &joints);

    pose_source(&mut scene, &source);

    let options = RetargetV2Options {
        orientation_mode: OrientationMode::Absolute,
        ..RetargetV2Options::default()
    };
    resolve_pose_v2(&mut scene, &target.mesh, &source.mesh, &options).unwrap();

    for index in [HIP, SPINE, HEAD] {
        assert!(
            quat_approx(
                world_rotation(&scene, target.bones[index]),
                world_rotation(&scene, source.bones[index])
            ),
            "joint {index} world rotation differs"
        );
    }
}

#[test]
fn v2_missing_root_fails_fast() {
    let (mut scene, source, target) = twin_rigs();
    let before = local(&scene, target.bones[SPINE]);

    let options = RetargetV2Options {
        root: "pelvis".to_string(),
        ..RetargetV2Options::default()
    };
    let err = resolve_pose_v2(&mut scene, &target.mesh, &source.mesh, &options).unwrap_err();

    assert!(matches!(err, RetargetError::RootNotFound { ref name } if name == "pelvis"));
    assert_eq!(local(&scene, target.bones[SPINE]).rotation, before.rotation);
}

// ============================================================================
// World-Matching Resolver
// ============================================================================

#[test]
fn legacy_matches_source_world_rotations() {
    let (mut scene, source, target) = twin_rigs();
    pose_source(&mut scene, &source);

    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &RetargetOptions::default()).unwrap();

    for (i, (&t, &s)) in target.bones.iter().zip(&source.bones).enumerate() {
        assert!(
            quat_approx(world_rotation(&scene, t), world_rotation(&scene, s)),
            "joint {i} world rotation differs"
        );
    }
    assert!(vec3_approx(
        world_position(&scene, target.bones[HIP]),
        Vec3::new(0.5, 1.2, 0.3)
    ));
    // Non-hip positions come back from the target's own pose
    assert!(vec3_approx(
        local(&scene, target.bones[SPINE]).position,
        Vec3::new(0.0, 0.5, 0.0)
    ));
}

#[test]
fn legacy_preserve_matrix_keeps_target_placement() {
    init_logger();
    let mut scene = Scene::new();
    let source = build_rig(&mut scene, "source", &humanoid());
    let placement = Affine3A::from_translation(Vec3::new(10.0, 0.0, 0.0));
    let target = build_rig_at(&mut scene, "target", &humanoid(), placement);
    pose_source(&mut scene, &source);

    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &RetargetOptions::default()).unwrap();

    assert!(world(&scene, target.mesh).abs_diff_eq(placement, EPSILON));
    assert!(vec3_approx(
        world_position(&scene, target.bones[HIP]),
        Vec3::new(10.5, 1.2, 0.3)
    ));
    assert!(quat_approx(
        world_rotation(&scene, target.bones[SPINE]),
        world_rotation(&scene, source.bones[SPINE])
    ));
}

#[test]
fn legacy_relative_to_placement_vs_target_matrix() {
    init_logger();
    let mut scene = Scene::new();
    let source = build_rig(&mut scene, "source", &humanoid());
    let placement = Affine3A::from_translation(Vec3::new(10.0, 0.0, 0.0));
    let target = build_rig_at(&mut scene, "target", &humanoid(), placement);
    pose_source(&mut scene, &source);

    let mut options = RetargetOptions {
        preserve_matrix: false,
        ..RetargetOptions::default()
    };

    // Source world expressed relative to the target placement
    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &options).unwrap();
    assert!(vec3_approx(
        world_position(&scene, target.bones[HIP]),
        Vec3::new(0.5, 1.2, 0.3)
    ));

    // Source world used as-is, so the placement applies on top
    options.use_target_matrix = true;
    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &options).unwrap();
    assert!(vec3_approx(
        world_position(&scene, target.bones[HIP]),
        Vec3::new(10.5, 1.2, 0.3)
    ));
}

#[test]
fn legacy_preserve_position_keeps_target_proportions() {
    init_logger();
    let mut scene = Scene::new();
    let source = build_rig(&mut scene, "source", &humanoid());
    let mut joints = humanoid();
    joints[SPINE].position = Vec3::new(0.0, 1.0, 0.0);
    let target = build_rig(&mut scene, "target", &joints);
    pose_source(&mut scene, &source);

    let mut options = RetargetOptions::default();
    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &options).unwrap();
    assert!(vec3_approx(
        local(&scene, target.bones[SPINE]).position,
        Vec3::new(0.0, 1.0, 0.0)
    ));

    options.preserve_position = false;
    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &options).unwrap();
    assert!(vec3_approx(
        local(&scene, target.bones[SPINE]).position,
        Vec3::new(0.0, 0.5, 0.0)
    ));
}

#[test]
fn legacy_preserve_hip_position_strips_horizontal_components() {
    let (mut scene, source, target) = twin_rigs();
    pose_source(&mut scene, &source);

    let mut options = RetargetOptions::default();
    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &options).unwrap();
    let unstripped = local(&scene, target.bones[HIP]).position;
    assert!(vec3_approx(unstripped, Vec3::new(0.5, 1.2, 0.3)));

    options.preserve_hip_position = true;
    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &options).unwrap();
    let stripped = local(&scene, target.bones[HIP]).position;

    assert_eq!(stripped.x, 0.0);
    assert_eq!(stripped.z, 0.0);
    assert!(approx(stripped.y, unstripped.y));
}

#[test]
fn legacy_offsets_redefine_the_bind_pose() {
    let (mut scene, source, target) = twin_rigs();

    let correction = Quat::from_rotation_x(0.3);
    let options = RetargetOptions {
        offsets: Some(
            [("spine".to_string(), Affine3A::from_quat(correction))]
                .into_iter()
                .collect(),
        ),
        ..RetargetOptions::default()
    };
    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &options).unwrap();

    // Source is in bind pose: only the correction remains
    assert!(quat_approx(world_rotation(&scene, target.bones[SPINE]), correction));
    assert!(quat_approx(world_rotation(&scene, target.bones[HIP]), Quat::IDENTITY));
}

#[test]
fn legacy_bare_skeleton_target_uses_source_world() {
    let (mut scene, source, target) = twin_rigs();
    pose_source(&mut scene, &source);

    resolve_pose_legacy(&mut scene, &target.skeleton, &source.mesh, &RetargetOptions::default())
        .unwrap();

    for index in [HIP, SPINE, HEAD] {
        assert!(quat_approx(
            world_rotation(&scene, target.bones[index]),
            world_rotation(&scene, source.bones[index])
        ));
    }
    assert!(vec3_approx(
        world_position(&scene, target.bones[HIP]),
        world_position(&scene, source.bones[HIP])
    ));
}

#[test]
fn legacy_degenerate_source_scale_is_an_error() {
    let (mut scene, source, target) = twin_rigs();
    local_mut(&mut scene, source.bones[HIP]).scale = Vec3::new(1.0, 0.0, 1.0);

    let err = resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &RetargetOptions::default())
        .unwrap_err();

    match err {
        RetargetError::DegenerateScale { joint, scale } => {
            assert_eq!(joint, "hip");
            assert!(scale.y < 1e-8);
        }
        other => panic!("expected DegenerateScale, got {other:?}"),
    }
}

#[test]
fn legacy_degenerate_scale_leaves_the_target_untouched() {
    init_logger();
    let mut scene = Scene::new();
    let source = build_rig(&mut scene, "source", &humanoid());
    let placement = Affine3A::from_translation(Vec3::new(10.0, 0.0, 0.0));
    let mut joints = humanoid();
    joints.push(joint("tail", Some(HIP), Vec3::new(0.0, -0.2, -0.3)));
    let target = build_rig_at(&mut scene, "target", &joints, placement);

    // A paired joint off its bind pose, and a later source joint that fails
    local_mut(&mut scene, target.bones[SPINE]).rotation = Quat::from_rotation_x(0.3);
    local_mut(&mut scene, source.bones[SPINE]).scale = Vec3::new(1.0, 0.0, 1.0);
    let before: Vec<_> = target.bones.iter().map(|&b| local(&scene, b)).collect();

    let err = resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &RetargetOptions::default())
        .unwrap_err();
    assert!(matches!(err, RetargetError::DegenerateScale { ref joint, .. } if joint == "spine"));

    assert!(world(&scene, target.mesh).abs_diff_eq(placement, EPSILON));
    for (i, transform) in before.iter().enumerate() {
        assert_unchanged(&scene, &target, i, transform);
    }

    scene.update_matrix_world();
    assert!(world(&scene, target.mesh).abs_diff_eq(placement, EPSILON));
    assert!(vec3_approx(
        world_position(&scene, target.bones[HIP]),
        Vec3::new(10.0, 1.0, 0.0)
    ));
}

#[test]
fn legacy_missing_hip_fails_fast() {
    let (mut scene, source, target) = twin_rigs();

    let options = RetargetOptions {
        hip: "pelvis".to_string(),
        ..RetargetOptions::default()
    };
    let err = resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &options).unwrap_err();
    assert!(matches!(err, RetargetError::RootNotFound { .. }));
}

// ============================================================================
// Unmapped Joints
// ============================================================================

fn rigs_with_tail() -> (Scene, TestRig, TestRig, usize) {
    init_logger();
    let mut scene = Scene::new();
    let source = build_rig(&mut scene, "source", &humanoid());

    let mut joints = humanoid();
    joints.push(joint("tail", Some(HIP), Vec3::new(0.0, -0.2, -0.3)));
    let tail = joints.len() - 1;
    let target = build_rig(&mut scene, "target", &joints);

    let t = local_mut(&mut scene, target.bones[tail]);
    t.position = Vec3::new(0.0, 0.0, -0.5);
    t.rotation = Quat::from_rotation_x(1.1);
    t.scale = Vec3::splat(2.0);

    pose_source(&mut scene, &source);
    (scene, source, target, tail)
}

fn assert_unchanged(scene: &Scene, rig: &TestRig, index: usize, before: &rigshift::scene::Transform) {
    let after = local(scene, rig.bones[index]);
    assert_eq!(after.position, before.position);
    assert_eq!(after.rotation, before.rotation);
    assert_eq!(after.scale, before.scale);
}

#[test]
fn unmapped_joint_is_untouched_by_v2() {
    let (mut scene, source, target, tail) = rigs_with_tail();
    let before = local(&scene, target.bones[tail]);

    resolve_pose_v2(&mut scene, &target.mesh, &source.mesh, &RetargetV2Options::default()).unwrap();

    assert_unchanged(&scene, &target, tail, &before);
}

#[test]
fn unmapped_joint_is_untouched_by_legacy() {
    let (mut scene, source, target, tail) = rigs_with_tail();
    let before = local(&scene, target.bones[tail]);

    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &RetargetOptions::default()).unwrap();

    assert_unchanged(&scene, &target, tail, &before);
}

#[test]
fn legacy_offsets_skip_unmapped_joints() {
    let (mut scene, source, target, tail) = rigs_with_tail();
    let before = local(&scene, target.bones[tail]);

    let options = RetargetOptions {
        offsets: Some(
            [("tail".to_string(), Affine3A::from_quat(Quat::from_rotation_y(0.9)))]
                .into_iter()
                .collect(),
        ),
        ..RetargetOptions::default()
    };
    resolve_pose_legacy(&mut scene, &target.mesh, &source.mesh, &options).unwrap();

    assert_unchanged(&scene, &target, tail, &before);
}

// ============================================================================
// Rig Lookup
// ============================================================================

#[test]
fn unskinned_node_is_not_a_rig() {
    let (mut scene, source, target) = twin_rigs();

    let err = resolve_pose_v2(
        &mut scene,
        &target.bones[HIP],
        &source.mesh,
        &RetargetV2Options::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RetargetError::NotSkinned(h) if h == target.bones[HIP]));
}

#[test]
fn find_bone_by_name_searches_one_skeleton() {
    let (scene, source, target) = twin_rigs();

    assert_eq!(
        find_bone_by_name(&scene, target.skeleton, "spine"),
        Some(target.bones[SPINE])
    );
    assert_eq!(
        find_bone_by_name(&scene, source.skeleton, "spine"),
        Some(source.bones[SPINE])
    );
    assert_eq!(find_bone_by_name(&scene, target.skeleton, "tail"), None);
}

// ============================================================================
// JSON Presets
// ============================================================================

#[test]
fn json_preset_drives_a_renamed_retarget() -> anyhow::Result<()> {
    init_logger();
    let mut scene = Scene::new();
    let source = build_rig(&mut scene, "source", &humanoid());
    let target = build_rig(
        &mut scene,
        "target",
        &[
            joint("Pelvis", None, Vec3::new(0.0, 1.0, 0.0)),
            joint("Chest", Some(0), Vec3::new(0.0, 0.5, 0.0)),
        ],
    );
    pose_source(&mut scene, &source);

    let options = RetargetV2Options::from_json(
        r#"{ "names": { "Pelvis": "hip", "Chest": "spine" }, "orientation_mode": "relative" }"#,
    )?;
    resolve_pose_v2(&mut scene, &target.mesh, &source.mesh, &options)?;

    assert!(quat_approx(
        local(&scene, target.bones[1]).rotation,
        Quat::from_rotation_z(0.5)
    ));
    Ok(())
}
