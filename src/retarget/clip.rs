//! Clip resampling.
//!
//! The source clip is played through a private [`AnimationMixer`] at a fixed
//! rate. After every step the world-matching resolver poses the target and
//! the resulting joint transforms are recorded as new keyframes.

use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::{
    AnimationClip, AnimationMixer, Binder, InterpolationMode, KeyframeTrack, LoopMode, TargetPath,
    Track, TrackData, TrackMeta,
};
use crate::errors::{Result, RetargetError};
use crate::retarget::legacy::resolve_pose_legacy;
use crate::retarget::lookup::{JointLookup, joint_name, pair_joints};
use crate::retarget::options::{RetargetClipOptions, source_name_for};
use crate::retarget::rig::Rig;
use crate::scene::{NodeHandle, Scene};

/// Resamples `clip`, which animates `source`, into a new clip for `target`.
///
/// Every paired target joint gets a rotation track; the hip joint also gets
/// a position track. Each track holds `round(duration * fps) + 1` samples,
/// the first at time 0 and the last exactly at `clip.duration`.
///
/// Leaves `target` posed at the end of the clip and `source` at the clip's
/// last frame.
pub fn retarget_clip(
    scene: &mut Scene,
    target: &impl Rig,
    source: &impl Rig,
    clip: &Arc<AnimationClip>,
    options: &RetargetClipOptions,
) -> Result<AnimationClip> {
    if !options.fps.is_finite() || options.fps <= 0.0 {
        return Err(RetargetError::InvalidFps(options.fps));
    }

    let target_key = target.skeleton_key(scene)?;
    let source_key = source.skeleton_key(scene)?;

    let duration = clip.duration.max(0.0);
    let num_frames = (duration * options.fps).round() as usize;
    let delta = options.fps.recip();

    let mut joints = {
        let target_skeleton = scene
            .skeleton(target_key)
            .ok_or(RetargetError::SkeletonNotFound)?;
        let source_skeleton = scene
            .skeleton(source_key)
            .ok_or(RetargetError::SkeletonNotFound)?;
        let lookup = JointLookup::new(source_skeleton, &scene.names);
        lookup.root(&options.pose.hip)?;

        pair_joints(target_skeleton, &scene.names, &lookup, &options.pose.names)
            .into_iter()
            .map(|pair| {
                let bone = target_skeleton.bones[pair.target];
                let name = joint_name(&scene.names, bone);
                let is_hip = source_name_for(&options.pose.names, name) == options.pose.hip;
                JointSamples::new(bone, name, is_hip, num_frames + 1)
            })
            .collect::<Vec<_>>()
    };

    scene.update_matrix_world();

    let source_bones = scene
        .skeleton(source_key)
        .map(|s| s.bones.clone())
        .unwrap_or_default();
    let mut playback = PlaybackScope::new(scene, &source_bones, clip);
    playback.advance(0.0, scene);
    scene.update_skeleton_world(source_key)?;

    let mut first_position: Option<Vec3> = None;

    for i in 0..num_frames {
        let time = i as f32 * delta;

        resolve_pose_legacy(scene, target, source, &options.pose)?;
        record(scene, &mut joints, time, options.use_first_frame_position, &mut first_position);
        log::trace!("Resampled '{}' frame {i} at {time:.4}s", clip.name);

        let step = if i + 1 == num_frames {
            (duration - playback.elapsed()).max(0.0)
        } else {
            delta
        };
        playback.advance(step, scene);
        scene.update_skeleton_world(source_key)?;
    }

    // Closing keyframe at exactly `duration`
    resolve_pose_legacy(scene, target, source, &options.pose)?;
    record(scene, &mut joints, duration, options.use_first_frame_position, &mut first_position);

    drop(playback);

    let tracks = joints.into_iter().flat_map(JointSamples::into_tracks).collect();
    Ok(AnimationClip::new(clip.name.clone(), tracks))
}

/// Appends the current target pose of every recorded joint.
fn record(
    scene: &Scene,
    joints: &mut [JointSamples],
    time: f32,
    use_first_frame_position: bool,
    first_position: &mut Option<Vec3>,
) {
    for joint in joints {
        let Some(node) = scene.get_node(joint.bone) else {
            continue;
        };
        let transform = &node.transform;

        joint.rotation_times.push(time);
        joint.rotations.push(transform.rotation);

        if let Some(positions) = &mut joint.positions {
            let mut position = transform.position;
            if use_first_frame_position {
                position -= *first_position.get_or_insert(position);
            }
            positions.push(position);
        }
    }
}

/// Keyframes accumulated for one target joint.
struct JointSamples {
    bone: NodeHandle,
    name: String,
    rotation_times: Vec<f32>,
    rotations: Vec<Quat>,
    /// Hip joint only.
    positions: Option<Vec<Vec3>>,
}

impl JointSamples {
    fn new(bone: NodeHandle, name: &str, is_hip: bool, capacity: usize) -> Self {
        Self {
            bone,
            name: name.to_string(),
            rotation_times: Vec::with_capacity(capacity),
            rotations: Vec::with_capacity(capacity),
            positions: is_hip.then(|| Vec::with_capacity(capacity)),
        }
    }

    fn into_tracks(self) -> Vec<Track> {
        let mut tracks = Vec::with_capacity(2);

        if let Some(positions) = self.positions {
            tracks.push(Track {
                meta: TrackMeta::new(&self.name, TargetPath::Translation),
                data: TrackData::Vector3(KeyframeTrack::new(
                    self.rotation_times.clone(),
                    positions,
                    InterpolationMode::Linear,
                )),
            });
        }

        tracks.push(Track {
            meta: TrackMeta::new(&self.name, TargetPath::Rotation),
            data: TrackData::Quaternion(KeyframeTrack::new(
                self.rotation_times,
                self.rotations,
                InterpolationMode::Linear,
            )),
        });

        tracks
    }
}

/// Private playback of the source clip.
///
/// Releases the mixer's cached action for the clip when dropped, including
/// on early return.
struct PlaybackScope {
    mixer: AnimationMixer,
    clip_name: String,
}

impl PlaybackScope {
    fn new(scene: &Scene, bones: &[NodeHandle], clip: &Arc<AnimationClip>) -> Self {
        let bindings = Binder::bind_bones(scene, bones, clip);

        let mut mixer = AnimationMixer::new();
        let action = mixer.clip_action(clip, bindings);
        action.loop_mode = LoopMode::Once;
        action.play();

        Self {
            mixer,
            clip_name: clip.name.clone(),
        }
    }

    /// Local time of the clip's action.
    fn elapsed(&self) -> f32 {
        self.mixer.action(&self.clip_name).map_or(0.0, |a| a.time)
    }

    fn advance(&mut self, dt: f32, scene: &mut Scene) {
        self.mixer.update(dt, scene);
    }
}

impl Drop for PlaybackScope {
    fn drop(&mut self) {
        if self.mixer.uncache_clip(&self.clip_name) {
            log::debug!("Released playback of clip '{}'", self.clip_name);
        }
    }
}
