use rustc_hash::FxHashMap;

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::scene::{NodeHandle, Scene};

pub struct Binder;

impl Binder {
    /// Binds each clip track to the node of the same name under `root`.
    ///
    /// Tracks with no matching node are skipped.
    #[must_use]
    pub fn bind(scene: &Scene, root: NodeHandle, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_index, track) in clip.tracks.iter().enumerate() {
            match scene.find_node_by_name(root, &track.meta.node_name) {
                Some(node_handle) => bindings.push(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.meta.target,
                }),
                None => log::warn!("No node named '{}' for track {track_index}", track.meta.node_name),
            }
        }

        bindings
    }

    /// Binds each clip track to the joint of the same name in `bones`.
    ///
    /// Used to drive a bare joint list that has no single owning root node.
    #[must_use]
    pub fn bind_bones(scene: &Scene, bones: &[NodeHandle], clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut by_name: FxHashMap<&str, NodeHandle> = FxHashMap::default();
        for &bone in bones {
            if let Some(name) = scene.get_name(bone) {
                by_name.entry(name).or_insert(bone);
            }
        }

        let mut bindings = Vec::with_capacity(clip.tracks.len());
        for (track_index, track) in clip.tracks.iter().enumerate() {
            match by_name.get(track.meta.node_name.as_str()) {
                Some(&node_handle) => bindings.push(PropertyBinding {
                    track_index,
                    node_handle,
                    target: track.meta.target,
                }),
                None => log::warn!("No joint named '{}' for track {track_index}", track.meta.node_name),
            }
        }

        bindings
    }
}
