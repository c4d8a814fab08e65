use std::sync::Arc;

use crate::animation::action::AnimationAction;
use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::scene::Scene;

/// Drives a set of actions and writes their sampled values onto nodes.
///
/// Actions are cached per clip name. No weight blending: when several
/// enabled actions drive the same property, the last one wins.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
    time: f32,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Global mixer time, the sum of every `dt` passed to [`update`](Self::update).
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Returns the cached action for `clip`, creating it with `bindings`
    /// on first use.
    pub fn clip_action(
        &mut self,
        clip: &Arc<AnimationClip>,
        bindings: Vec<PropertyBinding>,
    ) -> &mut AnimationAction {
        let index = match self.actions.iter().position(|a| a.clip().name == clip.name) {
            Some(index) => index,
            None => {
                self.actions
                    .push(AnimationAction::with_bindings(Arc::clone(clip), bindings));
                self.actions.len() - 1
            }
        };
        &mut self.actions[index]
    }

    #[must_use]
    pub fn action(&self, clip_name: &str) -> Option<&AnimationAction> {
        self.actions.iter().find(|a| a.clip().name == clip_name)
    }

    pub fn action_mut(&mut self, clip_name: &str) -> Option<&mut AnimationAction> {
        self.actions.iter_mut().find(|a| a.clip().name == clip_name)
    }

    /// Drops the cached action (bindings and cursors) for a clip.
    ///
    /// Returns whether anything was released.
    pub fn uncache_clip(&mut self, clip_name: &str) -> bool {
        let before = self.actions.len();
        self.actions.retain(|a| a.clip().name != clip_name);
        self.actions.len() != before
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Advances every action by `dt` seconds and applies the result.
    pub fn update(&mut self, dt: f32, scene: &mut Scene) {
        self.time += dt;

        for action in &mut self.actions {
            action.update(dt);
        }

        self.apply(scene);
    }

    /// Writes every enabled action's current sample onto its bound nodes.
    ///
    /// Paused actions still apply: a clip held on its last frame keeps
    /// posing the hierarchy.
    pub fn apply(&mut self, scene: &mut Scene) {
        for action in &mut self.actions {
            if !action.enabled || action.weight <= 0.0 {
                continue;
            }

            let clip = Arc::clone(action.clip());
            let time = action.time;

            for binding in &action.bindings {
                let Some(track) = clip.tracks.get(binding.track_index) else {
                    continue;
                };
                if track.data.is_empty() {
                    continue;
                }
                let cursor = &mut action.track_cursors[binding.track_index];
                let Some(node) = scene.get_node_mut(binding.node_handle) else {
                    continue;
                };

                match (&track.data, binding.target) {
                    (TrackData::Vector3(t), TargetPath::Translation) => {
                        node.transform.position = t.sample_with_cursor(time, cursor);
                    }
                    (TrackData::Vector3(t), TargetPath::Scale) => {
                        node.transform.scale = t.sample_with_cursor(time, cursor);
                    }
                    (TrackData::Quaternion(t), TargetPath::Rotation) => {
                        node.transform.rotation = t.sample_with_cursor(time, cursor);
                    }
                    _ => continue,
                }
                node.transform.mark_dirty();
            }
        }
    }
}
