use std::sync::Arc;

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::AnimationClip;
use crate::animation::tracks::KeyframeCursor;

/// What happens when playback runs past either end of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Clamp to the end that was crossed and stop.
    Once,
    /// Wrap around.
    #[default]
    Loop,
    /// Bounce back and forth between the ends.
    PingPong,
}

impl LoopMode {
    /// Maps an unbounded playback time into `[0, duration]`.
    ///
    /// Returns the mapped time and whether playback reached an end and
    /// should stop. `duration` must be positive.
    #[must_use]
    pub fn wrap(self, time: f32, duration: f32) -> (f32, bool) {
        match self {
            Self::Once if time >= duration => (duration, true),
            Self::Once if time < 0.0 => (0.0, true),
            Self::Once => (time, false),
            Self::Loop => (time.rem_euclid(duration), false),
            Self::PingPong => {
                let t = time.rem_euclid(duration * 2.0);
                let t = if t > duration { duration * 2.0 - t } else { t };
                (t, false)
            }
        }
    }
}

/// Playback state of one clip: local time, speed, loop behaviour, and the
/// bindings that route each track onto a node.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    /// Local time in seconds, always within `[0, clip.duration]`.
    pub time: f32,
    pub time_scale: f32,
    /// An action with zero weight is not applied.
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    /// One per clip track.
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        Self::with_bindings(clip, Vec::new())
    }

    #[must_use]
    pub fn with_bindings(clip: Arc<AnimationClip>, bindings: Vec<PropertyBinding>) -> Self {
        let track_cursors = vec![KeyframeCursor::default(); clip.tracks.len()];
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::default(),
            paused: false,
            enabled: true,
            bindings,
            track_cursors,
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Starts playback from the beginning.
    pub fn play(&mut self) {
        self.time = 0.0;
        self.paused = false;
        self.enabled = true;
    }

    pub fn stop(&mut self) {
        self.enabled = false;
        self.time = 0.0;
    }

    /// Whether a `Once` action has run into one of its ends.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.loop_mode == LoopMode::Once && self.paused
    }

    /// Advances local time by `dt * time_scale` seconds.
    ///
    /// Paused, disabled and zero-length actions do not move.
    pub fn update(&mut self, dt: f32) {
        let duration = self.clip.duration;
        if self.paused || !self.enabled || duration <= 0.0 {
            return;
        }

        let (time, stop) = self
            .loop_mode
            .wrap(self.time + dt * self.time_scale, duration);
        self.time = time;
        if stop {
            self.paused = true;
        }
    }
}
