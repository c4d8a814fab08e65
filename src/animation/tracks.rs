use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    /// Values are stored as `[in_tangent, value, out_tangent]` triples.
    CubicSpline,
}

/// How many keyframes the cursor scans forward before falling back to a
/// binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the keyframe interval of the previous sample so sequential
/// playback finds the next interval in O(1).
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Time-stamped samples of one animated property.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Stateless sample using a binary search.
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        assert!(!self.times.is_empty(), "Track is empty");

        let index = self.times.partition_point(|&t| t <= time).saturating_sub(1);
        self.sample_at_frame(index, time)
    }

    /// Samples at `time`, starting the interval search at the cursor.
    ///
    /// Forward playback scans at most [`MAX_SCAN_OFFSET`] intervals ahead;
    /// rewinds and large jumps fall back to a binary search.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        let len = self.times.len();
        assert!(len > 0, "Track is empty");

        if len == 1 {
            return self.value_at(0);
        }

        let mut index = cursor.last_index.min(len - 1);

        if time < self.times[index] {
            index = self.times.partition_point(|&t| t <= time).saturating_sub(1);
        } else {
            let limit = (index + MAX_SCAN_OFFSET).min(len - 1);
            while index < limit && time >= self.times[index + 1] {
                index += 1;
            }
            if index < len - 1 && time >= self.times[index + 1] {
                index = self.times.partition_point(|&t| t <= time) - 1;
            }
        }

        cursor.last_index = index;
        self.sample_at_frame(index, time)
    }

    #[inline]
    fn value_at(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();

        if index >= len - 1 {
            return self.value_at(len - 1);
        }

        let next = index + 1;
        let t0 = self.times[index];
        let dt = self.times[next] - t0;
        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => T::interpolate_linear(self.value_at(index), self.value_at(next), t),
            InterpolationMode::CubicSpline => {
                let i0 = index * 3;
                let i1 = next * 3;
                T::interpolate_cubic(
                    self.values[i0 + 1],
                    self.values[i0 + 2],
                    self.values[i1],
                    self.values[i1 + 1],
                    t,
                    dt,
                )
            }
        }
    }
}
