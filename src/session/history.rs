use std::collections::{VecDeque, vec_deque};

use itertools::{Itertools, MinMaxResult};

pub const HISTORY_CAPACITY: usize = 120;
/// Upper bound for a configured window, one day of samples at one per second
pub const MAX_HISTORY_CAPACITY: usize = 24 * 60 * 60;

/// One point of the rolling graph window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    /// Seconds of running heat time when the sample was taken
    pub elapsed_s: u32,
    pub motor_temp_c: f32,
    pub battery_temp_c: f32,
    pub energy_ah: f32,
}

/// Fixed capacity window of samples. The oldest sample is evicted first.
#[derive(Clone, Debug)]
pub struct SampleHistory {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl SampleHistory {
    /// Creates an empty window holding between 1 and [`MAX_HISTORY_CAPACITY`]
    /// samples.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_HISTORY_CAPACITY);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> vec_deque::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn motor_temp_series(&self) -> Vec<[f64; 2]> {
        self.series(|s| s.motor_temp_c)
    }

    pub fn battery_temp_series(&self) -> Vec<[f64; 2]> {
        self.series(|s| s.battery_temp_c)
    }

    pub fn energy_series(&self) -> Vec<[f64; 2]> {
        self.series(|s| s.energy_ah)
    }

    /// Lowest and highest temperature across both sensors, used to frame the
    /// temperature plot.
    pub fn temperature_bounds(&self) -> Option<(f32, f32)> {
        let temps = self
            .samples
            .iter()
            .flat_map(|s| [s.motor_temp_c, s.battery_temp_c]);
        match temps.minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(t) => Some((t, t)),
            MinMaxResult::MinMax(min, max) => Some((min, max)),
        }
    }

    fn series(&self, value: impl Fn(&Sample) -> f32) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .map(|s| [s.elapsed_s as f64, value(s) as f64])
            .collect()
    }
}
