use std::collections::VecDeque;

pub const DEFAULT_WINDOW_SIZE: usize = 10;

/// Rolling average over the most recent speed readings.
#[derive(Clone, Debug)]
pub struct SpeedEstimator {
    window: VecDeque<f64>,
    capacity: usize,
}

impl SpeedEstimator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        SpeedEstimator {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Records a reading. Missing readings are ignored, as are negative or non-finite ones since some
    /// platforms report -1 when the speed is unknown.
    pub fn push(&mut self, speed: Option<f64>) {
        let Some(speed) = speed.filter(|speed| speed.is_finite() && *speed >= 0.0) else {
            return;
        };

        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(speed);
    }

    pub fn average(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }

        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

impl Default for SpeedEstimator {
    fn default() -> Self {
        SpeedEstimator::new(DEFAULT_WINDOW_SIZE)
    }
}
