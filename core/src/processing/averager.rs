use crate::prelude::SweepFrame;

/// Running mean over the sweeps of the current batch.
///
/// Each sweep is blended in with weight `1 / (1 + sweeps_since_mean)`, which
/// yields the exact arithmetic mean of the batch without buffering sweeps.
pub struct Averager {
    current_mean: SweepFrame,
    sweeps_since_mean: u32,
    nbr_average: f64,
}

impl Averager {
    pub fn new(data_length: usize, nbr_average: f64) -> Self {
        Self {
            current_mean: vec![0.0; data_length],
            sweeps_since_mean: 0,
            nbr_average,
        }
    }

    /// Changes the batch size; the batch in progress is kept.
    pub fn set_batch_size(&mut self, nbr_average: f64) {
        self.nbr_average = nbr_average;
    }

    pub fn accumulate(&mut self, sweep: &[f64]) {
        let weight = 1.0 / (1.0 + self.sweeps_since_mean as f64);
        for (mean, &sample) in self.current_mean.iter_mut().zip(sweep) {
            *mean = weight * sample + (1.0 - weight) * *mean;
        }
        self.sweeps_since_mean += 1;
    }

    pub fn current_mean(&self) -> &[f64] {
        &self.current_mean
    }

    pub fn sweeps_since_mean(&self) -> u32 {
        self.sweeps_since_mean
    }

    pub fn is_batch_complete(&self) -> bool {
        self.sweeps_since_mean as f64 >= self.nbr_average
    }

    /// Hands out the finished mean and starts a new batch, if the batch is full.
    pub fn take_completed(&mut self) -> Option<SweepFrame> {
        if !self.is_batch_complete() {
            return None;
        }
        let fresh = vec![0.0; self.current_mean.len()];
        self.sweeps_since_mean = 0;
        Some(std::mem::replace(&mut self.current_mean, fresh))
    }
}
