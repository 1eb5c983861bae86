//! Running sums over the jobs completed in the current window.
//!
//! Keeping sums instead of re-scanning the completed jobs makes every
//! sample O(centers) no matter how long the run has been going.

use qn_core::{CenterId, SimTime};
use qn_model::Job;

#[derive(Clone, Debug, Default)]
pub struct CompletionTally {
    count:         u64,
    response_sum:  SimTime,
    residence_sum: Vec<SimTime>,
    requested_sum: Vec<f64>,
}

impl CompletionTally {
    pub fn new(centers: usize) -> Self {
        Self {
            count:         0,
            response_sum:  0.0,
            residence_sum: vec![0.0; centers],
            requested_sum: vec![0.0; centers],
        }
    }

    /// Fold one finished job into the window.
    pub fn record(&mut self, job: &Job) {
        debug_assert!(job.finish.is_some(), "tallying unfinished job {}", job.id);
        self.count += 1;
        self.response_sum += job.response_time().unwrap_or(0.0);
        for (i, slot) in self.residence_sum.iter_mut().enumerate() {
            *slot += job.residence_at(center(i));
        }
        for (i, slot) in self.requested_sum.iter_mut().enumerate() {
            *slot += job.requested_at(center(i));
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.response_sum = 0.0;
        self.residence_sum.iter_mut().for_each(|s| *s = 0.0);
        self.requested_sum.iter_mut().for_each(|s| *s = 0.0);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn centers(&self) -> usize {
        self.residence_sum.len()
    }

    /// Mean end-to-end response time, 0 when nothing completed.
    pub fn mean_response(&self) -> SimTime {
        self.per_job(self.response_sum)
    }

    /// Mean total time a completed job spent at `center`.
    pub fn mean_residence(&self, center: CenterId) -> SimTime {
        self.per_job(self.residence_sum.get(center.index()).copied().unwrap_or(0.0))
    }

    /// Service demand `D_i`: mean total service requirement a completed job
    /// brought to `center`, summed over its visits.
    pub fn demand(&self, center: CenterId) -> f64 {
        self.per_job(self.requested_sum.get(center.index()).copied().unwrap_or(0.0))
    }

    /// `1 / max_i D_i`, or `None` when nothing completed.
    pub fn throughput_bound(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        let d_max = (0..self.centers())
            .map(|i| self.demand(center(i)))
            .fold(0.0, f64::max);
        (d_max > 0.0).then(|| 1.0 / d_max)
    }

    #[inline]
    fn per_job(&self, sum: f64) -> f64 {
        if self.count == 0 { 0.0 } else { sum / self.count as f64 }
    }
}

#[inline]
fn center(i: usize) -> CenterId {
    CenterId(i as u16)
}
