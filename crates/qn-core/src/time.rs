//! Simulation time and the fixed sampling grid.
//!
//! Time is continuous: a `SimTime` is a count of simulated seconds since the
//! start of the run.  Event ordering never compares raw floats with `<`;
//! the agenda uses `f64::total_cmp` so ordering is total and deterministic.

/// Simulated seconds since the start of a run.
pub type SimTime = f64;

/// Fixed-width tick grid `0, step, 2·step, …` up to and including `stop`.
///
/// Every replication of a finite-horizon run derives its ticks from the same
/// grid, so sample `i` of one replication lines up with sample `i` of any
/// other.  Tick `i` is computed as `i * step` rather than by repeated
/// addition, keeping ticks identical across replications and free of drift.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampleGrid {
    step: SimTime,
    stop: SimTime,
    next: u64,
}

impl SampleGrid {
    /// Create a grid.  `step` must be positive; `Sim::run_until` checks it.
    pub fn new(step: SimTime, stop: SimTime) -> Self {
        Self { step, stop, next: 0 }
    }

    /// Number of ticks the grid holds in total.
    pub fn len(&self) -> usize {
        if self.step <= 0.0 || self.stop < 0.0 {
            return 0;
        }
        (self.stop / self.step).floor() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The next tick not yet taken, or `None` once past `stop`.
    #[inline]
    pub fn peek(&self) -> Option<SimTime> {
        let t = self.next as f64 * self.step;
        (self.step > 0.0 && t <= self.stop).then_some(t)
    }

    /// Take the next tick if it is due at or before `now`.
    #[inline]
    pub fn take_due(&mut self, now: SimTime) -> Option<SimTime> {
        let t = self.peek()?;
        if t <= now {
            self.next += 1;
            Some(t)
        } else {
            None
        }
    }

    /// Index of the next tick to be taken.
    pub fn taken(&self) -> u64 {
        self.next
    }

    /// All tick times, in order.
    pub fn ticks(&self) -> Vec<SimTime> {
        (0..self.len()).map(|i| i as f64 * self.step).collect()
    }
}
