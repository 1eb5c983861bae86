//! Simulation observer trait for progress reporting and data collection.

use qn_core::{CenterId, JobId, SimTime};
use qn_model::Job;
use qn_stats::MetricRecord;

/// Callbacks invoked by the [`Sim`][crate::Sim] event loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: completion counter
///
/// ```rust,ignore
/// struct Completions(u64);
///
/// impl SimObserver for Completions {
///     fn on_completion(&mut self, _job: &Job) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait SimObserver {
    /// A new job entered the network.
    fn on_arrival(&mut self, _job: JobId, _time: SimTime) {}

    /// `job` finished a visit at `center` (before routing).
    fn on_departure(&mut self, _center: CenterId, _job: JobId, _time: SimTime) {}

    /// A superseded departure event was popped and discarded.
    fn on_stale(&mut self, _center: CenterId, _generation: u64, _time: SimTime) {}

    /// `job` reached the sink.
    fn on_completion(&mut self, _job: &Job) {}

    /// A finite-horizon sample was taken.
    fn on_sample(&mut self, _record: &MetricRecord) {}

    /// Batch `index` closed.
    fn on_batch_end(&mut self, _index: u64, _record: &MetricRecord) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
