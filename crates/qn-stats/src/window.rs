//! Building `MetricRecord`s from center state and the completion tally.
//!
//! Callers must have advanced every center to the window's end before
//! calling in here; these functions only read.

use qn_core::SimTime;
use qn_model::Center;

use crate::{CenterMetrics, CompletionTally, MetricRecord};

/// Finite-horizon sample labelled with grid tick `tick`.
///
/// The window runs from time 0 to `now` (the instant the sample is taken),
/// so rates divide by `now`.  `in_flight` is the instantaneous number of
/// jobs in the system.
pub fn finite_sample(
    tick:      SimTime,
    now:       SimTime,
    centers:   &[Center],
    tally:     &CompletionTally,
    in_flight: usize,
) -> MetricRecord {
    build(tick, now, centers, tally, in_flight as f64)
}

/// Batch record for a window of length `duration` ending at `end`.
///
/// No job waits outside a center, so the system population is the sum of
/// the centers' time-averaged populations.
pub fn batch_record(
    end:      SimTime,
    duration: SimTime,
    centers:  &[Center],
    tally:    &CompletionTally,
) -> MetricRecord {
    let area: f64 = centers.iter().map(Center::area).sum();
    build(end, duration, centers, tally, rate(area, duration))
}

fn build(
    time:     SimTime,
    window:   SimTime,
    centers:  &[Center],
    tally:    &CompletionTally,
    n_system: f64,
) -> MetricRecord {
    let done = tally.count();
    let centers = centers
        .iter()
        .map(|c| CenterMetrics {
            center:         c.id,
            name:           c.name.clone(),
            utilization:    rate(c.busy_time(), window),
            avg_population: rate(c.area(), window),
            in_service:     c.population(),
            throughput:     rate(c.departures() as f64, window),
            response_time:  tally.mean_residence(c.id),
            demand:         tally.demand(c.id),
            arrivals:       c.arrivals(),
            departures:     c.departures(),
        })
        .collect();

    MetricRecord {
        time,
        window,
        completions:      done,
        response_time:    tally.mean_response(),
        throughput:       rate(done as f64, window),
        n_system,
        throughput_bound: tally.throughput_bound(),
        centers,
    }
}

#[inline]
fn rate(amount: f64, window: SimTime) -> f64 {
    if window > 0.0 { amount / window } else { 0.0 }
}
