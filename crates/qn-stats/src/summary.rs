//! Point estimates and 95% confidence intervals across replications or
//! batches.

use std::collections::BTreeMap;

use average::Variance;
use qn_core::SimTime;

use crate::{MetricRecord, StatsError, StatsResult};

/// Student-t 0.975 quantiles for 1..=30 degrees of freedom.
const T_975: [f64; 30] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228,
    2.201, 2.179, 2.160, 2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086,
    2.080, 2.074, 2.069, 2.064, 2.060, 2.056, 2.052, 2.048, 2.045, 2.042,
];

/// Two-sided 95% critical value for `df` degrees of freedom.  Between table
/// rows the smaller `df` is used, which widens the interval slightly.
pub fn t_critical_95(df: u64) -> f64 {
    match df {
        0 => f64::INFINITY,
        1..=30 => T_975[df as usize - 1],
        31..=39 => T_975[29],
        40..=59 => 2.021,
        60..=119 => 2.000,
        120..=999 => 1.980,
        _ => 1.960,
    }
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Sample mean with a 95% confidence half-width.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub n:          u64,
    pub mean:       f64,
    pub std_dev:    f64,
    pub half_width: f64,
}

impl Summary {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let v: Variance = values.into_iter().collect();
        let n = v.len();
        if n == 0 {
            return Self { n, mean: 0.0, std_dev: 0.0, half_width: 0.0 };
        }
        let std_dev = if n > 1 { v.sample_variance().max(0.0).sqrt() } else { 0.0 };
        let half_width = if n > 1 {
            t_critical_95(n - 1) * std_dev / (n as f64).sqrt()
        } else {
            0.0
        };
        Self { n, mean: v.mean(), std_dev, half_width }
    }

    pub fn lower(&self) -> f64 {
        self.mean - self.half_width
    }

    pub fn upper(&self) -> f64 {
        self.mean + self.half_width
    }

    /// Half-width relative to the mean (0 when the mean is 0).
    pub fn relative_precision(&self) -> f64 {
        if self.mean == 0.0 { 0.0 } else { self.half_width / self.mean.abs() }
    }
}

// ── Trajectory ────────────────────────────────────────────────────────────────

/// Mean trajectory of every metric over the shared sampling grid.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trajectory {
    pub times:        Vec<SimTime>,
    pub replications: usize,
    /// Metric name → one `Summary` per tick.
    pub series:       BTreeMap<String, Vec<Summary>>,
}

impl Trajectory {
    pub fn metric(&self, key: &str) -> Option<&[Summary]> {
        self.series.get(key).map(Vec::as_slice)
    }

    /// Summary at the last tick, typically the end of the horizon.
    pub fn last(&self, key: &str) -> Option<Summary> {
        self.series.get(key).and_then(|s| s.last()).copied()
    }
}

/// Average each metric across replications, tick by tick.
///
/// Every replication must have sampled the same grid.
pub fn aggregate_replications(runs: &[Vec<MetricRecord>]) -> StatsResult<Trajectory> {
    let first = runs.first().ok_or(StatsError::Empty)?;
    let expected = first.len();

    for (r, run) in runs.iter().enumerate() {
        if run.len() != expected {
            return Err(StatsError::Misaligned { replication: r, expected, got: run.len() });
        }
        for (i, (a, b)) in first.iter().zip(run).enumerate() {
            if a.time != b.time {
                return Err(StatsError::TickMismatch {
                    replication: r,
                    sample:      i,
                    expected:    a.time,
                    got:         b.time,
                });
            }
        }
    }

    let flat: Vec<Vec<BTreeMap<String, f64>>> = runs
        .iter()
        .map(|run| run.iter().map(MetricRecord::to_map).collect())
        .collect();

    let mut series: BTreeMap<String, Vec<Summary>> = BTreeMap::new();
    if let Some(sample0) = flat[0].first() {
        for key in sample0.keys() {
            let per_tick = (0..expected)
                .map(|i| {
                    Summary::from_values(
                        flat.iter().filter_map(|run| run[i].get(key).copied()),
                    )
                })
                .collect();
            series.insert(key.clone(), per_tick);
        }
    }

    Ok(Trajectory {
        times: first.iter().map(|r| r.time).collect(),
        replications: runs.len(),
        series,
    })
}

/// Summarize every metric over a set of records (batches, or the final
/// samples of independent replications).
pub fn summarize(records: &[MetricRecord]) -> BTreeMap<String, Summary> {
    let flat: Vec<BTreeMap<String, f64>> = records.iter().map(MetricRecord::to_map).collect();
    let mut out = BTreeMap::new();
    if let Some(first) = flat.first() {
        for key in first.keys() {
            let s = Summary::from_values(flat.iter().filter_map(|m| m.get(key).copied()));
            out.insert(key.clone(), s);
        }
    }
    out
}

// ── Autocorrelation ───────────────────────────────────────────────────────────

/// Lag-1 sample autocorrelation of a series of batch means.
///
/// Returns `None` for fewer than three values or a constant series.
pub fn lag1_autocorrelation(values: &[f64]) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }
    let mean = values.iter().copied().collect::<Variance>().mean();
    let denom: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
    if denom <= 0.0 {
        return None;
    }
    let numer: f64 = values
        .windows(2)
        .map(|w| (w[0] - mean) * (w[1] - mean))
        .sum();
    Some(numer / denom)
}
