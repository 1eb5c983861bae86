//! Infinite-horizon studies built on chained batches: batch means, the
//! batch-size search, and the throughput-versus-arrival-rate sweep.

use std::collections::BTreeMap;

use qn_core::{BatchConfig, NetworkConfig, VariateSource};
use qn_stats::{MetricRecord, Summary, lag1_autocorrelation, summarize};
use tracing::info;

use crate::event::Agenda;
use crate::{NoopObserver, Sim, SimBuilder, SimError, SimObserver, SimResult};

/// Candidates are accepted once `|r1|` of their batch means drops below this.
pub const DEFAULT_LAG1_THRESHOLD: f64 = 0.2;

/// Output of one batch-means run.
#[derive(Clone, Debug)]
pub struct BatchStudy {
    /// One record per batch, in order.
    pub records: Vec<MetricRecord>,
    /// Metric name → summary over batches.
    pub summary: BTreeMap<String, Summary>,
}

impl BatchStudy {
    pub fn metric(&self, key: &str) -> Option<Summary> {
        self.summary.get(key).copied()
    }

    /// Per-batch series of one flattened metric.
    pub fn series(&self, key: &str) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.get(key)).collect()
    }
}

/// Close `batch.batches` chained batches on an existing sim.
pub fn run_batches<V: VariateSource, A: Agenda, O: SimObserver>(
    sim:      &mut Sim<V, A>,
    batch:    &BatchConfig,
    observer: &mut O,
) -> SimResult<BatchStudy> {
    if batch.batches == 0 {
        return Err(SimError::Config("at least one batch is required".into()));
    }
    let mut records = Vec::with_capacity(batch.batches as usize);
    for _ in 0..batch.batches {
        records.push(sim.run_batch(batch, observer)?.record);
    }
    let summary = summarize(&records);
    Ok(BatchStudy { records, summary })
}

/// Batch means on a fresh network seeded with `config.seed`.
pub fn batch_means<A: Agenda>(config: &NetworkConfig, batch: &BatchConfig) -> SimResult<BatchStudy> {
    info!(
        batches = batch.batches,
        batch_size = batch.batch_size,
        arrival_rate = config.arrival_rate,
        "starting batch means"
    );
    let mut sim = SimBuilder::new(config.clone()).agenda::<A>().build()?;
    let study = run_batches(&mut sim, batch, &mut NoopObserver)?;
    info!(
        completions = batch.batches * batch.batch_size,
        duration = sim.now(),
        "batch means finished"
    );
    Ok(study)
}

// ── Batch-size search ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct BatchSizeCandidate {
    pub batch_size:    u64,
    /// Mean response time of each batch.
    pub batch_rts:     Vec<f64>,
    /// Lag-1 autocorrelation of `batch_rts`; `None` if undefined.
    pub lag1:          Option<f64>,
}

impl BatchSizeCandidate {
    pub fn accepted(&self, threshold: f64) -> bool {
        self.lag1.is_some_and(|r| r.abs() < threshold)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchSizeSearch {
    /// In ascending batch-size order.
    pub candidates:  Vec<BatchSizeCandidate>,
    /// Smallest accepted batch size.
    pub recommended: Option<u64>,
}

/// Run `batches` chained batches for every candidate size, each from a fresh
/// network with the config seed, and recommend the smallest size whose
/// per-batch response times have `|r1| < threshold`.
pub fn search_batch_size<A: Agenda>(
    config:     &NetworkConfig,
    batches:    u64,
    sizes:      &[u64],
    threshold:  f64,
) -> SimResult<BatchSizeSearch> {
    if sizes.is_empty() {
        return Err(SimError::Config("no candidate batch sizes".into()));
    }
    let mut sizes = sizes.to_vec();
    sizes.sort_unstable();
    sizes.dedup();

    let evaluate = |b: u64| -> SimResult<BatchSizeCandidate> {
        let target = BatchConfig { batches, batch_size: b, min_arrivals: None };
        let mut sim = SimBuilder::new(config.clone()).agenda::<A>().build()?;
        let study = run_batches(&mut sim, &target, &mut NoopObserver)?;
        let batch_rts: Vec<f64> = study.records.iter().map(|r| r.response_time).collect();
        let lag1 = lag1_autocorrelation(&batch_rts);
        info!(batch_size = b, ?lag1, "batch size evaluated");
        Ok(BatchSizeCandidate { batch_size: b, batch_rts, lag1 })
    };

    #[cfg(not(feature = "parallel"))]
    let candidates = sizes.iter().map(|&b| evaluate(b)).collect::<SimResult<Vec<_>>>()?;

    #[cfg(feature = "parallel")]
    let candidates = {
        use rayon::prelude::*;

        sizes.par_iter().map(|&b| evaluate(b)).collect::<SimResult<Vec<_>>>()?
    };

    let recommended = candidates
        .iter()
        .find(|c| c.accepted(threshold))
        .map(|c| c.batch_size);
    Ok(BatchSizeSearch { candidates, recommended })
}

// ── Arrival-rate sweep ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SweepPoint {
    pub arrival_rate:     f64,
    pub throughput:       Summary,
    pub throughput_bound: Summary,
    pub response_time:    Summary,
}

/// Batch means at each arrival rate in `rates`, all other parameters fixed.
pub fn sweep_arrival_rate<A: Agenda>(
    config: &NetworkConfig,
    batch:  &BatchConfig,
    rates:  &[f64],
) -> SimResult<Vec<SweepPoint>> {
    rates
        .iter()
        .map(|&rate| {
            let mut cfg = config.clone();
            cfg.arrival_rate = rate;
            let study = batch_means::<A>(&cfg, batch)?;
            let pick = |key: &str| study.metric(key).unwrap_or_else(|| Summary::from_values([]));
            Ok(SweepPoint {
                arrival_rate:     rate,
                throughput:       pick("Throughput"),
                throughput_bound: pick("Throughput_bound"),
                response_time:    pick("RT"),
            })
        })
        .collect()
}
