//! Deterministic per-stream random variates.
//!
//! # Determinism strategy
//!
//! Every logical source of randomness (arrivals, service at each center) is
//! bound to its own `StreamId`, and each stream gets its own `SmallRng`
//! seeded by:
//!
//!   seed = run_seed XOR (stream_id * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive stream IDs uniformly across the seed space.
//! This means:
//!
//! - Streams never share state, so changing how often one source draws
//!   (e.g. a different mean service time at B) leaves every other source's
//!   sequence untouched.
//! - Stream selection is explicit at every call site; nothing depends on
//!   container iteration order.
//! - Replications derive their run seed from `(master_seed, replication)`
//!   alone, so they may run in any order, or in parallel, and still match.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{CoreError, CoreResult, StreamId};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Odd constant used to separate replication partitions from stream ids.
const REPLICATION_CONSTANT: u64 = 0xbf58_476d_1ce4_e5b9;

// ── VariateSource ─────────────────────────────────────────────────────────────

/// The sampling capability the engine consumes.
///
/// Implementations must reject non-positive (or NaN) parameters instead of
/// clamping them, and must be reproducible: re-creating the source with the
/// same seed and replaying the same sequence of stream selections yields the
/// same values.
pub trait VariateSource {
    /// Exponential sample with the given `mean`, drawn from `stream`.
    fn sample_exponential(&mut self, mean: f64, stream: StreamId) -> CoreResult<f64>;

    /// Exponential interarrival time for arrivals at `rate` per second.
    fn sample_interarrival(&mut self, rate: f64, stream: StreamId) -> CoreResult<f64>;
}

#[inline]
fn check_mean(mean: f64, stream: StreamId) -> CoreResult<()> {
    // `!(x > 0)` also rejects NaN.
    if !(mean > 0.0) {
        return Err(CoreError::InvalidMean { mean, stream });
    }
    Ok(())
}

#[inline]
fn check_rate(rate: f64, stream: StreamId) -> CoreResult<()> {
    if !(rate > 0.0) {
        return Err(CoreError::InvalidRate { rate, stream });
    }
    Ok(())
}

// ── StreamRng ─────────────────────────────────────────────────────────────────

/// One independent `SmallRng` per stream id, created lazily on first use.
///
/// Used only from the single driver thread of one run.  Parallel replications
/// each own their own `StreamRng` built by [`StreamRng::for_replication`].
#[derive(Clone, Debug)]
pub struct StreamRng {
    seed:    u64,
    streams: BTreeMap<StreamId, SmallRng>,
}

impl StreamRng {
    /// Streams for a single run seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            streams: BTreeMap::new(),
        }
    }

    /// Streams for replication `replication` of a study seeded with
    /// `master_seed`.  Distinct replications get distinct partitions.
    pub fn for_replication(master_seed: u64, replication: u64) -> Self {
        let mixed = master_seed ^ replication.wrapping_add(1).wrapping_mul(REPLICATION_CONSTANT);
        let run_seed: u64 = SmallRng::seed_from_u64(mixed).r#gen();
        Self::new(run_seed)
    }

    /// The run seed all streams derive from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform sample in `[0, 1)` from `stream`.
    #[inline]
    pub fn uniform(&mut self, stream: StreamId) -> f64 {
        let seed = self.seed;
        self.streams
            .entry(stream)
            .or_insert_with(|| {
                SmallRng::seed_from_u64(seed ^ (stream.0 as u64).wrapping_mul(MIXING_CONSTANT))
            })
            .r#gen::<f64>()
    }
}

impl VariateSource for StreamRng {
    fn sample_exponential(&mut self, mean: f64, stream: StreamId) -> CoreResult<f64> {
        check_mean(mean, stream)?;
        // Inverse transform; 1 - U lies in (0, 1] so the log is finite.
        Ok(-mean * (1.0 - self.uniform(stream)).ln())
    }

    fn sample_interarrival(&mut self, rate: f64, stream: StreamId) -> CoreResult<f64> {
        check_rate(rate, stream)?;
        self.sample_exponential(1.0 / rate, stream)
    }
}

// ── MeanVariates ──────────────────────────────────────────────────────────────

/// A degenerate source that returns every mean exactly.
///
/// Handy for tracing the visit sequence of a handful of jobs by hand, and for
/// tests that need exact event times.  `interarrival` overrides `1 / rate`
/// when set.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeanVariates {
    pub interarrival: Option<f64>,
}

impl VariateSource for MeanVariates {
    fn sample_exponential(&mut self, mean: f64, stream: StreamId) -> CoreResult<f64> {
        check_mean(mean, stream)?;
        Ok(mean)
    }

    fn sample_interarrival(&mut self, rate: f64, stream: StreamId) -> CoreResult<f64> {
        check_rate(rate, stream)?;
        Ok(self.interarrival.unwrap_or(1.0 / rate))
    }
}
