//! Independent replications of a finite-horizon run.
//!
//! Replication `r` builds a fresh [`Sim`] whose streams come from
//! `StreamRng::for_replication(seed, r)`, so every replication is
//! self-contained and the study gives the same numbers whether replications
//! run one after another or (with the `parallel` feature) on Rayon's pool.

use qn_core::{FiniteConfig, NetworkConfig};
use qn_stats::{MetricRecord, Trajectory, aggregate_replications};
use tracing::{debug, info};

use crate::event::Agenda;
use crate::{SimBuilder, SimError, SimObserver, SimResult};

/// Run replication `replication` to `finite.stop_time` and return its
/// samples, one per grid tick.
pub fn run_replication<A: Agenda, O: SimObserver>(
    config:      &NetworkConfig,
    finite:      &FiniteConfig,
    replication: u64,
    observer:    &mut O,
) -> SimResult<Vec<MetricRecord>> {
    let mut sim = SimBuilder::new(config.clone())
        .replication(replication)
        .agenda::<A>()
        .build()?;
    let samples = sim.run_until(finite.stop_time, finite.sample_step, observer)?;
    debug!(
        replication,
        jobs = sim.jobs_created(),
        completions = sim.tally().count(),
        "replication finished"
    );
    Ok(samples)
}

/// Run `finite.replications` replications and summarize every metric at
/// every grid tick across them.
pub fn replicate<A: Agenda>(
    config: &NetworkConfig,
    finite: &FiniteConfig,
) -> SimResult<Trajectory> {
    if finite.replications == 0 {
        return Err(SimError::Config("at least one replication is required".into()));
    }
    info!(
        replications = finite.replications,
        stop_time = finite.stop_time,
        step = finite.sample_step,
        "starting replications"
    );

    #[cfg(not(feature = "parallel"))]
    let runs = (0..finite.replications)
        .map(|r| run_replication::<A, _>(config, finite, r, &mut crate::NoopObserver))
        .collect::<SimResult<Vec<_>>>()?;

    #[cfg(feature = "parallel")]
    let runs = {
        use rayon::prelude::*;

        (0..finite.replications)
            .into_par_iter()
            .map(|r| run_replication::<A, _>(config, finite, r, &mut crate::NoopObserver))
            .collect::<SimResult<Vec<_>>>()?
    };

    Ok(aggregate_replications(&runs)?)
}
