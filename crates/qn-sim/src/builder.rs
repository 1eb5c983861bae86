//! Fluent builder for constructing a [`Sim`].

use std::collections::BTreeSet;
use std::marker::PhantomData;

use qn_core::{NetworkConfig, StreamRng, VariateSource};
use qn_model::{ModelError, RoutingTable};
use tracing::debug;

use crate::event::{Agenda, UnifiedAgenda};
use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim<V, A>`].
///
/// # Required inputs
///
/// - [`NetworkConfig`]: centers, classes, workload, routing, streams, seed
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                              |
/// |--------------------------|--------------------------------------|
/// | `.variates(v)`           | `StreamRng::new(config.seed)`        |
/// | `.replication(r)`        | none (the config seed is used as is) |
/// | `.agenda::<A>()`         | [`UnifiedAgenda`]                    |
/// | `.retain_completed(b)`   | `false`                              |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(NetworkConfig::web_app())
///     .agenda::<SplitAgenda>()
///     .build()?;
/// let samples = sim.run_until(14_400.0, 60.0, &mut NoopObserver)?;
/// ```
pub struct SimBuilder<V: VariateSource = StreamRng, A: Agenda = UnifiedAgenda> {
    config:           NetworkConfig,
    variates:         V,
    retain_completed: bool,
    agenda:           PhantomData<A>,
}

impl SimBuilder {
    pub fn new(config: NetworkConfig) -> Self {
        let variates = StreamRng::new(config.seed);
        Self {
            config,
            variates,
            retain_completed: false,
            agenda: PhantomData,
        }
    }
}

impl<A: Agenda> SimBuilder<StreamRng, A> {
    /// Draw from the partition of replication `replication` of a study
    /// seeded with the config seed.
    pub fn replication(mut self, replication: u64) -> Self {
        self.variates = StreamRng::for_replication(self.config.seed, replication);
        self
    }
}

impl<V: VariateSource, A: Agenda> SimBuilder<V, A> {
    /// Replace the variate source, e.g. with `MeanVariates` for exact timing.
    pub fn variates<V2: VariateSource>(self, variates: V2) -> SimBuilder<V2, A> {
        SimBuilder {
            config: self.config,
            variates,
            retain_completed: self.retain_completed,
            agenda: PhantomData,
        }
    }

    /// Pick the agenda layout.  Both layouts give identical runs.
    pub fn agenda<A2: Agenda>(self) -> SimBuilder<V, A2> {
        SimBuilder {
            config:           self.config,
            variates:         self.variates,
            retain_completed: self.retain_completed,
            agenda:           PhantomData,
        }
    }

    /// Keep every finished job (with its visit history) until the window
    /// closes or the caller takes them.
    pub fn retain_completed(mut self, retain: bool) -> Self {
        self.retain_completed = retain;
        self
    }

    /// Validate the configuration and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<V, A>> {
        let cfg = &self.config;

        // ── Dimensions ────────────────────────────────────────────────────
        if cfg.centers.is_empty() {
            return Err(SimError::Config("network has no centers".into()));
        }
        if cfg.classes.is_empty() {
            return Err(SimError::Config("network has no classes".into()));
        }
        if cfg.centers.len() > u16::MAX as usize || cfg.classes.len() > u8::MAX as usize {
            return Err(SimError::Config("too many centers or classes".into()));
        }
        if cfg.service_means.len() != cfg.center_count()
            || cfg.service_means.iter().any(|row| row.len() != cfg.class_count())
        {
            return Err(SimError::Config(format!(
                "service means must be {} x {}",
                cfg.center_count(),
                cfg.class_count()
            )));
        }

        // ── Workload ──────────────────────────────────────────────────────
        if !(cfg.arrival_rate > 0.0) || !cfg.arrival_rate.is_finite() {
            return Err(SimError::Config(format!(
                "arrival rate must be positive and finite, got {}",
                cfg.arrival_rate
            )));
        }
        for (c, row) in cfg.service_means.iter().enumerate() {
            for (k, mean) in row.iter().enumerate() {
                if let Some(m) = mean {
                    if !(*m > 0.0) || !m.is_finite() {
                        return Err(SimError::Config(format!(
                            "service mean for {} / {} must be positive and finite, got {m}",
                            cfg.centers[c], cfg.classes[k]
                        )));
                    }
                }
            }
        }

        // ── Streams ───────────────────────────────────────────────────────
        if cfg.streams.service.len() != cfg.center_count() {
            return Err(SimError::Config(format!(
                "expected {} service streams, got {}",
                cfg.center_count(),
                cfg.streams.service.len()
            )));
        }
        let mut seen = BTreeSet::new();
        seen.insert(cfg.streams.arrivals);
        for s in &cfg.streams.service {
            if !seen.insert(*s) {
                return Err(SimError::Config(format!("stream {s} assigned twice")));
            }
        }

        // ── Routing ───────────────────────────────────────────────────────
        let routing = RoutingTable::from_config(cfg)?;
        let reachable = routing.reachable()?;
        for &(center, class) in &reachable {
            if cfg.service_mean(center, class).is_none() {
                return Err(ModelError::MissingServiceMean { center, class }.into());
            }
        }
        debug!(
            centers = cfg.center_count(),
            classes = cfg.class_count(),
            reachable = reachable.len(),
            seed = cfg.seed,
            "network validated"
        );

        Ok(Sim::from_parts(self.config, routing, self.variates, self.retain_completed))
    }
}
