//! Network topology, workload, and run-mode configuration.
//!
//! These are plain data: the application builds (or deserializes) them and
//! hands them to `qn_sim::SimBuilder`, which validates them before a run.

use crate::{CenterId, ClassId, SimTime, StreamId};

// ── Routing vocabulary ────────────────────────────────────────────────────────

/// Where a job goes after finishing a visit.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Destination {
    /// Admit to another center, keeping the current class.
    Center(CenterId),
    /// Advance to the next class and re-enter at the entry center.
    ClassSwitch,
    /// Leave the network.
    Sink,
}

/// One row of the routing table: a job of `class` finishing at `center`
/// moves to `next`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteRule {
    pub center: CenterId,
    pub class:  ClassId,
    pub next:   Destination,
}

/// Which random stream each logical source draws from.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamAssignment {
    /// Interarrival times.
    pub arrivals: StreamId,
    /// Service requirements, indexed by `CenterId`.
    pub service:  Vec<StreamId>,
}

// ── NetworkConfig ─────────────────────────────────────────────────────────────

/// The modeled system: centers, classes, workload, and topology.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkConfig {
    /// Center names; position is the `CenterId`.
    pub centers: Vec<String>,

    /// Ordered class sequence; position is the `ClassId`.  A class switch
    /// moves a job one step along this list.
    pub classes: Vec<String>,

    /// Center where arrivals and class-switched jobs are admitted.
    pub entry: CenterId,

    /// External arrivals per second (Poisson).
    pub arrival_rate: f64,

    /// Mean service requirement, indexed `[center][class]`.  `None` marks a
    /// pair the routing never produces.
    pub service_means: Vec<Vec<Option<f64>>>,

    /// Routing table rows.  Every reachable `(center, class)` pair needs one.
    pub routes: Vec<RouteRule>,

    pub streams: StreamAssignment,

    /// Master seed.  The same seed always produces identical results.
    pub seed: u64,
}

/// Center ids of the web-application network.
pub const CENTER_A: CenterId = CenterId(0);
pub const CENTER_B: CenterId = CenterId(1);
pub const CENTER_P: CenterId = CenterId(2);

impl NetworkConfig {
    /// The three-center web application: every request visits A three
    /// times (once per class), B once as `Class1`, and P once as `Class2`.
    ///
    /// ```text
    /// arrive → A(C1) → B(C1) → switch → A(C2) → P(C2) → switch → A(C3) → sink
    /// ```
    pub fn web_app() -> Self {
        let c1 = ClassId(0);
        let c2 = ClassId(1);
        let c3 = ClassId(2);
        Self {
            centers:       vec!["A".into(), "B".into(), "P".into()],
            classes:       vec!["Class1".into(), "Class2".into(), "Class3".into()],
            entry:         CENTER_A,
            arrival_rate:  1.2,
            service_means: vec![
                vec![Some(0.2), Some(0.4), Some(0.1)],
                vec![Some(0.8), None, None],
                vec![None, Some(0.4), None],
            ],
            routes: vec![
                RouteRule { center: CENTER_A, class: c1, next: Destination::Center(CENTER_B) },
                RouteRule { center: CENTER_B, class: c1, next: Destination::ClassSwitch },
                RouteRule { center: CENTER_A, class: c2, next: Destination::Center(CENTER_P) },
                RouteRule { center: CENTER_P, class: c2, next: Destination::ClassSwitch },
                RouteRule { center: CENTER_A, class: c3, next: Destination::Sink },
            ],
            streams: StreamAssignment {
                arrivals: StreamId(0),
                service:  vec![StreamId(1), StreamId(2), StreamId(3)],
            },
            seed: 12_345,
        }
    }

    /// The web application under one of the named workload scenarios.
    pub fn scenario(scenario: Scenario) -> Self {
        let mut cfg = Self::web_app();
        match scenario {
            Scenario::Light1Fa => {}
            Scenario::Heavy1Fa => cfg.arrival_rate = 1.4,
            Scenario::TwoFa => {
                cfg.service_means[CENTER_A.index()][2] = Some(0.15);
                cfg.service_means[CENTER_P.index()][1] = Some(0.7);
            }
            Scenario::FasterB => cfg.service_means[CENTER_B.index()][0] = Some(0.4),
        }
        cfg
    }

    #[inline]
    pub fn center_count(&self) -> usize {
        self.centers.len()
    }

    #[inline]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Mean service requirement for `class` at `center`, if configured.
    pub fn service_mean(&self, center: CenterId, class: ClassId) -> Option<f64> {
        self.service_means
            .get(center.index())
            .and_then(|row| row.get(class.index()))
            .copied()
            .flatten()
    }

    /// Look up a center by name.
    pub fn center_id(&self, name: &str) -> Option<CenterId> {
        self.centers
            .iter()
            .position(|c| c == name)
            .and_then(|i| CenterId::try_from(i).ok())
    }

    /// Display name of `center` (falls back to the numeric id).
    pub fn center_name(&self, center: CenterId) -> String {
        self.centers
            .get(center.index())
            .cloned()
            .unwrap_or_else(|| center.to_string())
    }

    /// Display name of `class` (falls back to the numeric id).
    pub fn class_name(&self, class: ClassId) -> String {
        self.classes
            .get(class.index())
            .cloned()
            .unwrap_or_else(|| class.to_string())
    }
}

/// Named workload variants of the web application.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scenario {
    /// Baseline single-factor authentication at λ = 1.2.
    Light1Fa,
    /// Baseline demands at λ = 1.4, beyond the B bottleneck bound of 1.25.
    Heavy1Fa,
    /// Two-factor authentication: heavier A/Class3 and P/Class2 visits.
    TwoFa,
    /// Upgraded B with half the Class1 service time.
    FasterB,
}

// ── Run modes ─────────────────────────────────────────────────────────────────

/// Replicated finite-horizon run.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FiniteConfig {
    /// Simulated seconds per replication.
    pub stop_time:    SimTime,
    /// Width of the sampling grid.
    pub sample_step:  SimTime,
    /// Independent replications.
    pub replications: u64,
}

impl Default for FiniteConfig {
    fn default() -> Self {
        Self {
            stop_time:    4.0 * 3_600.0,
            sample_step:  60.0,
            replications: 128,
        }
    }
}

/// Infinite-horizon batch-means run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchConfig {
    /// Number of batches (`k`).
    pub batches:      u64,
    /// Completions per batch (`b`).
    pub batch_size:   u64,
    /// Also require this many arrivals per batch before closing it.
    pub min_arrivals: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batches:      128,
            batch_size:   8_192,
            min_arrivals: None,
        }
    }
}
