//! The engine's output record.

use std::collections::BTreeMap;

use qn_core::{CenterId, SimTime};

/// Per-center estimates over one window.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CenterMetrics {
    pub center:         CenterId,
    pub name:           String,
    /// `busy_time / T`.
    pub utilization:    f64,
    /// `area / T`: time-average number of jobs present.
    pub avg_population: f64,
    /// Jobs present at the end of the window.
    pub in_service:     usize,
    /// `departures / T`.
    pub throughput:     f64,
    /// Mean total time a completed job spent here.
    pub response_time:  SimTime,
    /// Mean total service requirement a completed job brought here.
    pub demand:         f64,
    pub arrivals:       u64,
    pub departures:     u64,
}

/// Estimates for one sampling tick (finite horizon) or one batch.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricRecord {
    /// Sample tick, or the instant the batch closed.
    pub time:             SimTime,
    /// Length `T` of the observation window.
    pub window:           SimTime,
    pub completions:      u64,
    /// Mean end-to-end response time of jobs completed in the window.
    pub response_time:    SimTime,
    /// `completions / T`.
    pub throughput:       f64,
    /// Jobs in the system: instantaneous for finite-horizon samples,
    /// time-averaged for batches.
    pub n_system:         f64,
    /// `1 / max_i D_i`; `None` when nothing completed in the window.
    pub throughput_bound: Option<f64>,
    pub centers:          Vec<CenterMetrics>,
}

impl MetricRecord {
    pub fn center(&self, id: CenterId) -> Option<&CenterMetrics> {
        self.centers.iter().find(|c| c.center == id)
    }

    /// Flatten to `name → value`, e.g. `RT`, `Throughput`, `U_A`, `N_B`,
    /// `D_P`.  An undefined throughput bound is reported as 0.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        let mut m = BTreeMap::new();
        m.insert("RT".to_owned(), self.response_time);
        m.insert("Throughput".to_owned(), self.throughput);
        m.insert("N_system".to_owned(), self.n_system);
        m.insert("Completions".to_owned(), self.completions as f64);
        m.insert("Throughput_bound".to_owned(), self.throughput_bound.unwrap_or(0.0));
        for c in &self.centers {
            let n = &c.name;
            m.insert(format!("U_{n}"), c.utilization);
            m.insert(format!("N_{n}"), c.avg_population);
            m.insert(format!("Throughput_{n}"), c.throughput);
            m.insert(format!("RT_{n}"), c.response_time);
            m.insert(format!("D_{n}"), c.demand);
        }
        m
    }

    /// Look up one flattened metric by name.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.to_map().get(key).copied()
    }
}
