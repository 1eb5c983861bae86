//! `qn-core`: foundational types for the `rust_qn` queueing-network simulator.
//!
//! This crate is a dependency of every other `qn-*` crate.  It has no `qn-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `JobId`, `CenterId`, `ClassId`, `StreamId`                 |
//! | [`time`]        | `SimTime`, `SampleGrid`                                    |
//! | [`rng`]         | `VariateSource` trait, `StreamRng` (one stream per source) |
//! | [`config`]      | `NetworkConfig`, `FiniteConfig`, `BatchConfig`, `Scenario` |
//! | [`error`]       | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and config types.    |

pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    BatchConfig, CENTER_A, CENTER_B, CENTER_P, Destination, FiniteConfig, NetworkConfig, RouteRule,
    Scenario, StreamAssignment,
};
pub use error::{CoreError, CoreResult};
pub use ids::{CenterId, ClassId, JobId, StreamId};
pub use rng::{MeanVariates, StreamRng, VariateSource};
pub use time::{SampleGrid, SimTime};
