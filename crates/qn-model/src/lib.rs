//! `qn-model`: the passive state of a queueing network.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                       |
//! |---------------|----------------------------------------------------------------|
//! | [`job`]       | `Job` lifecycle record, `Visit` history entries                |
//! | [`center`]    | `Center`: egalitarian processor sharing with generation stamps |
//! | [`routing`]   | `RoutingTable`: `(center, class) → Destination`                |
//! | [`error`]     | `ModelError`, `ModelResult`                                    |
//!
//! Nothing here advances time on its own; the driver in `qn-sim` decides when
//! each operation happens.

pub mod center;
pub mod error;
pub mod job;
pub mod routing;

#[cfg(test)]
mod tests;

pub use center::Center;
pub use error::{ModelError, ModelResult};
pub use job::{Job, Visit};
pub use routing::RoutingTable;
