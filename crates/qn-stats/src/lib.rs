//! `qn-stats`: turning simulated sample paths into estimates.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                        |
//! |---------------|-----------------------------------------------------------------|
//! | [`tally`]     | `CompletionTally`: running sums over jobs completed in a window |
//! | [`record`]    | `MetricRecord`, `CenterMetrics`, flattening to named metrics    |
//! | [`window`]    | Finite-horizon samples and batch-window records                 |
//! | [`summary`]   | `Summary`, `Trajectory`, replication/batch aggregation, lag-1 r |
//! | [`error`]     | `StatsError`, `StatsResult`                                     |
//!
//! # Degenerate windows
//!
//! A window with no completions reports response times, demands, and the
//! throughput bound as 0.  A window of zero length reports every rate as 0.
//! Neither is an error.

pub mod error;
pub mod record;
pub mod summary;
pub mod tally;
pub mod window;


pub use error::{StatsError, StatsResult};
pub use record::{CenterMetrics, MetricRecord};
pub use summary::{Summary, Trajectory, aggregate_replications, lag1_autocorrelation, summarize};
pub use tally::CompletionTally;
pub use window::{batch_record, finite_sample};
