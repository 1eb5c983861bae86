//! `qn-sim`: discrete-event driver for the rust_qn simulator.
//!
//! # Event loop
//!
//! ```text
//! loop:
//!   ① Pop       earliest event; arrivals win ties with departures.
//!   ② Advance   every center progresses to the event time.
//!   ③ Dispatch  Arrival   → new job admitted at the entry center,
//!                           next arrival scheduled.
//!               Departure → stale generation: dropped.
//!                           otherwise: job removed, center rescheduled,
//!                           job routed to a center, a class switch, or
//!                           the sink.
//! ```
//!
//! # Run modes
//!
//! | Entry point                  | Stop condition                             |
//! |------------------------------|--------------------------------------------|
//! | [`Sim::run_until`]           | next event beyond the stop time            |
//! | [`Sim::run_batch`]           | `b` completions (and optional arrivals)    |
//! | [`replicate`]                | `R` fresh runs to the stop time            |
//! | [`batch_means`]              | `k` chained batches                        |
//! | [`search_batch_size`]        | `k` batches for each candidate `b`         |
//! | [`sweep_arrival_rate`]       | batch means at each arrival rate           |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Replications and batch-size candidates on Rayon's pool.   |
//! | `serde`    | Forwards `serde` to `qn-core`, `qn-model`, `qn-stats`.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use qn_core::NetworkConfig;
//! use qn_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(NetworkConfig::web_app()).build()?;
//! let samples = sim.run_until(14_400.0, 60.0, &mut NoopObserver)?;
//! println!("RT at the horizon: {}", samples.last().unwrap().response_time);
//! ```

pub mod batch;
pub mod builder;
pub mod error;
pub mod event;
pub mod observer;
pub mod replicate;
pub mod sim;


pub use batch::{
    BatchSizeCandidate, BatchSizeSearch, BatchStudy, DEFAULT_LAG1_THRESHOLD, SweepPoint,
    batch_means, run_batches, search_batch_size, sweep_arrival_rate,
};
pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use event::{Agenda, Event, EventKind, SplitAgenda, UnifiedAgenda};
pub use observer::{NoopObserver, SimObserver};
pub use replicate::{replicate, run_replication};
pub use sim::{Batch, Sim};
