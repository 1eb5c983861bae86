use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("nothing to aggregate")]
    Empty,

    #[error("replication {replication} has {got} samples, expected {expected}")]
    Misaligned {
        replication: usize,
        expected:    usize,
        got:         usize,
    },

    #[error("replication {replication} sample {sample} is at t={got}, expected t={expected}")]
    TickMismatch {
        replication: usize,
        sample:      usize,
        expected:    f64,
        got:         f64,
    },
}

pub type StatsResult<T> = Result<T, StatsError>;
