use qn_core::CoreError;
use qn_model::ModelError;
use qn_stats::StatsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("statistics error: {0}")]
    Stats(#[from] StatsError),

    #[error("agenda ran dry at t={0}")]
    Stalled(f64),
}

pub type SimResult<T> = Result<T, SimError>;
