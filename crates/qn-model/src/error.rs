use qn_core::{CenterId, ClassId, CoreError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("no route for {class} finishing at {center}")]
    Unroutable { center: CenterId, class: ClassId },

    #[error("no mean service time for {class} at {center}")]
    MissingServiceMean { center: CenterId, class: ClassId },

    #[error("class switch past the last class (from {class})")]
    ClassOverflow { class: ClassId },

    #[error("unknown center {0}")]
    UnknownCenter(CenterId),

    #[error("unknown class {0}")]
    UnknownClass(ClassId),

    #[error("invalid routing table: {0}")]
    InvalidRoute(String),

    #[error("no route from the entry center ever reaches the sink")]
    NoSink,

    #[error("sampling failed: {0}")]
    Sampling(#[from] CoreError),
}

pub type ModelResult<T> = Result<T, ModelError>;
