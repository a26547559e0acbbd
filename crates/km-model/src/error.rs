use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("unknown treatment arm: {0}")]
    UnknownTreatmentArm(String),
    #[error("unknown time unit: {0}")]
    UnknownTimeUnit(String),
    #[error("confidence level {0} must lie strictly between 0 and 1")]
    InvalidConfidenceLevel(f64),
}

pub type Result<T> = std::result::Result<T, ModelError>;
