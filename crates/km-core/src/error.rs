//! Error types for survival estimation.

use km_model::{InsufficientData, ModelError};
use thiserror::Error;

/// Errors raised by the cohort builder, estimator and exporters.
#[derive(Debug, Error)]
pub enum KmError {
    /// The cohort is too small to estimate anything. Recoverable: callers
    /// report it to the user instead of aborting.
    #[error("{0}")]
    InsufficientData(InsufficientData),

    /// A joined subject carries a negative or infinite time value.
    #[error("invalid time value {value} for subject {usubjid}")]
    InvalidSubjectTime { usubjid: String, value: f64 },

    /// The estimator received a negative or non-finite time.
    #[error("invalid time value {value}: times must be finite and non-negative")]
    InvalidTime { value: f64 },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("failed to write curves: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl KmError {
    /// True for expected data-quality outcomes that callers should surface
    /// as a message rather than a failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, KmError::InsufficientData(_))
    }

    pub fn insufficient_data(&self) -> Option<&InsufficientData> {
        match self {
            KmError::InsufficientData(data) => Some(data),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, KmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_insufficient_data_is_recoverable() {
        let insufficient = KmError::InsufficientData(InsufficientData::cohort(2, 5));
        assert!(insufficient.is_recoverable());
        assert_eq!(insufficient.insufficient_data().map(|d| d.observed), Some(2));

        let invalid = KmError::InvalidTime { value: -1.0 };
        assert!(!invalid.is_recoverable());
        assert!(invalid.insufficient_data().is_none());
    }

    #[test]
    fn error_display() {
        let err = KmError::InvalidSubjectTime {
            usubjid: "01-701-1015".to_string(),
            value: -3.0,
        };
        assert_eq!(err.to_string(), "invalid time value -3 for subject 01-701-1015");
    }
}
