//! Configuration for cohort construction and survival estimation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Mean number of days in a month (365.25 / 12, rounded as in the pilot
/// study outputs). Used when converting `AVAL` days to months.
pub const DAYS_PER_MONTH: f64 = 30.4167;

/// A cohort with this many entries or fewer is reported as insufficient.
pub const INSUFFICIENT_COHORT_THRESHOLD: usize = 5;

/// An arm with this many entries or fewer is reported as insufficient.
/// The default only flags empty arms.
pub const INSUFFICIENT_ARM_THRESHOLD: usize = 0;

pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

pub const DEFAULT_STUDY_ID: &str = "CDISCPILOT01";

/// Unit of the analysis time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    /// `AVAL` as stored (days for the pilot study).
    Raw,
    /// `AVAL / DAYS_PER_MONTH`.
    #[default]
    Months,
}

impl TimeUnit {
    pub fn convert(&self, raw: f64) -> f64 {
        match self {
            TimeUnit::Raw => raw,
            TimeUnit::Months => raw / DAYS_PER_MONTH,
        }
    }

    /// Axis label for rendered output.
    pub fn axis_label(&self) -> &'static str {
        match self {
            TimeUnit::Raw => "Time (Days)",
            TimeUnit::Months => "Time (Months)",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeUnit::Raw => f.write_str("raw"),
            TimeUnit::Months => f.write_str("months"),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" | "days" => Ok(TimeUnit::Raw),
            "months" | "month" => Ok(TimeUnit::Months),
            _ => Err(ModelError::UnknownTimeUnit(s.to_string())),
        }
    }
}

/// How the `CNSR` indicator maps to "event observed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CensorConvention {
    /// ADaM BDS-TTE: `0` is an event, any positive value is a censoring
    /// (values above one encode the censoring reason).
    #[default]
    Adam,
    /// The indicator itself flags the event: non-zero means observed.
    EventFlag,
}

impl CensorConvention {
    /// Returns `None` for indicators that cannot be interpreted (negative,
    /// NaN), which the cohort builder treats as missing.
    pub fn event_occurred(&self, cnsr: f64) -> Option<bool> {
        if cnsr.is_nan() || cnsr < 0.0 {
            return None;
        }
        let nonzero = cnsr != 0.0;
        match self {
            CensorConvention::Adam => Some(!nonzero),
            CensorConvention::EventFlag => Some(nonzero),
        }
    }
}

/// Pointwise confidence-interval construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CiMethod {
    /// Exponential Greenwood interval on `ln(-ln S)`.
    #[default]
    LogLog,
    /// Linear interval `S ± z·SE`, clamped to [0, 1].
    Plain,
}

/// Options for building the analysis cohort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortOptions {
    pub study_id: String,
    /// Restrict events to one `PARAMCD`; all parameters when `None`.
    pub param_code: Option<String>,
    pub time_unit: TimeUnit,
    pub censor_convention: CensorConvention,
    /// See [`INSUFFICIENT_COHORT_THRESHOLD`].
    pub cohort_threshold: usize,
}

impl Default for CohortOptions {
    fn default() -> Self {
        Self::new(DEFAULT_STUDY_ID)
    }
}

impl CohortOptions {
    pub fn new(study_id: impl Into<String>) -> Self {
        Self {
            study_id: study_id.into(),
            param_code: None,
            time_unit: TimeUnit::default(),
            censor_convention: CensorConvention::default(),
            cohort_threshold: INSUFFICIENT_COHORT_THRESHOLD,
        }
    }

    #[must_use]
    pub fn with_param_code(mut self, code: Option<String>) -> Self {
        self.param_code = code;
        self
    }

    #[must_use]
    pub fn with_time_unit(mut self, unit: TimeUnit) -> Self {
        self.time_unit = unit;
        self
    }

    #[must_use]
    pub fn with_censor_convention(mut self, convention: CensorConvention) -> Self {
        self.censor_convention = convention;
        self
    }

    #[must_use]
    pub fn with_cohort_threshold(mut self, threshold: usize) -> Self {
        self.cohort_threshold = threshold;
        self
    }
}

/// Options for the product-limit estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorOptions {
    pub confidence_level: f64,
    pub ci_method: CiMethod,
}

impl Default for EstimatorOptions {
    fn default() -> Self {
        Self {
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            ci_method: CiMethod::default(),
        }
    }
}

impl EstimatorOptions {
    #[must_use]
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    #[must_use]
    pub fn with_ci_method(mut self, method: CiMethod) -> Self {
        self.ci_method = method;
        self
    }

    /// Reject levels outside the open interval (0, 1).
    pub fn validate(&self) -> Result<(), ModelError> {
        let level = self.confidence_level;
        if level.is_finite() && level > 0.0 && level < 1.0 {
            Ok(())
        } else {
            Err(ModelError::InvalidConfidenceLevel(level))
        }
    }
}

/// Options for assembling one curve per arm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveOptions {
    pub estimator: EstimatorOptions,
    /// See [`INSUFFICIENT_ARM_THRESHOLD`].
    pub arm_threshold: usize,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            estimator: EstimatorOptions::default(),
            arm_threshold: INSUFFICIENT_ARM_THRESHOLD,
        }
    }
}

impl CurveOptions {
    #[must_use]
    pub fn with_estimator(mut self, estimator: EstimatorOptions) -> Self {
        self.estimator = estimator;
        self
    }

    #[must_use]
    pub fn with_arm_threshold(mut self, threshold: usize) -> Self {
        self.arm_threshold = threshold;
        self
    }
}
