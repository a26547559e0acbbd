//! Survival-curve estimation engine.
//!
//! The pipeline has three stages, each usable on its own:
//!
//! 1. [`CohortBuilder`] joins subject-level and time-to-event records for one
//!    study and derives `(time, event_occurred)` per subject.
//! 2. [`KaplanMeierEstimator`] turns one group's pairs into a product-limit
//!    survival function with Greenwood standard errors and pointwise bounds.
//! 3. [`CurveAssembler`] runs the estimator once per treatment arm.
//!
//! Everything is synchronous and allocation-local: no state is shared between
//! calls, so independent requests can run concurrently.
//!
//! # Example
//!
//! ```
//! use km_core::{CurveAssembler, build_cohort};
//! use km_model::{CohortOptions, CurveOptions, EventRecord, SubjectRecord, TimeUnit};
//!
//! let subjects: Vec<SubjectRecord> = (0..6)
//!     .map(|i| SubjectRecord::new("CDISCPILOT01", format!("01-{i}"), "Placebo", "Y"))
//!     .collect();
//! let events: Vec<EventRecord> = (0..6)
//!     .map(|i| EventRecord::new("CDISCPILOT01", format!("01-{i}"), "TTDE", 30.0 * (i + 1) as f64, 0.0))
//!     .collect();
//!
//! let options = CohortOptions::new("CDISCPILOT01").with_time_unit(TimeUnit::Raw);
//! let cohort = build_cohort(&subjects, &events, &options)?;
//! let curves = CurveAssembler::new(CurveOptions::default())?.assemble_cohort(&cohort, &options)?;
//! assert_eq!(curves.estimated().count(), 1);
//! # Ok::<(), km_core::KmError>(())
//! ```

pub mod cohort;
pub mod confidence;
pub mod curves;
pub mod error;
pub mod estimator;
pub mod export;
pub mod redact;

pub use cohort::{Cohort, CohortBuilder, ExclusionReason, ExclusionSummary, build_cohort};
pub use confidence::{confidence_bounds, critical_value, normal_quantile};
pub use curves::{CurveAssembler, assemble_curves};
pub use error::{KmError, Result};
pub use estimator::{KaplanMeierEstimator, estimate, estimate_with_method};
pub use export::{CSV_HEADER, write_curves_csv};
pub use redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data_enabled};
