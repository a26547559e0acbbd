//! Data model for Kaplan-Meier curves over ADaM subject-level (ADSL) and
//! time-to-event (ADTTE) tables.

pub mod arm;
pub mod error;
pub mod options;
pub mod records;
pub mod survival;

pub use arm::TreatmentArm;
pub use error::{ModelError, Result};
pub use options::{
    CensorConvention, CiMethod, CohortOptions, CurveOptions, DAYS_PER_MONTH,
    DEFAULT_CONFIDENCE_LEVEL, DEFAULT_STUDY_ID, EstimatorOptions, INSUFFICIENT_ARM_THRESHOLD,
    INSUFFICIENT_COHORT_THRESHOLD, TimeUnit,
};
pub use records::{CohortEntry, EventRecord, SubjectRecord};
pub use survival::{
    ArmOutcome, CurveSet, InsufficiencyScope, InsufficientData, SurvivalFunction, SurvivalPoint,
};
