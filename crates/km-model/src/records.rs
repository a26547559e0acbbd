//! Row-level records of the two input tables and the derived cohort entry.

use serde::{Deserialize, Serialize};

use crate::arm::TreatmentArm;

/// One row of the subject-level table (ADSL).
///
/// Identifier fields are optional because source tables routinely carry
/// blank keys; such rows are dropped during cohort construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// `STUDYID`
    pub study_id: Option<String>,
    /// `USUBJID`
    pub usubjid: Option<String>,
    /// Raw treatment label (`TRT01A` unless configured otherwise).
    pub arm_label: Option<String>,
    /// Raw population flag value (`SAFFL` unless configured otherwise).
    pub population_flag: Option<String>,
}

impl SubjectRecord {
    pub fn new(
        study_id: impl Into<String>,
        usubjid: impl Into<String>,
        arm_label: impl Into<String>,
        population_flag: impl Into<String>,
    ) -> Self {
        Self {
            study_id: Some(study_id.into()),
            usubjid: Some(usubjid.into()),
            arm_label: Some(arm_label.into()),
            population_flag: Some(population_flag.into()),
        }
    }

    /// True when the population flag is affirmatively set (`Y`).
    pub fn in_population(&self) -> bool {
        self.population_flag
            .as_deref()
            .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("Y"))
    }
}

/// One row of the time-to-event table (ADTTE).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// `STUDYID`
    pub study_id: Option<String>,
    /// `USUBJID`
    pub usubjid: Option<String>,
    /// `PARAMCD`
    pub param_code: Option<String>,
    /// `PARAM`
    pub param: Option<String>,
    /// `AVAL`, in days.
    pub aval: Option<f64>,
    /// `CNSR`
    pub cnsr: Option<f64>,
}

impl EventRecord {
    pub fn new(
        study_id: impl Into<String>,
        usubjid: impl Into<String>,
        param_code: impl Into<String>,
        aval: f64,
        cnsr: f64,
    ) -> Self {
        Self {
            study_id: Some(study_id.into()),
            usubjid: Some(usubjid.into()),
            param_code: Some(param_code.into()),
            param: None,
            aval: Some(aval),
            cnsr: Some(cnsr),
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }
}

/// A subject admitted to the analysis cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortEntry {
    pub usubjid: String,
    pub arm: TreatmentArm,
    /// Time to event or censoring, in the requested analysis unit.
    pub time: f64,
    /// True when the event was observed, false when right-censored.
    pub event_occurred: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn population_flag_requires_yes() {
        let mut subject = SubjectRecord::new("S", "S-001", "Placebo", " y ");
        assert!(subject.in_population());
        subject.population_flag = Some("N".to_string());
        assert!(!subject.in_population());
        subject.population_flag = None;
        assert!(!subject.in_population());
    }
}
