//! Conversion of ADSL and ADTTE tables into typed records.

use std::path::Path;
use std::time::Instant;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use km_model::{EventRecord, SubjectRecord};

use crate::csv_table::{optional_column, read_csv_table, required_column};
use crate::error::Result;
use crate::polars_utils::{any_to_f64, any_to_string_non_empty};

pub const STUDYID: &str = "STUDYID";
pub const USUBJID: &str = "USUBJID";
pub const PARAMCD: &str = "PARAMCD";
pub const PARAM: &str = "PARAM";
pub const AVAL: &str = "AVAL";
pub const CNSR: &str = "CNSR";

/// Which subject-level columns carry the treatment arm and the population flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectColumns {
    /// Actual treatment for period 1.
    pub arm: String,
    /// Safety population flag.
    pub population_flag: String,
}

impl Default for SubjectColumns {
    fn default() -> Self {
        Self {
            arm: "TRT01A".to_string(),
            population_flag: "SAFFL".to_string(),
        }
    }
}

impl SubjectColumns {
    #[must_use]
    pub fn with_arm(mut self, column: impl Into<String>) -> Self {
        self.arm = column.into();
        self
    }

    #[must_use]
    pub fn with_population_flag(mut self, column: impl Into<String>) -> Self {
        self.population_flag = column.into();
        self
    }
}

fn text(column: &Column, idx: usize) -> Option<String> {
    any_to_string_non_empty(column.get(idx).unwrap_or(AnyValue::Null))
}

fn number(column: &Column, idx: usize) -> Option<f64> {
    any_to_f64(column.get(idx).unwrap_or(AnyValue::Null))
}

/// Subject records from an ADSL frame. `STUDYID`, `USUBJID` and both
/// configured columns are required.
pub fn subjects_from_frame(df: &DataFrame, columns: &SubjectColumns) -> Result<Vec<SubjectRecord>> {
    let study = required_column(df, STUDYID)?;
    let usubjid = required_column(df, USUBJID)?;
    let arm = required_column(df, &columns.arm)?;
    let flag = required_column(df, &columns.population_flag)?;

    Ok((0..df.height())
        .map(|idx| SubjectRecord {
            study_id: text(study, idx),
            usubjid: text(usubjid, idx),
            arm_label: text(arm, idx),
            population_flag: text(flag, idx),
        })
        .collect())
}

/// Event records from an ADTTE frame. `STUDYID`, `USUBJID`, `AVAL` and
/// `CNSR` are required; `PARAMCD` and `PARAM` are read when present.
/// Unparseable `AVAL`/`CNSR` cells become `None`.
pub fn events_from_frame(df: &DataFrame) -> Result<Vec<EventRecord>> {
    let study = required_column(df, STUDYID)?;
    let usubjid = required_column(df, USUBJID)?;
    let aval = required_column(df, AVAL)?;
    let cnsr = required_column(df, CNSR)?;
    let param_code = optional_column(df, PARAMCD)?;
    let param = optional_column(df, PARAM)?;

    Ok((0..df.height())
        .map(|idx| EventRecord {
            study_id: text(study, idx),
            usubjid: text(usubjid, idx),
            param_code: param_code.and_then(|column| text(column, idx)),
            param: param.and_then(|column| text(column, idx)),
            aval: number(aval, idx),
            cnsr: number(cnsr, idx),
        })
        .collect())
}

/// Read and convert the subject-level table.
pub fn load_subjects(path: &Path, columns: &SubjectColumns) -> Result<Vec<SubjectRecord>> {
    let start = Instant::now();
    let df = read_csv_table(path)?;
    let subjects = subjects_from_frame(&df, columns).map_err(|e| e.with_path(path))?;
    info!(
        path = %path.display(),
        rows = subjects.len(),
        duration_ms = start.elapsed().as_millis(),
        "subject table loaded"
    );
    Ok(subjects)
}

/// Read and convert the time-to-event table.
pub fn load_events(path: &Path) -> Result<Vec<EventRecord>> {
    let start = Instant::now();
    let df = read_csv_table(path)?;
    let events = events_from_frame(&df).map_err(|e| e.with_path(path))?;
    info!(
        path = %path.display(),
        rows = events.len(),
        duration_ms = start.elapsed().as_millis(),
        "event table loaded"
    );
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;

    fn subject_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("STUDYID".into(), ["CDISCPILOT01", "CDISCPILOT01"]).into_column(),
            Series::new("USUBJID".into(), ["01-701-1015", " "]).into_column(),
            Series::new("trt01a".into(), ["Placebo", "Xanomeline Low Dose"]).into_column(),
            Series::new("SAFFL".into(), ["Y", "N"]).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn subjects_resolve_columns_case_insensitively() {
        let subjects = subjects_from_frame(&subject_frame(), &SubjectColumns::default()).unwrap();
        assert_eq!(subjects.len(), 2);
        assert_eq!(subjects[0].usubjid.as_deref(), Some("01-701-1015"));
        assert_eq!(subjects[0].arm_label.as_deref(), Some("Placebo"));
        assert!(subjects[0].in_population());
        assert_eq!(subjects[1].usubjid, None);
        assert!(!subjects[1].in_population());
    }

    #[test]
    fn custom_subject_columns_must_exist() {
        let columns = SubjectColumns::default().with_arm("TRT01P");
        let err = subjects_from_frame(&subject_frame(), &columns).unwrap_err();
        assert!(matches!(err, IngestError::ColumnNotFound { column } if column == "TRT01P"));
    }

    #[test]
    fn events_parse_numbers_and_tolerate_missing_param() {
        let df = DataFrame::new(vec![
            Series::new("STUDYID".into(), ["CDISCPILOT01", "CDISCPILOT01"]).into_column(),
            Series::new("USUBJID".into(), ["01-701-1015", "01-701-1023"]).into_column(),
            Series::new("AVAL".into(), [Some(12.0), None]).into_column(),
            Series::new("CNSR".into(), [0i64, 1]).into_column(),
        ])
        .unwrap();
        let events = events_from_frame(&df).unwrap();
        assert_eq!(events[0].aval, Some(12.0));
        assert_eq!(events[0].cnsr, Some(0.0));
        assert_eq!(events[0].param_code, None);
        assert_eq!(events[1].aval, None);
        assert_eq!(events[1].cnsr, Some(1.0));
    }
}
