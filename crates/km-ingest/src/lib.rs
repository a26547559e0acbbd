//! Reading the ADaM subject-level (ADSL) and time-to-event (ADTTE) tables.
//!
//! Tables are loaded from CSV with Polars and lifted into the typed records
//! of `km-model`. Column names are matched case-insensitively; blank cells
//! become `None` so that cohort construction can drop those rows.

pub mod adam;
pub mod csv_table;
pub mod error;
pub mod polars_utils;

pub use adam::{
    AVAL, CNSR, PARAM, PARAMCD, STUDYID, SubjectColumns, USUBJID, events_from_frame,
    load_events, load_subjects, subjects_from_frame,
};
pub use csv_table::{optional_column, read_csv_table, required_column, resolve_column};
pub use error::{IngestError, Result};
pub use polars_utils::{any_to_f64, any_to_string, any_to_string_non_empty, format_numeric, parse_f64};
