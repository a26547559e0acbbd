//! Cohort construction: join subjects to time-to-event records.
//!
//! Rows that cannot take part in the analysis (blank keys, other studies,
//! subjects outside the population, unknown arms, missing times) are dropped
//! silently and tallied in an [`ExclusionSummary`]. Only a cohort that ends
//! up too small, or a time value that is outright invalid, is reported as an
//! error.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use km_model::{
    CohortEntry, CohortOptions, EventRecord, InsufficientData, SubjectRecord, TreatmentArm,
};

use crate::error::{KmError, Result};
use crate::redact::redact_value;

/// Why a row was left out of the cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// `STUDYID` or `USUBJID` is blank.
    MissingJoinKey,
    /// The row belongs to another study.
    OtherStudy,
    /// The subject's population flag is not set.
    OutsidePopulation,
    /// The treatment label is not one of the known arms.
    UnknownCategory,
    /// A second subject row with the same identifier.
    DuplicateSubject,
    /// The event row is for another parameter.
    OtherParameter,
    /// The event row has no matching subject.
    EventWithoutSubject,
    /// The subject has no matching event row.
    SubjectWithoutEvent,
    /// `AVAL` or `CNSR` is missing or unreadable.
    MissingTimeOrCensor,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::MissingJoinKey => "missing join key",
            ExclusionReason::OtherStudy => "other study",
            ExclusionReason::OutsidePopulation => "outside population",
            ExclusionReason::UnknownCategory => "unknown treatment arm",
            ExclusionReason::DuplicateSubject => "duplicate subject",
            ExclusionReason::OtherParameter => "other parameter",
            ExclusionReason::EventWithoutSubject => "event without subject",
            ExclusionReason::SubjectWithoutEvent => "subject without event",
            ExclusionReason::MissingTimeOrCensor => "missing time or censor",
        }
    }
}

/// Row counts dropped per reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionSummary {
    counts: BTreeMap<ExclusionReason, usize>,
}

impl ExclusionSummary {
    fn record(&mut self, reason: ExclusionReason) {
        self.record_many(reason, 1);
    }

    fn record_many(&mut self, reason: ExclusionReason, count: usize) {
        if count > 0 {
            *self.counts.entry(reason).or_insert(0) += count;
        }
    }

    pub fn count(&self, reason: ExclusionReason) -> usize {
        self.counts.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExclusionReason, usize)> + '_ {
        self.counts.iter().map(|(reason, count)| (*reason, *count))
    }
}

/// The analysis cohort.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cohort {
    /// Entries ordered by arm, then by event-table order within an arm.
    pub entries: Vec<CohortEntry>,
    /// `PARAM` of the first joined event row.
    pub parameter: Option<String>,
    pub exclusions: ExclusionSummary,
}

impl Cohort {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries per arm, in display order.
    pub fn arm_counts(&self) -> BTreeMap<TreatmentArm, usize> {
        let mut counts: BTreeMap<TreatmentArm, usize> =
            TreatmentArm::ALL.iter().map(|arm| (*arm, 0)).collect();
        for entry in &self.entries {
            *counts.entry(entry.arm).or_insert(0) += 1;
        }
        counts
    }
}

/// Joins the subject-level and time-to-event tables into a cohort.
#[derive(Debug, Clone, Default)]
pub struct CohortBuilder {
    options: CohortOptions,
}

impl CohortBuilder {
    pub fn new(options: CohortOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CohortOptions {
        &self.options
    }

    /// Build the cohort. Inputs are only read.
    ///
    /// # Errors
    ///
    /// [`KmError::InsufficientData`] when the cohort has
    /// `cohort_threshold` entries or fewer, and
    /// [`KmError::InvalidSubjectTime`] for a negative or infinite `AVAL`.
    pub fn build(&self, subjects: &[SubjectRecord], events: &[EventRecord]) -> Result<Cohort> {
        let start = Instant::now();
        let options = &self.options;
        let mut exclusions = ExclusionSummary::default();

        let arms = self.subject_arms(subjects, &mut exclusions);

        let mut matched: BTreeSet<&str> = BTreeSet::new();
        let mut entries = Vec::new();
        let mut parameter = None;
        for event in events {
            let Some((study_id, usubjid)) =
                join_key(event.study_id.as_deref(), event.usubjid.as_deref())
            else {
                exclusions.record(ExclusionReason::MissingJoinKey);
                continue;
            };
            if study_id != options.study_id {
                exclusions.record(ExclusionReason::OtherStudy);
                continue;
            }
            if let Some(code) = options.param_code.as_deref() {
                let same = event
                    .param_code
                    .as_deref()
                    .is_some_and(|value| value.trim().eq_ignore_ascii_case(code.trim()));
                if !same {
                    exclusions.record(ExclusionReason::OtherParameter);
                    continue;
                }
            }
            let Some((subject_key, arm)) = arms.get_key_value(usubjid) else {
                exclusions.record(ExclusionReason::EventWithoutSubject);
                continue;
            };
            let raw = event.aval.filter(|value| !value.is_nan());
            let event_occurred = event
                .cnsr
                .and_then(|cnsr| options.censor_convention.event_occurred(cnsr));
            let (Some(raw), Some(event_occurred)) = (raw, event_occurred) else {
                exclusions.record(ExclusionReason::MissingTimeOrCensor);
                continue;
            };
            if raw < 0.0 || raw.is_infinite() {
                return Err(KmError::InvalidSubjectTime {
                    usubjid: usubjid.to_string(),
                    value: raw,
                });
            }
            matched.insert(*subject_key);
            if parameter.is_none() {
                parameter = event.param.as_deref().map(str::trim).map(str::to_string);
            }
            entries.push(CohortEntry {
                usubjid: usubjid.to_string(),
                arm: *arm,
                time: options.time_unit.convert(raw),
                event_occurred,
            });
        }
        exclusions.record_many(
            ExclusionReason::SubjectWithoutEvent,
            arms.len().saturating_sub(matched.len()),
        );

        entries.sort_by_key(|entry| entry.arm);

        for (reason, count) in exclusions.iter() {
            debug!(reason = reason.as_str(), count, "excluded rows");
        }
        info!(
            study_id = %options.study_id,
            param_code = options.param_code.as_deref().unwrap_or("*"),
            subjects = arms.len(),
            entries = entries.len(),
            excluded = exclusions.total(),
            duration_ms = start.elapsed().as_millis(),
            "cohort built"
        );

        if entries.len() <= options.cohort_threshold {
            return Err(KmError::InsufficientData(InsufficientData::cohort(
                entries.len(),
                options.cohort_threshold,
            )));
        }

        Ok(Cohort {
            entries,
            parameter,
            exclusions,
        })
    }

    /// Eligible subjects keyed by `USUBJID`. The first row wins when a
    /// subject appears twice.
    fn subject_arms<'a>(
        &self,
        subjects: &'a [SubjectRecord],
        exclusions: &mut ExclusionSummary,
    ) -> BTreeMap<&'a str, TreatmentArm> {
        let mut arms = BTreeMap::new();
        for subject in subjects {
            let Some((study_id, usubjid)) =
                join_key(subject.study_id.as_deref(), subject.usubjid.as_deref())
            else {
                exclusions.record(ExclusionReason::MissingJoinKey);
                continue;
            };
            if study_id != self.options.study_id {
                exclusions.record(ExclusionReason::OtherStudy);
                continue;
            }
            if !subject.in_population() {
                exclusions.record(ExclusionReason::OutsidePopulation);
                continue;
            }
            let Some(arm) = subject
                .arm_label
                .as_deref()
                .and_then(|label| label.parse::<TreatmentArm>().ok())
            else {
                exclusions.record(ExclusionReason::UnknownCategory);
                continue;
            };
            match arms.entry(usubjid) {
                Entry::Vacant(slot) => {
                    slot.insert(arm);
                }
                Entry::Occupied(_) => {
                    warn!(
                        usubjid = redact_value(usubjid),
                        "duplicate subject row ignored"
                    );
                    exclusions.record(ExclusionReason::DuplicateSubject);
                }
            }
        }
        arms
    }
}

/// Build the cohort for `options`; see [`CohortBuilder::build`].
pub fn build_cohort(
    subjects: &[SubjectRecord],
    events: &[EventRecord],
    options: &CohortOptions,
) -> Result<Cohort> {
    CohortBuilder::new(options.clone()).build(subjects, events)
}

fn join_key<'a>(study_id: Option<&'a str>, usubjid: Option<&'a str>) -> Option<(&'a str, &'a str)> {
    let study_id = study_id.map(str::trim).filter(|value| !value.is_empty())?;
    let usubjid = usubjid.map(str::trim).filter(|value| !value.is_empty())?;
    Some((study_id, usubjid))
}
