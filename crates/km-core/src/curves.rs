//! One survival curve per treatment arm.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use km_model::{
    ArmOutcome, CohortEntry, CohortOptions, CurveOptions, CurveSet, InsufficientData,
    TreatmentArm,
};

use crate::cohort::Cohort;
use crate::error::Result;
use crate::estimator::KaplanMeierEstimator;

/// Groups cohort entries by arm and estimates each group independently.
#[derive(Debug, Clone, Copy)]
pub struct CurveAssembler {
    options: CurveOptions,
    estimator: KaplanMeierEstimator,
}

impl CurveAssembler {
    /// # Errors
    ///
    /// Fails when the estimator options are invalid.
    pub fn new(options: CurveOptions) -> Result<Self> {
        Ok(Self {
            options,
            estimator: KaplanMeierEstimator::new(options.estimator)?,
        })
    }

    /// One outcome for every arm in [`TreatmentArm::ALL`], including arms
    /// with no entries. A small arm never prevents estimation of the others.
    pub fn assemble(&self, entries: &[CohortEntry]) -> Result<BTreeMap<TreatmentArm, ArmOutcome>> {
        let start = Instant::now();
        let mut groups: BTreeMap<TreatmentArm, Vec<(f64, bool)>> = TreatmentArm::ALL
            .iter()
            .map(|arm| (*arm, Vec::new()))
            .collect();
        for entry in entries {
            groups
                .entry(entry.arm)
                .or_default()
                .push((entry.time, entry.event_occurred));
        }

        let mut outcomes = BTreeMap::new();
        for (arm, pairs) in groups {
            let outcome = if pairs.len() <= self.options.arm_threshold {
                warn!(
                    arm = arm.label(),
                    entries = pairs.len(),
                    threshold = self.options.arm_threshold,
                    "insufficient data for arm"
                );
                ArmOutcome::Insufficient(InsufficientData::arm(
                    arm,
                    pairs.len(),
                    self.options.arm_threshold,
                ))
            } else {
                let function = self.estimator.estimate(&pairs)?;
                debug!(
                    arm = arm.label(),
                    subjects = function.n_subjects,
                    events = function.n_events,
                    steps = function.points.len(),
                    "arm estimated"
                );
                ArmOutcome::Estimated(function)
            };
            outcomes.insert(arm, outcome);
        }
        info!(
            arms = outcomes.len(),
            entries = entries.len(),
            duration_ms = start.elapsed().as_millis(),
            "curves assembled"
        );
        Ok(outcomes)
    }

    /// Assemble a [`CurveSet`] for a cohort built with `cohort_options`.
    pub fn assemble_cohort(&self, cohort: &Cohort, cohort_options: &CohortOptions) -> Result<CurveSet> {
        Ok(CurveSet {
            study_id: cohort_options.study_id.clone(),
            parameter: cohort.parameter.clone(),
            time_unit: cohort_options.time_unit,
            arms: self.assemble(&cohort.entries)?,
        })
    }
}

/// See [`CurveAssembler::assemble`].
pub fn assemble_curves(
    entries: &[CohortEntry],
    options: &CurveOptions,
) -> Result<BTreeMap<TreatmentArm, ArmOutcome>> {
    CurveAssembler::new(*options)?.assemble(entries)
}
