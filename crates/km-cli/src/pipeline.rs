//! Load, cohort, estimate: the stages behind `km curve`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, info_span};

use km_core::{Cohort, CurveAssembler, ExclusionSummary, KmError, build_cohort};
use km_ingest::{SubjectColumns, load_events, load_subjects};
use km_model::{CohortOptions, CurveOptions, CurveSet, InsufficientData};

/// Everything needed to produce one set of curves.
#[derive(Debug, Clone)]
pub struct CurveRequest {
    pub adsl: PathBuf,
    pub adtte: PathBuf,
    pub columns: SubjectColumns,
    pub cohort: CohortOptions,
    pub curves: CurveOptions,
}

/// Curves together with the cohort bookkeeping that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct CurveReport {
    pub title: String,
    pub cohort_size: usize,
    pub exclusions: ExclusionSummary,
    pub curves: CurveSet,
}

impl CurveReport {
    pub fn new(cohort: &Cohort, curves: CurveSet) -> Self {
        Self {
            title: curves.title(),
            cohort_size: cohort.len(),
            exclusions: cohort.exclusions.clone(),
            curves,
        }
    }
}

/// A run either yields curves or reports that the selection is too small.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Curves(CurveReport),
    Insufficient(InsufficientData),
}

/// Run every stage for `request`.
///
/// # Errors
///
/// Read failures, missing columns, invalid options and invalid time values.
/// An insufficient cohort is not an error; see [`PipelineOutcome`].
pub fn run_pipeline(request: &CurveRequest) -> Result<PipelineOutcome> {
    let span = info_span!("curve", study_id = %request.cohort.study_id);
    let _guard = span.enter();
    let start = Instant::now();

    let subjects = load_subjects(&request.adsl, &request.columns)
        .with_context(|| format!("read subject table {}", request.adsl.display()))?;
    let events = load_events(&request.adtte)
        .with_context(|| format!("read event table {}", request.adtte.display()))?;

    let cohort = match build_cohort(&subjects, &events, &request.cohort) {
        Ok(cohort) => cohort,
        Err(KmError::InsufficientData(data)) => {
            info!(observed = data.observed, "cohort too small to estimate");
            return Ok(PipelineOutcome::Insufficient(data));
        }
        Err(error) => return Err(error).context("build cohort"),
    };

    let curves = CurveAssembler::new(request.curves)
        .context("configure estimator")?
        .assemble_cohort(&cohort, &request.cohort)
        .context("estimate curves")?;

    info!(
        entries = cohort.len(),
        arms = curves.estimated().count(),
        duration_ms = start.elapsed().as_millis(),
        "pipeline complete"
    );
    Ok(PipelineOutcome::Curves(CurveReport::new(&cohort, curves)))
}
