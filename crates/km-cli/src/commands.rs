use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use km_cli::pipeline::{CurveReport, CurveRequest, PipelineOutcome, run_pipeline};
use km_cli::summary::{arms_table, render_csv, render_json, render_table};
use km_ingest::SubjectColumns;
use km_model::{CohortOptions, CurveOptions, EstimatorOptions};

use crate::cli::{CurveArgs, OutputFormatArg};

pub fn run_arms() -> Result<()> {
    println!("{}", arms_table());
    Ok(())
}

pub fn run_curve(args: &CurveArgs) -> Result<PipelineOutcome> {
    let request = curve_request(args);
    match run_pipeline(&request)? {
        PipelineOutcome::Curves(report) => {
            write_report(args, &report)?;
            Ok(PipelineOutcome::Curves(report))
        }
        insufficient => Ok(insufficient),
    }
}

fn write_report(args: &CurveArgs, report: &CurveReport) -> Result<()> {
    let rendered = match args.format {
        OutputFormatArg::Table => render_table(report, &args.risk_grid, args.output.is_none()),
        OutputFormatArg::Json => render_json(report).context("serialize curves")?,
        OutputFormatArg::Csv => render_csv(report).context("write curves")?,
    };
    match &args.output {
        Some(path) => {
            fs::write(path, rendered).with_context(|| format!("write {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn curve_request(args: &CurveArgs) -> CurveRequest {
    let cohort = CohortOptions::new(args.study.clone())
        .with_param_code(args.param.clone())
        .with_time_unit(args.unit.into())
        .with_censor_convention(args.censor.into());
    let estimator = EstimatorOptions::default()
        .with_confidence_level(args.confidence)
        .with_ci_method(args.ci_method.into());
    CurveRequest {
        adsl: args.adsl.clone(),
        adtte: args.adtte.clone(),
        columns: SubjectColumns::default()
            .with_arm(args.arm_var.clone())
            .with_population_flag(args.pop_flag.clone()),
        cohort,
        curves: CurveOptions::default().with_estimator(estimator),
    }
}
