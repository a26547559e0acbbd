//! CLI argument definitions for `km`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use km_model::{CensorConvention, CiMethod, DEFAULT_CONFIDENCE_LEVEL, DEFAULT_STUDY_ID, TimeUnit};

#[derive(Parser)]
#[command(
    name = "km",
    version,
    about = "Kaplan-Meier survival curves per treatment arm from ADaM tables",
    long_about = "Join a subject-level table (ADSL) with a time-to-event table (ADTTE),\n\
                  build the safety-population cohort for one study and estimate a\n\
                  product-limit survival curve with pointwise confidence bounds per arm."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow subject identifiers in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Estimate survival curves for one study.
    Curve(CurveArgs),

    /// List the treatment arms in display order.
    Arms,
}

#[derive(Parser)]
pub struct CurveArgs {
    /// Subject-level table (ADSL) as CSV.
    #[arg(long = "adsl", value_name = "CSV")]
    pub adsl: PathBuf,

    /// Time-to-event table (ADTTE) as CSV.
    #[arg(long = "adtte", value_name = "CSV")]
    pub adtte: PathBuf,

    /// Study identifier (STUDYID) to analyse.
    #[arg(long = "study", value_name = "ID", default_value = DEFAULT_STUDY_ID)]
    pub study: String,

    /// Restrict events to one parameter code (PARAMCD).
    #[arg(long = "param", value_name = "CODE")]
    pub param: Option<String>,

    /// Time unit of the curve.
    #[arg(long = "unit", value_enum, default_value = "months")]
    pub unit: UnitArg,

    /// How CNSR is read.
    ///
    /// `adam`: 0 is an event, positive values are censorings.
    /// `event-flag`: non-zero values are events.
    #[arg(long = "censor", value_enum, default_value = "adam")]
    pub censor: CensorArg,

    /// Confidence level of the pointwise bounds.
    #[arg(long = "confidence", value_name = "LEVEL", default_value_t = DEFAULT_CONFIDENCE_LEVEL)]
    pub confidence: f64,

    /// Confidence interval construction.
    #[arg(long = "ci-method", value_enum, default_value = "log-log")]
    pub ci_method: CiMethodArg,

    /// Subject-level column holding the treatment arm.
    #[arg(long = "arm-var", value_name = "COLUMN", default_value = "TRT01A")]
    pub arm_var: String,

    /// Subject-level column holding the population flag.
    #[arg(long = "pop-flag", value_name = "COLUMN", default_value = "SAFFL")]
    pub pop_flag: String,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: OutputFormatArg,

    /// Write output to a file instead of stdout.
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Times at which to report the number at risk (comma separated).
    #[arg(long = "risk-grid", value_name = "T1,T2,...", value_delimiter = ',')]
    pub risk_grid: Vec<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Raw,
    Months,
}

impl From<UnitArg> for TimeUnit {
    fn from(value: UnitArg) -> Self {
        match value {
            UnitArg::Raw => TimeUnit::Raw,
            UnitArg::Months => TimeUnit::Months,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CensorArg {
    Adam,
    EventFlag,
}

impl From<CensorArg> for CensorConvention {
    fn from(value: CensorArg) -> Self {
        match value {
            CensorArg::Adam => CensorConvention::Adam,
            CensorArg::EventFlag => CensorConvention::EventFlag,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CiMethodArg {
    LogLog,
    Plain,
}

impl From<CiMethodArg> for CiMethod {
    fn from(value: CiMethodArg) -> Self {
        match value {
            CiMethodArg::LogLog => CiMethod::LogLog,
            CiMethodArg::Plain => CiMethod::Plain,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
    Csv,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
