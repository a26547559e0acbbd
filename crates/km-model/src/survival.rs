//! Survival functions and per-arm curve outcomes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::arm::TreatmentArm;
use crate::options::{CiMethod, TimeUnit};

/// One step of a product-limit curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurvivalPoint {
    pub time: f64,
    /// Subjects at risk just before `time`.
    pub at_risk: usize,
    /// Events observed at `time`.
    pub events: usize,
    /// Subjects censored at `time`.
    pub censored: usize,
    /// Survival probability just after `time`.
    pub survival: f64,
    /// Greenwood standard error of `survival`.
    pub std_error: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Right-continuous product-limit estimate for one group.
///
/// `points[0]` is always the origin at time zero; each following point is a
/// distinct observed time in ascending order, whether it carries events,
/// censorings or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivalFunction {
    pub points: Vec<SurvivalPoint>,
    pub n_subjects: usize,
    pub n_events: usize,
    pub n_censored: usize,
    pub confidence_level: f64,
    pub ci_method: CiMethod,
}

impl SurvivalFunction {
    /// Survival probability at `t`, holding the last value between steps.
    pub fn survival_at(&self, t: f64) -> f64 {
        if t < 0.0 {
            return 1.0;
        }
        self.points
            .iter()
            .take_while(|point| point.time <= t)
            .last()
            .map_or(1.0, |point| point.survival)
    }

    /// Number of subjects still under observation at `t`.
    pub fn at_risk_at(&self, t: f64) -> usize {
        self.points
            .iter()
            .find(|point| point.time >= t)
            .map_or(0, |point| point.at_risk)
    }

    /// First time at which survival falls to one half or below.
    pub fn median_survival(&self) -> Option<f64> {
        self.points
            .iter()
            .find(|point| point.survival <= 0.5)
            .map(|point| point.time)
    }

    /// Last observed time (event or censoring).
    pub fn last_time(&self) -> f64 {
        self.points.last().map_or(0.0, |point| point.time)
    }

    /// Vertices of the rendered step curve.
    ///
    /// Each step contributes a horizontal segment ending at the step time
    /// and, when survival drops there, a vertical segment down to the new
    /// value. Censor-only times extend the horizontal line.
    pub fn step_vertices(&self) -> Vec<(f64, f64)> {
        let mut vertices = Vec::with_capacity(self.points.len() * 2);
        let Some(origin) = self.points.first() else {
            return vertices;
        };
        vertices.push((origin.time, origin.survival));
        let mut previous = origin.survival;
        for point in self.points.iter().skip(1) {
            vertices.push((point.time, previous));
            if point.survival != previous {
                vertices.push((point.time, point.survival));
                previous = point.survival;
            }
        }
        vertices
    }
}

/// Where an insufficiency was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "arm", rename_all = "lowercase")]
pub enum InsufficiencyScope {
    Cohort,
    Arm(TreatmentArm),
}

/// Too few entries to estimate a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientData {
    pub scope: InsufficiencyScope,
    pub observed: usize,
    /// Entry counts at or below this value are insufficient.
    pub threshold: usize,
}

impl InsufficientData {
    pub fn cohort(observed: usize, threshold: usize) -> Self {
        Self {
            scope: InsufficiencyScope::Cohort,
            observed,
            threshold,
        }
    }

    pub fn arm(arm: TreatmentArm, observed: usize, threshold: usize) -> Self {
        Self {
            scope: InsufficiencyScope::Arm(arm),
            observed,
            threshold,
        }
    }
}

impl fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            InsufficiencyScope::Cohort => write!(
                f,
                "not enough observations for this selection ({} found, more than {} required)",
                self.observed, self.threshold
            ),
            InsufficiencyScope::Arm(arm) => write!(
                f,
                "not enough observations in arm {arm} ({} found, more than {} required)",
                self.observed, self.threshold
            ),
        }
    }
}

/// Result of estimation for a single arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArmOutcome {
    Estimated(SurvivalFunction),
    Insufficient(InsufficientData),
}

impl ArmOutcome {
    pub fn as_estimated(&self) -> Option<&SurvivalFunction> {
        match self {
            ArmOutcome::Estimated(function) => Some(function),
            ArmOutcome::Insufficient(_) => None,
        }
    }
}

/// One outcome per treatment arm, keyed in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSet {
    pub study_id: String,
    /// `PARAM` of the analysed events, when known.
    pub parameter: Option<String>,
    pub time_unit: TimeUnit,
    pub arms: BTreeMap<TreatmentArm, ArmOutcome>,
}

impl CurveSet {
    pub fn title(&self) -> String {
        match &self.parameter {
            Some(parameter) => format!("KM estimate for {parameter}: Safety population"),
            None => "KM estimate: Safety population".to_string(),
        }
    }

    pub fn outcome(&self, arm: TreatmentArm) -> Option<&ArmOutcome> {
        self.arms.get(&arm)
    }

    /// Estimated arms in display order.
    pub fn estimated(&self) -> impl Iterator<Item = (TreatmentArm, &SurvivalFunction)> {
        self.arms
            .iter()
            .filter_map(|(arm, outcome)| outcome.as_estimated().map(|function| (*arm, function)))
    }

    /// Numbers at risk per estimated arm at each grid time.
    pub fn risk_table(&self, grid: &[f64]) -> Vec<(TreatmentArm, Vec<usize>)> {
        self.estimated()
            .map(|(arm, function)| {
                let counts = grid.iter().map(|t| function.at_risk_at(*t)).collect();
                (arm, counts)
            })
            .collect()
    }
}
