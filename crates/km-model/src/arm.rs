//! Treatment arms of the CDISC pilot study.
//!
//! The arm set is closed: legend order, colour assignment and output ordering
//! all follow the declaration order of [`TreatmentArm`], never the order in
//! which labels happen to appear in a dataset.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Actual treatment arm (`TRT01A`) of a subject.
///
/// Variants are declared in display order, so the derived `Ord` is the
/// legend order used by every consumer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum TreatmentArm {
    #[serde(rename = "Placebo")]
    Placebo,
    #[serde(rename = "Xanomeline Low Dose")]
    XanomelineLowDose,
    #[serde(rename = "Xanomeline High Dose")]
    XanomelineHighDose,
}

impl TreatmentArm {
    /// All arms in display order.
    pub const ALL: [TreatmentArm; 3] = [
        TreatmentArm::Placebo,
        TreatmentArm::XanomelineLowDose,
        TreatmentArm::XanomelineHighDose,
    ];

    /// Label exactly as it appears in the ADSL dataset.
    pub fn label(&self) -> &'static str {
        match self {
            TreatmentArm::Placebo => "Placebo",
            TreatmentArm::XanomelineLowDose => "Xanomeline Low Dose",
            TreatmentArm::XanomelineHighDose => "Xanomeline High Dose",
        }
    }

    /// Zero-based position in the legend.
    pub fn display_index(&self) -> usize {
        match self {
            TreatmentArm::Placebo => 0,
            TreatmentArm::XanomelineLowDose => 1,
            TreatmentArm::XanomelineHighDose => 2,
        }
    }

    /// Colour name assigned to the arm in rendered charts.
    pub fn color(&self) -> &'static str {
        match self {
            TreatmentArm::Placebo => "blue",
            TreatmentArm::XanomelineLowDose => "green",
            TreatmentArm::XanomelineHighDose => "purple",
        }
    }
}

impl fmt::Display for TreatmentArm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TreatmentArm {
    type Err = ModelError;

    /// Parse a dataset label. Matching ignores case and surrounding
    /// whitespace; anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        TreatmentArm::ALL
            .into_iter()
            .find(|arm| arm.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::UnknownTreatmentArm(s.to_string()))
    }
}
