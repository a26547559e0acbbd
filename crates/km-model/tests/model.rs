//! Tests for km-model types.

use std::collections::BTreeMap;

use km_model::{
    ArmOutcome, CiMethod, CurveSet, InsufficiencyScope, InsufficientData, SurvivalFunction,
    SurvivalPoint, TimeUnit, TreatmentArm,
};

fn point(time: f64, at_risk: usize, events: usize, censored: usize, survival: f64) -> SurvivalPoint {
    SurvivalPoint {
        time,
        at_risk,
        events,
        censored,
        survival,
        std_error: 0.0,
        lower: survival,
        upper: survival,
    }
}

/// Four subjects: events at 2 and 5, censorings at 3 and 8.
fn sample_function() -> SurvivalFunction {
    SurvivalFunction {
        points: vec![
            point(0.0, 4, 0, 0, 1.0),
            point(2.0, 4, 1, 0, 0.75),
            point(3.0, 3, 0, 1, 0.75),
            point(5.0, 2, 1, 0, 0.375),
            point(8.0, 1, 0, 1, 0.375),
        ],
        n_subjects: 4,
        n_events: 2,
        n_censored: 2,
        confidence_level: 0.95,
        ci_method: CiMethod::LogLog,
    }
}

#[test]
fn survival_at_holds_last_value() {
    let function = sample_function();
    assert_eq!(function.survival_at(-1.0), 1.0);
    assert_eq!(function.survival_at(0.0), 1.0);
    assert_eq!(function.survival_at(1.99), 1.0);
    assert_eq!(function.survival_at(2.0), 0.75);
    assert_eq!(function.survival_at(4.0), 0.75);
    assert_eq!(function.survival_at(5.0), 0.375);
    assert_eq!(function.survival_at(100.0), 0.375);
}

#[test]
fn at_risk_counts_subjects_still_observed() {
    let function = sample_function();
    assert_eq!(function.at_risk_at(0.0), 4);
    assert_eq!(function.at_risk_at(2.5), 3);
    assert_eq!(function.at_risk_at(5.0), 2);
    assert_eq!(function.at_risk_at(8.0), 1);
    assert_eq!(function.at_risk_at(8.5), 0);
}

#[test]
fn median_is_first_time_at_or_below_half() {
    assert_eq!(sample_function().median_survival(), Some(5.0));

    let mut never = sample_function();
    for point in &mut never.points {
        point.survival = point.survival.max(0.6);
    }
    assert_eq!(never.median_survival(), None);
}

#[test]
fn step_vertices_draw_horizontal_then_vertical() {
    let vertices = sample_function().step_vertices();
    assert_eq!(
        vertices,
        vec![
            (0.0, 1.0),
            (2.0, 1.0),
            (2.0, 0.75),
            (3.0, 0.75),
            (5.0, 0.75),
            (5.0, 0.375),
            (8.0, 0.375),
        ]
    );
}

#[test]
fn curve_set_iterates_in_display_order() {
    let mut arms = BTreeMap::new();
    arms.insert(
        TreatmentArm::XanomelineHighDose,
        ArmOutcome::Estimated(sample_function()),
    );
    arms.insert(
        TreatmentArm::XanomelineLowDose,
        ArmOutcome::Insufficient(InsufficientData::arm(TreatmentArm::XanomelineLowDose, 0, 0)),
    );
    arms.insert(TreatmentArm::Placebo, ArmOutcome::Estimated(sample_function()));
    let curves = CurveSet {
        study_id: "CDISCPILOT01".to_string(),
        parameter: Some("Time to First Dermatologic Event".to_string()),
        time_unit: TimeUnit::Months,
        arms,
    };

    let order: Vec<TreatmentArm> = curves.estimated().map(|(arm, _)| arm).collect();
    assert_eq!(
        order,
        vec![TreatmentArm::Placebo, TreatmentArm::XanomelineHighDose]
    );
    assert_eq!(
        curves.title(),
        "KM estimate for Time to First Dermatologic Event: Safety population"
    );

    let table = curves.risk_table(&[0.0, 4.0, 10.0]);
    assert_eq!(table.len(), 2);
    assert_eq!(table[0], (TreatmentArm::Placebo, vec![4, 2, 0]));
}

#[test]
fn curve_set_serializes_with_arm_labels() {
    let mut arms = BTreeMap::new();
    arms.insert(
        TreatmentArm::XanomelineLowDose,
        ArmOutcome::Insufficient(InsufficientData::arm(TreatmentArm::XanomelineLowDose, 0, 0)),
    );
    let curves = CurveSet {
        study_id: "CDISCPILOT01".to_string(),
        parameter: None,
        time_unit: TimeUnit::Raw,
        arms,
    };
    let json = serde_json::to_value(&curves).expect("serialize curves");
    let outcome = &json["arms"]["Xanomeline Low Dose"];
    assert_eq!(outcome["status"], "insufficient");
    assert_eq!(outcome["scope"]["scope"], "arm");
    assert_eq!(outcome["scope"]["arm"], "Xanomeline Low Dose");
    assert_eq!(json["time_unit"], "raw");

    let round: CurveSet = serde_json::from_value(json).expect("deserialize curves");
    assert_eq!(round, curves);
}

#[test]
fn insufficient_messages_name_the_scope() {
    let cohort = InsufficientData::cohort(3, 5);
    assert_eq!(cohort.scope, InsufficiencyScope::Cohort);
    assert_eq!(
        cohort.to_string(),
        "not enough observations for this selection (3 found, more than 5 required)"
    );
    let arm = InsufficientData::arm(TreatmentArm::Placebo, 0, 0);
    assert!(arm.to_string().contains("Placebo"));
}
