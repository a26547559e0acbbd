use km_core::{assemble_curves, write_curves_csv};
use km_model::{CohortEntry, CurveOptions, CurveSet, TimeUnit, TreatmentArm};

fn entry(usubjid: &str, arm: TreatmentArm, time: f64, event_occurred: bool) -> CohortEntry {
    CohortEntry {
        usubjid: usubjid.to_string(),
        arm,
        time,
        event_occurred,
    }
}

fn curve_set() -> CurveSet {
    let entries = vec![
        entry("S1", TreatmentArm::Placebo, 10.0, true),
        entry("S2", TreatmentArm::Placebo, 20.0, false),
        entry("S3", TreatmentArm::XanomelineHighDose, 15.0, true),
    ];
    CurveSet {
        study_id: "CDISCPILOT01".to_string(),
        parameter: None,
        time_unit: TimeUnit::Raw,
        arms: assemble_curves(&entries, &CurveOptions::default()).expect("curves"),
    }
}

#[test]
fn csv_export_lists_estimated_arms_in_display_order() {
    let mut buffer = Vec::new();
    write_curves_csv(&curve_set(), &mut buffer).expect("write csv");
    let csv = String::from_utf8(buffer).expect("utf8");
    insta::assert_snapshot!(csv, @r"
    arm,time,at_risk,events,censored,survival,std_error,lower,upper
    Placebo,0.000000,2,0,0,1.000000,0.000000,1.000000,1.000000
    Placebo,10.000000,2,1,0,0.500000,0.353553,0.005983,0.910410
    Placebo,20.000000,1,0,1,0.500000,0.353553,0.005983,0.910410
    Xanomeline High Dose,0.000000,1,0,0,1.000000,0.000000,1.000000,1.000000
    Xanomeline High Dose,15.000000,1,1,0,0.000000,0.000000,0.000000,0.000000
    ");
}

#[test]
fn empty_curve_set_writes_header_only() {
    let curves = CurveSet {
        study_id: "CDISCPILOT01".to_string(),
        parameter: None,
        time_unit: TimeUnit::Months,
        arms: Default::default(),
    };
    let mut buffer = Vec::new();
    write_curves_csv(&curves, &mut buffer).expect("write csv");
    assert_eq!(
        String::from_utf8(buffer).expect("utf8"),
        "arm,time,at_risk,events,censored,survival,std_error,lower,upper\n"
    );
}
