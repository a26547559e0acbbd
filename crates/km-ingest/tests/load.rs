use std::fs;
use std::path::PathBuf;

use km_ingest::{IngestError, SubjectColumns, load_events, load_subjects};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

const ADSL: &str = "\
STUDYID,USUBJID,ARM,TRT01A,SAFFL,AGE
CDISCPILOT01,01-701-1015,Placebo,Placebo,Y,63
CDISCPILOT01,01-701-1023,Placebo,Placebo,Y,64
CDISCPILOT01,01-701-1028,Xanomeline High Dose,Xanomeline High Dose,Y,71
CDISCPILOT01,01-701-1033,Xanomeline Low Dose,Xanomeline Low Dose,N,74
CDISCPILOT01,,Placebo,Placebo,Y,80
";

const ADTTE: &str = "\
STUDYID,USUBJID,PARAMCD,PARAM,AVAL,CNSR
CDISCPILOT01,01-701-1015,TTDE,Time to First Dermatologic Event,2,0
CDISCPILOT01,01-701-1023,TTDE,Time to First Dermatologic Event,3.5,1
CDISCPILOT01,01-701-1028,TTDE,Time to First Dermatologic Event,,1
CDISCPILOT01,01-701-1033,TTDE,Time to First Dermatologic Event,n/a,0
";

#[test]
fn loads_subject_table() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "adsl.csv", ADSL);
    let subjects = load_subjects(&path, &SubjectColumns::default()).expect("load subjects");
    assert_eq!(subjects.len(), 5);
    assert_eq!(subjects[2].arm_label.as_deref(), Some("Xanomeline High Dose"));
    assert!(subjects[0].in_population());
    assert!(!subjects[3].in_population());
    assert_eq!(subjects[4].usubjid, None);
}

#[test]
fn loads_event_table_with_unparseable_cells_as_missing() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "adtte.csv", ADTTE);
    let events = load_events(&path).expect("load events");
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].aval, Some(2.0));
    assert_eq!(events[0].cnsr, Some(0.0));
    assert_eq!(events[1].aval, Some(3.5));
    assert_eq!(events[2].aval, None);
    assert_eq!(events[3].aval, None);
    assert_eq!(events[0].param_code.as_deref(), Some("TTDE"));
    assert_eq!(
        events[0].param.as_deref(),
        Some("Time to First Dermatologic Event")
    );
}

#[test]
fn alternate_arm_column() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "adsl.csv", ADSL);
    let columns = SubjectColumns::default().with_arm("arm");
    let subjects = load_subjects(&path, &columns).expect("load subjects");
    assert_eq!(subjects[0].arm_label.as_deref(), Some("Placebo"));
}

#[test]
fn missing_required_column_names_the_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "adtte.csv", "STUDYID,USUBJID,AVAL\nS,01,1\n");
    let err = load_events(&path).expect_err("missing CNSR");
    match err {
        IngestError::MissingColumn { column, path: reported } => {
            assert_eq!(column, "CNSR");
            assert_eq!(reported, path);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let err = load_subjects(&dir.path().join("nope.csv"), &SubjectColumns::default())
        .expect_err("missing file");
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}
