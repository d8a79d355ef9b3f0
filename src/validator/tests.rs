use super::*;
use crate::sheet::{read_csv_from_reader, RawSheet};

fn sheet(text: &str) -> RawSheet {
    read_csv_from_reader(std::io::Cursor::new(text), b',', "test.csv").unwrap()
}

fn store() -> ReferenceDataStore {
    ReferenceDataStore::load(
        &sheet("Compound,ISTD,Conc. (nM)\nA 1:0,IS,1\nIS,IS,1\nB 2:0,IS d9,1\nC 3:0,,1"),
        &sheet("pattern,slot,compound,reference_ratio\n5700-5800,1,A 1:0,0.5\n5700-5800,1,IS,1\n5700-5800,1,B 2:0,-1"),
        None,
    )
    .unwrap()
}

fn matrix(text: &str) -> AreaMatrix {
    AreaMatrix::from_workbook(&sheet(text)).unwrap()
}

#[test]
fn test_validation_report_display() {
    let mut report = ValidationReport::new("areas.xlsx");
    report.add_check(ValidationCheck::ok("Test check 1"));
    report.add_check(ValidationCheck::warning("Test check 2", "This is a warning").with_details(vec!["x".into()]));
    report.add_check(ValidationCheck::failed("Test check 3", "This failed"));

    let output = format!("{}", report);
    assert!(output.contains("✓"));
    assert!(output.contains("⚠"));
    assert!(output.contains("✗"));
    assert!(output.contains("      x"));
    assert!(output.contains("1 passed, 1 warnings, 1 failed"));
    assert!(output.contains("Pre-flight FAILED"));
}

#[test]
fn test_clean_inputs_pass() {
    let matrix = matrix("Compound,PH-HC_5701\nA 1:0,1\nIS,1");
    let report = validate_inputs(&store(), &matrix, &EngineSettings::default());

    assert!(!report.has_failures(), "{}", report);
    assert!(!report.has_warnings(), "{}", report);
    assert_eq!(report.checks.len(), 6);
}

#[test]
fn test_coverage_gaps_are_warnings() {
    let matrix = matrix("Compound,PH-HC_5701,PH-HC_5801\nA 1:0,1,1\nIS,1,1\nB 2:0,1,1\nC 3:0,1,1\nZ 9:0,1,1");
    let report = validate_inputs(&store(), &matrix, &EngineSettings::default());

    assert!(!report.has_failures());
    let status = |name: &str| report.check(name).map(|c| c.status.clone());

    assert!(matches!(status(CHECK_COMPOUNDS), Some(CheckStatus::Warning(m)) if m.starts_with("1 ")));
    assert!(matches!(status(CHECK_ISTD), Some(CheckStatus::Warning(m)) if m.starts_with("2 ")));
    assert!(matches!(status(CHECK_PATTERNS), Some(CheckStatus::Warning(m)) if m.contains("5800-5900")));

    let nist = report.check(CHECK_NIST).unwrap();
    // 4 known compounds x 2 patterns: C 3:0 and all of 5800-5900 missing, B 2:0 invalid
    assert!(matches!(&nist.status, CheckStatus::Warning(m) if m.starts_with("5 of 8") && m.ends_with("1 invalid")));
}

#[test]
fn test_invalid_coefficient_fails() {
    let matrix = matrix("Compound,PH-HC_5701\nA 1:0,1\nIS,1");
    let report = validate_inputs(&store(), &matrix, &EngineSettings::with_coefficient(-1.0));

    assert!(report.has_failures());
    assert!(matches!(
        report.check(CHECK_COEFFICIENT).map(|c| &c.status),
        Some(CheckStatus::Failed(_))
    ));
}

#[test]
fn test_wraparound_is_flagged() {
    let mut text = String::from("Compound,PH-HC_5701\n");
    for i in 0..101 {
        text.push_str(&format!("X{i},1\n"));
    }
    let report = validate_inputs(&store(), &matrix(&text), &EngineSettings::default());

    assert!(matches!(
        report.check(CHECK_WORKBOOK).map(|c| &c.status),
        Some(CheckStatus::Warning(m)) if m.contains("wrap to slot 1")
    ));
}
