use super::*;
use crate::calc::CellError;
use crate::grouping::{PatternSource, Slot, SlotLayout};
use crate::matrix::RangePattern;

fn pattern() -> RangePattern {
    "5700-5800".parse().unwrap()
}

fn complete_record() -> CalculationRecord {
    let mut record = CalculationRecord::new(
        "AcylCarnitine 10:0",
        "PH-HC_5701",
        1,
        pattern(),
        PatternSource::Derived,
        Slot::new(1).unwrap(),
    );
    record.source_area = Some(212159.0);
    record.istd_name = Some("LPC 18:1 d7".to_string());
    record.istd_row_index = Some(2);
    record.istd_found = true;
    record.istd_area = Some(212434.0);
    record.ratio = Some(0.5);
    record.nist_reference_used = Some(NistReferenceUsed {
        pattern: pattern(),
        pattern_source: PatternSource::Derived,
        slot: Slot::new(1).unwrap(),
        value: 0.25,
        source: ReferenceSource::Table,
    });
    record.nist_result = Some(2.0);
    record.agilent_inputs = Some(AgilentInputs {
        concentration_nm: 90.029,
        response_factor: 1.0,
        coefficient: 500.0,
    });
    record.agilent_result = Some(0.5 * 90.029 * 500.0);
    record
}

fn ledger() -> CalculationLedger {
    CalculationLedger::new(RunInfo::new(500.0, SlotLayout::default(), 1, 2))
}

#[test]
fn test_record_and_get() {
    let mut ledger = ledger();
    ledger.record(complete_record()).unwrap();

    let record = ledger.get("AcylCarnitine 10:0", "PH-HC_5701").unwrap();
    assert_eq!(record.nist_result, Some(2.0));
    assert_eq!(ledger.len(), 1);

    let missing = ledger.get("AcylCarnitine 10:0", "PH-HC_5702").unwrap_err();
    assert!(matches!(missing, LedgerError::NotFound { ref sample, .. } if sample == "PH-HC_5702"));
}

#[test]
fn test_records_are_never_replaced() {
    let mut ledger = ledger();
    ledger.record(complete_record()).unwrap();

    let mut second = complete_record();
    second.nist_result = Some(99.0);
    let err = ledger.record(second).unwrap_err();

    assert!(matches!(err, LedgerError::Duplicate { .. }));
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.get("AcylCarnitine 10:0", "PH-HC_5701").unwrap().nist_result, Some(2.0));
}

#[test]
fn test_breakdown_substitutes_recorded_values() {
    let breakdown = complete_record().breakdown();

    assert_eq!(breakdown.steps.len(), 3);
    assert_eq!(breakdown.steps[0].substituted.as_deref(), Some("212159 ÷ 212434"));
    assert_eq!(breakdown.steps[1].substituted.as_deref(), Some("0.5 ÷ 0.25"));
    assert!(breakdown.steps[1].formula.contains("pattern 5700-5800, slot 1"));
    assert_eq!(breakdown.steps[2].substituted.as_deref(), Some("0.5 × 90.029 × 1 × 500"));
    assert!(breakdown.steps.iter().all(|s| s.note.is_none()));

    let text = breakdown.to_string();
    assert!(text.contains("AcylCarnitine 10:0 / PH-HC_5701"));
    assert!(text.contains("= 0.5 ÷ 0.25 = 2"));
}

#[test]
fn test_breakdown_explains_failures() {
    let mut record = complete_record();
    record.istd_area = Some(0.0);
    record.ratio = None;
    record.nist_reference_used = None;
    record.nist_result = None;
    record.agilent_result = None;
    record.errors.push(CellError::ZeroIstd {
        istd: "LPC 18:1 d7".to_string(),
        area: Some(0.0),
    });

    let breakdown = record.breakdown();
    assert_eq!(breakdown.steps[0].result, None);
    assert_eq!(breakdown.steps[0].substituted.as_deref(), Some("212159 ÷ 0"));
    for step in &breakdown.steps {
        assert!(step.note.as_deref().unwrap().starts_with("ISTD area is zero or missing"));
    }
    assert!(breakdown.to_string().contains("unavailable: ISTD area is zero or missing"));
}

#[test]
fn test_issues_and_json_export() {
    let mut ledger = ledger();
    ledger.record(complete_record()).unwrap();

    let mut failed = CalculationRecord::new(
        "AcylCarnitine 10:0",
        "PH-HC_5702",
        1,
        pattern(),
        PatternSource::Derived,
        Slot::new(1).unwrap(),
    );
    failed.errors.push(CellError::MissingArea);
    ledger.record(failed).unwrap();

    let issues = ledger.issues();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].sample, "PH-HC_5702");
    assert_eq!(ledger.cells_with_errors(), 1);

    let json: serde_json::Value = serde_json::from_str(&ledger.to_json().unwrap()).unwrap();
    assert_eq!(json["run"]["coefficient"], 500.0);
    assert!(json["run"]["run_id"].as_str().is_some());
    assert_eq!(json["records"].as_array().unwrap().len(), 2);
    assert_eq!(json["records"][0]["compound"], "AcylCarnitine 10:0");
    assert_eq!(json["records"][0]["nist_reference_used"]["source"]["kind"], "table");
    assert_eq!(json["records"][0]["breakdown"][2]["step"], 3);
    assert_eq!(json["records"][1]["errors"][0]["kind"], "missing_area");
    assert_eq!(json["issues"][0]["error"]["kind"], "missing_area");
}
