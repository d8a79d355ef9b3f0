//! Integration tests for lipidcalc
//!
//! These tests run the full pipeline from table files on disk to exported
//! results and the ledger.

use lipidcalc::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const COMPOUND_INDEX: &str = "compound,istd_name,concentration_nM,response_factor
AcylCarnitine 10:0,LPC 18:1 d7,90.029,1.0
LPC 18:1 d7,LPC 18:1 d7,50,1.0
PC 16:0/18:1,LPC 18:1 d7,12.5,0.8
";

const NIST_TABLE: &str = "pattern,slot,compound,reference_ratio
5700-5800,1,AcylCarnitine 10:0,0.17689020
5700-5800,1,LPC 18:1 d7,1.0
5700-5800,1,PC 16:0/18:1,0.5
";

const WORKBOOK: &str = "Quantitation export, batch 12
Compound,PH-HC_5701,PH-HC_5799,PH-HC_5800
AcylCarnitine 10:0,212159,100000,5
LPC 18:1 d7,212434,0,10
PC 16:0\\18:1,50000,,20
";

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn load(dir: &Path) -> (ReferenceDataStore, AreaMatrix) {
    let compounds = read_sheet(write(dir, "compounds.csv", COMPOUND_INDEX), None).unwrap();
    let nist = read_sheet(write(dir, "nist.tsv", &NIST_TABLE.replace(',', "\t")), None).unwrap();
    let workbook = read_sheet(write(dir, "areas.csv", WORKBOOK), None).unwrap();

    let store = ReferenceDataStore::load(&compounds, &nist, None).unwrap();
    let matrix = AreaMatrix::from_workbook(&workbook).unwrap();
    (store, matrix)
}

/// The documented AcylCarnitine 10:0 cell, computed from files on disk
#[test]
fn test_end_to_end_from_files() {
    let dir = tempdir().unwrap();
    let (store, matrix) = load(dir.path());

    let run = CalculationEngine::new(&store, EngineSettings::default())
        .run(&matrix)
        .unwrap();
    let record = run.ledger().get("AcylCarnitine 10:0", "PH-HC_5701").unwrap();

    assert!((record.ratio.unwrap() - 0.99871088).abs() < 1e-5);
    assert!((record.nist_result.unwrap() - 5.6460).abs() < 1e-3);
    assert_eq!(
        record.agilent_result.unwrap(),
        record.ratio.unwrap() * 90.029 * 1.0 * 500.0
    );

    // Notation drift between workbook and index still resolves
    let pc = run.ledger().get("PC 16:0\\18:1", "PH-HC_5701").unwrap();
    assert_eq!(pc.ratio, Some(50000.0 / 212434.0));
    assert_eq!(pc.nist_result, Some(50000.0 / 212434.0 / 0.5));
}

#[test]
fn test_result_tables_match_workbook_layout() {
    let dir = tempdir().unwrap();
    let (store, matrix) = load(dir.path());
    let run = CalculationEngine::new(&store, EngineSettings::default())
        .run(&matrix)
        .unwrap();
    let (nist, agilent) = run.tables();

    assert_eq!(nist.compounds, matrix.compounds());
    assert_eq!(nist.columns, vec!["PH-HC_5701", "PH-HC_5799", "PH-HC_5800"]);
    assert_eq!(agilent.columns, nist.columns);

    // Zero ISTD in PH-HC_5799
    assert!(nist.get(0, 1).is_unavailable());
    assert!(agilent.get(0, 1).is_unavailable());
    // PH-HC_5800 belongs to 5800-5900, which has no reference ratios
    assert!(nist.get(0, 2).is_unavailable());
    assert_eq!(agilent.get(0, 2).value(), Some(0.5 * 90.029 * 1.0 * 500.0));

    assert!(run.nist_ratio_table().is_none());
}

#[test]
fn test_coefficient_scales_agilent_only() {
    let dir = tempdir().unwrap();
    let (store, matrix) = load(dir.path());

    let base = CalculationEngine::new(&store, EngineSettings::with_coefficient(500.0))
        .run(&matrix)
        .unwrap();
    let doubled = CalculationEngine::new(&store, EngineSettings::with_coefficient(1000.0))
        .run(&matrix)
        .unwrap();

    let (base_nist, base_agilent) = base.tables();
    let (doubled_nist, doubled_agilent) = doubled.tables();
    assert_eq!(base_nist.cells, doubled_nist.cells);
    for (a, b) in base_agilent.cells.iter().flatten().zip(doubled_agilent.cells.iter().flatten()) {
        match (a.value(), b.value()) {
            (Some(a), Some(b)) => assert_eq!(b, 2.0 * a),
            (None, None) => {}
            other => panic!("availability changed: {:?}", other),
        }
    }
}

#[test]
fn test_csv_and_ledger_export() {
    let dir = tempdir().unwrap();
    let (store, matrix) = load(dir.path());
    let run = CalculationEngine::new(&store, EngineSettings::default())
        .run(&matrix)
        .unwrap();
    let (nist, _) = run.tables();

    let csv_path = dir.path().join("nist.csv");
    write_csv(&csv_path, &nist, &ExportSettings::default()).unwrap();
    let text = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Compound,PH-HC_5701,PH-HC_5799,PH-HC_5800");
    assert!(lines[1].ends_with(",N/A,N/A"));

    let ledger_path = dir.path().join("ledger.json");
    run.ledger()
        .write_json(fs::File::create(&ledger_path).unwrap())
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&ledger_path).unwrap()).unwrap();
    assert_eq!(json["records"].as_array().unwrap().len(), 9);
    assert_eq!(json["run"]["compounds"], 3);
    assert!(json["issues"].as_array().unwrap().len() >= 4);
}

#[test]
fn test_structural_errors_are_collected() {
    let dir = tempdir().unwrap();
    let workbook = read_sheet(
        write(
            dir.path(),
            "bad.csv",
            "Compound,PH-HC_1,Well\nA,1,2\nA,1,2\nB,-1,2\n,3,4\n",
        ),
        None,
    )
    .unwrap();

    let err = RunError::from(AreaMatrix::from_workbook(&workbook).unwrap_err());
    assert!(matches!(err, RunError::StructuralInput(_)));
    assert!(err.issues().len() >= 4, "{}", err);
}

#[cfg(feature = "xlsx")]
#[test]
fn test_xlsx_round_trip() {
    use calamine::{open_workbook_auto, Data, Reader};
    use rust_xlsxwriter::Workbook;

    let dir = tempdir().unwrap();
    let input = dir.path().join("areas.xlsx");

    // Excel input with a title row and a measured NIST column
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Areas").unwrap();
    sheet.write_string(0, 0, "Batch 12").unwrap();
    for (col, header) in ["Compound", "PH-HC_5701", "NIST_5700-5800 (1)"].iter().enumerate() {
        sheet.write_string(1, col as u16, *header).unwrap();
    }
    let rows = [
        ("AcylCarnitine 10:0", 212159.0, 17689.02),
        ("LPC 18:1 d7", 212434.0, 100000.0),
        ("PC 16:0/18:1", 1000.0, 50000.0),
    ];
    for (i, (name, area, nist)) in rows.iter().enumerate() {
        let row = i as u32 + 2;
        sheet.write_string(row, 0, *name).unwrap();
        sheet.write_number(row, 1, *area).unwrap();
        sheet.write_number(row, 2, *nist).unwrap();
    }
    workbook.save(&input).unwrap();

    let compounds = read_sheet(write(dir.path(), "compounds.csv", COMPOUND_INDEX), None).unwrap();
    let nist = read_sheet(write(dir.path(), "nist.csv", NIST_TABLE), None).unwrap();
    let store = ReferenceDataStore::load(&compounds, &nist, None).unwrap();
    let matrix = AreaMatrix::from_workbook(&read_sheet(&input, Some("Areas")).unwrap()).unwrap();
    assert_eq!(matrix.compound_count(), 3);
    assert_eq!(matrix.reference_columns().len(), 1);

    let run = CalculationEngine::new(&store, EngineSettings::default())
        .run(&matrix)
        .unwrap();
    let (nist_table, agilent_table) = run.tables();
    let ratios = run.nist_ratio_table().unwrap();
    let output = dir.path().join("results.xlsx");
    write_xlsx(&output, &[&nist_table, &agilent_table, &ratios], &ExportSettings::default()).unwrap();

    let mut results = open_workbook_auto(&output).unwrap();
    assert_eq!(results.sheet_names(), vec!["NIST Results", "Agilent Results", "NIST Ratios"]);

    let range = results.worksheet_range("NIST Results").unwrap();
    assert_eq!(range.get((0, 0)), Some(&Data::String("Compound".to_string())));
    assert_eq!(range.get((0, 1)), Some(&Data::String("PH-HC_5701".to_string())));
    match range.get((1, 1)) {
        Some(Data::Float(value)) => assert!((value - 5.6460).abs() < 1e-3),
        other => panic!("unexpected cell {:?}", other),
    }

    let ratios = results.worksheet_range("NIST Ratios").unwrap();
    match ratios.get((1, 1)) {
        Some(Data::Float(value)) => assert!((value - 0.17689020).abs() < 1e-9),
        other => panic!("unexpected cell {:?}", other),
    }
}

#[cfg(feature = "xlsx")]
#[test]
fn test_missing_worksheet() {
    use rust_xlsxwriter::Workbook;

    let dir = tempdir().unwrap();
    let path = dir.path().join("one.xlsx");
    let mut workbook = Workbook::new();
    workbook.add_worksheet().write_string(0, 0, "Compound").unwrap();
    workbook.save(&path).unwrap();

    let err = read_sheet(&path, Some("Areas")).unwrap_err();
    assert!(matches!(err, SheetError::MissingWorksheet(name) if name == "Areas"));
}
