use super::*;
use crate::calc::{CalculationEngine, EngineSettings};
use crate::reference::ReferenceDataStore;
use crate::sheet::{read_csv_from_reader, RawSheet};

fn sheet(text: &str) -> RawSheet {
    read_csv_from_reader(std::io::Cursor::new(text), b',', "test.csv").unwrap()
}

fn run() -> crate::calc::CalculationRun {
    let store = ReferenceDataStore::load(
        &sheet("Compound,ISTD,Conc. (nM)\nZ 2:0,IS,2\nIS,IS,1\nA 1:0,IS,4"),
        &sheet("pattern,slot,compound,reference_ratio\n100-200,1,Z 2:0,0.5\n100-200,1,IS,1\n100-200,1,A 1:0,2"),
        None,
    )
    .unwrap();
    let matrix = AreaMatrix::from_workbook(&sheet(
        "Compound,S_150,S_120,S_250\nZ 2:0,10,20,30\nIS,10,0,10\nA 1:0,5,,5",
    ))
    .unwrap();
    CalculationEngine::new(&store, EngineSettings::with_coefficient(10.0))
        .run(&matrix)
        .unwrap()
}

#[test]
fn test_tables_keep_workbook_order() {
    let (nist, agilent) = run().tables();

    for table in [&nist, &agilent] {
        assert_eq!(table.compounds, vec!["Z 2:0", "IS", "A 1:0"]);
        assert_eq!(table.columns, vec!["S_150", "S_120", "S_250"]);
    }
    assert_eq!(nist.kind.sheet_name(), "NIST Results");
    assert_eq!(agilent.kind.sheet_name(), "Agilent Results");
}

#[test]
fn test_unavailable_cells() {
    let (nist, agilent) = run().tables();

    // Complete cell
    assert_eq!(nist.get(0, 0), ResultCell::Value(1.0 / 0.5));
    assert_eq!(agilent.get(0, 0), ResultCell::Value(1.0 * 2.0 * 1.0 * 10.0));
    // Zero ISTD: both unavailable
    assert_eq!(nist.get(0, 1), ResultCell::Unavailable);
    assert_eq!(agilent.get(0, 1), ResultCell::Unavailable);
    // Missing area
    assert_eq!(nist.lookup("A 1:0", "S_120"), Some(ResultCell::Unavailable));
    // Pattern 200-300 has no references: NIST unavailable, Agilent computed
    assert_eq!(nist.get(0, 2), ResultCell::Unavailable);
    assert_eq!(agilent.get(0, 2), ResultCell::Value(3.0 * 2.0 * 1.0 * 10.0));

    assert_eq!(nist.available_count(), 3);
    assert_eq!(agilent.available_count(), 6);
}

#[test]
fn test_stats() {
    let stats = run().stats();

    assert_eq!(stats.cells, 9);
    assert_eq!(stats.nist_available, 3);
    assert_eq!(stats.agilent_available, 6);
    assert_eq!(stats.cells_with_errors, 6);
    assert_eq!(stats.patterns.len(), 2);
    assert!(stats.to_string().contains("3 compounds x 3 samples = 9 cells"));
}

#[test]
fn test_csv_export() {
    let (nist, _) = run().tables();
    let settings = ExportSettings {
        unavailable_marker: "n.d.".to_string(),
        ..ExportSettings::default()
    };

    let mut buffer = Vec::new();
    write_csv_to(&mut buffer, &nist, &settings).unwrap();
    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "Compound,S_150,S_120,S_250");
    assert_eq!(lines[1], "Z 2:0,2,n.d.,n.d.");
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_result_table_bounds() {
    let mut table = ResultTable::new(ResultKind::Nist, vec!["A".into()], vec!["S_1".into()]);
    table.set(5, 5, ResultCell::Value(1.0));
    assert_eq!(table.get(5, 5), ResultCell::Unavailable);
    assert_eq!(table.available_count(), 0);
    assert_eq!(table.lookup("B", "S_1"), None);
    assert_eq!(ResultCell::from(Some(2.0)).value(), Some(2.0));
}

#[cfg(feature = "xlsx")]
#[test]
fn test_xlsx_export_sheet_names() {
    use calamine::{open_workbook_auto, Reader};

    let (nist, agilent) = run().tables();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.xlsx");
    write_xlsx(&path, &[&nist, &agilent], &ExportSettings::default()).unwrap();

    let mut workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["NIST Results", "Agilent Results"]);
    let range = workbook.worksheet_range("NIST Results").unwrap();
    assert_eq!(range.get_size(), (4, 4));
}
