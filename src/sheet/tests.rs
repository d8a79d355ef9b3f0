use super::*;
use std::io::Cursor;

fn grid(rows: &[&[&str]]) -> Vec<Vec<RawCell>> {
    rows.iter()
        .map(|row| row.iter().map(|text| RawCell::from_text(text)).collect())
        .collect()
}

#[test]
fn test_header_after_title_rows() {
    let rows = grid(&[
        &["Export of 2024-03-01, batch 7"],
        &[""],
        &["Compound", "PH-HC_5701", "PH-HC_5702"],
        &["AcylCarnitine 10:0", "1", "2"],
    ]);
    assert_eq!(locate_header_row(&rows), Some(2));

    let sheet = RawSheet::from_grid("export", rows).unwrap();
    assert_eq!(sheet.header, vec!["Compound", "PH-HC_5701", "PH-HC_5702"]);
    assert_eq!(sheet.rows.len(), 1);
}

#[test]
fn test_sample_header_row_by_identifiers() {
    let rows = grid(&[
        &["Batch 7"],
        &["", "PH-HC_5701", "PH-HC_5702"],
        &["LPC 18:1 d7", "3", "4"],
    ]);
    assert_eq!(locate_header_row(&rows), Some(0));
    assert_eq!(locate_sample_header_row(&rows), Some(1));

    let sheet = RawSheet::from_grid("export", rows).unwrap();
    let promoted = sheet.promote_row(0);
    assert_eq!(promoted.header, vec!["", "PH-HC_5701", "PH-HC_5702"]);
    assert_eq!(promoted.rows.len(), 1);
}

#[test]
fn test_plate_labels_do_not_move_the_header() {
    let rows = grid(&[
        &["sample", "pattern", "plate"],
        &["PH-HC_5701", "5800-5900", "Plate_1"],
        &["PH-HC_5702", "", "Plate_1"],
    ]);
    assert_eq!(count_sample_identifiers(&rows[1]), 2);
    assert_eq!(locate_header_row(&rows), Some(0));

    let sheet = read_csv_from_reader(
        Cursor::new("Plate map, batch 7\nsample,pattern,plate\nPH-HC_5701,5800-5900,Plate_1\n"),
        b',',
        "samples.csv",
    )
    .unwrap();
    assert_eq!(sheet.header, vec!["sample", "pattern", "plate"]);
    assert_eq!(sheet.rows.len(), 1);
}

#[test]
fn test_header_falls_back_to_first_non_blank_row() {
    let rows = grid(&[&["", ""], &["pattern", "slot"], &["5700-5800", "1"]]);
    assert_eq!(locate_header_row(&rows), Some(1));
    assert_eq!(locate_header_row(&grid(&[&[""]])), None);
}

#[test]
fn test_missing_tokens() {
    for token in ["", "  ", "N/A", "na", "#N/A", "NaN", "NULL"] {
        assert!(RawCell::from_text(token).is_missing(), "{:?}", token);
        assert_eq!(RawCell::from_text(token).as_number(), Ok(None));
    }
    assert!(!RawCell::Number(0.0).is_missing());
    assert!(!RawCell::from_text("0").is_missing());
}

#[test]
fn test_as_number() {
    assert_eq!(RawCell::from_text(" 212159 ").as_number(), Ok(Some(212159.0)));
    assert_eq!(RawCell::from_text("1e3").as_number(), Ok(Some(1000.0)));
    assert_eq!(RawCell::Number(0.5).as_number(), Ok(Some(0.5)));
    assert_eq!(RawCell::from_text("abc").as_number(), Err("abc".to_string()));
}

#[test]
fn test_csv_short_rows_and_column_lookup() {
    let sheet = read_csv_from_reader(
        Cursor::new("Compound,ISTD,Conc. (nM)\nA 1:0,B\n"),
        b',',
        "compounds.csv",
    )
    .unwrap();

    assert_eq!(sheet.column_index(&["istd_name", "istd"]), Some(1));
    assert_eq!(sheet.column_index(&["CONC. (NM)"]), Some(2));
    assert_eq!(sheet.column_index(&["plate"]), None);
    assert_eq!(sheet.cell(0, 2), &RawCell::Empty);
    assert_eq!(sheet.cell(5, 0), &RawCell::Empty);
}

#[test]
fn test_tab_delimited() {
    let sheet = read_csv_from_reader(Cursor::new("Compound\tPH-HC_1\nA\t1\n"), b'\t', "t.tsv").unwrap();
    assert_eq!(sheet.header, vec!["Compound", "PH-HC_1"]);
    assert_eq!(sheet.cell(0, 1).as_number(), Ok(Some(1.0)));
}

#[test]
fn test_empty_input_is_an_error() {
    let err = read_csv_from_reader(Cursor::new(""), b',', "empty.csv").unwrap_err();
    assert!(matches!(err, SheetError::Empty(name) if name == "empty.csv"));
}

#[test]
fn test_unsupported_extension() {
    let err = read_sheet("areas.json", None).unwrap_err();
    assert!(matches!(err, SheetError::UnsupportedFormat(_)));
}
