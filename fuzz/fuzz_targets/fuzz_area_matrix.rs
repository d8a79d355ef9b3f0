#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use lipidcalc::calc::{CalculationEngine, EngineSettings};
use lipidcalc::matrix::AreaMatrix;
use lipidcalc::reference::ReferenceDataStore;
use lipidcalc::sheet::read_csv_from_reader;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either be rejected with an error or evaluate; never panic
    let Ok(sheet) = read_csv_from_reader(Cursor::new(data), b',', "fuzz.csv") else {
        return;
    };
    let Ok(matrix) = AreaMatrix::from_workbook(&sheet) else {
        return;
    };

    // Empty reference data: every cell becomes an unknown-compound error
    let store = ReferenceDataStore::default();
    if let Ok(run) = CalculationEngine::new(&store, EngineSettings::default()).run(&matrix) {
        let _ = run.tables();
        let _ = run.nist_ratio_table();
        let _ = run.ledger().to_json();
    }

    // The same bytes used as a compound index and NIST table
    let _ = ReferenceDataStore::load(&sheet, &sheet, Some(&sheet));
});
