use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use lipidcalc::calc::CalculationEngine;
use lipidcalc::report::write_csv;

use super::{InputArgs, SettingsArgs};

pub struct CalculateOptions {
    pub inputs: InputArgs,
    pub settings: SettingsArgs,
    #[cfg(feature = "xlsx")]
    pub output: PathBuf,
    pub csv_dir: Option<PathBuf>,
    pub ledger: Option<PathBuf>,
    pub unavailable_marker: Option<String>,
}

/// Run the engine and write every requested output
pub fn run(options: CalculateOptions) -> Result<()> {
    let config = options.settings.config()?;
    let engine_settings = config.engine_settings(
        options.settings.coefficient,
        options.settings.derive_missing_references,
    );
    let export_settings = config.export_settings(options.unavailable_marker);

    let (store, matrix) = options.inputs.load(engine_settings.slot_layout)?;
    let run = CalculationEngine::new(&store, engine_settings)
        .run(&matrix)
        .map_err(super::surface)?;

    let (nist, agilent) = run.tables();
    let ratios = if export_settings.include_nist_ratio_sheet {
        run.nist_ratio_table()
    } else {
        None
    };

    let mut tables = vec![&nist, &agilent];
    if let Some(ratios) = ratios.as_ref() {
        tables.push(ratios);
    }

    #[cfg(feature = "xlsx")]
    {
        lipidcalc::report::write_xlsx(&options.output, &tables, &export_settings)
            .with_context(|| format!("Failed to write {}", options.output.display()))?;
        println!("Results written to {}", options.output.display());
    }

    if let Some(dir) = &options.csv_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for table in &tables {
            let path = dir.join(format!("{}.csv", table.kind.short_name()));
            write_csv(&path, table, &export_settings)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        println!("CSV tables written to {}", dir.display());
    }

    if let Some(path) = &options.ledger {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        run.ledger()
            .write_json(BufWriter::new(file))
            .with_context(|| format!("Failed to write ledger {}", path.display()))?;
        info!("Ledger written to {}", path.display());
    }

    println!("{}", run.stats());
    let issues = run.issues();
    if !issues.is_empty() {
        println!("{} cell issue(s); first few:", issues.len());
        for issue in issues.iter().take(10) {
            println!(
                "  row {} {} / {}: {}",
                issue.row_index, issue.compound, issue.sample, issue.error
            );
        }
    }

    Ok(())
}
