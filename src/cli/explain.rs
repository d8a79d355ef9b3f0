use anyhow::{bail, Context, Result};

use lipidcalc::calc::CalculationEngine;

use super::{InputArgs, SettingsArgs};

/// Print the derivation of one (compound, sample) cell
pub fn run(inputs: InputArgs, settings: SettingsArgs, compound: &str, sample: &str, json: bool) -> Result<()> {
    let engine_settings = settings
        .config()?
        .engine_settings(settings.coefficient, settings.derive_missing_references);

    let (store, matrix) = inputs.load(engine_settings.slot_layout)?;

    // Accept notation variants of the compound name
    let Some(row) = matrix.find_row(compound) else {
        bail!("Compound '{}' is not in the workbook", compound);
    };
    let compound = matrix.compounds()[row].clone();

    let run = CalculationEngine::new(&store, engine_settings)
        .run(&matrix)
        .map_err(super::surface)?;
    let record = run.ledger().get(&compound, sample.trim())?;

    if json {
        let text = serde_json::to_string_pretty(record).context("Failed to serialise record")?;
        println!("{}", text);
        return Ok(());
    }

    println!("{}", record.breakdown());
    println!(
        "Row {} -> pattern {} ({:?}), slot {}",
        record.row_index, record.pattern, record.pattern_source, record.slot
    );
    if let Some(plate) = &record.plate {
        println!("Plate: {}", plate);
    }
    Ok(())
}
