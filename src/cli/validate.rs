use anyhow::Result;
use log::info;

use lipidcalc::validator::validate_inputs;

use super::{InputArgs, SettingsArgs};

/// Pre-flight check of a workbook against the reference tables
pub fn run(inputs: InputArgs, settings: SettingsArgs) -> Result<()> {
    let engine_settings = settings
        .config()?
        .engine_settings(settings.coefficient, settings.derive_missing_references);

    info!("Pre-flight check of {}", inputs.workbook.display());

    let (store, matrix) = inputs.load(engine_settings.slot_layout)?;
    let mut report = validate_inputs(&store, &matrix, &engine_settings);
    report.workbook = inputs.workbook.display().to_string();

    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
