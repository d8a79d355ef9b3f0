//! # lipidcalc
//!
//! Command-line front end of the lipidcalc engine.
//!
//! ## Usage
//!
//! ```bash
//! # Calculate NIST and Agilent results into an Excel workbook
//! lipidcalc calculate raw_areas.xlsx --compounds compound_index.csv --nist nist_ratios.csv -o results.xlsx
//!
//! # Explain one cell
//! lipidcalc explain raw_areas.xlsx --compounds compound_index.csv --nist nist_ratios.csv \
//!     --compound "AcylCarnitine 10:0" --sample PH-HC_5701
//!
//! # Pre-flight check
//! lipidcalc validate raw_areas.xlsx --compounds compound_index.csv --nist nist_ratios.csv
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
