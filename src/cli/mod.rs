use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use std::path::{Path, PathBuf};

use lipidcalc::error::RunError;
use lipidcalc::grouping::SlotLayout;
use lipidcalc::matrix::AreaMatrix;
use lipidcalc::reference::ReferenceDataStore;
use lipidcalc::sheet::{read_sheet, RawSheet};

mod calculate;
mod config;
mod explain;
mod validate;

pub use config::Config;

/// lipidcalc - Ratio, NIST and Agilent calculations for lipid peak areas
#[derive(Parser)]
#[command(name = "lipidcalc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Input tables shared by every command
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Raw-area workbook (.csv, .tsv, .xlsx, .xls)
    #[arg(value_name = "WORKBOOK")]
    pub workbook: PathBuf,

    /// Worksheet of the workbook to read (first worksheet when omitted)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// Compound index table
    #[arg(long, value_name = "FILE")]
    pub compounds: PathBuf,

    /// NIST ratio table
    #[arg(long, value_name = "FILE")]
    pub nist: PathBuf,

    /// Optional sample index table
    #[arg(long, value_name = "FILE")]
    pub samples: Option<PathBuf>,
}

/// Calculation settings shared by every command
#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Agilent coefficient (default 500)
    #[arg(short = 'c', long)]
    pub coefficient: Option<f64>,

    /// Use measured NIST_ columns when the ratio table lacks an entry
    #[arg(long)]
    pub derive_missing_references: bool,

    /// Load settings from a TOML config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine and write the NIST and Agilent result tables
    Calculate {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Excel output file with the result sheets
        #[cfg(feature = "xlsx")]
        #[arg(short = 'o', long, value_name = "FILE", default_value = "lipidcalc_results.xlsx")]
        output: PathBuf,

        /// Also write one CSV file per result table into this directory
        #[arg(long, value_name = "DIR")]
        csv_dir: Option<PathBuf>,

        /// Write the calculation ledger as JSON
        #[arg(long, value_name = "FILE")]
        ledger: Option<PathBuf>,

        /// Text written for unavailable cells
        #[arg(long, value_name = "TEXT")]
        unavailable_marker: Option<String>,
    },

    /// Show how one result cell was derived
    Explain {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Compound name as written in the workbook
        #[arg(long)]
        compound: String,

        /// Sample identifier
        #[arg(long)]
        sample: String,

        /// Print the ledger record as JSON instead of formulas
        #[arg(long)]
        json: bool,
    },

    /// Check workbook and reference coverage without calculating
    Validate {
        #[command(flatten)]
        inputs: InputArgs,

        #[command(flatten)]
        settings: SettingsArgs,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Calculate {
            inputs,
            settings,
            #[cfg(feature = "xlsx")]
            output,
            csv_dir,
            ledger,
            unavailable_marker,
        } => calculate::run(calculate::CalculateOptions {
            inputs,
            settings,
            #[cfg(feature = "xlsx")]
            output,
            csv_dir,
            ledger,
            unavailable_marker,
        }),
        Commands::Explain {
            inputs,
            settings,
            compound,
            sample,
            json,
        } => explain::run(inputs, settings, &compound, &sample, json),
        Commands::Validate { inputs, settings } => validate::run(inputs, settings),
    }
}

fn read_table(path: &Path, worksheet: Option<&str>, what: &str) -> Result<RawSheet> {
    read_sheet(path, worksheet).with_context(|| format!("Failed to read {}: {}", what, path.display()))
}

/// Log every issue of a run-level error before handing it to anyhow
fn surface(run_error: RunError) -> anyhow::Error {
    for issue in run_error.issues() {
        error!("{}", issue);
    }
    anyhow::Error::new(run_error)
}

impl InputArgs {
    /// Read and validate the reference tables and the workbook
    pub fn load(&self, layout: SlotLayout) -> Result<(ReferenceDataStore, AreaMatrix)> {
        let compounds = read_table(&self.compounds, None, "compound index")?;
        let nist = read_table(&self.nist, None, "NIST ratio table")?;
        let samples = self
            .samples
            .as_deref()
            .map(|path| read_table(path, None, "sample index"))
            .transpose()?;
        let workbook = read_table(&self.workbook, self.sheet.as_deref(), "workbook")?;

        info!("Workbook: {}", self.workbook.display());

        let store = ReferenceDataStore::load_with_layout(&compounds, &nist, samples.as_ref(), layout)
            .map_err(|e| surface(RunError::from(e)))?;
        let matrix = AreaMatrix::from_workbook(&workbook).map_err(|e| surface(RunError::from(e)))?;
        Ok((store, matrix))
    }
}

impl SettingsArgs {
    /// Config file contents (defaults when no file was given)
    pub fn config(&self) -> Result<Config> {
        Config::load(self.config.as_deref())
    }
}
