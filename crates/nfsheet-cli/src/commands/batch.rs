//! Batch command - tabulate a directory of invoice files.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use nfsheet_core::{BatchDriver, BatchReport, FileOutcome, NfsheetConfig, Targets};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// File names inside the input directory (default: every matching file)
    files: Vec<String>,

    /// Input directory
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// One spreadsheet per file, or one for the whole run
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Spreadsheet format
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Stop at the first failing file
    #[arg(long)]
    fail_fast: bool,

    /// Rewrite the combined spreadsheet after every record
    #[arg(long)]
    rewrite_each_record: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Mode {
    Separate,
    Combined,
}

impl From<Mode> for nfsheet_core::TabulationMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Separate => Self::Separate,
            Mode::Combined => Self::Combined,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Format {
    Xlsx,
    Csv,
}

impl From<Format> for nfsheet_core::OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Xlsx => Self::Xlsx,
            Format::Csv => Self::Csv,
        }
    }
}

impl BatchArgs {
    /// Apply command line overrides on top of the loaded config.
    fn apply(&self, config: &mut NfsheetConfig) {
        if let Some(dir) = &self.input_dir {
            config.input.directory = dir.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if let Some(mode) = self.mode {
            config.batch.mode = mode.into();
        }
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
        config.batch.fail_fast |= self.fail_fast;
        config.batch.rewrite_each_record |= self.rewrite_each_record;
    }
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    args.apply(&mut config);
    debug!("Effective config: {:?}", config);

    let driver = BatchDriver::new(&config);
    let targets = Targets::from_names(args.files);

    let files = driver.resolve_targets(&targets)?;
    if files.is_empty() {
        anyhow::bail!(
            "No .{} files found in {}",
            config.input.extension,
            config.input.directory.display()
        );
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("=>-"),
    );

    let report = driver.run_with(&Targets::Files(files), config.batch.mode, |outcome| {
        pb.set_message(outcome.file.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();
    let report = report?;

    print_report(&report, start);

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_report(report: &BatchReport, start: Instant) {
    let succeeded = report.succeeded().count();
    let failed: Vec<&FileOutcome> = report.failed().collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        report.outcomes.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(succeeded).green(),
        style(failed.len()).red()
    );

    for output in report.outputs() {
        println!("   {} {}", style("→").cyan(), output.display());
    }

    if report.stopped_early {
        println!(
            "{} Stopped at the first failure",
            style("!").yellow()
        );
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for outcome in failed {
            println!(
                "  - {}: {}",
                outcome.file,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
