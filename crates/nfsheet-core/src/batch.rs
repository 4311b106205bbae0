//! Batch processing of invoice files into spreadsheets.

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::document::DocumentLoader;
use crate::error::{NfsheetError, Result};
use crate::extract::{Extracted, extract};
use crate::models::config::NfsheetConfig;
use crate::schema::SchemaKind;
use crate::tabulate::{CombinedBatch, TabulationMode, Tabulator};

/// Which files a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    /// Every matching file in the input directory.
    Directory,
    /// Named files inside the input directory, in the given order.
    Files(Vec<String>),
}

impl Targets {
    /// Named files, or the whole directory when the list is empty.
    pub fn from_names(names: Vec<String>) -> Self {
        if names.is_empty() {
            Targets::Directory
        } else {
            Targets::Files(names)
        }
    }
}

/// Result of processing a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// File name inside the input directory.
    pub file: String,
    /// Detected schema, when extraction succeeded.
    pub kind: Option<SchemaKind>,
    /// Spreadsheet holding this file's row.
    pub output: Option<PathBuf>,
    /// Failure message, when processing failed.
    pub error: Option<String>,
    pub processing_time_ms: u64,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub mode: TabulationMode,
    /// Per-file outcomes in processing order.
    pub outcomes: Vec<FileOutcome>,
    /// The combined spreadsheet, when one was written.
    pub combined_output: Option<PathBuf>,
    /// Processing stopped at the first failure.
    pub stopped_early: bool,
}

impl BatchReport {
    fn new(mode: TabulationMode) -> Self {
        Self {
            mode,
            outcomes: Vec::new(),
            combined_output: None,
            stopped_early: false,
        }
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// True only when every file was processed without error.
    pub fn is_success(&self) -> bool {
        !self.stopped_early && self.failed().next().is_none()
    }

    /// Distinct spreadsheets written during the run.
    pub fn outputs(&self) -> Vec<&PathBuf> {
        let mut outputs: Vec<&PathBuf> = self
            .outcomes
            .iter()
            .filter_map(|o| o.output.as_ref())
            .collect();
        outputs.dedup();
        outputs
    }
}

/// Drives discovery, extraction and tabulation for a set of files.
pub struct BatchDriver {
    loader: DocumentLoader,
    extension: String,
    tabulator: Tabulator,
    fail_fast: bool,
    rewrite_each_record: bool,
}

impl BatchDriver {
    /// Create a driver from configuration.
    pub fn new(config: &NfsheetConfig) -> Self {
        Self {
            loader: DocumentLoader::new(&config.input.directory),
            extension: config.input.extension.clone(),
            tabulator: Tabulator::new(&config.output),
            fail_fast: config.batch.fail_fast,
            rewrite_each_record: config.batch.rewrite_each_record,
        }
    }

    /// Stop at the first failing file.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// In combined mode, rewrite the spreadsheet as soon as each record is
    /// extracted instead of once at the end.
    ///
    /// Readers can follow the file while the batch runs. The cost is that a
    /// mixed-schema failure or a `fail_fast` stop leaves the rows written so
    /// far on disk.
    pub fn with_rewrite_each_record(mut self, rewrite: bool) -> Self {
        self.rewrite_each_record = rewrite;
        self
    }

    /// Resolve targets to file names.
    pub fn resolve_targets(&self, targets: &Targets) -> Result<Vec<String>> {
        match targets {
            Targets::Files(names) => Ok(names.clone()),
            Targets::Directory => {
                let directory = self.loader.directory();
                if !directory.is_dir() {
                    return Err(NfsheetError::Config(format!(
                        "input directory not found: {}",
                        directory.display()
                    )));
                }
                self.loader.discover(&self.extension)
            }
        }
    }

    /// Load, detect and extract one file.
    pub fn process_file(&self, name: &str) -> Result<Extracted> {
        let doc = self.loader.load(name)?;
        let extracted = extract(&doc)?;
        debug!("{}: detected {}", name, extracted.kind());
        Ok(extracted)
    }

    /// Run the batch.
    pub fn run(&self, targets: &Targets, mode: TabulationMode) -> Result<BatchReport> {
        self.run_with(targets, mode, |_| {})
    }

    /// Run the batch, calling `observer` after each file.
    ///
    /// In combined mode records of different schemas fail the whole run.
    pub fn run_with<F>(
        &self,
        targets: &Targets,
        mode: TabulationMode,
        mut observer: F,
    ) -> Result<BatchReport>
    where
        F: FnMut(&FileOutcome),
    {
        let files = self.resolve_targets(targets)?;
        info!("Processing {} files ({:?} mode)", files.len(), mode);

        let mut report = BatchReport::new(mode);
        let mut combined = CombinedBatch::new();

        for file in files {
            let start = Instant::now();
            let result = self.process_file(&file).and_then(|extracted| match mode {
                TabulationMode::Separate => {
                    let path = self.tabulator.write_single(&file, &extracted.to_record())?;
                    Ok((extracted.kind(), Some(path), None))
                }
                TabulationMode::Combined => Ok((extracted.kind(), None, Some(extracted.to_record()))),
            });

            let mut outcome = match result {
                Ok((kind, output, record)) => {
                    if let Some(record) = record {
                        combined.push(&file, record)?;
                        if self.rewrite_each_record {
                            let path = self.tabulator.write_combined(&combined)?;
                            report.combined_output = Some(path.clone());
                        }
                    }
                    FileOutcome {
                        file,
                        kind: Some(kind),
                        output,
                        error: None,
                        processing_time_ms: 0,
                    }
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", file, e);
                    FileOutcome {
                        file,
                        kind: None,
                        output: None,
                        error: Some(e.to_string()),
                        processing_time_ms: 0,
                    }
                }
            };
            if outcome.is_success() {
                outcome.output = outcome.output.or_else(|| report.combined_output.clone());
            }
            outcome.processing_time_ms = start.elapsed().as_millis() as u64;

            observer(&outcome);
            let failed = !outcome.is_success();
            report.outcomes.push(outcome);

            if failed && self.fail_fast {
                warn!("Stopping batch after first failure");
                report.stopped_early = true;
                break;
            }
        }

        if mode == TabulationMode::Combined && !report.stopped_early && !self.rewrite_each_record {
            report.combined_output = self.write_combined(&combined)?;
            if let Some(path) = &report.combined_output {
                for outcome in report.outcomes.iter_mut().filter(|o| o.is_success()) {
                    outcome.output = Some(path.clone());
                }
            }
        }

        info!(
            "Batch complete: {} succeeded, {} failed",
            report.succeeded().count(),
            report.failed().count()
        );
        Ok(report)
    }

    fn write_combined(&self, batch: &CombinedBatch) -> Result<Option<PathBuf>> {
        if batch.is_empty() {
            warn!("No records extracted, combined spreadsheet not written");
            return Ok(None);
        }
        let path = self.tabulator.write_combined(batch)?;
        info!("Wrote {} rows to {}", batch.len(), path.display());
        Ok(Some(path))
    }
}
