//! Turning extracted records into spreadsheets.
//!
//! A [`Table`] is built from one or more [`ExtractedRecord`]s and handed to a
//! [`TabulationSink`]. [`Tabulator`] applies the naming and write policy for
//! both tabulation modes.

mod csv_sink;
mod xlsx_sink;

pub use csv_sink::CsvSink;
pub use xlsx_sink::XlsxSink;

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TabulationError;
use crate::models::ExtractedRecord;
use crate::models::config::OutputConfig;
use crate::schema::SchemaKind;

/// Result type for tabulation operations.
pub type Result<T> = std::result::Result<T, TabulationError>;

/// Whether each document gets its own spreadsheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabulationMode {
    /// One spreadsheet per input document.
    #[default]
    Separate,
    /// One spreadsheet for the whole run.
    Combined,
}

/// Spreadsheet file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Excel workbook.
    #[default]
    Xlsx,
    /// Comma-separated values.
    Csv,
}

impl OutputFormat {
    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }

}

/// Trait for spreadsheet writers.
pub trait TabulationSink {
    /// Write a table to `path`, replacing any existing file.
    fn write(&self, table: &Table, path: &Path) -> Result<()>;
}

/// Header plus rows of rendered cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from records of one schema.
    ///
    /// Columns follow the first record's insertion order. Empty or absent
    /// values are written as `no_value`.
    pub fn from_records<'a, I>(records: I, no_value: &str) -> Result<Self>
    where
        I: IntoIterator<Item = &'a ExtractedRecord>,
    {
        let mut records = records.into_iter().peekable();
        let columns: Vec<&'static str> = records
            .peek()
            .map(|first| first.columns())
            .ok_or(TabulationError::EmptyTable)?;

        let rows = records
            .map(|record| {
                columns
                    .iter()
                    .map(|column| match record.get(column) {
                        Some(value) => value.render(no_value),
                        None => no_value.to_string(),
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            columns: columns.into_iter().map(str::to_string).collect(),
            rows,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
}

/// Records accumulated for a combined spreadsheet.
///
/// All records must share one schema.
#[derive(Debug, Clone, Default)]
pub struct CombinedBatch {
    kind: Option<SchemaKind>,
    records: Vec<ExtractedRecord>,
}

impl CombinedBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record extracted from `file`.
    pub fn push(&mut self, file: &str, record: ExtractedRecord) -> Result<()> {
        match self.kind {
            Some(expected) if expected != record.kind() => {
                return Err(TabulationError::MixedSchema {
                    expected,
                    found: record.kind(),
                    file: file.to_string(),
                });
            }
            Some(_) => {}
            None => self.kind = Some(record.kind()),
        }
        self.records.push(record);
        Ok(())
    }

    /// Schema shared by every record, once one was pushed.
    pub fn kind(&self) -> Option<SchemaKind> {
        self.kind
    }

    pub fn records(&self) -> &[ExtractedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Names and writes spreadsheets according to the output configuration.
pub struct Tabulator {
    sink: Box<dyn TabulationSink>,
    format: OutputFormat,
    directory: PathBuf,
    file_prefix: String,
    combined_name: String,
    no_value_marker: String,
}

impl Tabulator {
    /// Create a tabulator from output settings.
    pub fn new(config: &OutputConfig) -> Self {
        let sink: Box<dyn TabulationSink> = match config.format {
            OutputFormat::Xlsx => {
                let mut sink = XlsxSink::new();
                if let Some(name) = &config.sheet_name {
                    sink = sink.with_sheet_name(name);
                }
                Box::new(sink)
            }
            OutputFormat::Csv => {
                Box::new(CsvSink::new().with_delimiter(config.csv_delimiter_byte().unwrap_or(b',')))
            }
        };

        Self {
            sink,
            format: config.format,
            directory: config.directory.clone(),
            file_prefix: config.file_prefix.clone(),
            combined_name: config.combined_name.clone(),
            no_value_marker: config.no_value_marker.clone(),
        }
    }

    /// Output path for a single source document, e.g. `NF_A_DANFE.xml.xlsx`.
    ///
    /// Only the file name of `source_name` is used, so `2023/a.xml` lands
    /// in the output directory as `NF_a.xml.xlsx`.
    pub fn single_output_path(&self, source_name: &str) -> PathBuf {
        let file_name = Path::new(source_name)
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or(Cow::Borrowed(source_name));
        self.directory.join(format!(
            "{}{}.{}",
            self.file_prefix,
            file_name,
            self.format.extension()
        ))
    }

    /// Output path of the combined spreadsheet, e.g. `NF.xlsx`.
    pub fn combined_output_path(&self) -> PathBuf {
        self.directory
            .join(format!("{}.{}", self.combined_name, self.format.extension()))
    }

    fn ensure_directory(&self) -> Result<()> {
        if !self.directory.as_os_str().is_empty() {
            fs::create_dir_all(&self.directory)?;
        }
        Ok(())
    }

    /// Write one record to its own spreadsheet.
    pub fn write_single(&self, source_name: &str, record: &ExtractedRecord) -> Result<PathBuf> {
        self.ensure_directory()?;
        let path = self.single_output_path(source_name);
        let table = Table::from_records([record], &self.no_value_marker)?;
        self.sink.write(&table, &path)?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Write every record accumulated so far to the combined spreadsheet,
    /// replacing any previous version of the file.
    pub fn write_combined(&self, batch: &CombinedBatch) -> Result<PathBuf> {
        let kind = batch.kind().ok_or(TabulationError::EmptyTable)?;
        self.ensure_directory()?;
        let path = self.combined_output_path();
        let table = Table::from_records(batch.records(), &self.no_value_marker)?;
        self.sink.write(&table, &path)?;
        debug!("Wrote {} {} rows to {}", batch.len(), kind, path.display());
        Ok(path)
    }
}
