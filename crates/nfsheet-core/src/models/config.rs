//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::NfsheetError;
use crate::tabulate::{OutputFormat, TabulationMode};

/// Main configuration for nfsheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfsheetConfig {
    /// Input discovery configuration.
    pub input: InputConfig,

    /// Spreadsheet output configuration.
    pub output: OutputConfig,

    /// Batch run configuration.
    pub batch: BatchConfig,
}

/// Where input documents are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory holding the XML files.
    pub directory: PathBuf,

    /// File suffix considered when scanning the whole directory.
    pub extension: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("Notas Fiscais"),
            extension: "xml".to_string(),
        }
    }
}

/// How spreadsheets are named and written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the spreadsheets.
    pub directory: PathBuf,

    /// Spreadsheet format.
    pub format: OutputFormat,

    /// Prefix for per-document output files.
    pub file_prefix: String,

    /// File stem of the combined output.
    pub combined_name: String,

    /// Text written in place of empty values.
    pub no_value_marker: String,

    /// Field delimiter for CSV output; must be a single ASCII character.
    pub csv_delimiter: char,

    /// Worksheet name for XLSX output (Excel's default when unset).
    pub sheet_name: Option<String>,
}

impl OutputConfig {
    /// The CSV delimiter as a byte, when it is ASCII.
    pub fn csv_delimiter_byte(&self) -> Option<u8> {
        self.csv_delimiter
            .is_ascii()
            .then_some(self.csv_delimiter as u8)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            format: OutputFormat::Xlsx,
            file_prefix: "NF_".to_string(),
            combined_name: "NF".to_string(),
            no_value_marker: "N/A".to_string(),
            csv_delimiter: ',',
            sheet_name: None,
        }
    }
}

/// Batch run policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// One spreadsheet per document, or one for the whole run.
    pub mode: TabulationMode,

    /// Stop at the first failing document.
    pub fail_fast: bool,

    /// Rewrite the combined spreadsheet after every record.
    pub rewrite_each_record: bool,
}

impl NfsheetConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        config.validate().map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        Ok(config)
    }

    /// Check values serde accepts but the writers cannot use.
    pub fn validate(&self) -> Result<(), NfsheetError> {
        if self.output.csv_delimiter_byte().is_none() {
            return Err(NfsheetError::Config(format!(
                "output.csv_delimiter must be an ASCII character, got {:?}",
                self.output.csv_delimiter
            )));
        }
        if self.output.sheet_name.as_deref().is_some_and(str::is_empty) {
            return Err(NfsheetError::Config(
                "output.sheet_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
