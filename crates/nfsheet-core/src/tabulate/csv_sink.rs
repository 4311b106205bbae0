//! CSV output.

use std::path::Path;

use super::{Result, Table, TabulationSink};

/// Writes a table as comma-separated values with a header row.
#[derive(Debug, Clone, Copy)]
pub struct CsvSink {
    delimiter: u8,
}

impl Default for CsvSink {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use another field delimiter (e.g. `;` for spreadsheets in pt-BR locales).
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl TabulationSink for CsvSink {
    fn write(&self, table: &Table, path: &Path) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(path)?;

        wtr.write_record(table.columns())?;
        for row in table.rows() {
            wtr.write_record(row)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
