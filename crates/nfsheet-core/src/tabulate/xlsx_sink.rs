//! Excel workbook output.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};

use super::{Result, Table, TabulationSink};

/// Writes a table to a single-sheet `.xlsx` workbook.
///
/// Every cell is written as a string so values such as CNPJs and postal codes
/// keep their leading zeros.
#[derive(Debug, Clone, Default)]
pub struct XlsxSink {
    sheet_name: Option<String>,
}

impl XlsxSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the worksheet (Excel default otherwise).
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }
}

impl TabulationSink for XlsxSink {
    fn write(&self, table: &Table, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        let worksheet = workbook.add_worksheet();
        if let Some(name) = &self.sheet_name {
            worksheet.set_name(name)?;
        }

        for (col, name) in table.columns().iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, name, &header)?;
        }
        for (row, cells) in table.rows().iter().enumerate() {
            for (col, value) in cells.iter().enumerate() {
                worksheet.write_string(row as u32 + 1, col as u16, value)?;
            }
        }

        workbook.save(path)?;
        Ok(())
    }
}
