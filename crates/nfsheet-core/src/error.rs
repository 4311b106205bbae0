//! Error types for the nfsheet-core library.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::SchemaKind;

/// Main error type for the nfsheet library.
#[derive(Error, Debug)]
pub enum NfsheetError {
    /// Loading or parsing an input document failed.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Writing tabular output failed.
    #[error("tabulation error: {0}")]
    Tabulation(#[from] TabulationError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to reading and parsing XML documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes do not decode in the document's declared encoding.
    #[error("failed to decode text: {0}")]
    Encoding(String),

    /// The file is not well-formed XML.
    #[error("failed to parse XML: {0}")]
    Parse(String),

    /// The document has no root element.
    #[error("document has no root element")]
    Empty,
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The root element matches none of the known invoice wrappers.
    #[error("unsupported schema (root element: {root})")]
    UnsupportedSchema { root: String },

    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A single element was expected but the name repeats.
    #[error("repeated element where one was expected: {0}")]
    RepeatedElement(String),

    /// A field was found but holds a nested structure instead of text.
    #[error("field is not a text value: {0}")]
    NotText(String),
}

/// Errors related to writing spreadsheets.
#[derive(Error, Debug)]
pub enum TabulationError {
    /// XLSX writer error.
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// CSV writer error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A combined batch received records of more than one schema.
    #[error("mixed schemas in combined batch: expected {expected}, found {found} in {file}")]
    MixedSchema {
        expected: SchemaKind,
        found: SchemaKind,
        file: String,
    },

    /// Nothing to write.
    #[error("no records to tabulate")]
    EmptyTable,
}

/// Result type for the nfsheet library.
pub type Result<T> = std::result::Result<T, NfsheetError>;
