//! Core library for Brazilian fiscal invoice XML processing.
//!
//! This crate provides:
//! - XML loading into nested key-value trees
//! - Schema detection for NF-e (goods) and NFS-e (service) documents
//! - Fixed-path field extraction into typed records
//! - Tabulation into XLSX or CSV spreadsheets, per document or combined
//! - A batch driver with per-file failure isolation

pub mod batch;
pub mod document;
pub mod error;
pub mod extract;
pub mod models;
pub mod schema;
pub mod tabulate;

pub use batch::{BatchDriver, BatchReport, FileOutcome, Targets};
pub use document::{DocumentLoader, Node, NodeMap, ParsedDocument, decode_document, parse_document};
pub use error::{DocumentError, ExtractionError, NfsheetError, Result, TabulationError};
pub use extract::{Extracted, InvoiceExtractor, extract, extract_goods, extract_service};
pub use models::config::NfsheetConfig;
pub use models::{ExtractedRecord, FieldValue, GoodsInvoice, LineItem, ServiceInvoice, TakerId};
pub use schema::{SchemaKind, detect};
pub use tabulate::{CombinedBatch, OutputFormat, Table, TabulationMode, TabulationSink, Tabulator};
