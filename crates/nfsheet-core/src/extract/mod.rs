//! Schema-specific field extraction.

mod goods;
mod service;

pub use goods::{GoodsExtractor, compose_goods_address, extract_goods};
pub use service::{ServiceExtractor, compose_service_address, extract_service, resolve_taker_id};

use serde::Serialize;

use crate::document::ParsedDocument;
use crate::error::ExtractionError;
use crate::models::{ExtractedRecord, GoodsInvoice, ServiceInvoice};
use crate::schema::{SchemaKind, detect};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for schema-specific extractors.
pub trait InvoiceExtractor {
    /// Typed record produced by this extractor.
    type Output;

    /// Schema this extractor accepts.
    const KIND: SchemaKind;

    /// Extract every declared field, failing on the first missing one.
    fn extract(&self, doc: &ParsedDocument) -> Result<Self::Output>;
}

/// A typed record of either schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "schema", rename_all = "snake_case")]
pub enum Extracted {
    Goods(GoodsInvoice),
    Service(ServiceInvoice),
}

impl Extracted {
    /// Schema the record came from.
    pub fn kind(&self) -> SchemaKind {
        match self {
            Extracted::Goods(_) => GoodsExtractor::KIND,
            Extracted::Service(_) => ServiceExtractor::KIND,
        }
    }

    /// Flatten into a tabulation record.
    pub fn to_record(&self) -> ExtractedRecord {
        match self {
            Extracted::Goods(invoice) => invoice.to_record(),
            Extracted::Service(invoice) => invoice.to_record(),
        }
    }
}

/// Detect the schema of a parsed document and run the matching extractor.
pub fn extract(doc: &ParsedDocument) -> Result<Extracted> {
    let kind = detect(doc);
    if kind == GoodsExtractor::KIND {
        GoodsExtractor.extract(doc).map(Extracted::Goods)
    } else if kind == ServiceExtractor::KIND {
        ServiceExtractor.extract(doc).map(Extracted::Service)
    } else {
        Err(ExtractionError::UnsupportedSchema {
            root: doc.root_name().unwrap_or_default().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    #[test]
    fn test_dispatch_goods() {
        let doc = parse_document(include_str!("../../tests/fixtures/nfe_danfe.xml")).unwrap();
        let extracted = extract(&doc).unwrap();
        assert_eq!(extracted.kind(), SchemaKind::GoodsInvoice);
        assert_eq!(extracted.to_record().columns(), GoodsInvoice::COLUMNS.to_vec());
    }

    #[test]
    fn test_dispatch_service() {
        let doc = parse_document(include_str!("../../tests/fixtures/nfse_cnpj.xml")).unwrap();
        let extracted = extract(&doc).unwrap();
        assert_eq!(extracted.kind(), SchemaKind::ServiceInvoice);
        assert_eq!(extracted.to_record().columns(), ServiceInvoice::COLUMNS.to_vec());
    }

    #[test]
    fn test_dispatch_unsupported() {
        let doc = parse_document("<CTe><infCte/></CTe>").unwrap();
        assert_eq!(
            extract(&doc).unwrap_err(),
            ExtractionError::UnsupportedSchema { root: "CTe".into() }
        );
    }

    #[test]
    fn test_extraction_is_pure() {
        let xml = include_str!("../../tests/fixtures/nfe_danfe.xml");
        let first = extract(&parse_document(xml).unwrap()).unwrap().to_record();
        let second = extract(&parse_document(xml).unwrap()).unwrap().to_record();
        assert_eq!(first, second);
    }
}
