//! Schema detection from the root element of a parsed document.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::ParsedDocument;

/// Root wrapper of an NF-e processing result (goods invoice).
pub const GOODS_INVOICE_ROOT: &str = "nfeProc";

/// Root wrapper of an NFS-e query response (service invoice).
pub const SERVICE_INVOICE_ROOT: &str = "ConsultarNfseResposta";

/// Known document schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// Electronic goods invoice (NF-e).
    GoodsInvoice,
    /// Municipal service invoice (NFS-e).
    ServiceInvoice,
    /// Anything else.
    Unsupported,
}

impl SchemaKind {
    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            SchemaKind::GoodsInvoice => "NF-e",
            SchemaKind::ServiceInvoice => "NFS-e",
            SchemaKind::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a document by its top-level keys.
pub fn detect(doc: &ParsedDocument) -> SchemaKind {
    let root = doc.root();
    if root.contains_key(GOODS_INVOICE_ROOT) {
        SchemaKind::GoodsInvoice
    } else if root.contains_key(SERVICE_INVOICE_ROOT) {
        SchemaKind::ServiceInvoice
    } else {
        SchemaKind::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;

    #[test]
    fn test_detect_goods_invoice() {
        let doc = parse_document(r#"<nfeProc versao="4.00"><NFe/></nfeProc>"#).unwrap();
        assert_eq!(detect(&doc), SchemaKind::GoodsInvoice);
    }

    #[test]
    fn test_detect_service_invoice() {
        let doc = parse_document("<ConsultarNfseResposta><ListaNfse/></ConsultarNfseResposta>")
            .unwrap();
        assert_eq!(detect(&doc), SchemaKind::ServiceInvoice);
    }

    #[test]
    fn test_detect_unsupported() {
        // A bare NFe without the processing wrapper is not accepted.
        let doc = parse_document("<NFe><infNFe/></NFe>").unwrap();
        assert_eq!(detect(&doc), SchemaKind::Unsupported);
    }

    #[test]
    fn test_display() {
        assert_eq!(SchemaKind::GoodsInvoice.to_string(), "NF-e");
        assert_eq!(SchemaKind::ServiceInvoice.to_string(), "NFS-e");
    }
}
