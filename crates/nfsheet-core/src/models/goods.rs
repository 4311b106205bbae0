//! Goods invoice (NF-e) data model.

use serde::{Deserialize, Serialize};

use super::record::{ExtractedRecord, FieldValue, LineItem};
use crate::schema::SchemaKind;

/// Fields extracted from an NF-e processing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsInvoice {
    /// Operation nature (`ide/natOp`).
    pub operation_nature: String,
    /// Issue timestamp (`ide/dhEmi`).
    pub issue_date: String,
    /// Exit/entry timestamp (`ide/dhSaiEnt`), reported as the due date.
    pub due_date: String,
    pub totals: GoodsTotals,
    pub seller: Seller,
    pub carrier: Carrier,
    pub buyer: Buyer,
    /// Products in document order.
    pub products: Vec<LineItem>,
}

/// `total/ICMSTot` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsTotals {
    /// Invoice total (`vNF`).
    pub invoice_total: String,
    /// Sum of product values (`vProd`).
    pub products_total: String,
    /// Discount (`vDesc`).
    pub discount: String,
    /// Freight (`vFrete`).
    pub freight: String,
    /// Approximate tax burden (`vTotTrib`).
    pub tax_total: String,
}

/// Issuer (`emit`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub cnpj: String,
    pub name: String,
    pub address: String,
    pub municipality: String,
    pub state: String,
    pub phone: String,
}

/// Carrier (`transp/transporta`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    pub cnpj: String,
    pub name: String,
    pub address: String,
    pub municipality: String,
    pub state: String,
}

/// Recipient (`dest`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    pub cpf: String,
    pub name: String,
    pub address: String,
    pub municipality: String,
    pub state: String,
    pub phone: String,
    pub email: String,
}

impl GoodsInvoice {
    /// Spreadsheet columns, in output order.
    pub const COLUMNS: [&'static str; 27] = [
        "natureza_operacao",
        "data_emissao",
        "data_vencimento",
        "valor_total",
        "valor_produtos",
        "valor_desconto",
        "valor_frete",
        "valor_tributos",
        "cnpj_vendedor",
        "nome_vendedor",
        "endereco_vendedor",
        "municipio_vendedor",
        "estado_vendedor",
        "fone_vendedor",
        "cnpj_transportadora",
        "nome_transportadora",
        "endereco_transportadora",
        "municipio_transportadora",
        "estado_transportadora",
        "cpf_comprador",
        "nome_comprador",
        "endereco_comprador",
        "municipio_comprador",
        "estado_comprador",
        "fone_comprador",
        "email_comprador",
        "produtos",
    ];

    /// Flatten into a tabulation record.
    pub fn to_record(&self) -> ExtractedRecord {
        let values: [FieldValue; 27] = [
            self.operation_nature.as_str().into(),
            self.issue_date.as_str().into(),
            self.due_date.as_str().into(),
            self.totals.invoice_total.as_str().into(),
            self.totals.products_total.as_str().into(),
            self.totals.discount.as_str().into(),
            self.totals.freight.as_str().into(),
            self.totals.tax_total.as_str().into(),
            self.seller.cnpj.as_str().into(),
            self.seller.name.as_str().into(),
            self.seller.address.as_str().into(),
            self.seller.municipality.as_str().into(),
            self.seller.state.as_str().into(),
            self.seller.phone.as_str().into(),
            self.carrier.cnpj.as_str().into(),
            self.carrier.name.as_str().into(),
            self.carrier.address.as_str().into(),
            self.carrier.municipality.as_str().into(),
            self.carrier.state.as_str().into(),
            self.buyer.cpf.as_str().into(),
            self.buyer.name.as_str().into(),
            self.buyer.address.as_str().into(),
            self.buyer.municipality.as_str().into(),
            self.buyer.state.as_str().into(),
            self.buyer.phone.as_str().into(),
            self.buyer.email.as_str().into(),
            self.products.clone().into(),
        ];

        let mut record = ExtractedRecord::new(SchemaKind::GoodsInvoice);
        for (column, value) in Self::COLUMNS.into_iter().zip(values) {
            record.push(column, value);
        }
        record
    }
}
