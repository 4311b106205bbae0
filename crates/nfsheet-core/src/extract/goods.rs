//! NF-e (goods invoice) extraction.

use tracing::debug;

use super::{InvoiceExtractor, Result};
use crate::document::{Cursor, ParsedDocument};
use crate::models::{Buyer, Carrier, GoodsInvoice, GoodsTotals, LineItem, Seller};
use crate::schema::SchemaKind;

const INF_NFE: &str = "nfeProc/NFe/infNFe";

/// Join street and neighborhood the way NF-e addresses are shown.
pub fn compose_goods_address(street: &str, neighborhood: &str) -> String {
    format!("{street}, {neighborhood}")
}

/// Extracts [`GoodsInvoice`] records from `nfeProc` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodsExtractor;

impl InvoiceExtractor for GoodsExtractor {
    type Output = GoodsInvoice;

    const KIND: SchemaKind = SchemaKind::GoodsInvoice;

    fn extract(&self, doc: &ParsedDocument) -> Result<GoodsInvoice> {
        let inf = doc.at(INF_NFE)?;
        let ide = inf.child("ide")?;

        let invoice = GoodsInvoice {
            operation_nature: ide.text_at("natOp")?,
            issue_date: ide.text_at("dhEmi")?,
            due_date: ide.text_at("dhSaiEnt")?,
            totals: totals(&inf)?,
            seller: seller(&inf)?,
            carrier: carrier(&inf)?,
            buyer: buyer(&inf)?,
            products: products(&inf)?,
        };

        debug!(
            "Extracted NF-e from {} with {} products",
            invoice.seller.cnpj,
            invoice.products.len()
        );
        Ok(invoice)
    }
}

/// Extract a goods invoice from an `nfeProc` document.
pub fn extract_goods(doc: &ParsedDocument) -> Result<GoodsInvoice> {
    GoodsExtractor.extract(doc)
}

fn totals(inf: &Cursor<'_>) -> Result<GoodsTotals> {
    let icms = inf.at("total/ICMSTot")?;
    Ok(GoodsTotals {
        invoice_total: icms.text_at("vNF")?,
        products_total: icms.text_at("vProd")?,
        discount: icms.text_at("vDesc")?,
        freight: icms.text_at("vFrete")?,
        tax_total: icms.text_at("vTotTrib")?,
    })
}

fn seller(inf: &Cursor<'_>) -> Result<Seller> {
    let emit = inf.child("emit")?;
    let address = emit.child("enderEmit")?;
    Ok(Seller {
        cnpj: emit.text_at("CNPJ")?,
        name: emit.text_at("xNome")?,
        address: compose_goods_address(
            &address.text_at("xLgr")?,
            &address.text_at("xBairro")?,
        ),
        municipality: address.text_at("xMun")?,
        state: address.text_at("UF")?,
        phone: address.text_at("fone")?,
    })
}

fn carrier(inf: &Cursor<'_>) -> Result<Carrier> {
    let carrier = inf.at("transp/transporta")?;
    Ok(Carrier {
        cnpj: carrier.text_at("CNPJ")?,
        name: carrier.text_at("xNome")?,
        address: carrier.text_at("xEnder")?,
        municipality: carrier.text_at("xMun")?,
        state: carrier.text_at("UF")?,
    })
}

fn buyer(inf: &Cursor<'_>) -> Result<Buyer> {
    let dest = inf.child("dest")?;
    let address = dest.child("enderDest")?;
    Ok(Buyer {
        cpf: dest.text_at("CPF")?,
        name: dest.text_at("xNome")?,
        address: compose_goods_address(
            &address.text_at("xLgr")?,
            &address.text_at("xBairro")?,
        ),
        municipality: address.text_at("xMun")?,
        state: address.text_at("UF")?,
        phone: address.text_at("fone")?,
        email: dest.text_at("email")?,
    })
}

fn products(inf: &Cursor<'_>) -> Result<Vec<LineItem>> {
    inf.child("det")?
        .items()
        .map(|det| -> Result<LineItem> {
            let prod = det.child("prod")?;
            Ok(LineItem::new(prod.text_at("xProd")?, prod.text_at("vProd")?))
        })
        .collect()
}
