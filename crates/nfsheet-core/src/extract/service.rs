//! NFS-e (service invoice) extraction.

use tracing::debug;

use super::{InvoiceExtractor, Result};
use crate::document::{Cursor, ParsedDocument};
use crate::error::ExtractionError;
use crate::models::{Provider, ServiceInvoice, Taker, TakerId};
use crate::schema::SchemaKind;

const INF_NFSE: &str = "ConsultarNfseResposta/ListaNfse/CompNfse/Nfse/InfNfse";

/// Join street, neighborhood and state the way NFS-e addresses are shown.
pub fn compose_service_address(street: &str, neighborhood: &str, state: &str) -> String {
    format!("{street} - {neighborhood}, {state}")
}

/// Extracts [`ServiceInvoice`] records from `ConsultarNfseResposta` documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceExtractor;

impl InvoiceExtractor for ServiceExtractor {
    type Output = ServiceInvoice;

    const KIND: SchemaKind = SchemaKind::ServiceInvoice;

    fn extract(&self, doc: &ParsedDocument) -> Result<ServiceInvoice> {
        let inf = doc.at(INF_NFSE)?;
        let servico = inf.child("Servico")?;

        let invoice = ServiceInvoice {
            number: inf.text_at("Numero")?,
            verification_code: inf.text_at("CodigoVerificacao")?,
            municipal_code: servico.text_at("CodigoMunicipio")?,
            issue_date: inf.text_at("DataEmissao")?,
            service_value: servico.text_at("Valores/ValorServicos")?,
            description: servico.text_at("Discriminacao")?,
            provider: provider(&inf)?,
            taker: taker(&inf)?,
        };

        debug!(
            "Extracted NFS-e {} (taker {})",
            invoice.number,
            if invoice.taker.id.is_corporate() { "CNPJ" } else { "CPF" }
        );
        Ok(invoice)
    }
}

/// Extract a service invoice from a `ConsultarNfseResposta` document.
pub fn extract_service(doc: &ParsedDocument) -> Result<ServiceInvoice> {
    ServiceExtractor.extract(doc)
}

/// Resolve the taker identifier below `IdentificacaoTomador/CpfCnpj`.
///
/// `Cnpj` is tried first, then `Cpf`. When neither exists the error names
/// both candidates. A missing `CpfCnpj` node is an ordinary missing field.
pub fn resolve_taker_id(taker: &Cursor<'_>) -> Result<TakerId> {
    let cpf_cnpj = taker.at("IdentificacaoTomador/CpfCnpj")?;
    if let Some(cnpj) = cpf_cnpj.try_child("Cnpj")? {
        return cnpj.text().map(TakerId::Corporate);
    }
    if let Some(cpf) = cpf_cnpj.try_child("Cpf")? {
        return cpf.text().map(TakerId::Personal);
    }
    Err(ExtractionError::MissingField(format!(
        "{}/Cnpj|Cpf",
        cpf_cnpj.path()
    )))
}

fn address(party: &Cursor<'_>) -> Result<String> {
    let endereco = party.child("Endereco")?;
    Ok(compose_service_address(
        &endereco.text_at("Endereco")?,
        &endereco.text_at("Bairro")?,
        &endereco.text_at("Uf")?,
    ))
}

fn provider(inf: &Cursor<'_>) -> Result<Provider> {
    let prestador = inf.child("PrestadorServico")?;
    Ok(Provider {
        cnpj: prestador.text_at("IdentificacaoPrestador/Cnpj")?,
        name: prestador.text_at("NomeFantasia")?,
        legal_name: prestador.text_at("RazaoSocial")?,
        address: address(&prestador)?,
        postal_code: prestador.text_at("Endereco/Cep")?,
        phone: prestador.text_at("Contato/Telefone")?,
        email: prestador.text_at("Contato/Email")?,
    })
}

fn taker(inf: &Cursor<'_>) -> Result<Taker> {
    let tomador = inf.child("TomadorServico")?;
    Ok(Taker {
        id: resolve_taker_id(&tomador)?,
        name: tomador.text_at("RazaoSocial")?,
        address: address(&tomador)?,
        postal_code: tomador.text_at("Endereco/Cep")?,
        phone: tomador.text_at("Contato/Telefone")?,
        email: tomador.text_at("Contato/Email")?,
    })
}
