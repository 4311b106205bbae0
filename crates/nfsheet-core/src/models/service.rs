//! Service invoice (NFS-e) data model.

use serde::{Deserialize, Serialize};

use super::record::{ExtractedRecord, FieldValue};
use crate::schema::SchemaKind;

/// Fields extracted from an NFS-e query response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInvoice {
    /// Invoice number (`Numero`).
    pub number: String,
    /// Verification code (`CodigoVerificacao`).
    pub verification_code: String,
    /// IBGE code of the municipality where the service was rendered.
    pub municipal_code: String,
    pub issue_date: String,
    /// Service value (`Servico/Valores/ValorServicos`).
    pub service_value: String,
    /// Free-text description (`Servico/Discriminacao`).
    pub description: String,
    pub provider: Provider,
    pub taker: Taker,
}

/// Service provider (`PrestadorServico`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub cnpj: String,
    /// Trade name (`NomeFantasia`).
    pub name: String,
    /// Legal name (`RazaoSocial`).
    pub legal_name: String,
    pub address: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
}

/// Service taker (`TomadorServico`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taker {
    pub id: TakerId,
    pub name: String,
    pub address: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
}

/// Taker tax identifier: a company carries a CNPJ, a person a CPF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TakerId {
    /// CNPJ.
    Corporate(String),
    /// CPF.
    Personal(String),
}

impl TakerId {
    /// The identifier digits, whichever kind.
    pub fn value(&self) -> &str {
        match self {
            TakerId::Corporate(id) | TakerId::Personal(id) => id,
        }
    }

    pub fn is_corporate(&self) -> bool {
        matches!(self, TakerId::Corporate(_))
    }
}

impl ServiceInvoice {
    /// Spreadsheet columns, in output order.
    pub const COLUMNS: [&'static str; 19] = [
        "numero",
        "codigo_verificacao",
        "codigo_municipio",
        "data_emissao_nfse",
        "valor_servicos",
        "discriminacao",
        "cnpj_prestador",
        "nome_prestador",
        "razao_social_prestador",
        "endereco_prestador",
        "cep_prestador",
        "fone_prestador",
        "email_prestador",
        "cpf_cnpj_tomador",
        "nome_tomador",
        "endereco_tomador",
        "cep_tomador",
        "fone_tomador",
        "email_tomador",
    ];

    /// Flatten into a tabulation record.
    pub fn to_record(&self) -> ExtractedRecord {
        let values: [&str; 19] = [
            &self.number,
            &self.verification_code,
            &self.municipal_code,
            &self.issue_date,
            &self.service_value,
            &self.description,
            &self.provider.cnpj,
            &self.provider.name,
            &self.provider.legal_name,
            &self.provider.address,
            &self.provider.postal_code,
            &self.provider.phone,
            &self.provider.email,
            self.taker.id.value(),
            &self.taker.name,
            &self.taker.address,
            &self.taker.postal_code,
            &self.taker.phone,
            &self.taker.email,
        ];

        let mut record = ExtractedRecord::new(SchemaKind::ServiceInvoice);
        for (column, value) in Self::COLUMNS.into_iter().zip(values) {
            record.push(column, FieldValue::from(value));
        }
        record
    }
}
