//! Flat, column-ordered records ready for tabulation.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

use crate::schema::SchemaKind;

/// One (product name, product value) pair from a goods invoice.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct LineItem {
    /// Product description (`xProd`).
    pub name: String,
    /// Product value as written in the document (`vProd`).
    pub amount: String,
}

impl LineItem {
    pub fn new(name: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
        }
    }
}

/// Value of a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// A scalar taken verbatim from the document.
    Text(String),
    /// Ordered line items (goods invoices only).
    Items(Vec<LineItem>),
}

impl FieldValue {
    /// Whether the value carries nothing worth showing.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Items(items) => items.is_empty(),
        }
    }

    /// Render as a single spreadsheet cell.
    ///
    /// Empty values become `no_value`. Line items render as
    /// `name: amount` pairs joined by `"; "`.
    pub fn render(&self, no_value: &str) -> String {
        if self.is_empty() {
            return no_value.to_string();
        }
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Items(items) => items
                .iter()
                .map(|item| format!("{}: {}", item.name, item.amount))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Vec<LineItem>> for FieldValue {
    fn from(value: Vec<LineItem>) -> Self {
        FieldValue::Items(value)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(text) => serializer.serialize_str(text),
            FieldValue::Items(items) => items.serialize(serializer),
        }
    }
}

/// Column name to value mapping in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    kind: SchemaKind,
    fields: Vec<(&'static str, FieldValue)>,
}

impl ExtractedRecord {
    /// Create an empty record for a schema.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    /// Append a column.
    pub fn push(&mut self, column: &'static str, value: impl Into<FieldValue>) {
        self.fields.push((column, value.into()));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, column: &'static str, value: impl Into<FieldValue>) -> Self {
        self.push(column, value);
        self
    }

    /// Schema the record was extracted from.
    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Look up a column value.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(name, _)| *name).collect()
    }

    /// Iterate `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ExtractedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
