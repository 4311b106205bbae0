//! Data models for extracted invoices and configuration.

pub mod config;
pub mod goods;
pub mod record;
pub mod service;

pub use goods::{Buyer, Carrier, GoodsInvoice, GoodsTotals, Seller};
pub use record::{ExtractedRecord, FieldValue, LineItem};
pub use service::{Provider, ServiceInvoice, Taker, TakerId};
