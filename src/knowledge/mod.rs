//! Knowledge store — the two read-only datasets consulted before the LLM.
//!
//! Both are loaded once at startup from JSON files. A missing or malformed
//! file is an [`AppError::DataSource`] and aborts startup; there is no
//! reload.

pub mod faq;
pub mod orders;

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::AppError;

pub use faq::FaqIndex;
pub use orders::{OrderIndex, OrderRecord};

#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    pub faq: FaqIndex,
    pub orders: OrderIndex,
}

impl KnowledgeStore {
    pub fn new(faq: FaqIndex, orders: OrderIndex) -> Self {
        Self { faq, orders }
    }

    pub fn load(faq_path: &Path, orders_path: &Path) -> Result<Self, AppError> {
        let faq = FaqIndex::load(faq_path)?;
        let orders = OrderIndex::load(orders_path)?;
        info!(faq = faq.len(), orders = orders.len(), "knowledge store loaded");
        Ok(Self { faq, orders })
    }
}

/// Read `path` and deserialize it as `T`, mapping every failure to
/// [`AppError::DataSource`].
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::DataSource(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::DataSource(format!("malformed {}: {e}", path.display())))
}
