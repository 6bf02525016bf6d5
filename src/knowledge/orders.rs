//! Order index: order id → order record.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// An order as stored in the dataset. Only `status` is required; any other
/// fields are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub status: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderIndex {
    orders: HashMap<String, OrderRecord>,
}

impl OrderIndex {
    /// Load a JSON object keyed by order id.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let orders: HashMap<String, OrderRecord> = super::read_json(path)?;
        Ok(Self { orders })
    }

    pub fn from_records(records: impl IntoIterator<Item = (String, OrderRecord)>) -> Self {
        Self { orders: records.into_iter().collect() }
    }

    /// Exact match on the identifier.
    pub fn get(&self, order_id: &str) -> Option<&OrderRecord> {
        self.orders.get(order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
