use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{stock_history, StockChangeReason};

/// One audit row about to be written. Built by the inventory service, never by clients.
#[derive(Debug, Clone)]
pub struct NewStockHistory {
    pub item_id: String,
    pub supplier_id: Option<String>,
    pub change: i32,
    pub reason: StockChangeReason,
    pub price_at_change: Option<Decimal>,
    pub created_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockHistoryResponse {
    pub id: String,
    pub item_id: String,
    pub supplier_id: Option<String>,
    /// Signed quantity delta
    pub change: i32,
    pub reason: StockChangeReason,
    #[schema(value_type = Option<String>)]
    pub price_at_change: Option<Decimal>,
    pub created_by: String,
    pub timestamp: DateTime<Utc>,
}

impl From<stock_history::Model> for StockHistoryResponse {
    fn from(model: stock_history::Model) -> Self {
        Self {
            id: model.id,
            item_id: model.item_id,
            supplier_id: model.supplier_id,
            change: model.quantity_change,
            reason: model.reason,
            price_at_change: model.price_at_change,
            created_by: model.created_by,
            timestamp: model.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct StockHistorySearchParams {
    /// Inclusive lower bound (RFC 3339 or local ISO date-time, read as UTC)
    #[serde(default, deserialize_with = "super::de_opt_instant")]
    #[param(value_type = Option<String>)]
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound
    #[serde(default, deserialize_with = "super::de_opt_instant")]
    #[param(value_type = Option<String>)]
    pub end_date: Option<DateTime<Utc>>,
    pub item_name: Option<String>,
    pub supplier_id: Option<String>,
    /// Zero-based page index
    pub page: Option<u64>,
    /// Page size, 50 by default and clamped to 1..=200
    pub size: Option<u64>,
}

/// Normalized filter handed to the repository
#[derive(Debug, Clone, Default)]
pub struct StockHistoryFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub item_name: Option<String>,
    pub supplier_id: Option<String>,
}
