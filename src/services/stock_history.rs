use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, Set};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    dto::{
        stock_history::{NewStockHistory, StockHistoryFilter, StockHistoryResponse},
        PaginatedResponse,
    },
    entities::{stock_history, StockChangeReason},
    errors::ServiceError,
    repositories::{PageRequest, StockHistoryRepository},
    validation::StockHistoryValidator,
};

/// Read access to the audit trail plus the single validated write path used by the
/// inventory service.
#[derive(Clone)]
pub struct StockHistoryService {
    db: Arc<DatabaseConnection>,
}

impl StockHistoryService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Validates and appends one audit row on the caller's connection, normally an open
    /// transaction.
    pub async fn record<C: ConnectionTrait>(
        db: &C,
        entry: NewStockHistory,
    ) -> Result<stock_history::Model, ServiceError> {
        StockHistoryValidator::validate(&entry)?;

        let row = stock_history::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            item_id: Set(entry.item_id),
            supplier_id: Set(entry.supplier_id),
            quantity_change: Set(entry.change),
            reason: Set(entry.reason),
            price_at_change: Set(entry.price_at_change),
            created_by: Set(entry.created_by),
            created_at: Set(Utc::now()),
        };
        let saved = StockHistoryRepository::insert(db, row).await?;
        debug!(item_id = %saved.item_id, change = saved.quantity_change, reason = %saved.reason, "stock history recorded");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<StockHistoryResponse>, ServiceError> {
        let rows = StockHistoryRepository::find_all(self.db.as_ref()).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn by_item(&self, item_id: &str) -> Result<Vec<StockHistoryResponse>, ServiceError> {
        let rows = StockHistoryRepository::find_by_item(self.db.as_ref(), item_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn by_reason(&self, reason: &str) -> Result<Vec<StockHistoryResponse>, ServiceError> {
        let reason = StockChangeReason::parse(reason)?;
        let rows = StockHistoryRepository::find_by_reason(self.db.as_ref(), reason).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self))]
    pub async fn search(
        &self,
        filter: StockHistoryFilter,
        page: PageRequest,
    ) -> Result<PaginatedResponse<StockHistoryResponse>, ServiceError> {
        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            if end < start {
                return Err(ServiceError::InvalidRequest(
                    "endDate must be >= startDate".to_string(),
                ));
            }
        }
        let filter = StockHistoryFilter {
            item_name: non_blank(filter.item_name),
            supplier_id: non_blank(filter.supplier_id),
            ..filter
        };

        let (rows, total) =
            StockHistoryRepository::search(self.db.as_ref(), &filter, page.page, page.size).await?;
        Ok(PaginatedResponse::new(
            rows.into_iter().map(Into::into).collect(),
            page.page,
            page.size,
            total,
        ))
    }

    /// Raw priced points for one item, oldest first
    #[instrument(skip(self))]
    pub async fn price_trend(
        &self,
        item_id: &str,
        supplier_id: Option<&str>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<(DateTime<Utc>, rust_decimal::Decimal)>, ServiceError> {
        Ok(
            StockHistoryRepository::find_price_points(self.db.as_ref(), item_id, supplier_id, start, end)
                .await?,
        )
    }
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
