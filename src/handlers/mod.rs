pub mod analytics;
pub mod auth;
pub mod common;
pub mod health;
pub mod inventory;
pub mod stock_history;
pub mod suppliers;

use std::sync::Arc;

use crate::{
    db::DbPool,
    services::{AnalyticsService, InventoryService, StockHistoryService, SupplierService},
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<InventoryService>,
    pub suppliers: Arc<SupplierService>,
    pub stock_history: Arc<StockHistoryService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            inventory: Arc::new(InventoryService::new(db_pool.clone())),
            suppliers: Arc::new(SupplierService::new(db_pool.clone())),
            stock_history: Arc::new(StockHistoryService::new(db_pool.clone())),
            analytics: Arc::new(AnalyticsService::new(db_pool)),
        }
    }
}
