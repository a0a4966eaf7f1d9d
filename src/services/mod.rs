// Inventory domain
pub mod inventory;
pub mod stock_history;
pub mod suppliers;

// Reporting
pub mod analytics;

pub use analytics::AnalyticsService;
pub use inventory::InventoryService;
pub use stock_history::StockHistoryService;
pub use suppliers::SupplierService;
