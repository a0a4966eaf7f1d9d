//! Domain rules checked before anything is persisted.

pub mod inventory_item;
pub mod security;
pub mod stock_history;
pub mod supplier;

pub use security::InventoryItemSecurityValidator;
pub use stock_history::StockHistoryValidator;
pub use supplier::SupplierValidator;

pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}
