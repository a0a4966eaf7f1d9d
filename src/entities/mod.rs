pub mod app_user;
pub mod inventory_item;
pub mod stock_history;
pub mod supplier;

pub use app_user::Role;
pub use stock_history::StockChangeReason;
