//! Query objects over sea-orm, generic over [`sea_orm::ConnectionTrait`] so callers can pass
//! either the pool or an open transaction.

pub mod app_user;
pub mod inventory_item;
pub mod stock_history;
pub mod supplier;

pub use app_user::AppUserRepository;
pub use inventory_item::InventoryItemRepository;
pub use stock_history::StockHistoryRepository;
pub use supplier::SupplierRepository;

use sea_orm::sea_query::LikeExpr;

const LIKE_ESCAPE: char = '\\';

/// Lower-cased `%term%` pattern with LIKE wildcards in the term matched literally.
pub(crate) fn contains_pattern(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(&term.trim().to_lowercase()))).escape(LIKE_ESCAPE)
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Zero-based page request with a size clamped to `1..=max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(page: Option<u64>, size: Option<u64>, default_size: u64, max_size: u64) -> Self {
        Self {
            page: page.unwrap_or(0),
            size: size.unwrap_or(default_size).clamp(1, max_size.max(1)),
        }
    }
}
