use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::errors::ServiceError;

/// Why a stock level (or price) changed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum StockChangeReason {
    #[sea_orm(string_value = "INITIAL_STOCK")]
    InitialStock,
    #[sea_orm(string_value = "MANUAL_UPDATE")]
    ManualUpdate,
    #[sea_orm(string_value = "PRICE_CHANGE")]
    PriceChange,
    #[sea_orm(string_value = "SOLD")]
    Sold,
    #[sea_orm(string_value = "SCRAPPED")]
    Scrapped,
    #[sea_orm(string_value = "DESTROYED")]
    Destroyed,
    #[sea_orm(string_value = "DAMAGED")]
    Damaged,
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
    #[sea_orm(string_value = "LOST")]
    Lost,
    #[sea_orm(string_value = "RETURNED_TO_SUPPLIER")]
    ReturnedToSupplier,
    #[sea_orm(string_value = "RETURNED_BY_CUSTOMER")]
    ReturnedByCustomer,
}

impl StockChangeReason {
    /// Parses a raw reason, rejecting unknown values with the offending input.
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        raw.trim().parse::<Self>().map_err(|_| {
            ServiceError::InvalidRequest(format!("Unsupported change reason: {}", raw))
        })
    }

    /// Reasons that may accompany the removal of an item.
    pub fn is_deletion_reason(self) -> bool {
        matches!(
            self,
            Self::Scrapped
                | Self::Destroyed
                | Self::Damaged
                | Self::Expired
                | Self::Lost
                | Self::ReturnedToSupplier
        )
    }
}

/// Append-only audit row. `item_id` is a soft reference so rows survive item deletion.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_history")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub item_id: String,
    pub supplier_id: Option<String>,
    pub quantity_change: i32,
    pub reason: StockChangeReason,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub price_at_change: Option<Decimal>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_item::Entity",
        from = "Column::ItemId",
        to = "super::inventory_item::Column::Id"
    )]
    InventoryItem,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::inventory_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItem.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
