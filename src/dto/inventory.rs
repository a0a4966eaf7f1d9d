use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::entities::inventory_item;

/// Body for creating or replacing an inventory item.
///
/// Every field is optional on the wire so that the domain validators, not the JSON
/// extractor, report which rule a payload breaks.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItemRequest {
    /// Client-chosen id; generated when absent or blank
    pub id: Option<String>,
    #[validate(length(max = 255))]
    #[schema(example = "Widget")]
    pub name: String,
    #[schema(example = 25)]
    pub quantity: i32,
    #[schema(value_type = Option<String>, example = "12.50")]
    pub price: Option<Decimal>,
    #[validate(length(max = 64))]
    pub supplier_id: Option<String>,
    /// Reorder threshold; 10 when absent or not positive
    pub minimum_quantity: Option<i32>,
    #[validate(length(max = 255))]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemResponse {
    pub id: String,
    pub name: String,
    pub quantity: i32,
    #[schema(value_type = String, example = "12.50")]
    pub price: Decimal,
    /// quantity × price
    #[schema(value_type = String, example = "312.50")]
    pub total_value: Decimal,
    pub supplier_id: String,
    pub minimum_quantity: i32,
    pub low_stock: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<inventory_item::Model> for InventoryItemResponse {
    fn from(model: inventory_item::Model) -> Self {
        let low_stock = model.is_low_stock();
        Self {
            total_value: model.price * Decimal::from(model.quantity),
            id: model.id,
            name: model.name,
            quantity: model.quantity,
            price: model.price,
            supplier_id: model.supplier_id,
            minimum_quantity: model.minimum_quantity,
            low_stock,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InventorySearchParams {
    /// Case-insensitive substring of the item name
    #[serde(default)]
    pub name: String,
    /// Zero-based page index
    pub page: Option<u64>,
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LowStockParams {
    pub supplier_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct QuantityAdjustmentParams {
    /// Signed change to apply; must be non-zero
    pub delta: i32,
    /// Defaults to MANUAL_UPDATE
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PriceChangeParams {
    #[param(value_type = String, example = "19.99")]
    pub price: Decimal,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeletionParams {
    /// One of SCRAPPED, DESTROYED, DAMAGED, EXPIRED, LOST, RETURNED_TO_SUPPLIER
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let req: InventoryItemRequest = serde_json::from_str(r#"{"name":"Widget"}"#).unwrap();
        assert_eq!(req.name, "Widget");
        assert_eq!(req.quantity, 0);
        assert!(req.price.is_none());
        assert!(req.supplier_id.is_none());
    }

    #[test]
    fn price_accepts_numbers_and_strings() {
        let a: InventoryItemRequest = serde_json::from_str(r#"{"price": 12.5}"#).unwrap();
        let b: InventoryItemRequest = serde_json::from_str(r#"{"price": "12.50"}"#).unwrap();
        assert_eq!(a.price, Some(dec!(12.5)));
        assert_eq!(b.price, Some(dec!(12.50)));
    }

    #[test]
    fn response_computes_total_value_and_low_stock() {
        let model = inventory_item::Model {
            id: "i-1".into(),
            name: "Widget".into(),
            quantity: 4,
            price: dec!(2.50),
            supplier_id: "s-1".into(),
            minimum_quantity: 10,
            created_by: "alice".into(),
            created_at: Utc::now(),
        };
        let dto = InventoryItemResponse::from(model);
        assert_eq!(dto.total_value, dec!(10.00));
        assert!(dto.low_stock);

        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("supplierId").is_some());
        assert!(json.get("minimumQuantity").is_some());
    }
}
