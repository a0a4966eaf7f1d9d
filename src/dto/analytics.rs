use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DateWindowParams {
    /// First day (YYYY-MM-DD); 30 days ago when absent
    pub start: Option<NaiveDate>,
    /// Last day, inclusive; today when absent
    pub end: Option<NaiveDate>,
    pub supplier_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SupplierScopeParams {
    pub supplier_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummaryParams {
    /// First day of the period (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Last day of the period, inclusive
    pub to: Option<NaiveDate>,
    pub supplier_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PriceTrendParams {
    pub item_id: Option<String>,
    pub supplier_id: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Filter for the stock-updates report. Accepted both as query parameters and as a JSON body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StockUpdateFilter {
    #[serde(deserialize_with = "super::de_opt_instant")]
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "super::de_opt_instant")]
    #[param(value_type = Option<String>)]
    #[schema(value_type = Option<String>)]
    pub end_date: Option<DateTime<Utc>>,
    pub item_name: Option<String>,
    pub supplier_id: Option<String>,
    pub created_by: Option<String>,
    pub min_change: Option<i32>,
    pub max_change: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockValuePoint {
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockPerSupplier {
    pub supplier_name: String,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdateFrequency {
    pub item_name: String,
    pub update_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub item_name: String,
    pub quantity: i32,
    pub minimum_quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStockMovement {
    /// YYYY-MM
    pub month: String,
    pub stock_in: i64,
    pub stock_out: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdateRow {
    pub item_name: String,
    pub supplier_name: String,
    pub quantity_change: i32,
    pub reason: String,
    pub created_by: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceTrendPoint {
    /// YYYY-MM-DD
    pub timestamp: String,
    #[schema(value_type = String)]
    pub price: Decimal,
}

/// Period valuation under weighted average cost.
///
/// Opening value plus purchases and customer returns, less cost of goods sold and write-offs,
/// gives the ending value (up to rounding of the running average).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    /// Always `WAC`
    pub method: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub opening_qty: i64,
    #[schema(value_type = String)]
    pub opening_value: Decimal,
    /// Net of returns to supplier
    pub purchases_qty: i64,
    #[schema(value_type = String)]
    pub purchases_cost: Decimal,
    pub returns_in_qty: i64,
    #[schema(value_type = String)]
    pub returns_in_cost: Decimal,
    pub cogs_qty: i64,
    #[schema(value_type = String)]
    pub cogs_cost: Decimal,
    pub write_off_qty: i64,
    #[schema(value_type = String)]
    pub write_off_cost: Decimal,
    pub ending_qty: i64,
    #[schema(value_type = String)]
    pub ending_value: Decimal,
}
