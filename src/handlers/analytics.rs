use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Query, State,
    },
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::common::{json_body, query_params, success_response};
use crate::{
    dto::analytics::{
        DateWindowParams, FinancialSummary, FinancialSummaryParams, ItemUpdateFrequency,
        LowStockItem, MonthlyStockMovement, PriceTrendParams, PriceTrendPoint, StockPerSupplier,
        StockUpdateFilter, StockUpdateRow, StockValuePoint, SupplierScopeParams,
    },
    errors::ApiError,
    AppState,
};

/// Build the analytics Router scoped under `/api/analytics`.
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/stock-value", get(stock_value))
        .route("/stock-per-supplier", get(stock_per_supplier))
        .route("/item-update-frequency", get(item_update_frequency))
        .route("/low-stock-items", get(low_stock_items))
        .route("/low-stock-count", get(low_stock_count))
        .route("/monthly-stock-movement", get(monthly_stock_movement))
        .route("/stock-updates", get(stock_updates))
        .route("/stock-updates/query", post(query_stock_updates))
        .route("/price-trend", get(price_trend))
        .route("/financial/summary", get(financial_summary))
}

#[utoipa::path(
    get,
    path = "/api/analytics/stock-value",
    params(DateWindowParams),
    responses(
        (status = 200, description = "Daily stock valuation", body = [StockValuePoint]),
        (status = 400, description = "start after end", body = crate::errors::ErrorResponse),
    ),
    tag = "analytics"
)]
pub async fn stock_value(
    State(state): State<AppState>,
    query: Result<Query<DateWindowParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    let points = state
        .services
        .analytics
        .stock_value_over_time(params.start, params.end, params.supplier_id)
        .await?;
    Ok(success_response(points))
}

#[utoipa::path(
    get,
    path = "/api/analytics/stock-per-supplier",
    responses((status = 200, description = "Total quantity per supplier, largest first", body = [StockPerSupplier])),
    tag = "analytics"
)]
pub async fn stock_per_supplier(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.analytics.stock_per_supplier().await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/item-update-frequency",
    params(SupplierScopeParams),
    responses(
        (status = 200, description = "History entries per item, most active first", body = [ItemUpdateFrequency]),
        (status = 400, description = "supplierId missing", body = crate::errors::ErrorResponse),
    ),
    tag = "analytics"
)]
pub async fn item_update_frequency(
    State(state): State<AppState>,
    query: Result<Query<SupplierScopeParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    Ok(success_response(
        state
            .services
            .analytics
            .item_update_frequency(params.supplier_id)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/low-stock-items",
    params(SupplierScopeParams),
    responses(
        (status = 200, description = "Supplier items under their minimum", body = [LowStockItem]),
        (status = 400, description = "supplierId missing", body = crate::errors::ErrorResponse),
    ),
    tag = "analytics"
)]
pub async fn low_stock_items(
    State(state): State<AppState>,
    query: Result<Query<SupplierScopeParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    Ok(success_response(
        state
            .services
            .analytics
            .low_stock_items(params.supplier_id)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/low-stock-count",
    responses((status = 200, description = "Number of items under their minimum", body = u64)),
    tag = "analytics"
)]
pub async fn low_stock_count(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.analytics.low_stock_count().await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/monthly-stock-movement",
    params(DateWindowParams),
    responses(
        (status = 200, description = "Units in and out per month", body = [MonthlyStockMovement]),
        (status = 400, description = "start after end", body = crate::errors::ErrorResponse),
    ),
    tag = "analytics"
)]
pub async fn monthly_stock_movement(
    State(state): State<AppState>,
    query: Result<Query<DateWindowParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    Ok(success_response(
        state
            .services
            .analytics
            .monthly_stock_movement(params.start, params.end, params.supplier_id)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/stock-updates",
    params(StockUpdateFilter),
    responses(
        (status = 200, description = "Matching stock updates, newest first", body = [StockUpdateRow]),
        (status = 400, description = "Inverted date or change range", body = crate::errors::ErrorResponse),
    ),
    tag = "analytics"
)]
pub async fn stock_updates(
    State(state): State<AppState>,
    query: Result<Query<StockUpdateFilter>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query_params(query)?;
    Ok(success_response(
        state.services.analytics.filtered_stock_updates(filter).await?,
    ))
}

/// Same report as `GET /stock-updates`, with the filter sent as a JSON body
#[utoipa::path(
    post,
    path = "/api/analytics/stock-updates/query",
    request_body = StockUpdateFilter,
    responses(
        (status = 200, description = "Matching stock updates, newest first", body = [StockUpdateRow]),
        (status = 400, description = "Inverted date or change range", body = crate::errors::ErrorResponse),
    ),
    tag = "analytics"
)]
pub async fn query_stock_updates(
    State(state): State<AppState>,
    body: Result<Json<StockUpdateFilter>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = json_body(body)?;
    Ok(success_response(
        state.services.analytics.filtered_stock_updates(filter).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/price-trend",
    params(PriceTrendParams),
    responses(
        (status = 200, description = "Average price per day", body = [PriceTrendPoint]),
        (status = 400, description = "itemId missing or start after end", body = crate::errors::ErrorResponse),
    ),
    tag = "analytics"
)]
pub async fn price_trend(
    State(state): State<AppState>,
    query: Result<Query<PriceTrendParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    Ok(success_response(
        state
            .services
            .analytics
            .price_trend(params.item_id, params.supplier_id, params.start, params.end)
            .await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/analytics/financial/summary",
    params(FinancialSummaryParams),
    responses(
        (status = 200, description = "Weighted average cost summary for the period", body = FinancialSummary),
        (status = 400, description = "from or to missing, or from after to", body = crate::errors::ErrorResponse),
    ),
    tag = "analytics"
)]
pub async fn financial_summary(
    State(state): State<AppState>,
    query: Result<Query<FinancialSummaryParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    let summary = state
        .services
        .analytics
        .financial_summary(params.from, params.to, params.supplier_id)
        .await?;
    Ok(success_response(summary))
}
