use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};

use super::common::{query_params, success_response};
use crate::{
    dto::stock_history::{StockHistoryFilter, StockHistoryResponse, StockHistorySearchParams},
    errors::ApiError,
    repositories::PageRequest,
    AppState,
};

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

/// Read-only views of the audit trail
pub fn stock_history_routes() -> Router<AppState> {
    Router::new()
        .route("/stock-history", get(list_history))
        .route("/stock-history/search", get(search_history))
        .route("/stock-history/item/:item_id", get(history_by_item))
        .route("/stock-history/reason/:reason", get(history_by_reason))
}

#[utoipa::path(
    get,
    path = "/api/stock-history",
    responses((status = 200, description = "Entire trail, newest first", body = [StockHistoryResponse])),
    tag = "stock-history"
)]
pub async fn list_history(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.stock_history.list_all().await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/stock-history/item/{itemId}",
    params(("itemId" = String, Path, description = "Item id")),
    responses((status = 200, description = "Trail of one item, newest first", body = [StockHistoryResponse])),
    tag = "stock-history"
)]
pub async fn history_by_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.stock_history.by_item(&item_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/stock-history/reason/{reason}",
    params(("reason" = String, Path, description = "Change reason, e.g. SOLD")),
    responses(
        (status = 200, description = "Entries with that reason, newest first", body = [StockHistoryResponse]),
        (status = 400, description = "Unknown reason", body = crate::errors::ErrorResponse),
    ),
    tag = "stock-history"
)]
pub async fn history_by_reason(
    State(state): State<AppState>,
    Path(reason): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(
        state.services.stock_history.by_reason(&reason).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/stock-history/search",
    params(StockHistorySearchParams),
    responses(
        (status = 200, description = "One page of matching entries, newest first"),
        (status = 400, description = "endDate before startDate or malformed date", body = crate::errors::ErrorResponse),
    ),
    tag = "stock-history"
)]
pub async fn search_history(
    State(state): State<AppState>,
    query: Result<Query<StockHistorySearchParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    let page = PageRequest::new(params.page, params.size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let filter = StockHistoryFilter {
        start: params.start_date,
        end: params.end_date,
        item_name: params.item_name,
        supplier_id: params.supplier_id,
    };
    Ok(success_response(
        state.services.stock_history.search(filter, page).await?,
    ))
}
