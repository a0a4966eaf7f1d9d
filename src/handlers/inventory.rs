use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    response::IntoResponse,
    routing::{get, patch},
    Router,
};

use super::common::{
    created_response, json_body, no_content_response, query_params, success_response,
    validate_input,
};
use crate::{
    auth::AuthUser,
    dto::inventory::{
        DeletionParams, InventoryItemRequest, InventoryItemResponse, InventorySearchParams,
        LowStockParams, PriceChangeParams, QuantityAdjustmentParams,
    },
    errors::ApiError,
    repositories::PageRequest,
    AppState,
};

/// Routes open to every authenticated role. USER edits are narrowed by the service.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_items))
        .route("/inventory/count", get(count_items))
        .route("/inventory/search", get(search_items))
        .route("/inventory/low-stock", get(low_stock_items))
        .route("/inventory/:id", get(get_item).put(update_item))
        .route("/inventory/:id/quantity", patch(adjust_quantity))
        .route("/inventory/:id/price", patch(change_price))
}

/// ADMIN-only routes
pub fn inventory_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", axum::routing::post(create_item))
        .route("/inventory/:id", axum::routing::delete(delete_item))
}

/// List every inventory item
#[utoipa::path(
    get,
    path = "/api/inventory",
    responses(
        (status = 200, description = "All items, by name", body = [InventoryItemResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    tag = "inventory"
)]
pub async fn list_items(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.services.inventory.list_all().await?;
    Ok(success_response(items))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item found", body = InventoryItemResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "inventory"
)]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.services.inventory.get(&id).await?;
    Ok(success_response(item))
}

#[utoipa::path(
    get,
    path = "/api/inventory/count",
    responses((status = 200, description = "Number of items", body = u64)),
    tag = "inventory"
)]
pub async fn count_items(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let count = state.services.inventory.count().await?;
    Ok(success_response(count))
}

/// Case-insensitive name search, cheapest first
#[utoipa::path(
    get,
    path = "/api/inventory/search",
    params(InventorySearchParams),
    responses(
        (status = 200, description = "One page of matching items"),
        (status = 400, description = "Invalid paging parameters", body = crate::errors::ErrorResponse),
    ),
    tag = "inventory"
)]
pub async fn search_items(
    State(state): State<AppState>,
    query: Result<Query<InventorySearchParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    let page = PageRequest::new(
        params.page,
        params.size,
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    );
    let result = state.services.inventory.search(&params.name, page).await?;
    Ok(success_response(result))
}

/// Items under their minimum quantity, optionally for one supplier
#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    params(LowStockParams),
    responses((status = 200, description = "Low stock items, lowest first", body = [InventoryItemResponse])),
    tag = "inventory"
)]
pub async fn low_stock_items(
    State(state): State<AppState>,
    query: Result<Query<LowStockParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    let items = state
        .services
        .inventory
        .low_stock(params.supplier_id.as_deref())
        .await?;
    Ok(success_response(items))
}

#[utoipa::path(
    post,
    path = "/api/inventory",
    request_body = InventoryItemRequest,
    responses(
        (status = 201, description = "Item created", body = InventoryItemResponse,
            headers(("Location" = String, description = "URI of the new item"))),
        (status = 400, description = "Invalid item", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate item name", body = crate::errors::ErrorResponse),
    ),
    tag = "inventory"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<InventoryItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(body)?;
    validate_input(&request)?;
    let created = state
        .services
        .inventory
        .create(&user.actor(), request)
        .await?;
    Ok(created_response(
        format!("/api/inventory/{}", created.id),
        created,
    ))
}

/// Full update. USER callers may not rename an item or move it to another supplier.
#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    params(("id" = String, Path, description = "Item id")),
    request_body = InventoryItemRequest,
    responses(
        (status = 200, description = "Item updated", body = InventoryItemResponse),
        (status = 400, description = "Invalid item or mismatched id", body = crate::errors::ErrorResponse),
        (status = 403, description = "Field change not permitted for role", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "inventory"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<InventoryItemRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(body)?;
    if let Some(body_id) = request.id.as_deref().map(str::trim) {
        if !body_id.is_empty() && body_id != id {
            return Err(ApiError::BadRequest(
                "Path id and body id must match".to_string(),
            ));
        }
    }
    validate_input(&request)?;
    let updated = state
        .services
        .inventory
        .update(&user.actor(), &id, request)
        .await?;
    Ok(success_response(updated))
}

#[utoipa::path(
    patch,
    path = "/api/inventory/{id}/quantity",
    params(("id" = String, Path, description = "Item id"), QuantityAdjustmentParams),
    responses(
        (status = 200, description = "Quantity adjusted", body = InventoryItemResponse),
        (status = 400, description = "Zero delta, unknown reason or insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "inventory"
)]
pub async fn adjust_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    query: Result<Query<QuantityAdjustmentParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    let reason = params.reason.as_deref().unwrap_or("MANUAL_UPDATE");
    let item = state
        .services
        .inventory
        .adjust_quantity(&user.actor(), &id, params.delta, reason)
        .await?;
    Ok(success_response(item))
}

#[utoipa::path(
    patch,
    path = "/api/inventory/{id}/price",
    params(("id" = String, Path, description = "Item id"), PriceChangeParams),
    responses(
        (status = 200, description = "Price changed", body = InventoryItemResponse),
        (status = 400, description = "Price must be positive", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "inventory"
)]
pub async fn change_price(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    query: Result<Query<PriceChangeParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    let item = state
        .services
        .inventory
        .update_price(&user.actor(), &id, params.price)
        .await?;
    Ok(success_response(item))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    params(("id" = String, Path, description = "Item id"), DeletionParams),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, description = "Invalid reason for deletion", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
    ),
    tag = "inventory"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    query: Result<Query<DeletionParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    state
        .services
        .inventory
        .delete(&user.actor(), &id, &params.reason)
        .await?;
    Ok(no_content_response())
}
