use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Path, Query, State,
    },
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};

use super::common::{
    created_response, json_body, no_content_response, query_params, success_response,
    validate_input,
};
use crate::{
    auth::AuthUser,
    dto::supplier::{SupplierRequest, SupplierResponse, SupplierSearchParams},
    errors::ApiError,
    AppState,
};

pub fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers))
        .route("/suppliers/search", get(search_suppliers))
        .route("/suppliers/:id", get(get_supplier))
}

pub fn supplier_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/suppliers", post(create_supplier))
        .route("/suppliers/:id", put(update_supplier).delete(delete_supplier))
}

#[utoipa::path(
    get,
    path = "/api/suppliers",
    responses((status = 200, description = "All suppliers, by name", body = [SupplierResponse])),
    tag = "suppliers"
)]
pub async fn list_suppliers(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.suppliers.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    params(("id" = String, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier found", body = SupplierResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse),
    ),
    tag = "suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(success_response(state.services.suppliers.get(&id).await?))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/search",
    params(SupplierSearchParams),
    responses((status = 200, description = "Suppliers whose name contains the term", body = [SupplierResponse])),
    tag = "suppliers"
)]
pub async fn search_suppliers(
    State(state): State<AppState>,
    query: Result<Query<SupplierSearchParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let params = query_params(query)?;
    Ok(success_response(
        state.services.suppliers.search(&params.name).await?,
    ))
}

/// Ids are server-assigned; a request carrying one is rejected.
#[utoipa::path(
    post,
    path = "/api/suppliers",
    request_body = SupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = SupplierResponse,
            headers(("Location" = String, description = "URI of the new supplier"))),
        (status = 400, description = "Invalid supplier", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate supplier name", body = crate::errors::ErrorResponse),
    ),
    tag = "suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    body: Result<Json<SupplierRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(body)?;
    if request.id.as_deref().is_some_and(|id| !id.trim().is_empty()) {
        return Err(ApiError::BadRequest(
            "Supplier id must not be provided on create".to_string(),
        ));
    }
    validate_input(&request)?;
    let created = state
        .services
        .suppliers
        .create(&user.actor(), request)
        .await?;
    Ok(created_response(
        format!("/api/suppliers/{}", created.id),
        created,
    ))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    params(("id" = String, Path, description = "Supplier id")),
    request_body = SupplierRequest,
    responses(
        (status = 200, description = "Supplier updated", body = SupplierResponse),
        (status = 400, description = "Invalid supplier or mismatched id", body = crate::errors::ErrorResponse),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate supplier name", body = crate::errors::ErrorResponse),
    ),
    tag = "suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<SupplierRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = json_body(body)?;
    if request.id.as_deref().map(str::trim) != Some(id.as_str()) {
        return Err(ApiError::BadRequest(
            "Path id and body id must match".to_string(),
        ));
    }
    validate_input(&request)?;
    let updated = state.services.suppliers.update(&id, request).await?;
    Ok(success_response(updated))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    params(("id" = String, Path, description = "Supplier id")),
    responses(
        (status = 204, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Supplier still has linked items", body = crate::errors::ErrorResponse),
    ),
    tag = "suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.suppliers.delete(&id).await?;
    Ok(no_content_response())
}
