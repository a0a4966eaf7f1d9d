use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Inventory API",
        version = "1.0.0",
        description = r#"
# Inventory API

Tracks inventory items and their suppliers. Every stock or price change is written to an
append-only stock history, which also feeds the analytics endpoints.

## Authentication

Send the session token either as the `SESSION` cookie or in the Authorization header:

```
Authorization: Bearer <your-jwt-token>
```

`ADMIN` may create and delete items and manage suppliers. `USER` may read everything, adjust
quantities and prices, and update items without renaming them or changing their supplier.

## Errors

```json
{
  "error": "bad_request",
  "message": "Insufficient stock: quantity cannot go negative",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

Paged endpoints take a zero-based `page` and a `size`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    modifiers(&SessionSecurity),
    tags(
        (name = "inventory", description = "Inventory item endpoints"),
        (name = "suppliers", description = "Supplier endpoints"),
        (name = "stock-history", description = "Stock history audit trail"),
        (name = "analytics", description = "Reporting endpoints"),
        (name = "auth", description = "Session endpoints"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Inventory
        crate::handlers::inventory::list_items,
        crate::handlers::inventory::get_item,
        crate::handlers::inventory::count_items,
        crate::handlers::inventory::search_items,
        crate::handlers::inventory::low_stock_items,
        crate::handlers::inventory::create_item,
        crate::handlers::inventory::update_item,
        crate::handlers::inventory::adjust_quantity,
        crate::handlers::inventory::change_price,
        crate::handlers::inventory::delete_item,

        // Suppliers
        crate::handlers::suppliers::list_suppliers,
        crate::handlers::suppliers::get_supplier,
        crate::handlers::suppliers::search_suppliers,
        crate::handlers::suppliers::create_supplier,
        crate::handlers::suppliers::update_supplier,
        crate::handlers::suppliers::delete_supplier,

        // Stock history
        crate::handlers::stock_history::list_history,
        crate::handlers::stock_history::history_by_item,
        crate::handlers::stock_history::history_by_reason,
        crate::handlers::stock_history::search_history,

        // Analytics
        crate::handlers::analytics::stock_value,
        crate::handlers::analytics::stock_per_supplier,
        crate::handlers::analytics::item_update_frequency,
        crate::handlers::analytics::low_stock_items,
        crate::handlers::analytics::low_stock_count,
        crate::handlers::analytics::monthly_stock_movement,
        crate::handlers::analytics::stock_updates,
        crate::handlers::analytics::query_stock_updates,
        crate::handlers::analytics::price_trend,
        crate::handlers::analytics::financial_summary,

        // Auth
        crate::handlers::auth::current_user,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,

        // Health
        crate::handlers::health::liveness_check,
        crate::handlers::health::database_check,
    ),
    components(
        schemas(
            crate::dto::PaginationMeta,
            crate::dto::inventory::InventoryItemRequest,
            crate::dto::inventory::InventoryItemResponse,
            crate::dto::supplier::SupplierRequest,
            crate::dto::supplier::SupplierResponse,
            crate::dto::stock_history::StockHistoryResponse,
            crate::dto::analytics::StockUpdateFilter,
            crate::dto::analytics::FinancialSummary,
            crate::dto::auth::LoginRequest,
            crate::dto::auth::LoginResponse,
            crate::entities::StockChangeReason,
            crate::entities::Role,
            crate::entities::app_user::Model,
            crate::handlers::health::DatabaseHealth,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

/// Declares the two ways a session token can be presented
struct SessionSecurity;

impl Modify for SessionSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::auth::SESSION_COOKIE,
                ))),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_inventory_routes() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Inventory API"));
        assert!(json.contains("/api/inventory/{id}/quantity"));
        assert!(json.contains("/api/analytics/stock-updates/query"));
        assert!(json.contains("/api/analytics/financial/summary"));
        assert!(json.contains("session_cookie"));
    }
}
