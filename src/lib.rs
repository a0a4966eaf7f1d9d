//! Inventory API Library
//!
//! Items, suppliers and the stock history audit trail behind a role-checked REST API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;
pub mod validation;

use axum::{http::HeaderValue, routing::get, Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};

use crate::auth::{AuthConfig, AuthRouterExt, AuthService};
use crate::entities::Role;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config), db.clone()));
        Self {
            services: handlers::AppServices::new(db.clone()),
            db,
            config,
            auth,
        }
    }
}

/// Every route under `/api`, each group wrapped in the role it requires.
pub fn api_routes() -> Router<AppState> {
    let inventory = handlers::inventory::inventory_routes().with_auth();
    let inventory_admin = handlers::inventory::inventory_admin_routes().with_role(Role::Admin);

    let suppliers = handlers::suppliers::supplier_routes().with_auth();
    let suppliers_admin = handlers::suppliers::supplier_admin_routes().with_role(Role::Admin);

    let stock_history = handlers::stock_history::stock_history_routes().with_auth();
    let analytics = handlers::analytics::analytics_routes().with_auth();
    let session = handlers::auth::session_routes().with_auth();

    Router::new()
        // Inventory
        .merge(inventory)
        .merge(inventory_admin)
        // Suppliers
        .merge(suppliers)
        .merge(suppliers_admin)
        // Audit trail
        .merge(stock_history)
        // Reporting
        .nest("/analytics", analytics)
        // Session
        .merge(session)
        .merge(handlers::auth::public_auth_routes())
}

/// CORS from config: explicit origins, or permissive in development or when overridden.
pub fn cors_layer(cfg: &config::AppConfig) -> anyhow::Result<CorsLayer> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_credentials(cfg.cors_allow_credentials))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        anyhow::bail!(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
        )
    }
}

/// The complete application: health checks, `/api`, Swagger UI and the shared layers.
pub fn build_app(state: AppState, cors: CorsLayer) -> Router {
    let auth_service = state.auth.clone();

    Router::<AppState>::new()
        .route("/", get(|| async { "inventory-api up" }))
        .merge(handlers::health::health_routes())
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        // Auth middleware reads the service from request extensions
        .layer(Extension(auth_service))
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
