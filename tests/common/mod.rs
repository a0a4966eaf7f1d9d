#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use inventory_api::{config::AppConfig, db, AppState};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const USER_EMAIL: &str = "user@example.com";

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    admin_token: String,
    user_token: String,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut AppConfig)) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only_32chars".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A second pooled connection would open a separate in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.admin_emails = Some(ADMIN_EMAIL.to_string());
        cfg.session_cookie_secure = false;
        customize(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);

        let admin = state
            .auth
            .provision_user(ADMIN_EMAIL, "Admin")
            .await
            .expect("provision admin");
        let user = state
            .auth
            .provision_user(USER_EMAIL, "User")
            .await
            .expect("provision user");
        let admin_token = state.auth.issue_token(&admin).expect("admin token");
        let user_token = state.auth.issue_token(&user).expect("user token");

        let router = inventory_api::build_app(state.clone(), CorsLayer::permissive());

        Self {
            router,
            state,
            admin_token,
            user_token,
        }
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    pub fn user_token(&self) -> &str {
        &self.user_token
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }
        self.send(builder, body).await
    }

    /// Request authenticated through the SESSION cookie instead of a bearer header
    pub async fn request_with_cookie(&self, method: Method, uri: &str, token: &str) -> Response {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("cookie", format!("theme=dark; SESSION={}", token));
        self.send(builder, None).await
    }

    pub async fn as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(&self.admin_token)).await
    }

    pub async fn as_user(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(&self.user_token)).await
    }

    async fn send(&self, mut builder: axum::http::request::Builder, body: Option<Value>) -> Response {
        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Creates a supplier as admin and returns its id.
    pub async fn seed_supplier(&self, name: &str) -> String {
        let response = self
            .as_admin(Method::POST, "/api/suppliers", Some(json!({ "name": name })))
            .await;
        assert_eq!(response.status(), 201, "seed supplier {}", name);
        response_json(response).await["id"]
            .as_str()
            .expect("supplier id")
            .to_string()
    }

    /// Creates an item as admin and returns the response body.
    pub async fn seed_item(&self, supplier_id: &str, name: &str, quantity: i32, price: &str) -> Value {
        let response = self
            .as_admin(
                Method::POST,
                "/api/inventory",
                Some(json!({
                    "name": name,
                    "quantity": quantity,
                    "price": price,
                    "supplierId": supplier_id,
                    "minimumQuantity": 5
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "seed item {}", name);
        response_json(response).await
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}
