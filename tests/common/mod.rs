#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use serde_json::Value;
use stockroom_api::{
    config::AppConfig,
    db::{self, DbConfig},
    models::stock_item::StockItem,
    repositories::StockItemRepository,
    AppState,
};
use tower::ServiceExt;

/// Helper harness for spinning up the application against an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with a fresh, migrated database.
    pub async fn new() -> Self {
        let pool = test_pool().await;

        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );

        let state = AppState::new(Arc::new(pool), cfg);
        let router = stockroom_api::app(state.clone());

        Self { router, state }
    }

    pub fn repository(&self) -> &StockItemRepository {
        self.state.stock_items.repository()
    }

    /// Sends a request with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let body = body.map(|json| serde_json::to_vec(&json).expect("failed to serialize json request body"));
        self.request_raw(method, uri, body).await
    }

    /// Sends a request whose body bytes are used as-is.
    pub async fn request_raw(&self, method: Method, uri: &str, body: Option<Vec<u8>>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(bytes) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(bytes)
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

    pub async fn list(&self) -> Vec<StockItem> {
        let response = self.request(Method::GET, "/api/items", None).await;
        assert_eq!(response.status(), 200);
        serde_json::from_value(response_json(response).await).expect("stock item list")
    }
}

/// A migrated single-connection in-memory database.
pub async fn test_pool() -> db::DbPool {
    let pool = db::establish_connection_with_config(&DbConfig::single_connection("sqlite::memory:"))
        .await
        .expect("failed to create test database");
    db::run_migrations(&pool)
        .await
        .expect("failed to run migrations in tests");
    pool
}

pub fn item(sku: &str, store: &str, quantity: i64, description: Option<&str>) -> StockItem {
    StockItem {
        sku: sku.to_string(),
        store: store.to_string(),
        quantity,
        description: description.map(str::to_string),
    }
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes")
        .to_vec()
}

pub async fn response_json(response: Response) -> Value {
    serde_json::from_slice(&response_bytes(response).await).expect("json response")
}
