//! Stockroom API Library
//!
//! Stock levels per store and SKU behind a small JSON API: bulk upsert, listing,
//! partial update and delete, plus CSV import for the command-line client.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod import;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;
pub mod validation;

use axum::{extract::DefaultBodyLimit, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub stock_items: services::StockItemService,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        Self {
            stock_items: services::StockItemService::new(db.clone()),
            db,
            config,
        }
    }
}

/// Routes served under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(handlers::item_routes())
}

/// The full application: health, the item API, OpenAPI docs, request ids and tracing.
/// CORS is left to the binary since it depends on deployment.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.max_body_size;

    Router::new()
        .nest("/health", health::health_routes())
        .nest("/api", api_routes())
        .merge(openapi::swagger_ui())
        .fallback(handlers::unmatched)
        .layer(DefaultBodyLimit::max(body_limit))
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
