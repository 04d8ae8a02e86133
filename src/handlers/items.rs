use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde_json::Value;

use crate::errors::ServiceError;
use crate::models::stock_item::{ItemKey, StockItem};
use crate::AppState;

pub const INVALID_PATH_MESSAGE: &str = "Invalid URL format. Expected /api/items/{store}/{sku}";
pub const MISSING_KEY_MESSAGE: &str = "Missing store or SKU in URL parameters";

const ITEM_PATH_PREFIX: &str = "/api/items/";

/// Item routes, mounted under `/api`. Methods a path does not support fall through to 404.
pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/items",
            get(list_items)
                .post(insert_items)
                .head(not_found)
                .fallback(not_found),
        )
        .route(
            "/items/*key",
            put(update_item).delete(delete_item).fallback(not_found),
        )
}

/// Create or overwrite stock items
#[utoipa::path(
    post,
    path = "/api/items",
    request_body(content = Vec<StockItem>, description = "One item or an array of items"),
    responses(
        (status = 201, description = "All items were created or updated"),
        (status = 400, description = "Empty batch or invalid records", body = crate::errors::ErrorResponse),
        (status = 500, description = "Malformed body or storage failure")
    ),
    tag = "items"
)]
pub async fn insert_items(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    let payload: Value = serde_json::from_slice(&body)?;
    state.stock_items.insert_items(payload).await?;
    Ok(StatusCode::CREATED)
}

/// List every stock item
#[utoipa::path(
    get,
    path = "/api/items",
    responses(
        (status = 200, description = "All stored items", body = Vec<StockItem>),
        (status = 500, description = "Storage failure")
    ),
    tag = "items"
)]
pub async fn list_items(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let items = state.stock_items.list_items().await?;
    Ok(Json(items))
}

/// Partially update a stock item
#[utoipa::path(
    put,
    path = "/api/items/{store}/{sku}",
    params(
        ("store" = String, Path, description = "Store identifier"),
        ("sku" = String, Path, description = "Stock keeping unit")
    ),
    request_body(content = Object, description = "Optional `quantity` and nullable `description`"),
    responses(
        (status = 204, description = "Item updated"),
        (status = 400, description = "Malformed path, invalid patch or no fields", body = crate::errors::ErrorResponse),
        (status = 404, description = "No item with that key"),
        (status = 500, description = "Malformed body or storage failure")
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ServiceError> {
    let key = parse_item_key(&raw_key)?;
    let patch: Value = serde_json::from_slice(&body)?;
    state.stock_items.update_item(&key, &patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a stock item
#[utoipa::path(
    delete,
    path = "/api/items/{store}/{sku}",
    params(
        ("store" = String, Path, description = "Store identifier"),
        ("sku" = String, Path, description = "Stock keeping unit")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, description = "Malformed path", body = crate::errors::ErrorResponse),
        (status = 404, description = "No item with that key"),
        (status = 500, description = "Storage failure")
    ),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    Path(raw_key): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let key = parse_item_key(&raw_key)?;
    state.stock_items.delete_item(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Splits the part of the path after `items/` into `(store, sku)`.
pub fn parse_item_key(raw: &str) -> Result<ItemKey, ServiceError> {
    let segments: Vec<&str> = raw.split('/').collect();
    let [store, sku] = segments.as_slice() else {
        return Err(ServiceError::MalformedPath(INVALID_PATH_MESSAGE.to_string()));
    };
    if store.is_empty() || sku.is_empty() {
        return Err(ServiceError::MalformedPath(MISSING_KEY_MESSAGE.to_string()));
    }
    Ok(ItemKey::new(*store, *sku))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Router-wide fallback. A PUT or DELETE aimed at an item path the router could not
/// match is a malformed key; everything else is unknown.
pub async fn unmatched(method: Method, OriginalUri(uri): OriginalUri) -> ServiceError {
    let targets_item = method == Method::PUT || method == Method::DELETE;
    match uri.path().strip_prefix(ITEM_PATH_PREFIX) {
        Some(rest) if targets_item => match parse_item_key(rest) {
            Err(err) => err,
            Ok(_) => ServiceError::NotFound(uri.path().to_string()),
        },
        _ => ServiceError::NotFound(uri.path().to_string()),
    }
}
