use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        version = "0.1.0",
        description = r#"
# Stockroom Inventory API

Stock levels keyed by store and SKU.

- `POST /api/items` accepts one item or an array and upserts them all, or none when any record is invalid.
- `PUT /api/items/{store}/{sku}` changes only the fields present in the body; `"description": null` clears it.

Client errors carry a JSON body `{ "message": ..., "details": ... }`. Not-found and server errors have no body.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "items", description = "Stock item management")
    ),
    paths(
        crate::handlers::items::insert_items,
        crate::handlers::items::list_items,
        crate::handlers::items::update_item,
        crate::handlers::items::delete_item,
    ),
    components(
        schemas(
            crate::models::stock_item::StockItem,
            crate::errors::ErrorResponse,
            crate::validation::Issues,
            crate::validation::RecordError,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url(OPENAPI_JSON_PATH, ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from(OPENAPI_JSON_PATH).try_it_out_enabled(true))
}
