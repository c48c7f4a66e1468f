use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    db::CatalogStore,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{CatalogService, RecommendationEngine},
};

pub mod recommendations;
pub mod records;

/// Shared handler state
pub struct AppState {
    pub catalog: CatalogService,
    pub recommendations: RecommendationEngine,
    pub store_backend: &'static str,
}

impl AppState {
    /// Wires the catalog and recommendation services to one store
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store_backend: store.name(),
            catalog: CatalogService::new(store.clone()),
            recommendations: RecommendationEngine::new(store),
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/record", record_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
}

/// Routes under /record
fn record_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(records::list_all).post(records::create))
        .route("/limited", get(records::list_limited))
        .route("/search", axum::routing::post(records::search))
        .route(
            "/:id",
            get(records::get_one)
                .patch(records::update)
                .delete(records::delete),
        )
        .route("/recommendation/:id", get(recommendations::source))
        .route(
            "/recommendation/composer/:id",
            get(recommendations::by_composer),
        )
        .route("/recommendation/period/:id", get(recommendations::by_period))
        .route("/recommendation/disc/:id", get(recommendations::by_disc))
        .route("/recommendation/all/:id", get(recommendations::blend))
}

/// CORS policy for the browser client
pub fn cors_layer(allow_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Ok(match allow_origin {
        Some(origin) => layer.allow_origin(
            origin
                .parse::<HeaderValue>()
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", origin, e))?,
        ),
        None => layer.allow_origin(Any),
    })
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "healthy", "store": state.store_backend })),
    )
}
