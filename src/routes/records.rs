use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{CatalogEntry, EntryFields, SearchRequest},
    routes::AppState,
    services::catalog::parse_id,
};

/// Turns a body rejection into a 400 with the same JSON error shape
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

/// Full catalog in display order
pub async fn list_all(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<CatalogEntry>>> {
    Ok(Json(state.catalog.list_all().await?))
}

/// First page of the catalog, store order
pub async fn list_limited(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    Ok(Json(state.catalog.list_limited().await?))
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    let request = json_body(payload)?;

    tracing::info!(
        request_id = %request_id,
        field = %request.search_field,
        query = %request.query_text,
        "Processing search request"
    );

    Ok(Json(state.catalog.search(request).await?))
}

pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<CatalogEntry>> {
    let id = parse_id(&id)?;
    Ok(Json(state.catalog.get(id).await?))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<EntryFields>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CatalogEntry>)> {
    let fields = json_body(payload)?;
    let entry = state.catalog.create(fields).await?;

    tracing::info!(request_id = %request_id, id = %entry.id, "Record stored");

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Replaces every editable field of a record
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
    payload: Result<Json<EntryFields>, JsonRejection>,
) -> AppResult<Json<CatalogEntry>> {
    let id = parse_id(&id)?;
    let fields = json_body(payload)?;
    let entry = state.catalog.update(id, fields).await?;

    tracing::info!(request_id = %request_id, id = %id, "Record replaced");

    Ok(Json(entry))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    state.catalog.delete(id).await?;

    tracing::info!(request_id = %request_id, id = %id, "Record removed");

    Ok(StatusCode::NO_CONTENT)
}
