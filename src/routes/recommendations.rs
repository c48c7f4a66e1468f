use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{CatalogEntry, RecommendationSet},
    routes::AppState,
    services::catalog::parse_id,
};

/// The source record as a one-element list, shown above the recommendations
pub async fn source(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    let id = parse_id(&id)?;
    Ok(Json(state.recommendations.source(id).await?))
}

/// Handler for composer recommendations
pub async fn by_composer(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    let id = parse_id(&id)?;
    let entries = state.recommendations.by_composer(id).await?;

    tracing::info!(
        request_id = %request_id,
        id = %id,
        count = entries.len(),
        "Composer recommendations served"
    );

    Ok(Json(entries))
}

/// Handler for period/duration recommendations
pub async fn by_period(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    let id = parse_id(&id)?;
    let entries = state.recommendations.by_period(id).await?;

    tracing::info!(
        request_id = %request_id,
        id = %id,
        count = entries.len(),
        "Period recommendations served"
    );

    Ok(Json(entries))
}

/// Handler for same-disc recommendations
pub async fn by_disc(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    let id = parse_id(&id)?;
    let entries = state.recommendations.by_disc(id).await?;

    tracing::info!(
        request_id = %request_id,
        id = %id,
        count = entries.len(),
        "Disc recommendations served"
    );

    Ok(Json(entries))
}

pub async fn blend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<Json<RecommendationSet>> {
    let id = parse_id(&id)?;
    let set = state.recommendations.blend(id).await?;

    tracing::info!(
        request_id = %request_id,
        id = %id,
        composer = set.composer.len(),
        period = set.period.len(),
        disc = set.disc.len(),
        "Recommendation set served"
    );

    Ok(Json(set))
}
