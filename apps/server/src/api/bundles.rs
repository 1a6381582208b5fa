use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use lumen_core::content::{
    Bundle, BundleUpdate, EntityKind, EntitySnapshot, NewBundle, SyncAction,
};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    include_inactive: Option<bool>,
}

async fn list_bundles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Bundle>>> {
    let bundles = state
        .bundle_repository
        .list(query.include_inactive.unwrap_or(false))?;
    Ok(Json(bundles))
}

async fn get_bundle(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Bundle>> {
    let bundle = state.bundle_repository.get_by_id(id)?;
    Ok(Json(bundle))
}

async fn create_bundle(
    State(state): State<Arc<AppState>>,
    Json(new_bundle): Json<NewBundle>,
) -> ApiResult<(StatusCode, Json<Bundle>)> {
    let bundle = state.bundle_repository.create(new_bundle).await?;
    state.dispatch_entity_sync(EntityKind::Bundles, SyncAction::Create, bundle.snapshot());
    Ok((StatusCode::CREATED, Json(bundle)))
}

async fn update_bundle(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<BundleUpdate>,
) -> ApiResult<Json<Bundle>> {
    let bundle = state.bundle_repository.update(id, update).await?;
    state.dispatch_entity_sync(EntityKind::Bundles, SyncAction::Update, bundle.snapshot());
    Ok(Json(bundle))
}

async fn delete_bundle(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let bundle = state.bundle_repository.delete(id).await?;
    state.dispatch_entity_sync(
        EntityKind::Bundles,
        SyncAction::Delete,
        Ok(EntitySnapshot::delete_marker(bundle.id, bundle.secondary_id)),
    );
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bundles", get(list_bundles).post(create_bundle))
        .route(
            "/bundles/{id}",
            get(get_bundle).put(update_bundle).delete(delete_bundle),
        )
}
