//! Administrative sync surface: status, logs, and force-resync.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use lumen_core::content::EntityKind;
use lumen_core::sync::{KindSyncStatus, ResyncSummary, SyncLogEntry};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncStatusResponse {
    sync_status: Vec<KindSyncStatus>,
    recent_syncs: Vec<SyncLogEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResyncEntityResponse {
    message: &'static str,
    entity: EntityKind,
    secondary_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResyncAllResponse {
    message: &'static str,
    synced: Vec<ResyncSummary>,
}

async fn sync_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<SyncStatusResponse>> {
    let sync_status = state.sync_admin_service.status()?;
    let recent_syncs = state.sync_admin_service.recent_logs(None)?;
    Ok(Json(SyncStatusResponse {
        sync_status,
        recent_syncs,
    }))
}

async fn resync_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<ResyncAllResponse>> {
    let synced = state.sync_admin_service.resync_all(None).await?;
    Ok(Json(ResyncAllResponse {
        message: "Sync completed",
        synced,
    }))
}

async fn resync_entity(
    Path((entity, id)): Path<(String, i64)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ResyncEntityResponse>> {
    let kind = EntityKind::from_str(&entity)?;
    let secondary_id = state.sync_admin_service.resync_entity(kind, id, None).await?;
    Ok(Json(ResyncEntityResponse {
        message: "Entity synced successfully",
        entity: kind,
        secondary_id,
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync/status", get(sync_status))
        .route("/sync/all", post(resync_all))
        .route("/sync/{entity}/{id}", post(resync_entity))
}
