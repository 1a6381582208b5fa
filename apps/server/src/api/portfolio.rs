use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use lumen_core::content::{
    EntityKind, EntitySnapshot, NewPortfolioItem, PortfolioItem, PortfolioItemUpdate, SyncAction,
};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    include_inactive: Option<bool>,
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<PortfolioItem>>> {
    let items = state
        .portfolio_repository
        .list(query.include_inactive.unwrap_or(false))?;
    Ok(Json(items))
}

async fn get_item(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PortfolioItem>> {
    let item = state.portfolio_repository.get_by_id(id)?;
    Ok(Json(item))
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(new_item): Json<NewPortfolioItem>,
) -> ApiResult<(StatusCode, Json<PortfolioItem>)> {
    let item = state.portfolio_repository.create(new_item).await?;
    state.dispatch_entity_sync(
        EntityKind::PortfolioItems,
        SyncAction::Create,
        item.snapshot(),
    );
    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<PortfolioItemUpdate>,
) -> ApiResult<Json<PortfolioItem>> {
    let item = state.portfolio_repository.update(id, update).await?;
    state.dispatch_entity_sync(
        EntityKind::PortfolioItems,
        SyncAction::Update,
        item.snapshot(),
    );
    Ok(Json(item))
}

async fn delete_item(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let item = state.portfolio_repository.delete(id).await?;
    state.dispatch_entity_sync(
        EntityKind::PortfolioItems,
        SyncAction::Delete,
        Ok(EntitySnapshot::delete_marker(item.id, item.secondary_id)),
    );
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio", get(list_items).post(create_item))
        .route(
            "/portfolio/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}
