use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use lumen_core::content::{
    EntityKind, EntitySnapshot, GalleryImage, GalleryImageUpdate, NewGalleryImage, SyncAction,
};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    include_inactive: Option<bool>,
}

async fn list_images(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<GalleryImage>>> {
    let images = state
        .gallery_repository
        .list(query.include_inactive.unwrap_or(false))?;
    Ok(Json(images))
}

async fn register_image(
    State(state): State<Arc<AppState>>,
    Json(new_image): Json<NewGalleryImage>,
) -> ApiResult<(StatusCode, Json<GalleryImage>)> {
    let image = state.gallery_repository.create(new_image).await?;
    state.dispatch_entity_sync(
        EntityKind::GalleryImages,
        SyncAction::Create,
        image.snapshot(),
    );
    Ok((StatusCode::CREATED, Json(image)))
}

async fn update_image(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<GalleryImageUpdate>,
) -> ApiResult<Json<GalleryImage>> {
    let image = state.gallery_repository.update(id, update).await?;
    state.dispatch_entity_sync(
        EntityKind::GalleryImages,
        SyncAction::Update,
        image.snapshot(),
    );
    Ok(Json(image))
}

async fn delete_image(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let image = state.gallery_repository.delete(id).await?;
    state.dispatch_entity_sync(
        EntityKind::GalleryImages,
        SyncAction::Delete,
        Ok(EntitySnapshot::delete_marker(image.id, image.secondary_id)),
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn get_image(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<GalleryImage>> {
    let image = state.gallery_repository.get_by_id(id)?;
    Ok(Json(image))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/gallery", get(list_images).post(register_image))
        .route(
            "/gallery/{id}",
            get(get_image).put(update_image).delete(delete_image),
        )
}
