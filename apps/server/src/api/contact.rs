use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};

use lumen_core::content::{
    ContactMessage, ContactMessageUpdate, EntityKind, EntitySnapshot, NewContactMessage,
    SyncAction,
};

use crate::{error::ApiResult, main_lib::AppState};

async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ContactMessage>>> {
    let messages = state.contact_repository.list()?;
    Ok(Json(messages))
}

/// Public contact-form submission endpoint.
async fn submit_message(
    State(state): State<Arc<AppState>>,
    Json(new_message): Json<NewContactMessage>,
) -> ApiResult<(StatusCode, Json<ContactMessage>)> {
    let message = state.contact_repository.create(new_message).await?;
    state.dispatch_entity_sync(
        EntityKind::ContactMessages,
        SyncAction::Create,
        message.snapshot(),
    );
    Ok((StatusCode::CREATED, Json(message)))
}

async fn update_message(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(update): Json<ContactMessageUpdate>,
) -> ApiResult<Json<ContactMessage>> {
    let message = state.contact_repository.update(id, update).await?;
    state.dispatch_entity_sync(
        EntityKind::ContactMessages,
        SyncAction::Update,
        message.snapshot(),
    );
    Ok(Json(message))
}

async fn delete_message(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    let message = state.contact_repository.delete(id).await?;
    state.dispatch_entity_sync(
        EntityKind::ContactMessages,
        SyncAction::Delete,
        Ok(EntitySnapshot::delete_marker(
            message.id,
            message.secondary_id,
        )),
    );
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contact", get(list_messages).post(submit_message))
        .route("/contact/{id}", patch(update_message).delete(delete_message))
}
