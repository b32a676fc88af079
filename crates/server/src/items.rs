//! Items API endpoints.

use api_types::item::{ItemCreate, ItemListResponse, ItemUpdate, ItemView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_item(item: engine::Item) -> ItemView {
    ItemView {
        id: item.id,
        category_id: item.category_id,
        name: item.name,
    }
}

pub async fn list(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
) -> Result<Json<ItemListResponse>, ServerError> {
    let items = state
        .engine
        .list_items(user.id)
        .await?
        .into_iter()
        .map(map_item)
        .collect();

    Ok(Json(ItemListResponse { items }))
}

pub async fn create(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<ItemCreate>,
) -> Result<(StatusCode, Json<ItemView>), ServerError> {
    let item = state
        .engine
        .create_item(user.id, payload.category_id, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(map_item(item))))
}

pub async fn update(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemUpdate>,
) -> Result<Json<ItemView>, ServerError> {
    if payload.name.is_none() && payload.category_id.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name or category_id".to_string(),
        ));
    }

    let item = state
        .engine
        .update_item(engine::UpdateItemCmd {
            user_id: user.id,
            item_id: id,
            category_id: payload.category_id,
            name: payload.name,
        })
        .await?;

    Ok(Json(map_item(item)))
}

pub async fn remove(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_item(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
