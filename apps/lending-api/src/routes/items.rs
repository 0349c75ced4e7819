//! Item endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use lending_core::{Item, NewItem};

use crate::error::ApiError;
use crate::AppState;

/// `GET /api/items` - every item, including ones with zero quantity.
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state.inventory.list_items().await?;
    Ok(Json(items))
}

/// `POST /api/items` - add stock, merging by name and category.
pub async fn add_item(
    State(state): State<AppState>,
    body: Result<Json<NewItem>, JsonRejection>,
) -> Result<Json<Item>, ApiError> {
    let Json(new_item) = body?;
    let item = state.inventory.add_item(new_item).await?;
    Ok(Json(item))
}
