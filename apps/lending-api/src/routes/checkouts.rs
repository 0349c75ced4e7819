//! Checkout and return endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use lending_core::{Checkout, CheckoutRequest, ReturnRequest};

use crate::error::ApiError;
use crate::AppState;

/// `GET /api/checkedout` - checkouts that have not been returned.
pub async fn list_open_checkouts(
    State(state): State<AppState>,
) -> Result<Json<Vec<Checkout>>, ApiError> {
    let checkouts = state.inventory.list_open_checkouts().await?;
    Ok(Json(checkouts))
}

/// `POST /api/checkout` - lend one unit of an item.
pub async fn checkout(
    State(state): State<AppState>,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<Checkout>, ApiError> {
    let Json(request) = body?;
    let checkout = state.inventory.checkout(request).await?;
    Ok(Json(checkout))
}

/// `POST /api/return` - close a checkout and restock its item.
pub async fn return_item(
    State(state): State<AppState>,
    body: Result<Json<ReturnRequest>, JsonRejection>,
) -> Result<Json<Checkout>, ApiError> {
    let Json(request) = body?;
    let checkout = state.inventory.return_item(request).await?;
    Ok(Json(checkout))
}
