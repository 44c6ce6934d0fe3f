use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::extract::{parse_id, ApiJson};
use super::server::AppState;
use super::session::CurrentPrincipal;
use crate::errors::AppError;
use shop_types::domain::cart::CartView;
use shop_types::ports::ShopRepository;

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "one")]
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

pub async fn view_cart<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<CartView>, AppError> {
    Ok(Json(state.services.carts.view_cart(&principal).await?))
}

pub async fn add_item<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiJson(req): ApiJson<AddToCartRequest>,
) -> Result<Json<CartView>, AppError> {
    let view = state
        .services
        .carts
        .add_item(&principal, req.product_id, req.quantity)
        .await?;
    Ok(Json(view))
}

pub async fn set_quantity<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(product_id): Path<String>,
    ApiJson(req): ApiJson<SetQuantityRequest>,
) -> Result<Json<CartView>, AppError> {
    let view = state
        .services
        .carts
        .set_quantity(&principal, parse_id(&product_id)?, req.quantity)
        .await?;
    Ok(Json(view))
}

pub async fn remove_item<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(product_id): Path<String>,
) -> Result<Json<CartView>, AppError> {
    let view = state
        .services
        .carts
        .remove_item(&principal, parse_id(&product_id)?)
        .await?;
    Ok(Json(view))
}
