use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::extract::{parse_id, ApiJson, ApiQuery};
use super::server::AppState;
use super::session::CurrentPrincipal;
use crate::errors::AppError;
use shop_types::domain::order::{Order, OrderStatus, PaymentMethod, ShippingAddress};
use shop_types::domain::page::PageRequest;
use shop_types::ports::ShopRepository;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// `status` stays a string so an unknown value reports the value itself.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status: String,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    orders: Vec<Order>,
    total: u64,
    total_pages: u64,
    current_page: u32,
}

pub async fn list_orders<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiQuery(params): ApiQuery<ListOrdersParams>,
) -> Result<Json<OrderListResponse>, AppError> {
    let request = PageRequest::new(params.page, params.limit);
    let page = state.services.orders.list_orders(&principal, request).await?;
    Ok(Json(OrderListResponse {
        total_pages: page.total_pages(request),
        total: page.total,
        orders: page.items,
        current_page: request.page,
    }))
}

pub async fn place_order<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiJson(req): ApiJson<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let order = state
        .services
        .orders
        .place_order(&principal, req.shipping_address, req.payment_method)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<String>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .services
        .orders
        .get_order(&principal, parse_id(&id)?)
        .await?;
    Ok(Json(order))
}

pub async fn update_order<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    let id = parse_id(&id)?;
    let status: OrderStatus = req.status.trim().parse()?;
    let order = state
        .services
        .orders
        .update_status(&principal, id, status, req.payment_method)
        .await?;
    Ok(Json(order))
}
