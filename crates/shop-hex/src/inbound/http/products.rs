use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::extract::{parse_id, ApiJson, ApiQuery};
use super::server::AppState;
use super::session::CurrentPrincipal;
use crate::errors::AppError;
use shop_types::domain::page::PageRequest;
use shop_types::domain::product::{Category, Product, ProductDraft, ProductFilter};
use shop_types::ports::ShopRepository;

#[derive(Debug, Default, Deserialize)]
pub struct ListProductsParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category: Option<String>,
}

impl ListProductsParams {
    fn filter(&self) -> Result<ProductFilter, AppError> {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(c) if c.eq_ignore_ascii_case("all") => None,
            Some(c) => Some(c.parse::<Category>()?),
        };
        Ok(ProductFilter { search, category })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    products: Vec<Product>,
    total: u64,
    total_pages: u64,
    current_page: u32,
}

pub async fn list_products<R: ShopRepository>(
    State(state): State<AppState<R>>,
    ApiQuery(params): ApiQuery<ListProductsParams>,
) -> Result<Json<ProductListResponse>, AppError> {
    let filter = params.filter()?;
    let request = PageRequest::new(params.page, params.limit);
    let page = state
        .services
        .products
        .list_products(&filter, request)
        .await?;
    Ok(Json(ProductListResponse {
        total_pages: page.total_pages(request),
        total: page.total,
        products: page.items,
        current_page: request.page,
    }))
}

pub async fn get_product<R: ShopRepository>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let product = state.services.products.get_product(parse_id(&id)?).await?;
    Ok(Json(product))
}

pub async fn create_product<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state
        .services
        .products
        .create_product(&principal, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<String>,
    ApiJson(draft): ApiJson<ProductDraft>,
) -> Result<Json<Product>, AppError> {
    let product = state
        .services
        .products
        .update_product(&principal, parse_id(&id)?, draft)
        .await?;
    Ok(Json(product))
}

pub async fn delete_product<R: ShopRepository>(
    State(state): State<AppState<R>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .services
        .products
        .delete_product(&principal, parse_id(&id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
