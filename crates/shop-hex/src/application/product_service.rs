use std::sync::Arc;

use crate::errors::AppError;
use shop_types::domain::page::{Page, PageRequest};
use shop_types::domain::product::{Product, ProductDraft, ProductFilter};
use shop_types::domain::user::Principal;
use shop_types::ports::ProductRepository;
use uuid::Uuid;

pub struct ProductService<R: ProductRepository> {
    repo: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, AppError> {
        Ok(self.repo.list_products(filter, page).await?)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.repo
            .get_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {id}")))
    }

    pub async fn create_product(
        &self,
        principal: &Principal,
        draft: ProductDraft,
    ) -> Result<Product, AppError> {
        let product = Product::new(draft, principal.id)?;
        let product = self.repo.create_product(product).await?;
        tracing::info!(product_id = %product.id, user_id = %principal.id, "product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        principal: &Principal,
        id: Uuid,
        draft: ProductDraft,
    ) -> Result<Product, AppError> {
        let mut product = self.get_product(id).await?;
        product.apply(draft, principal.id)?;
        let updated = self
            .repo
            .update_product(product)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
        tracing::info!(product_id = %id, user_id = %principal.id, "product updated");
        Ok(updated)
    }

    pub async fn delete_product(&self, principal: &Principal, id: Uuid) -> Result<(), AppError> {
        if self.repo.delete_product(id).await? {
            tracing::info!(product_id = %id, user_id = %principal.id, "product deleted");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("product {id}")))
        }
    }
}
