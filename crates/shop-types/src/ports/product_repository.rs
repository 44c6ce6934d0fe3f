use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::page::{Page, PageRequest};
use crate::domain::product::{Product, ProductFilter};
use crate::ports::RepoError;

#[async_trait]
pub trait ProductRepository: Send + Sync + 'static {
    async fn create_product(&self, product: Product) -> Result<Product, RepoError>;
    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError>;
    async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, RepoError>;
    /// Newest first.
    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepoError>;
    async fn update_product(&self, product: Product) -> Result<Option<Product>, RepoError>;
    async fn delete_product(&self, id: Uuid) -> Result<bool, RepoError>;
}
