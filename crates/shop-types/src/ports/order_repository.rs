use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{Order, OrderStatus};
use crate::domain::page::{Page, PageRequest};
use crate::ports::RepoError;

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    /// Places `order` as one unit: decrements every line's product stock
    /// (only where `stock >= quantity`), stores the order and deletes the
    /// owner's cart. Returns `RepoError::InsufficientStock` when any decrement
    /// would go below zero, or `RepoError::ProductNotFound` when a line's product
    /// is gone; either way nothing is changed.
    async fn place_order(&self, order: Order) -> Result<Order, RepoError>;
    async fn get_order(&self, user_id: Uuid, id: Uuid) -> Result<Option<Order>, RepoError>;
    /// Newest first.
    async fn list_orders(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Order>, RepoError>;
    /// Writes `order`'s status and payment method only while the stored status
    /// is still `expected`; otherwise fails with `RepoError::StatusChanged`.
    /// `None` when the order does not exist for its owner.
    async fn update_order(
        &self,
        order: Order,
        expected: OrderStatus,
    ) -> Result<Option<Order>, RepoError>;
}
