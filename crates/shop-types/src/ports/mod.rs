pub mod cart_repository;
pub mod order_repository;
pub mod product_repository;
pub mod user_repository;

use uuid::Uuid;

use crate::domain::order::OrderStatus;

pub use cart_repository::CartRepository;
pub use order_repository::OrderRepository;
pub use product_repository::ProductRepository;
pub use user_repository::UserRepository;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("db error: {0}")]
    DbError(String),

    #[error("not enough stock for product {0}")]
    InsufficientStock(Uuid),

    #[error("product {0} not found")]
    ProductNotFound(Uuid),

    /// A conditional status write found the order in another status.
    #[error("order {id} is already {current}")]
    StatusChanged { id: Uuid, current: OrderStatus },

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Everything the storefront services need from a storage backend.
pub trait ShopRepository:
    ProductRepository + CartRepository + OrderRepository + UserRepository
{
}

impl<T> ShopRepository for T where
    T: ProductRepository + CartRepository + OrderRepository + UserRepository
{
}
