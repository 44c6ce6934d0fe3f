use thiserror::Error;
use uuid::Uuid;

use crate::domain::order::OrderStatus;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("not enough stock for {name}")]
    InsufficientStock { product_id: Uuid, name: String },

    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
}
