pub mod cart;
pub mod error;
pub mod order;
pub mod page;
pub mod product;
pub mod user;

pub use error::DomainError;
