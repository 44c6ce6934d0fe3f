//! shop-types: storefront domain model and repository ports

pub mod domain;
pub mod ports;
