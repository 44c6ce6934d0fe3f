//! shop-hex: hexagonal storefront API library (core services + inbound HTTP)

pub mod config;
pub mod errors;

pub mod application;

pub use shop_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
