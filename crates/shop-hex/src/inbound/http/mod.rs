//! HTTP adapter: router, handlers and the session resolver.

mod auth;
mod cart;
mod extract;
mod orders;
mod products;
pub mod server;
pub mod session;

pub use server::{AppState, HttpServer, HttpServerConfig};
pub use session::{CurrentPrincipal, SessionManager};
