use axum::{
    extract::FromRef,
    routing::{get, post, put},
    serve, Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::session::SessionManager;
use super::{auth, cart, orders, products};
use crate::application::ShopServices;
use shop_types::ports::ShopRepository;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

pub struct AppState<R: ShopRepository> {
    pub services: Arc<ShopServices<R>>,
    pub sessions: Arc<SessionManager>,
}

// Manual impl: `R` itself need not be `Clone`.
impl<R: ShopRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            services: self.services.clone(),
            sessions: self.sessions.clone(),
        }
    }
}

impl<R: ShopRepository> FromRef<AppState<R>> for Arc<SessionManager> {
    fn from_ref(state: &AppState<R>) -> Self {
        state.sessions.clone()
    }
}

pub struct HttpServer<R: ShopRepository> {
    state: AppState<R>,
    config: HttpServerConfig,
}

impl<R: ShopRepository> HttpServer<R> {
    pub fn new(services: ShopServices<R>, sessions: SessionManager, config: HttpServerConfig) -> Self {
        Self {
            state: AppState {
                services: Arc::new(services),
                sessions: Arc::new(sessions),
            },
            config,
        }
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        Router::new()
            .route("/health", get(health))
            .route("/auth/register", post(auth::register::<R>))
            .route("/auth/login", post(auth::login::<R>))
            .route("/auth/me", get(auth::me))
            .route("/auth/logout", post(auth::logout))
            .route(
                "/products",
                get(products::list_products::<R>).post(products::create_product::<R>),
            )
            .route(
                "/products/{id}",
                get(products::get_product::<R>)
                    .put(products::update_product::<R>)
                    .delete(products::delete_product::<R>),
            )
            .route("/cart", get(cart::view_cart::<R>).post(cart::add_item::<R>))
            .route(
                "/cart/{product_id}",
                put(cart::set_quantity::<R>).delete(cart::remove_item::<R>),
            )
            .route(
                "/orders",
                get(orders::list_orders::<R>).post(orders::place_order::<R>),
            )
            .route(
                "/orders/{id}",
                get(orders::get_order::<R>).put(orders::update_order::<R>),
            )
            .layer(trace_layer)
            .with_state(self.state.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        tracing::info!("starting server on {}", listener.local_addr()?);
        let app = self.router();
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}
