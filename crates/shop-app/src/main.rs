use anyhow::Context;
use shop_hex::application::ShopServices;
use shop_hex::config::Config;
use shop_hex::inbound::http::{HttpServer, HttpServerConfig, SessionManager};
use shop_repo::{build_repo, Repo};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / JWT_SECRET / SERVER_PORT when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("loading configuration")?;
    let repo: Repo = build_repo(config.database_url.as_deref())
        .await
        .context("opening storage")?;
    let services = ShopServices::new(repo);
    let sessions = SessionManager::from_config(&config);

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };
    tracing::info!(port = %server_cfg.port, "storefront configured");

    HttpServer::new(services, sessions, server_cfg).run().await
}
