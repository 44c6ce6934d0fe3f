use anyhow::Context;
use serde::Deserialize;
use std::env;

use crate::application::session::DEFAULT_SESSION_TTL_SECS;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub session_ttl_secs: u64,
    /// Accept `x-user-id` / `x-user-email` injected by a trusted proxy.
    pub trust_principal_header: bool,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_port = lookup("SERVER_PORT").unwrap_or_else(|| "3000".into());
        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET must be set")?;
        let session_ttl_secs = match lookup("SESSION_TTL_SECS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("invalid SESSION_TTL_SECS: {v}"))?,
            None => DEFAULT_SESSION_TTL_SECS,
        };
        Ok(Self {
            server_port,
            database_url,
            jwt_secret,
            session_ttl_secs,
            trust_principal_header: flag(lookup("TRUST_PRINCIPAL_HEADER"))?,
            secure_cookies: flag(lookup("SECURE_COOKIES"))?,
        })
    }
}

fn flag(value: Option<String>) -> anyhow::Result<bool> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some("1") | Some("true") | Some("yes") | Some("on") => Ok(true),
        Some("0") | Some("false") | Some("no") | Some("off") => Ok(false),
        Some(other) => anyhow::bail!("invalid boolean flag: {other}"),
    }
}
