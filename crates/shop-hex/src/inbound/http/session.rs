//! Resolves the principal behind a request.
//!
//! When the deployment trusts an upstream proxy, `x-user-id` and `x-user-email`
//! identify the caller directly. Otherwise the signed `token` cookie is verified.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::application::session::TokenSigner;
use crate::config::Config;
use crate::errors::AppError;
use shop_types::domain::user::Principal;

pub const SESSION_COOKIE: &str = "token";
pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

pub struct SessionManager {
    signer: TokenSigner,
    trust_principal_header: bool,
    secure_cookies: bool,
}

impl SessionManager {
    pub fn new(signer: TokenSigner, trust_principal_header: bool, secure_cookies: bool) -> Self {
        Self {
            signer,
            trust_principal_header,
            secure_cookies,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            TokenSigner::new(&config.jwt_secret, config.session_ttl_secs),
            config.trust_principal_header,
            config.secure_cookies,
        )
    }

    pub fn resolve(&self, headers: &HeaderMap) -> Result<Principal, AppError> {
        if self.trust_principal_header {
            if let Some(principal) = header_principal(headers) {
                return principal;
            }
        }
        let token = cookie_value(headers, SESSION_COOKIE)
            .ok_or_else(|| AppError::Unauthenticated("authentication required".into()))?;
        self.signer.verify(token)
    }

    pub fn issue(&self, principal: &Principal) -> Result<String, AppError> {
        self.signer.issue(principal)
    }

    pub fn session_cookie(&self, token: &str) -> String {
        self.cookie(token, self.signer.ttl_secs())
    }

    pub fn clear_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: u64) -> String {
        let mut cookie =
            format!("{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}");
        if self.secure_cookies {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

fn header_principal(headers: &HeaderMap) -> Option<Result<Principal, AppError>> {
    let id = headers.get(USER_ID_HEADER)?;
    let invalid = || AppError::Unauthenticated("invalid principal headers".into());
    let principal = id
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .zip(
            headers
                .get(USER_EMAIL_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|e| !e.is_empty()),
        )
        .map(|(id, email)| Principal {
            id,
            email: email.to_owned(),
        })
        .ok_or_else(invalid);
    Some(principal)
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// The authenticated caller. Rejects with 401 when no valid identity is present.
pub struct CurrentPrincipal(pub Principal);

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    Arc<SessionManager>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = Arc::<SessionManager>::from_ref(state);
        sessions.resolve(&parts.headers).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn manager(trust: bool) -> SessionManager {
        SessionManager::new(TokenSigner::new("secret", 3600), trust, false)
    }

    fn principal() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: "cara@example.com".into(),
        }
    }

    #[test]
    fn cookie_token_resolves() {
        let sessions = manager(false);
        let p = principal();
        let token = sessions.issue(&p).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; token={token}")).unwrap(),
        );
        assert_eq!(sessions.resolve(&headers).unwrap(), p);
    }

    #[test]
    fn missing_or_bad_cookie_is_unauthenticated() {
        let sessions = manager(false);
        assert!(matches!(
            sessions.resolve(&HeaderMap::new()),
            Err(AppError::Unauthenticated(_))
        ));
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=abc.def.ghi"));
        assert!(matches!(
            sessions.resolve(&headers),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn principal_headers_only_when_trusted() {
        let p = principal();
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_str(&p.id.to_string()).unwrap());
        headers.insert(USER_EMAIL_HEADER, HeaderValue::from_str(&p.email).unwrap());

        assert_eq!(manager(true).resolve(&headers).unwrap(), p);
        assert!(manager(false).resolve(&headers).is_err());

        headers.insert(USER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(manager(true).resolve(&headers).is_err());
    }

    #[test]
    fn cookie_attributes() {
        let sessions = SessionManager::new(TokenSigner::new("secret", 60), false, true);
        assert_eq!(
            sessions.session_cookie("abc"),
            "token=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=60; Secure"
        );
        assert!(sessions.clear_cookie().starts_with("token=; "));
        assert!(sessions.clear_cookie().contains("Max-Age=0"));
    }
}
