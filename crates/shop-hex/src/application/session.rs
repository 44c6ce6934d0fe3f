//! Signed session tokens.
//!
//! Tokens are compact HS256 JWS strings (`header.claims.signature`, each part
//! base64url without padding) carrying the principal id and email plus issue
//! and expiry times in unix seconds.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use uuid::Uuid;

use crate::errors::AppError;
use shop_types::domain::user::Principal;

type HmacSha256 = Hmac<Sha256>;

/// Seven days.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 7;

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    id: Uuid,
    email: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl_secs: u64,
}

impl TokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub fn issue(&self, principal: &Principal) -> Result<String, AppError> {
        self.issue_at(principal, Utc::now().timestamp())
    }

    pub fn issue_at(&self, principal: &Principal, now: i64) -> Result<String, AppError> {
        let header = Header {
            alg: "HS256".into(),
            typ: "JWT".into(),
        };
        let claims = Claims {
            id: principal.id,
            email: principal.email.clone(),
            iat: now,
            exp: now.saturating_add(i64::try_from(self.ttl_secs).unwrap_or(i64::MAX)),
        };
        let header = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&header).map_err(|e| AppError::Internal(e.into()))?,
        );
        let claims = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&claims).map_err(|e| AppError::Internal(e.into()))?,
        );
        let signing_input = format!("{header}.{claims}");
        let signature = URL_SAFE_NO_PAD.encode(self.mac(&signing_input)?.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    pub fn verify(&self, token: &str) -> Result<Principal, AppError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<Principal, AppError> {
        let invalid = || AppError::Unauthenticated("invalid token".into());

        let mut parts = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };

        let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| invalid())?;
        self.mac(&format!("{header}.{claims}"))?
            .verify_slice(&signature)
            .map_err(|_| invalid())?;

        let header: Header = URL_SAFE_NO_PAD
            .decode(header)
            .ok()
            .and_then(|b| serde_json::from_slice(&b).ok())
            .ok_or_else(invalid)?;
        if header.alg != "HS256" {
            return Err(invalid());
        }

        let claims: Claims = URL_SAFE_NO_PAD
            .decode(claims)
            .ok()
            .and_then(|b| serde_json::from_slice(&b).ok())
            .ok_or_else(invalid)?;
        if claims.exp <= now {
            return Err(AppError::Unauthenticated("session expired".into()));
        }

        Ok(Principal {
            id: claims.id,
            email: claims.email,
        })
    }

    fn mac(&self, input: &str) -> Result<HmacSha256, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;
        mac.update(input.as_bytes());
        Ok(mac)
    }
}
