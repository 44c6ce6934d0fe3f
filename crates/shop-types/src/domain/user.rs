use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A registered account. `password_hash` is a PHC string and never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, password_hash: String) -> Result<Self, DomainError> {
        Ok(Self {
            id: Uuid::new_v4(),
            email: normalize_email(email)?,
            password_hash,
            created_at: Utc::now(),
        })
    }

    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// Identity attached to an authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
}

pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(DomainError::InvalidArgument("invalid email".into())),
    }
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(DomainError::InvalidArgument(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
