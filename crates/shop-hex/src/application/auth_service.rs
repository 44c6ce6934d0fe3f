use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::errors::AppError;
use shop_types::domain::user::{normalize_email, validate_password, Principal, User};
use shop_types::ports::{RepoError, UserRepository};

pub struct AuthService<R: UserRepository> {
    repo: Arc<R>,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<Principal, AppError> {
        let email = normalize_email(email)?;
        validate_password(password)?;
        if self.repo.find_user_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("user already exists".into()));
        }

        let password = password.to_owned();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(e.into()))??;

        let user = match self.repo.create_user(User::new(&email, hash)?).await {
            Ok(user) => user,
            Err(RepoError::Conflict(_)) => {
                return Err(AppError::Conflict("user already exists".into()))
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user.principal())
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<Principal, AppError> {
        let invalid = || AppError::Unauthenticated("invalid credentials".into());
        let email = normalize_email(email).map_err(|_| invalid())?;
        let user = self
            .repo
            .find_user_by_email(&email)
            .await?
            .ok_or_else(invalid)?;

        let password = password.to_owned();
        let hash = user.password_hash.clone();
        let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        if !ok {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(invalid());
        }
        Ok(user.principal())
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
