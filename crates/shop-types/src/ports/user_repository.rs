use async_trait::async_trait;

use crate::domain::user::User;
use crate::ports::RepoError;

#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Fails with `RepoError::Conflict` when the email is already registered.
    async fn create_user(&self, user: User) -> Result<User, RepoError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}
