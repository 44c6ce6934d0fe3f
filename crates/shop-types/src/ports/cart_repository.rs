use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::cart::Cart;
use crate::ports::RepoError;

/// One cart per principal, keyed by user id. `get` returning `None` means the
/// principal has no cart, which is distinct from an empty one.
#[async_trait]
pub trait CartRepository: Send + Sync + 'static {
    async fn get_cart(&self, user_id: Uuid) -> Result<Option<Cart>, RepoError>;
    async fn save_cart(&self, cart: Cart) -> Result<Cart, RepoError>;
    async fn delete_cart(&self, user_id: Uuid) -> Result<bool, RepoError>;
}
