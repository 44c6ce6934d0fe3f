#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a repo feature: `memory` or `sqlite`.");

use async_trait::async_trait;
use shop_types::domain::cart::Cart;
use shop_types::domain::order::{Order, OrderStatus};
use shop_types::domain::page::{Page, PageRequest};
use shop_types::domain::product::{Product, ProductFilter};
use shop_types::domain::user::User;
use shop_types::ports::{
    CartRepository, OrderRepository, ProductRepository, RepoError, UserRepository,
};
use uuid::Uuid;

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Storage backend selected by cargo features. With both features enabled a
/// database URL picks SQLite and `None` picks the in-memory store.
pub enum Repo {
    #[cfg(feature = "memory")]
    Memory(memory::InMemoryRepo),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteRepo),
}

pub async fn build_repo(url: Option<&str>) -> anyhow::Result<Repo> {
    Repo::build_repo(url).await
}

impl Repo {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build_repo(_: Option<&str>) -> anyhow::Result<Self> {
        tracing::info!("using in-memory storage");
        Ok(Self::Memory(memory::InMemoryRepo::new()))
    }

    #[cfg(all(feature = "sqlite", not(feature = "memory")))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or("sqlite://shop.db");
        tracing::info!(url, "using sqlite storage");
        Ok(Self::Sqlite(sqlite::SqliteRepo::new(url).await?))
    }

    #[cfg(all(feature = "sqlite", feature = "memory"))]
    pub async fn build_repo(database_url: Option<&str>) -> anyhow::Result<Self> {
        match database_url {
            Some(url) => {
                tracing::info!(url, "using sqlite storage");
                Ok(Self::Sqlite(sqlite::SqliteRepo::new(url).await?))
            }
            None => {
                tracing::info!("using in-memory storage");
                Ok(Self::Memory(memory::InMemoryRepo::new()))
            }
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $repo:ident => $call:expr) => {
        match $self {
            #[cfg(feature = "memory")]
            Repo::Memory($repo) => $call,
            #[cfg(feature = "sqlite")]
            Repo::Sqlite($repo) => $call,
        }
    };
}

#[async_trait]
impl ProductRepository for Repo {
    async fn create_product(&self, product: Product) -> Result<Product, RepoError> {
        dispatch!(self, r => r.create_product(product).await)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        dispatch!(self, r => r.get_product(id).await)
    }

    async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, RepoError> {
        dispatch!(self, r => r.get_products(ids).await)
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepoError> {
        dispatch!(self, r => r.list_products(filter, page).await)
    }

    async fn update_product(&self, product: Product) -> Result<Option<Product>, RepoError> {
        dispatch!(self, r => r.update_product(product).await)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_product(id).await)
    }
}

#[async_trait]
impl CartRepository for Repo {
    async fn get_cart(&self, user_id: Uuid) -> Result<Option<Cart>, RepoError> {
        dispatch!(self, r => r.get_cart(user_id).await)
    }

    async fn save_cart(&self, cart: Cart) -> Result<Cart, RepoError> {
        dispatch!(self, r => r.save_cart(cart).await)
    }

    async fn delete_cart(&self, user_id: Uuid) -> Result<bool, RepoError> {
        dispatch!(self, r => r.delete_cart(user_id).await)
    }
}

#[async_trait]
impl OrderRepository for Repo {
    async fn place_order(&self, order: Order) -> Result<Order, RepoError> {
        dispatch!(self, r => r.place_order(order).await)
    }

    async fn get_order(&self, user_id: Uuid, id: Uuid) -> Result<Option<Order>, RepoError> {
        dispatch!(self, r => r.get_order(user_id, id).await)
    }

    async fn list_orders(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Order>, RepoError> {
        dispatch!(self, r => r.list_orders(user_id, page).await)
    }

    async fn update_order(
        &self,
        order: Order,
        expected: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        dispatch!(self, r => r.update_order(order, expected).await)
    }
}

#[async_trait]
impl UserRepository for Repo {
    async fn create_user(&self, user: User) -> Result<User, RepoError> {
        dispatch!(self, r => r.create_user(user).await)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        dispatch!(self, r => r.find_user_by_email(email).await)
    }
}
