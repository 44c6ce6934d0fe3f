use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shop_types::domain::cart::Cart;
use shop_types::domain::order::{Order, OrderStatus};
use shop_types::domain::page::{Page, PageRequest};
use shop_types::domain::product::{Product, ProductFilter};
use shop_types::domain::user::User;
use shop_types::ports::{
    CartRepository, OrderRepository, ProductRepository, RepoError, UserRepository,
};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Clone)]
pub struct InMemoryRepo {
    pub products: Arc<DashMap<Uuid, Product>>,
    pub carts: Arc<DashMap<Uuid, Cart>>,
    pub orders: Arc<DashMap<Uuid, Order>>,
    pub users: Arc<DashMap<String, User>>,
    // Held by every stock write so checkout's check-then-decrement is atomic.
    stock_lock: Arc<Mutex<()>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            products: Arc::new(DashMap::new()),
            carts: Arc::new(DashMap::new()),
            orders: Arc::new(DashMap::new()),
            users: Arc::new(DashMap::new()),
            stock_lock: Arc::new(Mutex::new(())),
        }
    }

    fn lock_stock(&self) -> Result<MutexGuard<'_, ()>, RepoError> {
        self.stock_lock
            .lock()
            .map_err(|e| RepoError::DbError(e.to_string()))
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProductRepository for InMemoryRepo {
    async fn create_product(&self, product: Product) -> Result<Product, RepoError> {
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        Ok(self.products.get(&id).map(|r| r.clone()))
    }

    async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, RepoError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.products.get(id).map(|r| r.clone()))
            .collect())
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepoError> {
        let mut all: Vec<Product> = self
            .products
            .iter()
            .filter(|kv| filter.matches(kv.value()))
            .map(|kv| kv.value().clone())
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(Page::from_sorted(all, page))
    }

    async fn update_product(&self, product: Product) -> Result<Option<Product>, RepoError> {
        let _guard = self.lock_stock()?;
        if let Some(mut v) = self.products.get_mut(&product.id) {
            *v = product.clone();
            return Ok(Some(product));
        }
        Ok(None)
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, RepoError> {
        let _guard = self.lock_stock()?;
        Ok(self.products.remove(&id).is_some())
    }
}

#[async_trait]
impl CartRepository for InMemoryRepo {
    async fn get_cart(&self, user_id: Uuid) -> Result<Option<Cart>, RepoError> {
        Ok(self.carts.get(&user_id).map(|r| r.clone()))
    }

    async fn save_cart(&self, cart: Cart) -> Result<Cart, RepoError> {
        self.carts.insert(cart.user_id, cart.clone());
        Ok(cart)
    }

    async fn delete_cart(&self, user_id: Uuid) -> Result<bool, RepoError> {
        Ok(self.carts.remove(&user_id).is_some())
    }
}

#[async_trait]
impl OrderRepository for InMemoryRepo {
    async fn place_order(&self, order: Order) -> Result<Order, RepoError> {
        let _guard = self.lock_stock()?;
        for item in &order.items {
            match self.products.get(&item.product) {
                None => return Err(RepoError::ProductNotFound(item.product)),
                Some(p) if p.stock < item.quantity => {
                    return Err(RepoError::InsufficientStock(item.product))
                }
                Some(_) => {}
            }
        }
        for item in &order.items {
            if let Some(mut p) = self.products.get_mut(&item.product) {
                p.stock -= item.quantity;
                p.updated_at = order.created_at;
            }
        }
        self.orders.insert(order.id, order.clone());
        self.carts.remove(&order.user_id);
        Ok(order)
    }

    async fn get_order(&self, user_id: Uuid, id: Uuid) -> Result<Option<Order>, RepoError> {
        Ok(self
            .orders
            .get(&id)
            .filter(|o| o.user_id == user_id)
            .map(|o| o.clone()))
    }

    async fn list_orders(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Order>, RepoError> {
        let mut all: Vec<Order> = self
            .orders
            .iter()
            .filter(|kv| kv.value().user_id == user_id)
            .map(|kv| kv.value().clone())
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(Page::from_sorted(all, page))
    }

    async fn update_order(
        &self,
        order: Order,
        expected: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        match self.orders.get_mut(&order.id) {
            Some(mut v) if v.user_id == order.user_id => {
                // The shard lock is held, so the compare and the write are one step.
                if v.status != expected {
                    return Err(RepoError::StatusChanged {
                        id: order.id,
                        current: v.status,
                    });
                }
                *v = order.clone();
                Ok(Some(order))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryRepo {
    async fn create_user(&self, user: User) -> Result<User, RepoError> {
        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(RepoError::Conflict(format!(
                "user {} already exists",
                user.email
            ))),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.users.get(email).map(|r| r.clone()))
    }
}
