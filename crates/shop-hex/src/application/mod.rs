pub mod auth_service;
pub mod cart_service;
pub mod order_service;
pub mod product_service;
pub mod session;

use std::sync::Arc;

use shop_types::ports::ShopRepository;

use auth_service::AuthService;
use cart_service::CartService;
use order_service::OrderService;
use product_service::ProductService;

/// All storefront services sharing one storage backend.
pub struct ShopServices<R: ShopRepository> {
    pub products: ProductService<R>,
    pub carts: CartService<R>,
    pub orders: OrderService<R>,
    pub auth: AuthService<R>,
}

impl<R: ShopRepository> ShopServices<R> {
    pub fn new(repo: R) -> Self {
        let repo = Arc::new(repo);
        Self {
            products: ProductService::new(repo.clone()),
            carts: CartService::new(repo.clone()),
            orders: OrderService::new(repo.clone()),
            auth: AuthService::new(repo),
        }
    }
}
