use std::sync::Arc;

use crate::errors::AppError;
use shop_types::domain::cart::{Cart, CartView};
use shop_types::domain::user::Principal;
use shop_types::domain::DomainError;
use shop_types::ports::{CartRepository, ProductRepository};
use uuid::Uuid;

pub struct CartService<R: ProductRepository + CartRepository> {
    repo: Arc<R>,
}

impl<R: ProductRepository + CartRepository> CartService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// A principal without a cart reads as an empty cart.
    pub async fn view_cart(&self, principal: &Principal) -> Result<CartView, AppError> {
        match self.repo.get_cart(principal.id).await? {
            Some(cart) => self.render(&cart).await,
            None => Ok(CartView::empty()),
        }
    }

    pub async fn add_item(
        &self,
        principal: &Principal,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<CartView, AppError> {
        if quantity < 1 {
            return Err(AppError::BadRequest("quantity must be at least 1".into()));
        }
        let product = self
            .repo
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

        let mut cart = self
            .repo
            .get_cart(principal.id)
            .await?
            .unwrap_or_else(|| Cart::new(principal.id));
        cart.add(&product, quantity)?;
        // Render first so a cart whose total cannot be computed is never stored.
        let view = self.render(&cart).await?;
        self.repo.save_cart(cart).await?;
        tracing::debug!(user_id = %principal.id, %product_id, quantity, "cart item added");
        Ok(view)
    }

    pub async fn set_quantity(
        &self,
        principal: &Principal,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<CartView, AppError> {
        if quantity < 1 {
            return Err(AppError::BadRequest("quantity must be at least 1".into()));
        }
        let mut cart = self.existing_cart(principal).await?;
        if cart.line(product_id).is_none() {
            return Err(DomainError::NotFound(format!("product {product_id} in cart")).into());
        }
        let product = self
            .repo
            .get_product(product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
        cart.set_quantity(&product, quantity)?;
        let view = self.render(&cart).await?;
        self.repo.save_cart(cart).await?;
        tracing::debug!(user_id = %principal.id, %product_id, quantity, "cart quantity set");
        Ok(view)
    }

    /// Removing a product that is not in the cart leaves it unchanged.
    pub async fn remove_item(
        &self,
        principal: &Principal,
        product_id: Uuid,
    ) -> Result<CartView, AppError> {
        let mut cart = self.existing_cart(principal).await?;
        if cart.remove(product_id) {
            cart = self.repo.save_cart(cart).await?;
            tracing::debug!(user_id = %principal.id, %product_id, "cart item removed");
        }
        self.render(&cart).await
    }

    async fn existing_cart(&self, principal: &Principal) -> Result<Cart, AppError> {
        self.repo
            .get_cart(principal.id)
            .await?
            .ok_or_else(|| AppError::NotFound("cart".into()))
    }

    async fn render(&self, cart: &Cart) -> Result<CartView, AppError> {
        let ids: Vec<Uuid> = cart.items.iter().map(|l| l.product_id).collect();
        let products = self.repo.get_products(&ids).await?;
        Ok(CartView::build(cart, &products)?)
    }
}
