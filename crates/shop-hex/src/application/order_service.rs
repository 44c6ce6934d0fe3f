use std::sync::Arc;

use crate::errors::AppError;
use shop_types::domain::cart::CartView;
use shop_types::domain::order::{Order, OrderItem, OrderStatus, PaymentMethod, ShippingAddress};
use shop_types::domain::page::{Page, PageRequest};
use shop_types::domain::user::Principal;
use shop_types::domain::DomainError;
use shop_types::ports::{CartRepository, OrderRepository, ProductRepository, RepoError};
use uuid::Uuid;

pub struct OrderService<R: ProductRepository + CartRepository + OrderRepository> {
    repo: Arc<R>,
}

impl<R: ProductRepository + CartRepository + OrderRepository> OrderService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Converts the principal's cart into a pending order. Stock is checked for
    /// every line before anything is written; the decrement, order insert and
    /// cart removal then happen as one repository unit.
    pub async fn place_order(
        &self,
        principal: &Principal,
        shipping_address: ShippingAddress,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Order, AppError> {
        shipping_address.validate()?;

        let cart = match self.repo.get_cart(principal.id).await? {
            Some(cart) if !cart.is_empty() => cart,
            _ => return Err(AppError::BadRequest("cart is empty".into())),
        };

        let ids: Vec<Uuid> = cart.items.iter().map(|l| l.product_id).collect();
        let products = self.repo.get_products(&ids).await?;
        if let Some(missing) = ids.iter().find(|id| !products.iter().any(|p| p.id == **id)) {
            return Err(AppError::NotFound(format!("product {missing}")));
        }

        let view = CartView::build(&cart, &products)?;
        for item in &view.items {
            if let Err(e) = item.product.ensure_stock(item.quantity) {
                tracing::warn!(user_id = %principal.id, product_id = %item.product.id, "checkout rejected: insufficient stock");
                return Err(e.into());
            }
        }

        let items: Vec<OrderItem> = view.items.iter().map(OrderItem::from).collect();
        let order = Order::new(
            principal.id,
            items,
            shipping_address,
            payment_method.unwrap_or_default(),
        )?;

        let order = match self.repo.place_order(order).await {
            Ok(order) => order,
            Err(RepoError::InsufficientStock(id)) => {
                // Lost a race with another checkout between the check and the write.
                let name = view
                    .items
                    .iter()
                    .find(|it| it.product.id == id)
                    .map(|it| it.product.name.clone())
                    .unwrap_or_else(|| format!("product {id}"));
                tracing::warn!(user_id = %principal.id, product_id = %id, "checkout rejected: stock changed");
                return Err(AppError::InsufficientStock(format!(
                    "not enough stock for {name}"
                )));
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            order_id = %order.id,
            user_id = %principal.id,
            total_amount = order.total_amount,
            "order placed"
        );
        Ok(order)
    }

    pub async fn get_order(&self, principal: &Principal, id: Uuid) -> Result<Order, AppError> {
        self.repo
            .get_order(principal.id, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {id}")))
    }

    pub async fn list_orders(
        &self,
        principal: &Principal,
        page: PageRequest,
    ) -> Result<Page<Order>, AppError> {
        Ok(self.repo.list_orders(principal.id, page).await?)
    }

    pub async fn update_status(
        &self,
        principal: &Principal,
        id: Uuid,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
    ) -> Result<Order, AppError> {
        let mut order = self.get_order(principal, id).await?;
        let from = order.status;
        order.transition(status, payment_method)?;
        let updated = match self.repo.update_order(order, from).await {
            Ok(Some(updated)) => updated,
            Ok(None) => return Err(AppError::NotFound(format!("order {id}"))),
            Err(RepoError::StatusChanged { current, .. }) => {
                // Another update committed after our read.
                tracing::warn!(order_id = %id, %current, to = %status, "order status update lost a race");
                return Err(DomainError::InvalidTransition {
                    from: current,
                    to: status,
                }
                .into());
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(order_id = %id, %from, to = %updated.status, "order status updated");
        Ok(updated)
    }
}
