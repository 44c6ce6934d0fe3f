use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::Product;
use crate::domain::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// The single cart owned by a principal. Product ids are unique across `items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub user_id: Uuid,
    pub items: Vec<CartLine>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
        self.items.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `quantity` of `product`, merging into an existing line. The merged
    /// quantity must fit in the product's current stock.
    pub fn add(&mut self, product: &Product, quantity: u32) -> Result<(), DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidArgument(
                "quantity must be at least 1".into(),
            ));
        }
        match self.items.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => {
                let merged = line.quantity.checked_add(quantity).ok_or_else(|| {
                    DomainError::InsufficientStock {
                        product_id: product.id,
                        name: product.name.clone(),
                    }
                })?;
                product.ensure_stock(merged)?;
                line.quantity = merged;
            }
            None => {
                product.ensure_stock(quantity)?;
                self.items.push(CartLine {
                    product_id: product.id,
                    quantity,
                });
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Overwrites the quantity of an existing line.
    pub fn set_quantity(&mut self, product: &Product, quantity: u32) -> Result<(), DomainError> {
        if quantity < 1 {
            return Err(DomainError::InvalidArgument(
                "quantity must be at least 1".into(),
            ));
        }
        let line = self
            .items
            .iter_mut()
            .find(|l| l.product_id == product.id)
            .ok_or_else(|| DomainError::NotFound(format!("product {} in cart", product.id)))?;
        product.ensure_stock(quantity)?;
        line.quantity = quantity;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Returns whether a line was removed.
    pub fn remove(&mut self, product_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|l| l.product_id != product_id);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

/// Cart joined with live product data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total_amount: i64,
    pub total_items: u64,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_amount: 0,
            total_items: 0,
        }
    }

    /// Joins lines with `products`; lines whose product no longer exists are dropped.
    /// Fails when the total amount does not fit in `i64`.
    pub fn build(cart: &Cart, products: &[Product]) -> Result<Self, DomainError> {
        let items: Vec<CartItem> = cart
            .items
            .iter()
            .filter_map(|line| {
                products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .map(|p| CartItem {
                        product: p.clone(),
                        quantity: line.quantity,
                    })
            })
            .collect();
        let total_amount = items
            .iter()
            .try_fold(0i64, |acc, it| {
                it.product
                    .price
                    .checked_mul(i64::from(it.quantity))
                    .and_then(|line| acc.checked_add(line))
            })
            .ok_or_else(|| DomainError::InvalidArgument("cart total is too large".into()))?;
        let total_items = items.iter().map(|it| u64::from(it.quantity)).sum();
        Ok(Self {
            items,
            total_amount,
            total_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::{Category, ProductDraft, MAX_PRICE};

    fn product(price: i64, stock: u32) -> Product {
        Product::new(
            ProductDraft {
                name: "Loafer".into(),
                description: "Leather loafer".into(),
                price,
                image: None,
                category: Category::Shoes,
                stock,
            },
            Uuid::new_v4(),
        )
        .unwrap()
    }

    #[test]
    fn add_to_empty_cart_creates_single_line() {
        let p = product(2_000, 5);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&p, 3).unwrap();
        let view = CartView::build(&cart, &[p.clone()]).unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.total_items, 3);
        assert_eq!(view.total_amount, 6_000);
    }

    #[test]
    fn add_merges_existing_line() {
        let p = product(100, 5);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&p, 2).unwrap();
        cart.add(&p, 3).unwrap();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.line(p.id).unwrap().quantity, 5);
    }

    #[test]
    fn merge_over_stock_leaves_line_untouched() {
        let p = product(100, 4);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&p, 3).unwrap();
        let err = cart.add(&p, 2).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(cart.line(p.id).unwrap().quantity, 3);
    }

    #[test]
    fn add_rejects_zero_quantity() {
        let p = product(100, 4);
        let mut cart = Cart::new(Uuid::new_v4());
        assert!(matches!(
            cart.add(&p, 0),
            Err(DomainError::InvalidArgument(_))
        ));
    }

    #[test]
    fn set_quantity_is_absolute_and_checked() {
        let p = product(100, 4);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&p, 3).unwrap();
        cart.set_quantity(&p, 1).unwrap();
        assert_eq!(cart.line(p.id).unwrap().quantity, 1);

        assert!(matches!(
            cart.set_quantity(&p, 5),
            Err(DomainError::InsufficientStock { .. })
        ));
        assert!(matches!(
            cart.set_quantity(&p, 0),
            Err(DomainError::InvalidArgument(_))
        ));

        let absent = product(100, 4);
        assert!(matches!(
            cart.set_quantity(&absent, 1),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn remove_absent_line_is_noop() {
        let p = product(100, 4);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&p, 1).unwrap();
        assert!(!cart.remove(Uuid::new_v4()));
        assert_eq!(cart.items.len(), 1);
        assert!(cart.remove(p.id));
        assert!(cart.is_empty());
    }

    #[test]
    fn view_reads_live_prices_and_skips_deleted_products() {
        let mut p = product(100, 10);
        let gone = product(500, 10);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&p, 2).unwrap();
        cart.add(&gone, 1).unwrap();

        p.price = 150;
        let view = CartView::build(&cart, &[p]).unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.total_amount, 300);
        assert_eq!(view.total_items, 2);
    }

    #[test]
    fn view_rejects_overflowing_total() {
        let big = product(MAX_PRICE, u32::MAX);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&big, u32::MAX).unwrap();
        assert!(matches!(
            CartView::build(&cart, &[big]),
            Err(DomainError::InvalidArgument(_))
        ));

        // Each line fits, the sum does not.
        let mut left = product(1, 1);
        let mut right = product(1, 1);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&left, 1).unwrap();
        cart.add(&right, 1).unwrap();
        left.price = i64::MAX / 2 + 1;
        right.price = i64::MAX / 2 + 1;
        assert!(CartView::build(&cart, &[left, right]).is_err());
    }

    #[test]
    fn serde_round_trip_preserves_cart_and_view() {
        let p = product(2_500, 5);
        let mut cart = Cart::new(Uuid::new_v4());
        cart.add(&p, 2).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["items"][0]["productId"], p.id.to_string());
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);

        let view = CartView::build(&cart, &[p]).unwrap();
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"totalAmount\":5000"));
        assert!(json.contains("\"totalItems\":2"));
        let back: CartView = serde_json::from_str(&json).unwrap();
        assert_eq!(back, view);
    }
}
