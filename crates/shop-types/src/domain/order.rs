use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::cart::CartItem;
use crate::domain::product::Category;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::InvalidArgument(format!(
                "invalid status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(DomainError::InvalidArgument(format!(
                "invalid payment method: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

impl ShippingAddress {
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields = [
            &self.full_name,
            &self.phone,
            &self.address,
            &self.city,
            &self.postal_code,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(DomainError::InvalidArgument(
                "complete shipping address is required".into(),
            ));
        }
        Ok(())
    }
}

/// Product fields frozen at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image: Option<String>,
    pub category: Category,
    pub quantity: u32,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            product: item.product.id,
            name: item.product.name.clone(),
            description: item.product.description.clone(),
            price: item.product.price,
            image: item.product.image.clone(),
            category: item.product.category,
            quantity: item.quantity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total_amount: i64,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        user_id: Uuid,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Result<Self, DomainError> {
        shipping_address.validate()?;
        if items.is_empty() {
            return Err(DomainError::InvalidArgument("cart is empty".into()));
        }
        for it in &items {
            if it.quantity == 0 {
                return Err(DomainError::InvalidArgument(
                    "item quantity must be > 0".into(),
                ));
            }
        }
        let total = items
            .iter()
            .try_fold(0i64, |acc, it| {
                it.price
                    .checked_mul(i64::from(it.quantity))
                    .and_then(|line| acc.checked_add(line))
            })
            .ok_or_else(|| DomainError::InvalidArgument("order total is too large".into()))?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            items,
            total_amount: total,
            shipping_address,
            payment_method,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a status change. Only pending orders move; `paid` and
    /// `cancelled` are terminal. Re-asserting `pending` is a no-op transition.
    pub fn transition(
        &mut self,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
    ) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        if let Some(method) = payment_method {
            self.payment_method = method;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
