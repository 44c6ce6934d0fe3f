use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Shirts,
    Pants,
    Shoes,
    Accessories,
    Handbags,
    Jewelry,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Shirts,
        Category::Pants,
        Category::Shoes,
        Category::Accessories,
        Category::Handbags,
        Category::Jewelry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Shirts => "Shirts",
            Category::Pants => "Pants",
            Category::Shoes => "Shoes",
            Category::Accessories => "Accessories",
            Category::Handbags => "Handbags",
            Category::Jewelry => "Jewelry",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DomainError::InvalidArgument(format!("unknown category: {s}")))
    }
}

/// Largest accepted unit price in minor units. Keeps line totals well inside `i64`
/// for any realistic quantity; cart and order totals are still checked.
pub const MAX_PRICE: i64 = 1_000_000_000_000;

/// Caller-supplied product fields, shared by create and full update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    /// Minor currency units.
    pub price: i64,
    #[serde(default)]
    pub image: Option<String>,
    pub category: Category,
    pub stock: u32,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidArgument("name is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(DomainError::InvalidArgument(
                "description is required".into(),
            ));
        }
        if self.price < 0 {
            return Err(DomainError::InvalidArgument(
                "price must not be negative".into(),
            ));
        }
        if self.price > MAX_PRICE {
            return Err(DomainError::InvalidArgument(format!(
                "price must not exceed {MAX_PRICE}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub image: Option<String>,
    pub category: Category,
    pub stock: u32,
    pub created_by: Uuid,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(draft: ProductDraft, created_by: Uuid) -> Result<Self, DomainError> {
        draft.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            price: draft.price,
            image: normalize_image(draft.image),
            category: draft.category,
            stock: draft.stock,
            created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replaces every editable field and stamps the editor.
    pub fn apply(&mut self, draft: ProductDraft, updated_by: Uuid) -> Result<(), DomainError> {
        draft.validate()?;
        self.name = draft.name.trim().to_string();
        self.description = draft.description.trim().to_string();
        self.price = draft.price;
        self.image = normalize_image(draft.image);
        self.category = draft.category;
        self.stock = draft.stock;
        self.updated_by = Some(updated_by);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn ensure_stock(&self, quantity: u32) -> Result<(), DomainError> {
        if quantity > self.stock {
            return Err(DomainError::InsufficientStock {
                product_id: self.id,
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

fn normalize_image(image: Option<String>) -> Option<String> {
    image
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Listing filter. `search` matches a case-insensitive name substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category {
            if product.category != category {
                return false;
            }
        }
        match &self.search {
            Some(needle) => product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
