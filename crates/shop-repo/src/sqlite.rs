use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use shop_types::domain::cart::{Cart, CartLine};
use shop_types::domain::order::{Order, OrderItem, OrderStatus, ShippingAddress};
use shop_types::domain::page::{Page, PageRequest};
use shop_types::domain::product::{Product, ProductFilter};
use shop_types::domain::user::User;
use shop_types::ports::{
    CartRepository, OrderRepository, ProductRepository, RepoError, UserRepository,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Executor, FromRow, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

pub struct SqliteRepo {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, image, category, stock, created_by, updated_by, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, user_id, items_json, total_amount, shipping_json, payment_method, status, created_at, updated_at";
const PRODUCT_FILTER: &str = r"(? IS NULL OR name LIKE ? ESCAPE '\') AND (? IS NULL OR category = ?)";

fn db_err(e: impl std::fmt::Display) -> RepoError {
    RepoError::DbError(e.to_string())
}

// Fixed-width timestamps so text ordering matches time ordering.
fn ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>, RepoError> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(db_err)?
        .with_timezone(&Utc))
}

fn parse_id(s: &str) -> Result<Uuid, RepoError> {
    Uuid::parse_str(s).map_err(db_err)
}

fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[derive(FromRow)]
struct DbProduct {
    id: String,
    name: String,
    description: String,
    price: i64,
    image: Option<String>,
    category: String,
    stock: i64,
    created_by: String,
    updated_by: Option<String>,
    created_at: String,
    updated_at: String,
}

impl DbProduct {
    fn into_product(self) -> Result<Product, RepoError> {
        Ok(Product {
            id: parse_id(&self.id)?,
            name: self.name,
            description: self.description,
            price: self.price,
            image: self.image,
            category: self.category.parse().map_err(db_err)?,
            stock: u32::try_from(self.stock).map_err(db_err)?,
            created_by: parse_id(&self.created_by)?,
            updated_by: self.updated_by.as_deref().map(parse_id).transpose()?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct DbCart {
    user_id: String,
    items_json: String,
    updated_at: String,
}

impl DbCart {
    fn into_cart(self) -> Result<Cart, RepoError> {
        let items: Vec<CartLine> = serde_json::from_str(&self.items_json).map_err(db_err)?;
        Ok(Cart {
            user_id: parse_id(&self.user_id)?,
            items,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct DbOrder {
    id: String,
    user_id: String,
    items_json: String,
    total_amount: i64,
    shipping_json: String,
    payment_method: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl DbOrder {
    fn into_order(self) -> Result<Order, RepoError> {
        let items: Vec<OrderItem> = serde_json::from_str(&self.items_json).map_err(db_err)?;
        let shipping_address: ShippingAddress =
            serde_json::from_str(&self.shipping_json).map_err(db_err)?;
        Ok(Order {
            id: parse_id(&self.id)?,
            user_id: parse_id(&self.user_id)?,
            items,
            total_amount: self.total_amount,
            shipping_address,
            payment_method: self.payment_method.parse().map_err(db_err)?,
            status: self.status.parse().map_err(db_err)?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct DbUser {
    id: String,
    email: String,
    password_hash: String,
    created_at: String,
}

impl DbUser {
    fn into_user(self) -> Result<User, RepoError> {
        Ok(User {
            id: parse_id(&self.id)?,
            email: self.email,
            password_hash: self.password_hash,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

impl SqliteRepo {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        let in_memory = database_url.contains(":memory:");
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if !in_memory {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every in-memory connection is its own database.
        let max_connections = if in_memory { 1 } else { 8 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        pool.execute(include_str!("../migrations/0001_create_shop.sql"))
            .await?;

        Ok(Self { pool })
    }

    fn filter_binds(filter: &ProductFilter) -> (Option<String>, Option<&'static str>) {
        (
            filter.search.as_deref().map(like_pattern),
            filter.category.map(|c| c.as_str()),
        )
    }
}

#[async_trait]
impl ProductRepository for SqliteRepo {
    async fn create_product(&self, product: Product) -> Result<Product, RepoError> {
        sqlx::query(&format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(product.id.to_string())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.image.clone())
        .bind(product.category.as_str())
        .bind(i64::from(product.stock))
        .bind(product.created_by.to_string())
        .bind(product.updated_by.map(|u| u.to_string()))
        .bind(ts(product.created_at))
        .bind(ts(product.updated_at))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(product)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        let row: Option<DbProduct> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(|r| r.into_product()).transpose()
    }

    async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ({placeholders})");
        let mut query = sqlx::query_as::<_, DbProduct>(&sql);
        for id in ids {
            query = query.bind(id.to_string());
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        rows.into_iter()
            .map(|r| r.into_product())
            .collect::<Result<Vec<_>, _>>()
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Page<Product>, RepoError> {
        let (pattern, category) = Self::filter_binds(filter);

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products WHERE {PRODUCT_FILTER}"))
                .bind(pattern.clone())
                .bind(pattern.clone())
                .bind(category)
                .bind(category)
                .fetch_one(&self.pool)
                .await
                .map_err(db_err)?;

        let rows: Vec<DbProduct> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE {PRODUCT_FILTER}
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(pattern.clone())
        .bind(pattern.clone())
        .bind(category)
        .bind(category)
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(|r| r.into_product())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            total: total as u64,
        })
    }

    async fn update_product(&self, product: Product) -> Result<Option<Product>, RepoError> {
        let updated = sqlx::query(
            "UPDATE products SET name = ?, description = ?, price = ?, image = ?, category = ?,
             stock = ?, updated_by = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.image.clone())
        .bind(product.category.as_str())
        .bind(i64::from(product.stock))
        .bind(product.updated_by.map(|u| u.to_string()))
        .bind(ts(product.updated_at))
        .bind(product.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(product))
    }

    async fn delete_product(&self, id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl CartRepository for SqliteRepo {
    async fn get_cart(&self, user_id: Uuid) -> Result<Option<Cart>, RepoError> {
        let row: Option<DbCart> =
            sqlx::query_as("SELECT user_id, items_json, updated_at FROM carts WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        row.map(|r| r.into_cart()).transpose()
    }

    async fn save_cart(&self, cart: Cart) -> Result<Cart, RepoError> {
        let items_json = serde_json::to_string(&cart.items).map_err(db_err)?;
        sqlx::query(
            "INSERT INTO carts (user_id, items_json, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET items_json = excluded.items_json,
             updated_at = excluded.updated_at",
        )
        .bind(cart.user_id.to_string())
        .bind(items_json)
        .bind(ts(cart.updated_at))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(cart)
    }

    async fn delete_cart(&self, user_id: Uuid) -> Result<bool, RepoError> {
        let res = sqlx::query("DELETE FROM carts WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderRepository for SqliteRepo {
    async fn place_order(&self, order: Order) -> Result<Order, RepoError> {
        let items_json = serde_json::to_string(&order.items).map_err(db_err)?;
        let shipping_json = serde_json::to_string(&order.shipping_address).map_err(db_err)?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for item in &order.items {
            let qty = i64::from(item.quantity);
            let res = sqlx::query(
                "UPDATE products SET stock = stock - ?, updated_at = ? WHERE id = ? AND stock >= ?",
            )
            .bind(qty)
            .bind(ts(order.created_at))
            .bind(item.product.to_string())
            .bind(qty)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
            if res.rows_affected() == 0 {
                let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE id = ?")
                    .bind(item.product.to_string())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(db_err)?;
                tx.rollback().await.map_err(db_err)?;
                return Err(if exists == 0 {
                    RepoError::ProductNotFound(item.product)
                } else {
                    RepoError::InsufficientStock(item.product)
                });
            }
        }

        sqlx::query(&format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(order.id.to_string())
        .bind(order.user_id.to_string())
        .bind(items_json)
        .bind(order.total_amount)
        .bind(shipping_json)
        .bind(order.payment_method.as_str())
        .bind(order.status.as_str())
        .bind(ts(order.created_at))
        .bind(ts(order.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        sqlx::query("DELETE FROM carts WHERE user_id = ?")
            .bind(order.user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(order)
    }

    async fn get_order(&self, user_id: Uuid, id: Uuid) -> Result<Option<Order>, RepoError> {
        let row: Option<DbOrder> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ? AND user_id = ?"
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| r.into_order()).transpose()
    }

    async fn list_orders(&self, user_id: Uuid, page: PageRequest) -> Result<Page<Order>, RepoError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let rows: Vec<DbOrder> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(user_id.to_string())
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(|r| r.into_order())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            total: total as u64,
        })
    }

    async fn update_order(
        &self,
        order: Order,
        expected: OrderStatus,
    ) -> Result<Option<Order>, RepoError> {
        let updated = sqlx::query(
            "UPDATE orders SET status = ?, payment_method = ?, updated_at = ?
             WHERE id = ? AND user_id = ? AND status = ?",
        )
        .bind(order.status.as_str())
        .bind(order.payment_method.as_str())
        .bind(ts(order.updated_at))
        .bind(order.id.to_string())
        .bind(order.user_id.to_string())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if updated.rows_affected() > 0 {
            return Ok(Some(order));
        }

        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ? AND user_id = ?")
                .bind(order.id.to_string())
                .bind(order.user_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        match current {
            Some(status) => Err(RepoError::StatusChanged {
                id: order.id,
                current: status.parse::<OrderStatus>().map_err(db_err)?,
            }),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl UserRepository for SqliteRepo {
    async fn create_user(&self, user: User) -> Result<User, RepoError> {
        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)")
            .bind(user.id.to_string())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(ts(user.created_at))
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref d) if d.is_unique_violation() => {
                    RepoError::Conflict(format!("user {} already exists", user.email))
                }
                other => db_err(other),
            })?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbUser> = sqlx::query_as(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        row.map(|r| r.into_user()).transpose()
    }
}
