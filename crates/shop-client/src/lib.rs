use std::time::Duration;

use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use shop_types::domain::cart::CartView;
use shop_types::domain::order::{Order, OrderStatus, PaymentMethod, ShippingAddress};
use shop_types::domain::product::{Category, Product, ProductDraft};
use shop_types::domain::user::Principal;
use uuid::Uuid;

#[derive(Clone)]
pub struct ShopClientBuilder {
    base: Url,
    headers: HeaderMap,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

/// Typed client for the storefront API. The default client keeps a cookie
/// store, so a successful `register` or `login` authenticates later calls.
#[derive(Clone)]
pub struct ShopClient {
    base: Url,
    client: reqwest::Client,
}

impl ShopClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::builder(base_url)?.build()
    }

    pub fn builder(base_url: &str) -> anyhow::Result<ShopClientBuilder> {
        let base = Url::parse(base_url).context("invalid base url")?;
        Ok(ShopClientBuilder {
            base,
            headers: HeaderMap::new(),
            timeout: None,
            client: None,
        })
    }

    fn url(&self, path: &str) -> anyhow::Result<Url> {
        self.base.join(path).context("failed to join url")
    }

    pub async fn health(&self) -> anyhow::Result<Health> {
        let res = self
            .client
            .get(self.url("health")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn register(&self, email: &str, password: &str) -> anyhow::Result<Session> {
        let res = self
            .client
            .post(self.url("auth/register")?)
            .json(&Credentials { email, password })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<Session> {
        let res = self
            .client
            .post(self.url("auth/login")?)
            .json(&Credentials { email, password })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn me(&self) -> anyhow::Result<Principal> {
        let res = self
            .client
            .get(self.url("auth/me")?)
            .send()
            .await?
            .error_for_status()?;
        let body: Me = res.json().await?;
        Ok(body.user)
    }

    pub async fn logout(&self) -> anyhow::Result<()> {
        self.client
            .post(self.url("auth/logout")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn list_products(&self, query: &ProductQuery) -> anyhow::Result<ProductList> {
        let res = self
            .client
            .get(self.url("products")?)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn get_product(&self, id: Uuid) -> anyhow::Result<Product> {
        let res = self
            .client
            .get(self.url(&format!("products/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> anyhow::Result<Product> {
        let res = self
            .client
            .post(self.url("products")?)
            .json(draft)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn update_product(&self, id: Uuid, draft: &ProductDraft) -> anyhow::Result<Product> {
        let res = self
            .client
            .put(self.url(&format!("products/{id}"))?)
            .json(draft)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn delete_product(&self, id: Uuid) -> anyhow::Result<()> {
        self.client
            .delete(self.url(&format!("products/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn view_cart(&self) -> anyhow::Result<CartView> {
        let res = self
            .client
            .get(self.url("cart")?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    /// `quantity` defaults to 1 server-side when omitted.
    pub async fn add_to_cart(
        &self,
        product_id: Uuid,
        quantity: Option<u32>,
    ) -> anyhow::Result<CartView> {
        let res = self
            .client
            .post(self.url("cart")?)
            .json(&AddToCart {
                product_id,
                quantity,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn set_cart_quantity(&self, product_id: Uuid, quantity: u32) -> anyhow::Result<CartView> {
        let res = self
            .client
            .put(self.url(&format!("cart/{product_id}"))?)
            .json(&SetQuantity { quantity })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn remove_from_cart(&self, product_id: Uuid) -> anyhow::Result<CartView> {
        let res = self
            .client
            .delete(self.url(&format!("cart/{product_id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn place_order(
        &self,
        shipping_address: ShippingAddress,
        payment_method: Option<PaymentMethod>,
    ) -> anyhow::Result<Order> {
        let res = self
            .client
            .post(self.url("orders")?)
            .json(&PlaceOrder {
                shipping_address,
                payment_method,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn list_orders(&self, page: Option<u32>, limit: Option<u32>) -> anyhow::Result<OrderList> {
        let res = self
            .client
            .get(self.url("orders")?)
            .query(&PageQuery { page, limit })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn get_order(&self, id: Uuid) -> anyhow::Result<Order> {
        let res = self
            .client
            .get(self.url(&format!("orders/{id}"))?)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }

    pub async fn update_order(
        &self,
        id: Uuid,
        status: OrderStatus,
        payment_method: Option<PaymentMethod>,
    ) -> anyhow::Result<Order> {
        let res = self
            .client
            .put(self.url(&format!("orders/{id}"))?)
            .json(&UpdateOrder {
                status,
                payment_method,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }
}

impl ShopClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_header(
        mut self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> anyhow::Result<Self> {
        let header_name =
            HeaderName::from_bytes(key.as_ref().as_bytes()).context("invalid header name")?;
        let header_value = HeaderValue::from_str(value.as_ref()).context("invalid header value")?;
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// A supplied client is used as is; enable its cookie store to keep sessions.
    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<ShopClient> {
        if let Some(client) = self.client {
            return Ok(ShopClient {
                base: self.base,
                client,
            });
        }

        let mut builder = reqwest::Client::builder().cookie_store(true);
        if !self.headers.is_empty() {
            builder = builder.default_headers(self.headers);
        }
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        Ok(ShopClient {
            base: self.base,
            client,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Health {
    pub status: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub message: String,
    pub user: Principal,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProductList {
    pub products: Vec<Product>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderList {
    pub orders: Vec<Order>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u32,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct Me {
    user: Principal,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct AddToCart {
    product_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug)]
struct SetQuantity {
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PlaceOrder {
    shipping_address: ShippingAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method: Option<PaymentMethod>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UpdateOrder {
    status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_method: Option<PaymentMethod>,
}

#[derive(Serialize)]
struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use shop_types::domain::order::OrderItem;

    fn sample_product() -> Product {
        Product::new(
            ProductDraft {
                name: "Pleated Skirt".into(),
                description: "Midi length".into(),
                price: 55_000,
                image: None,
                category: Category::Pants,
                stock: 4,
            },
            Uuid::new_v4(),
        )
        .unwrap()
    }

    fn shipping() -> ShippingAddress {
        ShippingAddress {
            full_name: "Gia Vo".into(),
            phone: "0933333333".into(),
            address: "5 Nguyen Hue".into(),
            city: "Ho Chi Minh".into(),
            postal_code: "700000".into(),
        }
    }

    fn sample_order(product: &Product) -> Order {
        Order::new(
            Uuid::new_v4(),
            vec![OrderItem {
                product: product.id,
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price,
                image: None,
                category: product.category,
                quantity: 1,
            }],
            shipping(),
            PaymentMethod::Cash,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn login_then_cart() {
        let server = MockServer::start();
        let product = sample_product();
        let user = Principal {
            id: Uuid::new_v4(),
            email: "gia@example.com".into(),
        };

        let login_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/login")
                .json_body(serde_json::json!({ "email": "gia@example.com", "password": "pw1234" }));
            then.status(200)
                .header("set-cookie", "token=abc; HttpOnly; Path=/")
                .json_body_obj(&Session {
                    message: "Login successful".into(),
                    user: user.clone(),
                });
        });

        let add_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/cart")
                .header("cookie", "token=abc")
                .json_body(serde_json::json!({ "productId": product.id }));
            then.status(200).json_body_obj(&CartView {
                items: vec![shop_types::domain::cart::CartItem {
                    product: product.clone(),
                    quantity: 1,
                }],
                total_amount: product.price,
                total_items: 1,
            });
        });

        let client = ShopClient::new(&server.base_url()).unwrap();
        let session = client.login("gia@example.com", "pw1234").await.unwrap();
        assert_eq!(session.user, user);

        let cart = client.add_to_cart(product.id, None).await.unwrap();
        assert_eq!(cart.total_items, 1);
        assert_eq!(cart.items[0].product.id, product.id);

        login_mock.assert();
        add_mock.assert();
    }

    #[tokio::test]
    async fn catalog_queries() {
        let server = MockServer::start();
        let product = sample_product();

        let list_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/products")
                .query_param("search", "skirt")
                .query_param("category", "Pants")
                .query_param("page", "2");
            then.status(200).json_body_obj(&ProductList {
                products: vec![product.clone()],
                total: 11,
                total_pages: 2,
                current_page: 2,
            });
        });

        let get_mock = server.mock(|when, then| {
            when.method(GET).path(format!("/products/{}", product.id));
            then.status(200).json_body_obj(&product);
        });

        let missing = Uuid::new_v4();
        let missing_mock = server.mock(|when, then| {
            when.method(GET).path(format!("/products/{missing}"));
            then.status(404)
                .json_body(serde_json::json!({ "error": "product not found" }));
        });

        let client = ShopClient::new(&server.base_url()).unwrap();
        let page = client
            .list_products(&ProductQuery {
                page: Some(2),
                search: Some("skirt".into()),
                category: Some(Category::Pants),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.products.len(), 1);

        let fetched = client.get_product(product.id).await.unwrap();
        assert_eq!(fetched, product);
        assert!(client.get_product(missing).await.is_err());

        list_mock.assert();
        get_mock.assert();
        missing_mock.assert();
    }

    #[tokio::test]
    async fn checkout_and_pay() {
        let server = MockServer::start();
        let product = sample_product();
        let order = sample_order(&product);

        let place_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/orders")
                .json_body_obj(&PlaceOrder {
                    shipping_address: shipping(),
                    payment_method: None,
                });
            then.status(201).json_body_obj(&order);
        });

        let update_mock = server.mock(|when, then| {
            when.method(httpmock::Method::PUT)
                .path(format!("/orders/{}", order.id))
                .json_body_obj(&UpdateOrder {
                    status: OrderStatus::Paid,
                    payment_method: Some(PaymentMethod::Card),
                });
            let mut paid = order.clone();
            paid.status = OrderStatus::Paid;
            paid.payment_method = PaymentMethod::Card;
            then.status(200).json_body_obj(&paid);
        });

        let list_mock = server.mock(|when, then| {
            when.method(GET).path("/orders").query_param("limit", "5");
            then.status(200).json_body_obj(&OrderList {
                orders: vec![order.clone()],
                total: 1,
                total_pages: 1,
                current_page: 1,
            });
        });

        let client = ShopClient::new(&server.base_url()).unwrap();
        let placed = client.place_order(shipping(), None).await.unwrap();
        assert_eq!(placed.id, order.id);

        let paid = client
            .update_order(order.id, OrderStatus::Paid, Some(PaymentMethod::Card))
            .await
            .unwrap();
        assert_eq!(paid.status, OrderStatus::Paid);

        let listed = client.list_orders(None, Some(5)).await.unwrap();
        assert_eq!(listed.orders.len(), 1);

        place_mock.assert();
        update_mock.assert();
        list_mock.assert();
    }

    #[tokio::test]
    async fn builder_applies_default_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/health").header("x-client", "storefront");
            then.status(200).json_body(serde_json::json!({ "status": "ok" }));
        });

        let client = ShopClient::builder(&server.base_url())
            .unwrap()
            .with_timeout(Duration::from_secs(2))
            .with_header("x-client", "storefront")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.health().await.unwrap().status, "ok");
        mock.assert();
    }
}
