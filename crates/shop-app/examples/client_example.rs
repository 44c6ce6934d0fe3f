///  To run :
///  cargo r --example client_example
use reqwest::StatusCode;
use shop_client::{ProductQuery, ShopClient};
use shop_hex::application::session::TokenSigner;
use shop_hex::application::ShopServices;
use shop_hex::inbound::http::{HttpServer, HttpServerConfig, SessionManager};
use shop_repo::build_repo;
use shop_types::domain::order::{OrderStatus, PaymentMethod, ShippingAddress};
use shop_types::domain::product::{Category, ProductDraft};
use tempfile::tempdir;

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port = find_free_port();
    let addr = format!("http://127.0.0.1:{port}/");

    // Use a temp file-backed SQLite DB so multiple connections see the same data.
    let tmp = tempdir()?;
    let db_path = tmp.path().join("shop.db");
    let db_url = format!("sqlite://{}", db_path.display());

    let repo = build_repo(Some(&db_url)).await?;
    let server = HttpServer::new(
        ShopServices::new(repo),
        SessionManager::new(TokenSigner::new("example-secret", 3600), false, false),
        HttpServerConfig {
            port: port.to_string(),
        },
    );

    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // The client keeps the session cookie set by register.
    let client = ShopClient::new(&addr)?;
    let session = client.register("example@example.com", "example-pw").await?;
    println!("Registered user id={}", session.user.id);

    let jacket = client
        .create_product(&ProductDraft {
            name: "Denim Jacket".into(),
            description: "Stonewashed, relaxed fit".into(),
            price: 89_000,
            image: None,
            category: Category::Shirts,
            stock: 2,
        })
        .await?;
    println!("Created product id={} stock={}", jacket.id, jacket.stock);

    let page = client
        .list_products(&ProductQuery {
            search: Some("denim".into()),
            ..Default::default()
        })
        .await?;
    println!("Search found {} product(s)", page.total);

    let cart = client.add_to_cart(jacket.id, Some(2)).await?;
    println!("Cart total={} items={}", cart.total_amount, cart.total_items);

    // Asking for more than is in stock is rejected with 400.
    match client.set_cart_quantity(jacket.id, 3).await {
        Err(err)
            if err
                .downcast_ref::<reqwest::Error>()
                .and_then(|e| e.status())
                == Some(StatusCode::BAD_REQUEST) =>
        {
            println!("Quantity 3 rejected: only 2 in stock");
        }
        other => anyhow::bail!("expected a stock rejection, got {other:?}"),
    }

    let order = client
        .place_order(
            ShippingAddress {
                full_name: "Example Person".into(),
                phone: "0900000001".into(),
                address: "10 Example Road".into(),
                city: "Example City".into(),
                postal_code: "10000".into(),
            },
            Some(PaymentMethod::Card),
        )
        .await?;
    println!("Placed order id={} total={}", order.id, order.total_amount);
    assert_eq!(order.status, OrderStatus::Pending);

    let remaining = client.get_product(jacket.id).await?;
    println!("Stock after checkout={}", remaining.stock);

    let paid = client.update_order(order.id, OrderStatus::Paid, None).await?;
    println!("Order status={}", paid.status);

    client.logout().await?;
    println!("Logged out; /auth/me now fails: {}", client.me().await.is_err());

    handle.abort();
    Ok(())
}
