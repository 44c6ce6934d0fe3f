// Behaviour every storage backend must share.

use shop_types::domain::cart::Cart;
use shop_types::domain::order::{Order, OrderItem, OrderStatus, PaymentMethod, ShippingAddress};
use shop_types::domain::page::PageRequest;
use shop_types::domain::product::{Category, Product, ProductDraft, ProductFilter};
use shop_types::domain::user::User;
use shop_types::ports::{RepoError, ShopRepository};
use uuid::Uuid;

pub fn product(name: &str, category: Category, price: i64, stock: u32) -> Product {
    Product::new(
        ProductDraft {
            name: name.into(),
            description: format!("{name} description"),
            price,
            image: None,
            category,
            stock,
        },
        Uuid::new_v4(),
    )
    .unwrap()
}

fn address() -> ShippingAddress {
    ShippingAddress {
        full_name: "Test User".into(),
        phone: "555-0100".into(),
        address: "1 Test Way".into(),
        city: "Testville".into(),
        postal_code: "12345".into(),
    }
}

fn order_for(user_id: Uuid, lines: &[(&Product, u32)]) -> Order {
    let items = lines
        .iter()
        .map(|(p, qty)| OrderItem {
            product: p.id,
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price,
            image: p.image.clone(),
            category: p.category,
            quantity: *qty,
        })
        .collect();
    Order::new(user_id, items, address(), PaymentMethod::Card).unwrap()
}

pub async fn product_crud_and_listing<R: ShopRepository>(repo: &R) {
    let shirt = repo
        .create_product(product("Oxford Shirt", Category::Shirts, 3_000, 5))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let chino = repo
        .create_product(product("Slim Chino", Category::Pants, 4_000, 2))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    repo.create_product(product("Denim Shirt 50%", Category::Shirts, 3_500, 1))
        .await
        .unwrap();

    let fetched = repo.get_product(shirt.id).await.unwrap().unwrap();
    assert_eq!(fetched, shirt);

    let all = repo
        .list_products(&ProductFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total, 3);
    assert_eq!(all.items[0].name, "Denim Shirt 50%");

    let shirts = repo
        .list_products(
            &ProductFilter {
                search: Some("sHiRt".into()),
                category: None,
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(shirts.total, 2);

    let literal_percent = repo
        .list_products(
            &ProductFilter {
                search: Some("50%".into()),
                category: None,
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(literal_percent.total, 1);

    let pants = repo
        .list_products(
            &ProductFilter {
                search: None,
                category: Some(Category::Pants),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(pants.items, vec![chino.clone()]);

    let second_page = repo
        .list_products(&ProductFilter::default(), PageRequest::new(Some(2), Some(2)))
        .await
        .unwrap();
    assert_eq!(second_page.total, 3);
    assert_eq!(second_page.items.len(), 1);
    assert_eq!(second_page.items[0].id, shirt.id);

    let mut edited = chino.clone();
    edited.stock = 9;
    edited.updated_by = Some(Uuid::new_v4());
    let updated = repo.update_product(edited.clone()).await.unwrap().unwrap();
    assert_eq!(updated.stock, 9);
    assert_eq!(repo.get_product(chino.id).await.unwrap().unwrap(), edited);

    let many = repo
        .get_products(&[shirt.id, Uuid::new_v4(), chino.id])
        .await
        .unwrap();
    assert_eq!(many.len(), 2);

    assert!(repo.delete_product(shirt.id).await.unwrap());
    assert!(!repo.delete_product(shirt.id).await.unwrap());
    assert!(repo.get_product(shirt.id).await.unwrap().is_none());
    assert!(repo
        .update_product(shirt)
        .await
        .unwrap()
        .is_none());
}

pub async fn cart_is_keyed_by_principal<R: ShopRepository>(repo: &R) {
    let user = Uuid::new_v4();
    assert!(repo.get_cart(user).await.unwrap().is_none());

    let p = repo
        .create_product(product("Scarf", Category::Accessories, 1_500, 3))
        .await
        .unwrap();
    let mut cart = Cart::new(user);
    cart.add(&p, 2).unwrap();
    repo.save_cart(cart.clone()).await.unwrap();
    assert_eq!(repo.get_cart(user).await.unwrap().unwrap(), cart);

    cart.remove(p.id);
    repo.save_cart(cart).await.unwrap();
    let empty = repo.get_cart(user).await.unwrap().unwrap();
    assert!(empty.is_empty());

    assert!(repo.get_cart(Uuid::new_v4()).await.unwrap().is_none());
    assert!(repo.delete_cart(user).await.unwrap());
    assert!(!repo.delete_cart(user).await.unwrap());
}

pub async fn place_order_is_all_or_nothing<R: ShopRepository>(repo: &R) {
    let user = Uuid::new_v4();
    let ring = repo
        .create_product(product("Silver Ring", Category::Jewelry, 9_000, 3))
        .await
        .unwrap();
    let bag = repo
        .create_product(product("Clutch", Category::Handbags, 12_000, 1))
        .await
        .unwrap();

    let mut cart = Cart::new(user);
    cart.add(&ring, 2).unwrap();
    cart.add(&bag, 1).unwrap();
    repo.save_cart(cart).await.unwrap();

    // Ring fits, bag does not: nothing may change.
    let too_many = order_for(user, &[(&ring, 2), (&bag, 2)]);
    let err = repo.place_order(too_many).await.unwrap_err();
    assert!(matches!(err, RepoError::InsufficientStock(id) if id == bag.id));
    assert_eq!(repo.get_product(ring.id).await.unwrap().unwrap().stock, 3);
    assert_eq!(repo.get_product(bag.id).await.unwrap().unwrap().stock, 1);
    assert!(repo.get_cart(user).await.unwrap().is_some());
    assert_eq!(repo.list_orders(user, PageRequest::default()).await.unwrap().total, 0);

    let order = order_for(user, &[(&ring, 2), (&bag, 1)]);
    let placed = repo.place_order(order.clone()).await.unwrap();
    assert_eq!(placed, order);
    assert_eq!(repo.get_product(ring.id).await.unwrap().unwrap().stock, 1);
    assert_eq!(repo.get_product(bag.id).await.unwrap().unwrap().stock, 0);
    assert!(repo.get_cart(user).await.unwrap().is_none());

    let fetched = repo.get_order(user, order.id).await.unwrap().unwrap();
    assert_eq!(fetched, order);
    assert!(repo
        .get_order(Uuid::new_v4(), order.id)
        .await
        .unwrap()
        .is_none());
}

pub async fn order_listing_and_updates<R: ShopRepository>(repo: &R) {
    let user = Uuid::new_v4();
    let p = repo
        .create_product(product("Belt", Category::Accessories, 2_000, 10))
        .await
        .unwrap();

    let mut ids = Vec::new();
    for _ in 0..3 {
        let placed = repo.place_order(order_for(user, &[(&p, 1)])).await.unwrap();
        ids.push(placed.id);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    repo.place_order(order_for(Uuid::new_v4(), &[(&p, 1)]))
        .await
        .unwrap();

    let first = repo
        .list_orders(user, PageRequest::new(Some(1), Some(2)))
        .await
        .unwrap();
    assert_eq!(first.total, 3);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].id, ids[2]);
    assert_eq!(first.items[1].id, ids[1]);

    let mut order = repo.get_order(user, ids[0]).await.unwrap().unwrap();
    order
        .transition(OrderStatus::Paid, Some(PaymentMethod::BankTransfer))
        .unwrap();
    let updated = repo
        .update_order(order.clone(), OrderStatus::Pending)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Paid);
    let stored = repo.get_order(user, ids[0]).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert_eq!(stored.payment_method, PaymentMethod::BankTransfer);

    let mut foreign = order;
    foreign.user_id = Uuid::new_v4();
    assert!(repo
        .update_order(foreign, OrderStatus::Paid)
        .await
        .unwrap()
        .is_none());
}

pub async fn status_write_requires_expected_status<R: ShopRepository>(repo: &R) {
    let user = Uuid::new_v4();
    let p = repo
        .create_product(product("Anklet", Category::Jewelry, 2_500, 2))
        .await
        .unwrap();
    let placed = repo.place_order(order_for(user, &[(&p, 1)])).await.unwrap();

    // Two writers both read the order while it was pending.
    let mut paid = placed.clone();
    paid.transition(OrderStatus::Paid, Some(PaymentMethod::Card)).unwrap();
    let mut cancelled = placed.clone();
    cancelled.transition(OrderStatus::Cancelled, None).unwrap();

    repo.update_order(paid, OrderStatus::Pending)
        .await
        .unwrap()
        .unwrap();
    let err = repo
        .update_order(cancelled, OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::StatusChanged { id, current: OrderStatus::Paid } if id == placed.id
    ));

    let stored = repo.get_order(user, placed.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert_eq!(stored.payment_method, PaymentMethod::Card);
}

pub async fn place_order_reports_deleted_product<R: ShopRepository>(repo: &R) {
    let user = Uuid::new_v4();
    let kept = repo
        .create_product(product("Beret", Category::Accessories, 1_800, 4))
        .await
        .unwrap();
    let gone = repo
        .create_product(product("Bangle", Category::Jewelry, 3_300, 4))
        .await
        .unwrap();
    let order = order_for(user, &[(&kept, 1), (&gone, 1)]);
    assert!(repo.delete_product(gone.id).await.unwrap());

    let err = repo.place_order(order).await.unwrap_err();
    assert!(matches!(err, RepoError::ProductNotFound(id) if id == gone.id));
    assert_eq!(repo.get_product(kept.id).await.unwrap().unwrap().stock, 4);
    assert_eq!(repo.list_orders(user, PageRequest::default()).await.unwrap().total, 0);
}

pub async fn users_are_unique_by_email<R: ShopRepository>(repo: &R) {
    let user = User::new("shopper@example.com", "$argon2id$fake".into()).unwrap();
    repo.create_user(user.clone()).await.unwrap();

    let found = repo
        .find_user_by_email("shopper@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, user);

    let dup = User::new("shopper@example.com", "$argon2id$other".into()).unwrap();
    assert!(matches!(
        repo.create_user(dup).await,
        Err(RepoError::Conflict(_))
    ));
    assert!(repo
        .find_user_by_email("nobody@example.com")
        .await
        .unwrap()
        .is_none());
}
