//! Checkout flow over HTTP: cart, orders, stock and notifications.

use pickles_integration_tests::{TestApp, decimal, json};
use reqwest::StatusCode;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_checkout_places_orders_and_decrements_stock() {
    let app = TestApp::spawn().await;
    let jar = app.add_product("Jar", 450, 5).await;
    let lid = app.add_product("Lid", 100, 3).await;
    let alice = app.shopper("alice", "pw").await;

    let products = json(app.get(&alice, "/").await).await;
    assert_eq!(products.as_array().unwrap().len(), 2);

    app.add_to_cart(&alice, &jar).await;
    app.add_to_cart(&alice, &lid).await;
    let resp = app.add_to_cart(&alice, &jar).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cart = json(app.get(&alice, "/cart").await).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
    assert_eq!(decimal(&cart["total"]), Decimal::new(1000, 2));

    let resp = app
        .post_form(&alice, "/checkout", &[("payment_method", "card")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt = json(resp).await;

    let orders = receipt["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    for order in orders {
        assert_eq!(order["user_id"], "alice");
        assert_eq!(order["status"], "Confirmed (card)");
    }
    assert_eq!(receipt["notification_sent"], true);

    assert_eq!(app.stock_of(&jar).await, 3);
    assert_eq!(app.stock_of(&lid).await, 2);
    assert_eq!(app.store.order_count().await, 2);

    let published = app.notifier.published();
    assert_eq!(published.len(), 1);
    let message = &published.first().unwrap().message;
    assert!(message.starts_with("New order placed by alice:"));
    assert!(message.contains("Jar x 2"));
    assert!(message.contains("Lid x 1"));

    let cart = json(app.get(&alice, "/cart").await).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_cart_is_rejected() {
    let app = TestApp::spawn().await;
    let alice = app.shopper("alice", "pw").await;

    let resp = app
        .post_form(&alice, "/checkout", &[("payment_method", "card")])
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text().await.unwrap(), "Cart is empty");
    assert_eq!(app.store.order_count().await, 0);
    assert!(app.notifier.published().is_empty());
}

#[tokio::test]
async fn test_missing_payment_method_is_rejected() {
    let app = TestApp::spawn().await;
    let jar = app.add_product("Jar", 450, 5).await;
    let alice = app.shopper("alice", "pw").await;
    app.add_to_cart(&alice, &jar).await;

    let resp = app.post_form(&alice, "/checkout", &[]).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.stock_of(&jar).await, 5);
}

#[tokio::test]
async fn test_insufficient_stock_aborts_whole_checkout() {
    let app = TestApp::spawn().await;
    let jar = app.add_product("Jar", 450, 5).await;
    let lid = app.add_product("Lid", 100, 1).await;
    let alice = app.shopper("alice", "pw").await;

    app.add_to_cart(&alice, &jar).await;
    app.add_to_cart(&alice, &lid).await;
    app.add_to_cart(&alice, &lid).await;

    let resp = app
        .post_form(&alice, "/checkout", &[("payment_method", "card")])
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    assert_eq!(app.stock_of(&jar).await, 5);
    assert_eq!(app.stock_of(&lid).await, 1);
    assert_eq!(app.store.order_count().await, 0);
    assert!(app.notifier.published().is_empty());

    // The cart survives so the shopper can adjust it.
    let cart = json(app.get(&alice, "/cart").await).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_vanished_product_is_named_and_dropped_from_cart() {
    let app = TestApp::spawn().await;
    let jar = app.add_product("Jar", 450, 5).await;
    let gone = app.add_product("Gone", 100, 5).await;
    let alice = app.shopper("alice", "pw").await;

    app.add_to_cart(&alice, &jar).await;
    app.add_to_cart(&alice, &gone).await;
    app.store.remove_product(gone.id).await.unwrap();

    let form = [("payment_method", "card")];
    let resp = app.post_form(&alice, "/checkout", &form).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = resp.text().await.unwrap();
    assert!(body.contains(&gone.id.to_string()), "body: {body}");
    assert_eq!(app.stock_of(&jar).await, 5);
    assert_eq!(app.store.order_count().await, 0);

    let cart = json(app.get(&alice, "/cart").await).await;
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items.first().unwrap()["name"], "Jar");

    let resp = app.post_form(&alice, "/checkout", &form).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(app.stock_of(&jar).await, 4);
    assert_eq!(app.store.order_count().await, 1);
}

#[tokio::test]
async fn test_notification_failure_does_not_fail_checkout() {
    let app = TestApp::spawn().await;
    let jar = app.add_product("Jar", 450, 5).await;
    let alice = app.shopper("alice", "pw").await;
    app.add_to_cart(&alice, &jar).await;
    app.notifier.set_failing(true);

    let resp = app
        .post_form(&alice, "/checkout", &[("payment_method", "cash")])
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt = json(resp).await;
    assert_eq!(receipt["notification_sent"], false);
    assert_eq!(app.stock_of(&jar).await, 4);
    assert_eq!(app.store.order_count().await, 1);
}

#[tokio::test]
async fn test_adding_unknown_product_is_not_found() {
    let app = TestApp::spawn().await;
    let alice = app.shopper("alice", "pw").await;

    let resp = app
        .post_form(
            &alice,
            "/cart/add/6f1b9a52-3c4d-4e5f-8a9b-0c1d2e3f4a5b",
            &[],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_checkouts_never_oversell() {
    let app = TestApp::spawn().await;
    let jar = app.add_product("Jar", 450, 3).await;
    let alice = app.shopper("alice", "pw").await;
    let bob = app.shopper("bob", "pw").await;

    for client in [&alice, &bob] {
        app.add_to_cart(client, &jar).await;
        app.add_to_cart(client, &jar).await;
    }

    let form = [("payment_method", "card")];
    let (a, b) = tokio::join!(
        app.post_form(&alice, "/checkout", &form),
        app.post_form(&bob, "/checkout", &form),
    );

    let mut statuses = [a.status().as_u16(), b.status().as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 409]);
    assert_eq!(app.stock_of(&jar).await, 1);
    assert_eq!(app.store.order_count().await, 1);
}
