//! Registration, login, logout and access control over HTTP.

use pickles_integration_tests::{TestApp, json};
use reqwest::{Response, StatusCode, header::LOCATION};

fn location(resp: &Response) -> &str {
    resp.headers().get(LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn test_anonymous_visitors_are_redirected_to_login() {
    let app = TestApp::spawn().await;
    let client = app.client();

    for path in ["/", "/cart"] {
        let resp = app.get(&client, path).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), "/auth/login");
    }

    let resp = app
        .post_form(&client, "/checkout", &[("payment_method", "card")])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");
}

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::spawn().await;
    let client = app.client();
    let form = [("username", "alice"), ("password", "pw")];

    let resp = app.post_form(&client, "/auth/register", &form).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let user = json(resp).await;
    assert_eq!(user["username"], "alice");
    assert_eq!(user["is_admin"], false);

    // Registration alone does not log in.
    let resp = app.get(&client, "/").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = app.post_form(&client, "/auth/login", &form).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app.get(&client, "/").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let resp = app
        .post_form(&client, "/auth/register", &[("username", "alice"), ("password", "pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .post_form(&client, "/auth/register", &[("username", "alice"), ("password", "other")])
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(resp.text().await.unwrap(), "Username already taken");
}

#[tokio::test]
async fn test_invalid_registration_is_bad_request() {
    let app = TestApp::spawn().await;
    let client = app.client();

    let resp = app
        .post_form(&client, "/auth/register", &[("username", ""), ("password", "pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .post_form(&client, "/auth/register", &[("username", "alice"), ("password", "")])
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::spawn().await;
    app.shopper("alice", "pw").await;
    let client = app.client();

    let resp = app
        .post_form(&client, "/auth/login", &[("username", "alice"), ("password", "nope")])
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .post_form(&client, "/auth/login", &[("username", "nobody"), ("password", "pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.text().await.unwrap(), "Invalid credentials");
}

#[tokio::test]
async fn test_logout_forgets_user_and_cart() {
    let app = TestApp::spawn().await;
    let jar = app.add_product("Jar", 450, 5).await;
    let alice = app.shopper("alice", "pw").await;
    app.add_to_cart(&alice, &jar).await;

    let resp = app.post_form(&alice, "/auth/logout", &[]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/auth/login");

    let resp = app.get(&alice, "/cart").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    app.post_form(&alice, "/auth/login", &[("username", "alice"), ("password", "pw")])
        .await;
    let cart = json(app.get(&alice, "/cart").await).await;
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_shoppers_cannot_reach_admin_pages() {
    let app = TestApp::spawn().await;
    let alice = app.shopper("alice", "pw").await;

    let resp = app.get(&alice, "/admin").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/login");

    let resp = app
        .post_form(&alice, "/admin/login", &[("username", "alice"), ("password", "pw")])
        .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.text().await.unwrap(), "Invalid admin credentials");
}
