//! Integration test harness for the Pickles storefront.
//!
//! Each [`TestApp`] serves the real router on an ephemeral local port, backed
//! by the in-memory shop store, a recording notifier and an in-memory session
//! store. Tests talk to it over HTTP with a cookie-holding client, so the
//! session cookie round-trips exactly as it does in a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pickles-integration-tests
//! ```
//!
//! No database or external service is required.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::path::Path;
use std::sync::Arc;

use reqwest::{Client, Response, StatusCode, redirect};
use rust_decimal::Decimal;
use serde_json::Value;

use pickles_core::{NewProduct, Password, Price, Product, User, Username};
use pickles_storefront::db::{IdentityStore, MemoryStore};
use pickles_storefront::middleware::create_session_layer;
use pickles_storefront::routes;
use pickles_storefront::services::notify::RecordingNotifier;
use pickles_storefront::state::AppState;

/// Username/password of the admin account every [`TestApp`] starts with.
pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "brine";

/// A running storefront plus handles on its backing stores.
pub struct TestApp {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// Start a storefront on `127.0.0.1:0` with one admin account.
    pub async fn spawn() -> Self {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());

        store
            .insert_user_if_absent(&User::admin(
                Username::parse(ADMIN_USERNAME).unwrap(),
                Password::new(ADMIN_PASSWORD).unwrap(),
            ))
            .await
            .unwrap();

        let state = AppState::new(store.clone(), notifier.clone());
        let sessions = create_session_layer(tower_sessions::MemoryStore::default(), false);
        let app = routes::app(state, sessions, Path::new("crates/storefront/static"));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            store,
            notifier,
        }
    }

    /// A fresh browser: its own cookie jar, redirects not followed.
    pub fn client(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .unwrap()
    }

    /// Absolute URL for a path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Put a product straight into the store.
    pub async fn add_product(&self, name: &str, cents: i64, quantity: u32) -> Product {
        let product = NewProduct::new(name, Price::from_cents(cents).unwrap(), quantity, None)
            .unwrap()
            .into_product();
        self.store.upsert_product(product.clone()).await.unwrap();
        product
    }

    /// Register and log in a shopper, returning their client.
    pub async fn shopper(&self, username: &str, password: &str) -> Client {
        let client = self.client();
        let resp = self
            .post_form(&client, "/auth/register", &[("username", username), ("password", password)])
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = self
            .post_form(&client, "/auth/login", &[("username", username), ("password", password)])
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        client
    }

    /// Log in the seeded admin account, returning its client.
    pub async fn admin(&self) -> Client {
        let client = self.client();
        let resp = self
            .post_form(
                &client,
                "/admin/login",
                &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)],
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        client
    }

    /// GET a path.
    pub async fn get(&self, client: &Client, path: &str) -> Response {
        client.get(self.url(path)).send().await.unwrap()
    }

    /// POST a url-encoded form to a path.
    pub async fn post_form(&self, client: &Client, path: &str, form: &[(&str, &str)]) -> Response {
        client.post(self.url(path)).form(form).send().await.unwrap()
    }

    /// Add one unit of a product to the client's cart.
    pub async fn add_to_cart(&self, client: &Client, product: &Product) -> Response {
        self.post_form(client, &format!("/cart/add/{}", product.id), &[])
            .await
    }

    /// Current stock of a product as seen by the store.
    pub async fn stock_of(&self, product: &Product) -> u32 {
        use pickles_storefront::db::CatalogStore;
        self.store
            .get_product(product.id)
            .await
            .unwrap()
            .map_or(0, |p| p.quantity)
    }
}

/// Parse a response body as JSON.
pub async fn json(resp: Response) -> Value {
    resp.json().await.unwrap()
}

/// Parse a decimal string field such as a cart total.
pub fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}
