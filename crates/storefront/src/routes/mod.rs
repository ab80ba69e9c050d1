//! HTTP route handlers for the storefront.
//!
//! Responses are JSON; pages that need a login redirect to it instead.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Store readiness check
//! GET  /static/*                        - Product images
//!
//! # Shop (requires login, else redirect to /auth/login)
//! GET  /                                - Product listing
//! GET  /cart                            - Cart with total
//! POST /cart/add/{product_id}           - Add one unit
//! POST /checkout                        - Place orders (form: payment_method)
//!
//! # Auth
//! POST /auth/register                   - Create account (form: username, password)
//! POST /auth/login                      - Log in
//! POST /auth/logout                     - Log out, redirect to /auth/login
//!
//! # Admin (requires admin login, else redirect to /admin/login)
//! POST /admin/login                     - Admin login
//! GET  /admin                           - Dashboard counts
//! GET  /admin/stock                     - Products with stock levels
//! POST /admin/products                  - Add product (form: name, price, quantity, image?)
//! POST /admin/products/{id}/restock     - Add stock (form: amount)
//! GET  /admin/orders                    - Orders with user and product names
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod products;

use std::path::Path;
use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add/{product_id}", post(cart::add))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/login", post(admin::login))
        .route("/stock", get(admin::stock))
        .route("/products", post(admin::add_product))
        .route("/products/{id}/restock", post(admin::restock))
        .route("/orders", get(admin::orders))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}

/// Assemble the full application: health checks, routes, static files,
/// sessions, request IDs and request tracing.
///
/// Layers run outermost first: trace span, request ID, session.
///
/// Sentry layers are added by the binary on top of this.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S>, static_dir: &Path) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &axum::http::Request<_>| {
                            tracing::info_span!(
                                "http_request",
                                method = %request.method(),
                                uri = %request.uri(),
                                request_id = tracing::field::Empty,
                                status = tracing::field::Empty,
                                latency_ms = tracing::field::Empty,
                            )
                        })
                        .on_response(
                            |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                                span.record("status", response.status().as_u16());
                                span.record(
                                    "latency_ms",
                                    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                                );
                                DefaultOnResponse::default().on_response(response, latency, span);
                            },
                        ),
                )
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(sessions),
        )
        .with_state(state)
}
