//! Admin route handlers.
//!
//! Everything except `POST /admin/login` requires an administrator session.

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument};

use pickles_core::{Product, ProductId};

use crate::error::{Result, set_sentry_user};
use crate::middleware::RequireAdmin;
use crate::models::{CurrentUser, ShopSession};
use crate::routes::auth::CredentialsForm;
use crate::services::catalog::{DashboardStats, OrderReportLine};
use crate::state::AppState;

/// New product form data.
#[derive(Debug, Deserialize)]
pub struct NewProductForm {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

/// Restock form data.
#[derive(Debug, Deserialize)]
pub struct RestockForm {
    pub amount: u32,
}

/// Stock level after a restock.
#[derive(Debug, serde::Serialize)]
pub struct RestockResult {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Log in as an administrator.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: ShopSession,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<CurrentUser>> {
    let admin = state
        .auth()
        .admin_login(&form.username, &form.password)
        .await?;
    session.set_current_user(&admin).await?;
    set_sentry_user(&admin.username);

    info!("Admin logged in");
    Ok(Json(admin))
}

/// Catalog and order counts.
#[instrument(skip_all)]
pub async fn dashboard(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    Ok(Json(state.catalog().dashboard().await?))
}

/// Add a product. A blank image falls back to the default image.
#[instrument(skip(state, admin, form), fields(admin = %admin.username, name = %form.name))]
pub async fn add_product(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<NewProductForm>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state
        .catalog()
        .add_product(&form.name, form.price, form.quantity, form.image.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Every product with its stock level.
#[instrument(skip_all)]
pub async fn stock(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().stock().await?))
}

/// Add units to a product's stock.
#[instrument(skip(state, admin, form), fields(admin = %admin.username))]
pub async fn restock(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Form(form): Form<RestockForm>,
) -> Result<Json<RestockResult>> {
    let quantity = state.catalog().restock(product_id, form.amount).await?;
    Ok(Json(RestockResult {
        product_id,
        quantity,
    }))
}

/// Every order joined with its user and product.
#[instrument(skip_all)]
pub async fn orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderReportLine>>> {
    Ok(Json(state.catalog().orders_report().await?))
}
