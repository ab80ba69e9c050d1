//! Cart route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use pickles_core::ProductId;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::ShopSession;
use crate::services::cart::CartView;
use crate::state::AppState;

/// Add one unit of a product, returning the updated cart.
#[instrument(skip(state, session, user), fields(username = %user.username))]
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: ShopSession,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartView>> {
    let cart = state.cart().add_one(&session, product_id).await?;
    let product_ref = product_id.to_string();
    add_breadcrumb("cart", "Added product", Some(&[("product_id", product_ref.as_str())]));
    Ok(Json(state.cart().view(&cart).await?))
}

/// The cart with names, prices and total.
#[instrument(skip(state, session, user), fields(username = %user.username))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: ShopSession,
) -> Result<Json<CartView>> {
    let cart = session.cart().await?;
    Ok(Json(state.cart().view(&cart).await?))
}
