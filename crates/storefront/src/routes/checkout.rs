//! Checkout route handler.

use axum::{Form, Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use pickles_core::PaymentMethod;

use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::ShopSession;
use crate::services::checkout::CheckoutReceipt;
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub payment_method: String,
}

/// Turn the session cart into orders.
#[instrument(skip(state, session, user, form), fields(username = %user.username))]
pub async fn checkout(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: ShopSession,
    Form(form): Form<CheckoutForm>,
) -> Result<Json<CheckoutReceipt>> {
    let payment_method = PaymentMethod::parse(&form.payment_method)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let receipt = state
        .checkout()
        .checkout(&session, &user.username, &payment_method)
        .await?;

    Ok(Json(receipt))
}
