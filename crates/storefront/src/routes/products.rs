//! Product listing route handler.

use axum::{Json, extract::State};
use tracing::instrument;

use pickles_core::Product;

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Every product in the catalog.
#[instrument(skip(state, _user))]
pub async fn index(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.store().list_products().await?))
}
