//! Authentication route handlers.
//!
//! Registration, login and logout for shoppers. Admin login lives in
//! [`super::admin`].

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::auth::LOGIN_PATH;
use crate::models::{CurrentUser, ShopSession};
use crate::state::AppState;

/// Username/password form data, shared by login and registration.
#[derive(Debug, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Create an account. The new user still has to log in.
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<(StatusCode, Json<CurrentUser>)> {
    let user = state.auth().register(&form.username, &form.password).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in and bind the account to the session.
#[instrument(skip(state, session, form), fields(username = %form.username))]
pub async fn login(
    State(state): State<AppState>,
    session: ShopSession,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<CurrentUser>> {
    let user = state.auth().login(&form.username, &form.password).await?;
    session.set_current_user(&user).await?;
    set_sentry_user(&user.username);

    info!("User logged in");
    Ok(Json(user))
}

/// Forget the identity and the cart.
#[instrument(skip(session))]
pub async fn logout(session: ShopSession) -> Result<impl IntoResponse> {
    session.clear().await?;
    clear_sentry_user();
    Ok(Redirect::to(LOGIN_PATH))
}
