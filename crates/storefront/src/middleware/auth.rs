//! Authentication extractors.
//!
//! Route handlers declare what they need in their signature:
//! [`RequireAuth`] for any logged-in account and [`RequireAdmin`] for the
//! admin routes. Each redirects to its own login page when unmet.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentUser, ShopSession};

/// Login page for shoppers.
pub const LOGIN_PATH: &str = "/auth/login";

/// Login page for administrators.
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Extractor that requires a logged-in account.
///
/// If nobody is logged in, redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a logged-in administrator.
///
/// Anyone else is redirected to the admin login page.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when authentication is required but missing.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the shopper login page.
    RedirectToLogin,
    /// Redirect to the admin login page.
    RedirectToAdminLogin,
    /// No session layer installed or the session store failed.
    SessionUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::RedirectToAdminLogin => Redirect::to(ADMIN_LOGIN_PATH).into_response(),
            Self::SessionUnavailable => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable").into_response()
            }
        }
    }
}

/// Read the logged-in user from the request's session.
async fn current_user(parts: &Parts) -> Result<Option<CurrentUser>, AuthRejection> {
    // Set by SessionManagerLayer
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or(AuthRejection::SessionUnavailable)?;

    ShopSession::new(session).current_user().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to read session");
        AuthRejection::SessionUnavailable
    })
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts)
            .await?
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match current_user(parts).await? {
            Some(user) if user.is_admin => Ok(Self(user)),
            _ => Err(AuthRejection::RedirectToAdminLogin),
        }
    }
}

/// Extractor for the typed session.
///
/// Fails with 500 if the session layer is missing.
impl<S> FromRequestParts<S> for ShopSession
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(Self::new)
            .ok_or(AuthRejection::SessionUnavailable)
    }
}
