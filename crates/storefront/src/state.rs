//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::DEFAULT_NOTIFICATION_SUBJECT;
use crate::db::ShopStore;
use crate::services::auth::AuthService;
use crate::services::cart::CartService;
use crate::services::catalog::CatalogService;
use crate::services::checkout::CheckoutService;
use crate::services::notify::Notifier;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the store and notification channel behind their traits, so the same
/// router runs against `PostgreSQL` in production and memory in tests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn ShopStore>,
    notifier: Arc<dyn Notifier>,
    notification_subject: String,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn ShopStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                notifier,
                notification_subject: DEFAULT_NOTIFICATION_SUBJECT.to_string(),
            }),
        }
    }

    /// Override the subject line used for order notifications.
    #[must_use]
    pub fn with_notification_subject(self, subject: impl Into<String>) -> Self {
        let inner = AppStateInner {
            store: Arc::clone(&self.inner.store),
            notifier: Arc::clone(&self.inner.notifier),
            notification_subject: subject.into(),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &dyn ShopStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the notification channel.
    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    /// Subject line of order notifications.
    #[must_use]
    pub fn notification_subject(&self) -> &str {
        &self.inner.notification_subject
    }

    /// Authentication service over this state's identity store.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.store())
    }

    /// Cart service over this state's catalog.
    #[must_use]
    pub fn cart(&self) -> CartService<'_> {
        CartService::new(self.store())
    }

    /// Catalog management service.
    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self.store())
    }

    /// Checkout service wired to this state's store and notifier.
    #[must_use]
    pub fn checkout(&self) -> CheckoutService<'_> {
        CheckoutService::new(self.store(), self.notifier(), self.notification_subject())
    }
}
