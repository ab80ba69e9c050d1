//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, shopper login and admin login
//! - `cart` - Adding to the session cart and resolving it for display
//! - `checkout` - Cart to orders, with inventory decrement and notification
//! - `catalog` - Admin product management, dashboard and order reports
//! - `notify` - Order notification channel (Slack, log, recording)
//!
//! Services borrow their stores from [`AppState`](crate::state::AppState)
//! for the duration of one request.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod notify;
