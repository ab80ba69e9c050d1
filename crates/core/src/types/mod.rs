//! Core types for Pickles.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod credential;
pub mod id;
pub mod order;
pub mod payment;
pub mod price;
pub mod product;
pub mod status;
pub mod user;
pub mod username;

pub use cart::{Cart, CartLine};
pub use credential::{Password, PasswordError};
pub use id::*;
pub use order::{Order, OrderError};
pub use payment::{PaymentMethod, PaymentMethodError};
pub use price::{Price, PriceError};
pub use product::{DEFAULT_PRODUCT_IMAGE, MAX_STOCK, NewProduct, Product, ProductError};
pub use status::OrderStatus;
pub use user::User;
pub use username::{Username, UsernameError};
