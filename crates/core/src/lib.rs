//! Pickles Core - Shared domain types.
//!
//! This crate provides the types used across all Pickles components:
//! - `storefront` - Shop front, checkout workflow and admin routes
//! - `cli` - Command-line tools for migrations, seeding and admin accounts
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Validation happens at construction, so a
//! [`Product`] or [`Order`] held anywhere in the workspace already satisfies
//! its invariants (non-negative stock, positive order quantity, and so on).
//!
//! # Modules
//!
//! - [`types`] - IDs, credentials, prices, statuses, and the catalog/order/cart records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
