//! GameHub Core - Shared domain library.
//!
//! This crate provides the types and rules shared by all GameHub components:
//! - `storefront` - Public-facing account marketplace (catalog, cart, selling, review)
//! - `cli` - Command-line tools for migrations, seeding and role management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Catalog filtering, cart totals and sell-request validation
//! live here so they can be tested without a server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, rarities, roles and games
//! - [`account`] - Listed accounts and their skins
//! - [`catalog`] - Filtering and sorting the storefront grid
//! - [`cart`] - Cart lines, quantity rules and checkout totals
//! - [`sell_request`] - Seller submissions and their validation
//! - [`review`] - Checker decisions on pending submissions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod review;
pub mod sell_request;
pub mod types;

pub use types::*;
