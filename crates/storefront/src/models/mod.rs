//! Domain models for storefront.
//!
//! Storefront-only types that sit on top of `gamehub_core`: the signed-in
//! user as stored in the session and the user rows behind it.

pub mod session;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use user::{User, UserWithRole};
