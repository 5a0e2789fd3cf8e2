//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Email and password authentication
//! - `credentials` - AES-256-GCM sealing of seller passwords
//! - `sell_requests` - Seller submission and reviewer decisions

pub mod auth;
pub mod credentials;
pub mod sell_requests;

pub use auth::{AuthError, AuthService};
pub use credentials::{CredentialCipher, CredentialError};
pub use sell_requests::{SellRequestService, SellRequestServiceError};
