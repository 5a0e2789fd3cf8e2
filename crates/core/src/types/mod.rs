//! Core types for GameHub.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod game;
pub mod id;
pub mod price;
pub mod rarity;
pub mod role;
pub mod status;

pub use email::{Email, EmailError};
pub use game::{Game, GameTag, GameTagError, VerificationMethod, find_game};
pub use id::*;
pub use price::{Price, PriceError};
pub use rarity::{Rarity, highest_rarity};
pub use role::{Role, RoleGate};
pub use status::SellRequestStatus;
