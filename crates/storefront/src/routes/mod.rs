//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog (query: game, q, price, skins, sort)
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (database)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Cart (signed in)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add one of an account
//! POST /cart/update            - Set quantity (<= 0 removes)
//! POST /cart/remove            - Remove line
//! GET  /cart/count             - Item count badge (fragment)
//!
//! # Checkout (signed in)
//! GET  /checkout               - Order summary
//! POST /checkout               - Place order
//!
//! # Sell (signed in)
//! GET  /sell                   - Sell form
//! POST /sell                   - Submit sell request
//! GET  /sell/requests          - Own requests and friend-request notices
//! GET  /api/sell-requests/notices - Notices as JSON
//!
//! # Review queue (checker, admin)
//! GET  /checker                        - Pending requests
//! POST /checker/requests/{id}/approve  - Approve
//! POST /checker/requests/{id}/deny     - Deny
//! POST /checker/requests/{id}/reveal   - Show decrypted credentials
//!
//! # Admin (admin)
//! GET  /admin                          - Accounts, games, users
//! POST /admin/accounts                 - Create account
//! GET  /admin/accounts/{id}/edit       - Edit account form
//! POST /admin/accounts/{id}            - Update account
//! POST /admin/accounts/{id}/delete     - Delete account
//! POST /admin/games                    - Create game
//! GET  /admin/games/{slug}/edit        - Edit game form
//! POST /admin/games/{slug}             - Update game
//! POST /admin/games/{slug}/delete      - Delete game
//! POST /admin/users/{id}/role          - Set role
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checker;
pub mod checkout;
pub mod health;
pub mod home;
pub mod sell;

use axum::{
    Router,
    routing::{get, post},
};
use serde::Deserialize;

use gamehub_core::review::ReviewError;
use gamehub_core::sell_request::SellRequestError;

use crate::db::{CartRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Shared Page Context
// =============================================================================

/// Navigation bar state shared by every page.
#[derive(Debug, Clone, Default)]
pub struct Nav {
    pub user_name: Option<String>,
    pub can_review: bool,
    pub is_admin: bool,
    pub cart_count: u32,
}

impl Nav {
    /// Build the navigation for the current visitor.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the role or cart lookup fails.
    pub async fn load(state: &AppState, user: Option<&CurrentUser>) -> Result<Self, AppError> {
        let Some(user) = user else {
            return Ok(Self::default());
        };

        let role = UserRepository::new(state.pool()).get_role(user.id).await?;
        let cart_count = CartRepository::new(state.pool()).count(user.id).await?;

        Ok(Self {
            user_name: Some(user.greeting_name().to_string()),
            can_review: role.can_review(),
            is_admin: role.is_admin(),
            cart_count,
        })
    }
}

/// A `<select>` option with its selection precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    /// Options whose value and label are the same token.
    #[must_use]
    pub fn tokens(tokens: &[&str], selected: Option<&str>) -> Vec<Self> {
        tokens
            .iter()
            .map(|token| Self {
                value: (*token).to_string(),
                label: (*token).to_string(),
                selected: selected == Some(*token),
            })
            .collect()
    }
}

/// Query parameters for error/success display.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

impl MessageQuery {
    /// Human text for the `error` code, if any.
    #[must_use]
    pub fn error_notice(&self) -> Option<String> {
        self.error.as_deref().map(notice_for)
    }

    /// Human text for the `success` code, if any.
    #[must_use]
    pub fn success_notice(&self) -> Option<String> {
        self.success.as_deref().map(notice_for)
    }
}

/// Map a redirect notice code to the text shown on the page.
#[must_use]
pub fn notice_for(code: &str) -> String {
    if let Some(message) = SellRequestError::message_for_code(code) {
        return message.to_string();
    }

    let message = match code {
        // Auth
        "invalid_email" => "Please enter a valid email address",
        "invalid_credentials" => "Invalid email or password",
        "email_taken" => "An account with this email already exists",
        "weak_password" => "Password must be at least 8 characters",
        "password_mismatch" => "Passwords do not match",
        "session" => "Your session could not be saved, please try again",
        // Cart and checkout
        "added" => "Added to cart",
        "not_found" => "That item no longer exists",
        "empty_cart" => "Your cart is empty",
        "order_placed" => "Order placed, thank you!",
        // Sell and review
        "submitted" => "Sell request submitted for review",
        "approved" => "Request approved and listed",
        "denied" => "Request denied",
        c if c == ReviewError::MissingReviewerHandle.code() => {
            "Enter your Discord handle before approving this request"
        }
        c if c == ReviewError::AlreadyReviewed.code() => "This request has already been reviewed",
        // Admin
        "missing_title" => "Title is required",
        "invalid_game" => "Please choose a valid game",
        "invalid_price" => "Please enter a valid price",
        "game_exists" => "A game with that slug already exists",
        "game_in_use" => "Remove this game's listings before deleting it",
        "invalid_role" => "Unknown role",
        "own_role" => "You cannot change your own role",
        "saved" => "Saved",
        "deleted" => "Deleted",
        _ => "Something went wrong, please try again",
    };
    message.to_string()
}

// =============================================================================
// Routers
// =============================================================================

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the sell routes router.
pub fn sell_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sell::form_page).post(sell::submit))
        .route("/requests", get(sell::my_requests))
}

/// Create the review queue router.
pub fn checker_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checker::index))
        .route("/requests/{id}/approve", post(checker::approve))
        .route("/requests/{id}/deny", post(checker::deny))
        .route("/requests/{id}/reveal", post(checker::reveal))
}

/// Create the admin router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/accounts", post(admin::create_account))
        .route("/accounts/{id}", post(admin::update_account))
        .route("/accounts/{id}/edit", get(admin::edit_account))
        .route("/accounts/{id}/delete", post(admin::delete_account))
        .route("/games", post(admin::create_game))
        .route("/games/{slug}", post(admin::update_game))
        .route("/games/{slug}/edit", get(admin::edit_game))
        .route("/games/{slug}/delete", post(admin::delete_game))
        .route("/users/{id}/role", post(admin::set_role))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes().layer(auth_rate_limiter()))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        .nest("/sell", sell_routes().layer(form_rate_limiter()))
        .route("/api/sell-requests/notices", get(sell::notices))
        .nest("/checker", checker_routes())
        .nest("/admin", admin_routes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_for_known_codes() {
        assert_eq!(
            notice_for("skin_count_mismatch"),
            "Number of skins must match the amount of skin names provided"
        );
        assert_eq!(
            notice_for("already_reviewed"),
            "This request has already been reviewed"
        );
        assert_eq!(notice_for("email_taken"), "An account with this email already exists");
    }

    #[test]
    fn test_notice_for_unknown_code() {
        assert_eq!(notice_for("bogus"), "Something went wrong, please try again");
    }

    #[test]
    fn test_option_tokens() {
        let options = OptionView::tokens(&["user", "checker", "admin"], Some("checker"));
        assert_eq!(options.len(), 3);
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[1].label, "checker");
    }

    #[test]
    fn test_message_query() {
        let query = MessageQuery {
            error: Some("missing_fields".to_string()),
            success: None,
        };
        assert_eq!(
            query.error_notice().as_deref(),
            Some("Please fill in all required fields")
        );
        assert_eq!(query.success_notice(), None);
    }
}
