//! Checkout route handlers.
//!
//! There is no payment step: placing the order snapshots the cart into an
//! order and empties the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use crate::db::{CartRepository, OrderRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::Nav;
use crate::routes::cart::CartView;
use crate::state::AppState;

/// Checkout summary page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub nav: Nav,
    pub cart: CartView,
    pub subtotal: String,
    pub tax: String,
    pub total: String,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout_complete.html")]
pub struct CheckoutCompleteTemplate {
    pub nav: Nav,
    pub order_id: String,
}

/// Display the order summary.
///
/// An empty cart sends the user back to the cart page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let cart = CartRepository::new(state.pool()).list(user.id).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart?error=empty_cart").into_response());
    }

    let summary = cart.summary();
    let nav = Nav::load(&state, Some(&user)).await?;

    Ok(CheckoutTemplate {
        nav,
        cart: CartView::from(&cart),
        subtotal: summary.subtotal.display(),
        tax: summary.tax.display(),
        total: summary.total.display(),
    }
    .into_response())
}

/// Place the order.
#[instrument(skip(state, user))]
pub async fn place_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let Some(order_id) = OrderRepository::new(state.pool())
        .place_order(user.id)
        .await?
    else {
        return Ok(Redirect::to("/cart?error=empty_cart").into_response());
    };

    tracing::info!(order_id = %order_id, user_id = %user.id, "Order placed");

    let nav = Nav::load(&state, Some(&user)).await?;
    Ok(CheckoutCompleteTemplate {
        nav,
        order_id: order_id.to_string(),
    }
    .into_response())
}
