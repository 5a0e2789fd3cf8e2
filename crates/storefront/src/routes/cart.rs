//! Cart route handlers.
//!
//! Carts belong to signed-in users and live in the database, so they follow
//! the user across devices. Anonymous visitors are sent to sign in.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use gamehub_core::cart::{Cart, CartLine, QuantityUpdate};
use gamehub_core::{AccountId, CartItemId};

use crate::db::{CartRepository, RepositoryError};
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::routes::{MessageQuery, Nav};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub game: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            title: line.title.clone(),
            game: line.game.to_string(),
            image_url: line.image_url.clone(),
            quantity: line.quantity,
            price: line.unit_price.display(),
            line_price: line.line_total().display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines.iter().map(CartItemView::from).collect(),
            subtotal: cart.total().display(),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub account_id: AccountId,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: CartItemId,
    /// Zero or negative removes the line.
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: CartItemId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartShowTemplate {
    pub nav: Nav,
    pub cart: CartView,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display cart page.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let cart = CartRepository::new(state.pool()).list(user.id).await?;
    let nav = Nav::load(&state, Some(&user)).await?;

    Ok(CartShowTemplate {
        nav,
        cart: CartView::from(&cart),
        error: query.error_notice(),
        success: query.success_notice(),
    })
}

/// Add one of an account to the cart.
#[instrument(skip(state, user))]
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    match CartRepository::new(state.pool())
        .add(user.id, form.account_id)
        .await
    {
        Ok(()) => Ok(Redirect::to("/cart?success=added").into_response()),
        Err(RepositoryError::NotFound) => {
            Ok(Redirect::to("/cart?error=not_found").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Set a line's quantity.
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response, AppError> {
    let update = QuantityUpdate::from_requested(form.quantity);
    match CartRepository::new(state.pool())
        .set_quantity(user.id, form.item_id, update)
        .await
    {
        Ok(()) => Ok(Redirect::to("/cart").into_response()),
        Err(RepositoryError::NotFound) => {
            Ok(Redirect::to("/cart?error=not_found").into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove a line.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response, AppError> {
    match CartRepository::new(state.pool())
        .remove(user.id, form.item_id)
        .await
    {
        Ok(()) | Err(RepositoryError::NotFound) => Ok(Redirect::to("/cart").into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Get cart item count (badge fragment).
///
/// Anonymous visitors always see zero.
pub async fn count(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    let count = match user {
        Some(user) => CartRepository::new(state.pool()).count(user.id).await?,
        None => 0,
    };
    Ok(CartCountTemplate { count })
}
