//! Order repository.
//!
//! Checkout snapshots the cart into an order and clears the cart in one
//! transaction.

use sqlx::PgPool;

use gamehub_core::{OrderId, UserId};

use super::RepositoryError;
use super::cart::load_cart;

/// Repository for completed orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Turn the user's cart into an order.
    ///
    /// Returns `None` when the cart is empty; nothing is written in that case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; the
    /// transaction is rolled back and the cart is left untouched.
    pub async fn place_order(&self, user_id: UserId) -> Result<Option<OrderId>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let cart = load_cart(&mut tx, user_id).await?;
        if cart.is_empty() {
            return Ok(None);
        }

        let order_id = OrderId::generate();
        sqlx::query("INSERT INTO storefront.orders (id, user_id, total) VALUES ($1, $2, $3)")
            .bind(order_id)
            .bind(user_id)
            .bind(cart.total())
            .execute(&mut *tx)
            .await?;

        for line in &cart.lines {
            let quantity = i32::try_from(line.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!("quantity out of range: {}", line.quantity))
            })?;
            sqlx::query(
                r"
                INSERT INTO storefront.order_lines (order_id, account_id, title, unit_price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(order_id)
            .bind(line.account_id)
            .bind(&line.title)
            .bind(line.unit_price)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM storefront.cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(order_id))
    }
}
