//! Cart repository.
//!
//! One row per (user, account); adding an account already in the cart bumps
//! its quantity instead of inserting a second line.

use sqlx::{PgConnection, PgPool};

use gamehub_core::cart::{Cart, CartLine, MAX_QUANTITY, QuantityUpdate};
use gamehub_core::{AccountId, CartItemId, GameTag, Price, UserId};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    id: CartItemId,
    account_id: AccountId,
    title: String,
    game: GameTag,
    image_url: Option<String>,
    unit_price: Price,
    quantity: i32,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            account_id: row.account_id,
            title: row.title,
            game: row.game,
            image_url: row.image_url,
            unit_price: row.unit_price,
            quantity: super::to_u32(row.quantity, "quantity")?,
        })
    }
}

/// Repository for per-user carts.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's cart, oldest line first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        load_cart(&mut conn, user_id).await
    }

    /// Add one of an account to the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    pub async fn add(&self, user_id: UserId, account_id: AccountId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.cart_items (user_id, account_id, quantity)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, account_id)
            DO UPDATE SET quantity = LEAST(storefront.cart_items.quantity + 1, $3)
            ",
        )
        .bind(user_id)
        .bind(account_id)
        .bind(max_quantity())
        .execute(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(())
    }

    /// Apply a quantity change to one of the user's lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in this user's cart.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        item_id: CartItemId,
        update: QuantityUpdate,
    ) -> Result<(), RepositoryError> {
        let quantity = match update {
            QuantityUpdate::Remove => return self.remove(user_id, item_id).await,
            QuantityUpdate::Set(quantity) => i32::try_from(quantity).unwrap_or(max_quantity()),
        };

        let result = sqlx::query(
            r"
            UPDATE storefront.cart_items
            SET quantity = $3
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(item_id)
        .bind(user_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in this user's cart.
    pub async fn remove(&self, user_id: UserId, item_id: CartItemId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM storefront.cart_items WHERE id = $1 AND user_id = $2")
                .bind(item_id)
                .bind(user_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Total item count for the navigation badge.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, user_id: UserId) -> Result<u32, RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM storefront.cart_items WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        u32::try_from(total)
            .map_err(|_| RepositoryError::DataCorruption(format!("cart count out of range: {total}")))
    }
}

/// Load a cart on an open connection, so checkout can read it inside its
/// transaction.
pub(crate) async fn load_cart(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Cart, RepositoryError> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        r"
        SELECT c.id, c.account_id, a.title, a.game, a.image_url,
               a.price AS unit_price, c.quantity
        FROM storefront.cart_items c
        JOIN storefront.accounts a ON a.id = c.account_id
        WHERE c.user_id = $1
        ORDER BY c.created_at, c.id
        ",
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;

    let lines = rows
        .into_iter()
        .map(CartLine::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Cart::new(lines))
}

fn max_quantity() -> i32 {
    i32::try_from(MAX_QUANTITY).unwrap_or(i32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_quantity_is_corruption() {
        let row = CartLineRow {
            id: CartItemId::generate(),
            account_id: AccountId::generate(),
            title: "OG Minecraft Account".to_string(),
            game: GameTag::parse("minecraft").unwrap(),
            image_url: None,
            unit_price: Price::from_dollars(89),
            quantity: -2,
        };
        assert!(matches!(
            CartLine::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn test_max_quantity_fits() {
        assert_eq!(max_quantity(), 99);
    }
}
