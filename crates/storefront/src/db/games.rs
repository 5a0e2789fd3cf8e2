//! Game repository.
//!
//! Games drive the navigation tabs and decide which verification a seller
//! must provide.

use sqlx::PgPool;

use gamehub_core::{Game, GameTag, VerificationMethod};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct GameRow {
    slug: GameTag,
    name: String,
    verification_method: VerificationMethod,
    sort_order: i32,
}

impl From<GameRow> for Game {
    fn from(row: GameRow) -> Self {
        Self {
            tag: row.slug,
            name: row.name,
            verification: row.verification_method,
            sort_order: row.sort_order,
        }
    }
}

/// Repository for games.
pub struct GameRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GameRepository<'a> {
    /// Create a new game repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List games in navigation order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Game>, RepositoryError> {
        let rows = sqlx::query_as::<_, GameRow>(
            r"
            SELECT slug, name, verification_method, sort_order
            FROM storefront.games
            ORDER BY sort_order, name
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Game::from).collect())
    }

    /// Get a game by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, tag: &GameTag) -> Result<Option<Game>, RepositoryError> {
        let row = sqlx::query_as::<_, GameRow>(
            r"
            SELECT slug, name, verification_method, sort_order
            FROM storefront.games
            WHERE slug = $1
            ",
        )
        .bind(tag)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Game::from))
    }

    /// Create a game.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is already taken.
    pub async fn create(&self, game: &Game) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.games (slug, name, verification_method, sort_order)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(&game.tag)
        .bind(&game.name)
        .bind(game.verification)
        .bind(game.sort_order)
        .execute(self.pool)
        .await
        .map_err(|e| super::conflict_or_database(e, "game already exists"))?;

        Ok(())
    }

    /// Update a game, possibly renaming its slug.
    ///
    /// Accounts and sell requests follow a slug rename through
    /// `ON UPDATE CASCADE`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no game has slug `tag`.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    pub async fn update(&self, tag: &GameTag, game: &Game) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.games
            SET slug = $2, name = $3, verification_method = $4, sort_order = $5
            WHERE slug = $1
            ",
        )
        .bind(tag)
        .bind(&game.tag)
        .bind(&game.name)
        .bind(game.verification)
        .bind(game.sort_order)
        .execute(self.pool)
        .await
        .map_err(|e| super::conflict_or_database(e, "game already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a game.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the game does not exist.
    /// Returns `RepositoryError::Conflict` if accounts or sell requests still
    /// reference it.
    pub async fn delete(&self, tag: &GameTag) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.games WHERE slug = $1")
            .bind(tag)
            .execute(self.pool)
            .await
            .map_err(|e| super::conflict_or_database(e, "game still has listings"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
