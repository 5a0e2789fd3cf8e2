//! Catalog account repository.
//!
//! Accounts and their skins are stored in two tables; skins keep their
//! display order in a `position` column and are replaced wholesale on update.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use gamehub_core::account::{Account, AccountDraft, Skin};
use gamehub_core::{AccountId, GameTag, Price, Rarity};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: AccountId,
    title: String,
    game: GameTag,
    price: Price,
    bundle: Option<String>,
    image_url: Option<String>,
    featured: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct SkinRow {
    account_id: AccountId,
    name: String,
    rarity: Option<String>,
}

impl From<SkinRow> for Skin {
    fn from(row: SkinRow) -> Self {
        Self {
            name: row.name,
            rarity: row.rarity.as_deref().and_then(Rarity::parse),
        }
    }
}

impl AccountRow {
    fn into_account(self, skins: Vec<Skin>) -> Account {
        Account {
            id: self.id,
            title: self.title,
            game: self.game,
            price: self.price,
            bundle: self.bundle,
            image_url: self.image_url,
            featured: self.featured,
            skins,
            created_at: self.created_at,
        }
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, title, game, price, bundle, image_url, featured, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog accounts.
pub struct AccountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AccountRepository<'a> {
    /// Create a new account repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every account for one game, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_game(&self, game: &GameTag) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM storefront.accounts \
             WHERE game = $1 ORDER BY created_at, id"
        ))
        .bind(game)
        .fetch_all(self.pool)
        .await?;

        self.attach_skins(rows).await
    }

    /// List every account, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM storefront.accounts \
             ORDER BY created_at DESC, id"
        ))
        .fetch_all(self.pool)
        .await?;

        self.attach_skins(rows).await
    }

    /// Get an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM storefront.accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_skins(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Create an account and its skins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the game does not exist.
    pub async fn create(&self, draft: &AccountDraft) -> Result<AccountId, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id = insert_account(&mut tx, draft).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Replace an account's fields and skins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    /// Returns `RepositoryError::Conflict` if the game does not exist.
    pub async fn update(&self, id: AccountId, draft: &AccountDraft) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r"
            UPDATE storefront.accounts
            SET title = $2, game = $3, price = $4, bundle = $5, image_url = $6,
                featured = $7, updated_at = now()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&draft.title)
        .bind(&draft.game)
        .bind(draft.price)
        .bind(draft.bundle.as_deref())
        .bind(draft.image_url.as_deref())
        .bind(draft.featured)
        .execute(&mut *tx)
        .await
        .map_err(|e| super::conflict_or_database(e, "unknown game"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM storefront.account_skins WHERE account_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_skins(&mut tx, id, &draft.skins).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete an account. Cart lines referencing it go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account does not exist.
    pub async fn delete(&self, id: AccountId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.accounts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn attach_skins(&self, rows: Vec<AccountRow>) -> Result<Vec<Account>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<uuid::Uuid> = rows.iter().map(|r| r.id.as_uuid()).collect();
        let skin_rows = sqlx::query_as::<_, SkinRow>(
            r"
            SELECT account_id, name, rarity
            FROM storefront.account_skins
            WHERE account_id = ANY($1)
            ORDER BY account_id, position
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut skins: HashMap<AccountId, Vec<Skin>> = HashMap::new();
        for row in skin_rows {
            skins.entry(row.account_id).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let account_skins = skins.remove(&row.id).unwrap_or_default();
                row.into_account(account_skins)
            })
            .collect())
    }
}

/// Insert an account and its skins on an open connection.
///
/// Used directly by sell-request approval so the listing is created in the
/// same transaction as the status change.
pub(crate) async fn insert_account(
    conn: &mut PgConnection,
    draft: &AccountDraft,
) -> Result<AccountId, RepositoryError> {
    let id = AccountId::generate();
    sqlx::query(
        r"
        INSERT INTO storefront.accounts (id, title, game, price, bundle, image_url, featured)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ",
    )
    .bind(id)
    .bind(&draft.title)
    .bind(&draft.game)
    .bind(draft.price)
    .bind(draft.bundle.as_deref())
    .bind(draft.image_url.as_deref())
    .bind(draft.featured)
    .execute(&mut *conn)
    .await
    .map_err(|e| super::conflict_or_database(e, "unknown game"))?;

    insert_skins(conn, id, &draft.skins).await?;
    Ok(id)
}

async fn insert_skins(
    conn: &mut PgConnection,
    account_id: AccountId,
    skins: &[Skin],
) -> Result<(), RepositoryError> {
    for (position, skin) in (0_i32..).zip(skins) {
        sqlx::query(
            r"
            INSERT INTO storefront.account_skins (account_id, name, rarity, position)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(account_id)
        .bind(&skin.name)
        .bind(skin.rarity.map(|r| r.as_str()))
        .bind(position)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skin_row_folds_rarity() {
        let row = SkinRow {
            account_id: AccountId::generate(),
            name: "Prime Vandal".to_string(),
            rarity: Some("Legendary".to_string()),
        };
        let skin: Skin = row.into();
        assert_eq!(skin.rarity, Some(Rarity::Legendary));

        let row = SkinRow {
            account_id: AccountId::generate(),
            name: "Mystery".to_string(),
            rarity: Some("mythic".to_string()),
        };
        assert_eq!(Skin::from(row).effective_rarity(), Rarity::Common);
    }
}
