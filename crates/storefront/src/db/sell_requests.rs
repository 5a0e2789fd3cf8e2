//! Sell-request repository.
//!
//! Passwords arrive already sealed by the credential cipher; this module only
//! stores and returns the ciphertext strings. Review transitions are guarded
//! on `status = 'pending'` so two reviewers racing on one request cannot
//! both win.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gamehub_core::account::AccountDraft;
use gamehub_core::review::Approval;
use gamehub_core::sell_request::{NewSellRequest, SellRequest, Verification};
use gamehub_core::{
    AccountId, Email, GameTag, Price, SellRequestId, SellRequestStatus, UserId, VerificationMethod,
};

use super::RepositoryError;
use super::accounts::insert_account;

/// Ciphertexts stored alongside a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecrets {
    pub game_password: String,
    pub verification_password: Option<String>,
}

/// A pending request together with who submitted it.
#[derive(Debug, Clone)]
pub struct PendingSellRequest {
    pub request: SellRequest,
    pub submitter: Email,
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SellRequestRow {
    id: SellRequestId,
    user_id: UserId,
    title: String,
    game: GameTag,
    price: Price,
    amount_of_skins: i32,
    skin_names: Vec<String>,
    game_username: String,
    verification_kind: VerificationMethod,
    verification_email: Option<Email>,
    seller_discord: Option<String>,
    reviewer_discord: Option<String>,
    friend_request_sent: bool,
    status: SellRequestStatus,
    checker_id: Option<UserId>,
    checked_at: Option<DateTime<Utc>>,
    listed_account_id: Option<AccountId>,
    created_at: DateTime<Utc>,
}

impl TryFrom<SellRequestRow> for SellRequest {
    type Error = RepositoryError;

    fn try_from(row: SellRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            game: row.game,
            price: row.price,
            amount_of_skins: super::to_u32(row.amount_of_skins, "amount_of_skins")?,
            skin_names: row.skin_names,
            game_username: row.game_username,
            verification: row.verification_kind,
            verification_email: row.verification_email,
            seller_discord: row.seller_discord,
            reviewer_discord: row.reviewer_discord,
            friend_request_sent: row.friend_request_sent,
            status: row.status,
            checker_id: row.checker_id,
            checked_at: row.checked_at,
            listed_account_id: row.listed_account_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PendingRow {
    #[sqlx(flatten)]
    request: SellRequestRow,
    submitter: Email,
}

#[derive(Debug, sqlx::FromRow)]
struct SealedRow {
    game_password_enc: String,
    verification_password_enc: Option<String>,
}

const SELL_REQUEST_COLUMNS: &str = "s.id, s.user_id, s.title, s.game, s.price, \
     s.amount_of_skins, s.skin_names, s.game_username, s.verification_kind, \
     s.verification_email, s.seller_discord, s.reviewer_discord, \
     s.friend_request_sent, s.status, s.checker_id, s.checked_at, \
     s.listed_account_id, s.created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for seller submissions.
pub struct SellRequestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SellRequestRepository<'a> {
    /// Create a new sell-request repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a validated request as pending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the game disappeared since
    /// validation.
    pub async fn create(
        &self,
        user_id: UserId,
        request: &NewSellRequest,
        sealed: &SealedSecrets,
    ) -> Result<SellRequestId, RepositoryError> {
        let amount_of_skins = i32::try_from(request.amount_of_skins).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "skin count out of range: {}",
                request.amount_of_skins
            ))
        })?;

        let (verification_email, seller_discord) = match &request.verification {
            Verification::None => (None, None),
            Verification::Credentials { email, .. } => (Some(email), None),
            Verification::Discord { seller_handle } => (None, Some(seller_handle.as_str())),
        };

        let id = SellRequestId::generate();
        sqlx::query(
            r"
            INSERT INTO storefront.sell_requests (
                id, user_id, title, game, price, amount_of_skins, skin_names,
                game_username, game_password_enc, verification_kind,
                verification_email, verification_password_enc, seller_discord
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(&request.title)
        .bind(&request.game)
        .bind(request.price)
        .bind(amount_of_skins)
        .bind(&request.skin_names)
        .bind(&request.credentials.username)
        .bind(&sealed.game_password)
        .bind(request.verification.method())
        .bind(verification_email)
        .bind(sealed.verification_password.as_deref())
        .bind(seller_discord)
        .execute(self.pool)
        .await
        .map_err(|e| super::conflict_or_database(e, "unknown game"))?;

        Ok(id)
    }

    /// Pending requests, newest first, with the submitter's email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_pending(&self) -> Result<Vec<PendingSellRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, PendingRow>(&format!(
            "SELECT {SELL_REQUEST_COLUMNS}, u.email AS submitter \
             FROM storefront.sell_requests s \
             JOIN storefront.users u ON u.id = s.user_id \
             WHERE s.status = 'pending' \
             ORDER BY s.created_at DESC, s.id"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(PendingSellRequest {
                    request: SellRequest::try_from(row.request)?,
                    submitter: row.submitter,
                })
            })
            .collect()
    }

    /// A seller's own requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<SellRequest>, RepositoryError> {
        let rows = sqlx::query_as::<_, SellRequestRow>(&format!(
            "SELECT {SELL_REQUEST_COLUMNS} FROM storefront.sell_requests s \
             WHERE s.user_id = $1 \
             ORDER BY s.created_at DESC, s.id"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(SellRequest::try_from).collect()
    }

    /// Get a request by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: SellRequestId) -> Result<Option<SellRequest>, RepositoryError> {
        let row = sqlx::query_as::<_, SellRequestRow>(&format!(
            "SELECT {SELL_REQUEST_COLUMNS} FROM storefront.sell_requests s WHERE s.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(SellRequest::try_from).transpose()
    }

    /// Ciphertexts for a pending request.
    ///
    /// Reviewed requests return `None`; their secrets are no longer needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_sealed(
        &self,
        id: SellRequestId,
    ) -> Result<Option<SealedSecrets>, RepositoryError> {
        let row = sqlx::query_as::<_, SealedRow>(
            r"
            SELECT game_password_enc, verification_password_enc
            FROM storefront.sell_requests
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| SealedSecrets {
            game_password: r.game_password_enc,
            verification_password: r.verification_password_enc,
        }))
    }

    /// Approve a pending request and create its catalog listing.
    ///
    /// Both writes happen in one transaction. Returns `None` if the request
    /// was no longer pending, in which case nothing is written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn approve(
        &self,
        id: SellRequestId,
        approval: &Approval,
        listing: &AccountDraft,
    ) -> Result<Option<AccountId>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let account_id = insert_account(&mut tx, listing).await?;

        let result = sqlx::query(
            r"
            UPDATE storefront.sell_requests
            SET status = 'approved',
                checker_id = $2,
                checked_at = now(),
                reviewer_discord = $3,
                friend_request_sent = $4,
                listed_account_id = $5
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(id)
        .bind(approval.reviewer_id)
        .bind(approval.reviewer_discord.as_deref())
        .bind(approval.friend_request_sent)
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(account_id))
    }

    /// Deny a pending request by deleting it.
    ///
    /// Returns `false` if the request was already reviewed or never existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn deny(&self, id: SellRequestId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM storefront.sell_requests WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
