//! Seller submission and reviewer workflow.
//!
//! Ties validation from `gamehub_core` to the repository and the credential
//! cipher. Every transition is logged with the acting user.

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use gamehub_core::review::{ApprovalForm, ReviewDecision, ReviewError, listing_for, prepare_approval};
use gamehub_core::sell_request::{SellRequestError, SellRequestForm, Verification};
use gamehub_core::{AccountId, SellRequestId, UserId};

use crate::db::sell_requests::SealedSecrets;
use crate::db::{GameRepository, RepositoryError, SellRequestRepository};
use crate::services::credentials::{CredentialCipher, CredentialError};

/// Errors from the sell-request workflow.
#[derive(Debug, Error)]
pub enum SellRequestServiceError {
    #[error(transparent)]
    Invalid(#[from] SellRequestError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error("sell request not found")]
    NotFound,
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl SellRequestServiceError {
    /// Short code used in redirect notices, for user-facing failures.
    #[must_use]
    pub const fn notice_code(&self) -> Option<&'static str> {
        match self {
            Self::Invalid(e) => Some(e.code()),
            Self::Review(e) => Some(e.code()),
            Self::NotFound => Some("not_found"),
            Self::Credential(_) | Self::Repository(_) => None,
        }
    }
}

/// Plaintext credentials shown to a reviewer on request.
#[derive(Debug)]
pub struct RevealedCredentials {
    pub game_username: String,
    pub game_password: SecretString,
    pub verification_password: Option<SecretString>,
}

/// Sell-request workflow service.
pub struct SellRequestService<'a> {
    pool: &'a PgPool,
    cipher: &'a CredentialCipher,
}

impl<'a> SellRequestService<'a> {
    /// Create a new sell-request service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, cipher: &'a CredentialCipher) -> Self {
        Self { pool, cipher }
    }

    /// Validate and store a seller's submission.
    ///
    /// # Errors
    ///
    /// Returns `SellRequestServiceError::Invalid` with the first validation
    /// failure; nothing is written in that case.
    #[instrument(skip(self, form), fields(game = %form.game))]
    pub async fn submit(
        &self,
        user_id: UserId,
        form: &SellRequestForm,
    ) -> Result<SellRequestId, SellRequestServiceError> {
        let games = GameRepository::new(self.pool).list().await?;
        let request = form.validate(&games)?;

        let verification_password = match &request.verification {
            Verification::Credentials { password, .. } => Some(self.cipher.seal(password)?),
            Verification::None | Verification::Discord { .. } => None,
        };
        let sealed = SealedSecrets {
            game_password: self.cipher.seal(&request.credentials.password)?,
            verification_password,
        };

        let id = SellRequestRepository::new(self.pool)
            .create(user_id, &request, &sealed)
            .await?;

        info!(sell_request_id = %id, user_id = %user_id, "Sell request submitted");
        Ok(id)
    }

    /// Approve a pending request and list it in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `SellRequestServiceError::NotFound` if the request does not
    /// exist, `Review(AlreadyReviewed)` if another reviewer got there first,
    /// or `Review(MissingReviewerHandle)` for Discord requests without a handle.
    #[instrument(skip(self, form))]
    pub async fn approve(
        &self,
        id: SellRequestId,
        reviewer_id: UserId,
        form: &ApprovalForm,
    ) -> Result<AccountId, SellRequestServiceError> {
        let repo = SellRequestRepository::new(self.pool);
        let request = repo.get(id).await?.ok_or(SellRequestServiceError::NotFound)?;

        let approval = prepare_approval(&request, reviewer_id, form)?;
        let listing = listing_for(&request);

        let Some(account_id) = repo.approve(id, &approval, &listing).await? else {
            warn!(sell_request_id = %id, "Sell request was reviewed concurrently");
            return Err(ReviewError::AlreadyReviewed.into());
        };

        log_decision(ReviewDecision::Approve, id, reviewer_id);
        Ok(account_id)
    }

    /// Deny a pending request, removing it.
    ///
    /// # Errors
    ///
    /// Returns `Review(AlreadyReviewed)` if the request is missing or no
    /// longer pending.
    #[instrument(skip(self))]
    pub async fn deny(
        &self,
        id: SellRequestId,
        reviewer_id: UserId,
    ) -> Result<(), SellRequestServiceError> {
        if !SellRequestRepository::new(self.pool).deny(id).await? {
            return Err(ReviewError::AlreadyReviewed.into());
        }

        log_decision(ReviewDecision::Deny, id, reviewer_id);
        Ok(())
    }

    /// Decrypt a pending request's passwords for a reviewer.
    ///
    /// Every reveal is logged with the reviewer's ID.
    ///
    /// # Errors
    ///
    /// Returns `SellRequestServiceError::NotFound` if the request is missing
    /// or already reviewed.
    #[instrument(skip(self))]
    pub async fn reveal(
        &self,
        id: SellRequestId,
        reviewer_id: UserId,
    ) -> Result<RevealedCredentials, SellRequestServiceError> {
        let repo = SellRequestRepository::new(self.pool);
        let request = repo.get(id).await?.ok_or(SellRequestServiceError::NotFound)?;
        let sealed = repo
            .get_sealed(id)
            .await?
            .ok_or(SellRequestServiceError::NotFound)?;

        let revealed = RevealedCredentials {
            game_username: request.game_username,
            game_password: self.cipher.open(&sealed.game_password)?,
            verification_password: sealed
                .verification_password
                .as_deref()
                .map(|value| self.cipher.open(value))
                .transpose()?,
        };

        info!(
            sell_request_id = %id,
            reviewer_id = %reviewer_id,
            "Sell request credentials revealed"
        );
        Ok(revealed)
    }
}

fn log_decision(decision: ReviewDecision, id: SellRequestId, reviewer_id: UserId) {
    info!(
        sell_request_id = %id,
        reviewer_id = %reviewer_id,
        decision = ?decision,
        "Sell request reviewed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_codes() {
        let err = SellRequestServiceError::from(SellRequestError::SkinCountMismatch);
        assert_eq!(err.notice_code(), Some("skin_count_mismatch"));

        let err = SellRequestServiceError::from(ReviewError::AlreadyReviewed);
        assert_eq!(err.notice_code(), Some("already_reviewed"));

        let err = SellRequestServiceError::from(CredentialError::Decrypt);
        assert_eq!(err.notice_code(), None);
    }
}
