//! Review queue route handlers.
//!
//! Checkers and admins see pending sell requests with passwords masked.
//! Plaintext is only shown after an explicit reveal, which is logged.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::ExposeSecret;
use tracing::instrument;

use gamehub_core::review::ApprovalForm;
use gamehub_core::{SellRequestId, VerificationMethod};

use crate::db::SellRequestRepository;
use crate::db::sell_requests::PendingSellRequest;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireReviewer;
use crate::routes::{MessageQuery, Nav};
use crate::services::{SellRequestService, SellRequestServiceError};
use crate::state::AppState;

/// Placeholder shown instead of a stored password.
const MASKED_PASSWORD: &str = "••••••••";

// =============================================================================
// View Types
// =============================================================================

/// A pending request as shown in the queue.
#[derive(Clone)]
pub struct PendingView {
    pub id: String,
    pub title: String,
    pub game: String,
    pub price: String,
    pub amount_of_skins: u32,
    pub skin_names: Vec<String>,
    pub submitter: String,
    pub submitted_at: String,
    pub game_username: String,
    pub masked_password: &'static str,
    pub verification: &'static str,
    pub verification_email: Option<String>,
    pub seller_discord: Option<String>,
    /// Approval needs the reviewer's Discord handle.
    pub needs_reviewer_discord: bool,
}

impl From<&PendingSellRequest> for PendingView {
    fn from(pending: &PendingSellRequest) -> Self {
        let request = &pending.request;
        Self {
            id: request.id.to_string(),
            title: request.title.clone(),
            game: request.game.to_string(),
            price: request.price.display(),
            amount_of_skins: request.amount_of_skins,
            skin_names: request.skin_names.clone(),
            submitter: pending.submitter.to_string(),
            submitted_at: request.created_at.format("%Y-%m-%d %H:%M").to_string(),
            game_username: request.game_username.clone(),
            masked_password: MASKED_PASSWORD,
            verification: request.verification.as_str(),
            verification_email: request.verification_email.as_ref().map(ToString::to_string),
            seller_discord: request.seller_discord.clone(),
            needs_reviewer_discord: request.verification == VerificationMethod::Discord,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Review queue template.
#[derive(Template, WebTemplate)]
#[template(path = "checker.html")]
pub struct CheckerTemplate {
    pub nav: Nav,
    pub requests: Vec<PendingView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Revealed credentials template.
#[derive(Template, WebTemplate)]
#[template(path = "checker_reveal.html")]
pub struct RevealTemplate {
    pub nav: Nav,
    pub id: String,
    pub title: String,
    pub game_username: String,
    pub game_password: String,
    pub verification_password: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display pending requests, newest first.
#[instrument(skip(state, reviewer))]
pub async fn index(
    State(state): State<AppState>,
    reviewer: RequireReviewer,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pending = SellRequestRepository::new(state.pool())
        .list_pending()
        .await?;
    let nav = Nav::load(&state, Some(&reviewer.user)).await?;

    Ok(CheckerTemplate {
        nav,
        requests: pending.iter().map(PendingView::from).collect(),
        error: query.error_notice(),
        success: query.success_notice(),
    })
}

/// Approve a request and list it.
#[instrument(skip(state, reviewer, form))]
pub async fn approve(
    State(state): State<AppState>,
    reviewer: RequireReviewer,
    Path(id): Path<SellRequestId>,
    Form(form): Form<ApprovalForm>,
) -> Result<Response, AppError> {
    let result = SellRequestService::new(state.pool(), state.cipher())
        .approve(id, reviewer.user.id, &form)
        .await
        .map(|_| ());
    outcome(result, "approved")
}

/// Deny a request.
#[instrument(skip(state, reviewer))]
pub async fn deny(
    State(state): State<AppState>,
    reviewer: RequireReviewer,
    Path(id): Path<SellRequestId>,
) -> Result<Response, AppError> {
    let result = SellRequestService::new(state.pool(), state.cipher())
        .deny(id, reviewer.user.id)
        .await;
    outcome(result, "denied")
}

fn outcome(
    result: Result<(), SellRequestServiceError>,
    success: &str,
) -> Result<Response, AppError> {
    match result {
        Ok(()) => Ok(Redirect::to(&format!("/checker?success={success}")).into_response()),
        Err(e) => match e.notice_code() {
            Some(code) => Ok(Redirect::to(&format!("/checker?error={code}")).into_response()),
            None => Err(e.into()),
        },
    }
}

/// Show a pending request's decrypted passwords.
///
/// The page is marked `no-store` so the plaintext is not cached.
#[instrument(skip(state, reviewer))]
pub async fn reveal(
    State(state): State<AppState>,
    reviewer: RequireReviewer,
    Path(id): Path<SellRequestId>,
) -> Result<Response, AppError> {
    let service = SellRequestService::new(state.pool(), state.cipher());
    let revealed = match service.reveal(id, reviewer.user.id).await {
        Ok(revealed) => revealed,
        Err(SellRequestServiceError::NotFound) => {
            return Ok(Redirect::to("/checker?error=not_found").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let title = SellRequestRepository::new(state.pool())
        .get(id)
        .await?
        .map(|request| request.title)
        .unwrap_or_default();
    let nav = Nav::load(&state, Some(&reviewer.user)).await?;

    let page = RevealTemplate {
        nav,
        id: id.to_string(),
        title,
        game_username: revealed.game_username,
        game_password: revealed.game_password.expose_secret().to_string(),
        verification_password: revealed
            .verification_password
            .as_ref()
            .map(|p| p.expose_secret().to_string()),
    };

    Ok(([(header::CACHE_CONTROL, "no-store")], page).into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use gamehub_core::sell_request::SellRequest;
    use gamehub_core::{Email, GameTag, Price, SellRequestStatus, UserId};

    use super::*;

    #[test]
    fn test_pending_view_masks_password() {
        let pending = PendingSellRequest {
            request: SellRequest {
                id: SellRequestId::generate(),
                user_id: UserId::generate(),
                title: "OG Minecraft".to_string(),
                game: GameTag::parse("minecraft").unwrap(),
                price: Price::from_dollars(89),
                amount_of_skins: 1,
                skin_names: vec!["Migrator Cape".to_string()],
                game_username: "notch_fan".to_string(),
                verification: VerificationMethod::Credentials,
                verification_email: Some(Email::parse("seller@example.com").unwrap()),
                seller_discord: None,
                reviewer_discord: None,
                friend_request_sent: false,
                status: SellRequestStatus::Pending,
                checker_id: None,
                checked_at: None,
                listed_account_id: None,
                created_at: Utc::now(),
            },
            submitter: Email::parse("seller@example.com").unwrap(),
        };

        let view = PendingView::from(&pending);
        assert_eq!(view.masked_password, MASKED_PASSWORD);
        assert_eq!(view.verification, "credentials");
        assert!(!view.needs_reviewer_discord);
        assert_eq!(view.verification_email.as_deref(), Some("seller@example.com"));
    }
}
