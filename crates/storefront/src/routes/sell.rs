//! Sell route handlers.
//!
//! Signed-in users propose accounts for the catalog. Requests wait in the
//! review queue; once a reviewer sends a Discord friend request the seller
//! sees a notice on their requests page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tracing::instrument;

use gamehub_core::sell_request::{SellRequest, SellRequestForm};
use gamehub_core::{Game, VerificationMethod};

use crate::db::{GameRepository, SellRequestRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::routes::{MessageQuery, Nav, notice_for};
use crate::services::{SellRequestService, SellRequestServiceError};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// A game option on the sell form, with the verification it needs.
#[derive(Clone)]
pub struct SellGameView {
    pub slug: String,
    pub name: String,
    /// Lower-case verification method, `none`, `credentials` or `discord`.
    pub verification: &'static str,
    pub selected: bool,
}

fn game_views(games: &[Game], selected: &str) -> Vec<SellGameView> {
    let selected = selected.trim().to_ascii_lowercase();
    games
        .iter()
        .map(|game| SellGameView {
            slug: game.tag.to_string(),
            name: game.name.clone(),
            verification: game.verification.as_str(),
            selected: game.tag.as_str() == selected,
        })
        .collect()
}

/// Values echoed back into the sell form after a rejected submission.
///
/// Passwords are never echoed.
#[derive(Clone, Default)]
pub struct SellFormView {
    pub title: String,
    pub game: String,
    pub price: String,
    pub amount_of_skins: String,
    pub skin_names: String,
    pub game_username: String,
    pub verification_email: String,
    pub seller_discord: String,
}

impl From<&SellRequestForm> for SellFormView {
    fn from(form: &SellRequestForm) -> Self {
        Self {
            title: form.title.clone(),
            game: form.game.clone(),
            price: form.price.clone(),
            amount_of_skins: form.amount_of_skins.clone(),
            skin_names: form.skin_names.clone(),
            game_username: form.game_username.clone(),
            verification_email: form.verification_email.clone(),
            seller_discord: form.seller_discord.clone(),
        }
    }
}

/// A row on the seller's own requests page.
#[derive(Clone)]
pub struct MyRequestView {
    pub title: String,
    pub game: String,
    pub price: String,
    pub amount_of_skins: u32,
    pub status: &'static str,
    pub created_at: String,
    pub notice: Option<String>,
}

impl From<&SellRequest> for MyRequestView {
    fn from(request: &SellRequest) -> Self {
        Self {
            title: request.title.clone(),
            game: request.game.to_string(),
            price: request.price.display(),
            amount_of_skins: request.amount_of_skins,
            status: request.status.as_str(),
            created_at: request.created_at.format("%Y-%m-%d %H:%M").to_string(),
            notice: request.friend_request_notice(),
        }
    }
}

/// A friend-request notice as returned by the JSON endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NoticeResponse {
    pub request_id: String,
    pub title: String,
    pub message: String,
}

fn notices_for(requests: &[SellRequest]) -> Vec<NoticeResponse> {
    requests
        .iter()
        .filter_map(|request| {
            request.friend_request_notice().map(|message| NoticeResponse {
                request_id: request.id.to_string(),
                title: request.title.clone(),
                message,
            })
        })
        .collect()
}

// =============================================================================
// Templates
// =============================================================================

/// Sell form template.
#[derive(Template, WebTemplate)]
#[template(path = "sell.html")]
pub struct SellTemplate {
    pub nav: Nav,
    pub games: Vec<SellGameView>,
    pub credential_games: String,
    pub discord_games: String,
    pub form: SellFormView,
    pub error: Option<String>,
}

/// Seller's own requests template.
#[derive(Template, WebTemplate)]
#[template(path = "sell_requests.html")]
pub struct SellRequestsTemplate {
    pub nav: Nav,
    pub requests: Vec<MyRequestView>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the sell form.
#[instrument(skip(state, user))]
pub async fn form_page(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    sell_page(&state, &user, SellFormView::default(), query.error_notice()).await
}

async fn sell_page(
    state: &AppState,
    user: &CurrentUser,
    form: SellFormView,
    error: Option<String>,
) -> Result<SellTemplate, AppError> {
    let games = GameRepository::new(state.pool()).list().await?;
    let nav = Nav::load(state, Some(user)).await?;

    Ok(SellTemplate {
        nav,
        credential_games: names_needing(&games, VerificationMethod::Credentials),
        discord_games: names_needing(&games, VerificationMethod::Discord),
        games: game_views(&games, &form.game),
        form,
        error,
    })
}

fn names_needing(games: &[Game], method: VerificationMethod) -> String {
    games
        .iter()
        .filter(|game| game.verification == method)
        .map(|game| game.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Handle sell form submission.
///
/// A rejected submission re-renders the form with what the seller typed,
/// minus passwords.
#[instrument(skip(state, user, form))]
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<SellRequestForm>,
) -> Result<Response, AppError> {
    let service = SellRequestService::new(state.pool(), state.cipher());
    match service.submit(user.id, &form).await {
        Ok(_) => Ok(Redirect::to("/sell/requests?success=submitted").into_response()),
        Err(SellRequestServiceError::Invalid(e)) => {
            tracing::debug!(code = e.code(), "Sell request rejected");
            let page = sell_page(
                &state,
                &user,
                SellFormView::from(&form),
                Some(notice_for(e.code())),
            )
            .await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response())
        }
        Err(e) => match e.notice_code() {
            Some(code) => Ok(Redirect::to(&format!("/sell?error={code}")).into_response()),
            None => Err(e.into()),
        },
    }
}

/// Display the seller's own requests.
#[instrument(skip(state, user))]
pub async fn my_requests(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let requests = SellRequestRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    let nav = Nav::load(&state, Some(&user)).await?;

    Ok(SellRequestsTemplate {
        nav,
        requests: requests.iter().map(MyRequestView::from).collect(),
        success: query.success_notice(),
    })
}

/// Friend-request notices for the signed-in seller, as JSON.
#[instrument(skip(state, user))]
pub async fn notices(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<NoticeResponse>>, AppError> {
    let requests = SellRequestRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(notices_for(&requests)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use gamehub_core::{GameTag, Price, SellRequestId, SellRequestStatus, UserId};

    use super::*;

    fn request(reviewer_discord: Option<&str>, friend_request_sent: bool) -> SellRequest {
        SellRequest {
            id: SellRequestId::generate(),
            user_id: UserId::generate(),
            title: "Immortal Account".to_string(),
            game: GameTag::parse("valorant").unwrap(),
            price: Price::from_dollars(150),
            amount_of_skins: 2,
            skin_names: vec!["Prime Vandal".to_string(), "Oni Phantom".to_string()],
            game_username: "seller#1234".to_string(),
            verification: VerificationMethod::Discord,
            verification_email: None,
            seller_discord: Some("seller#1234".to_string()),
            reviewer_discord: reviewer_discord.map(str::to_string),
            friend_request_sent,
            status: if friend_request_sent {
                SellRequestStatus::Approved
            } else {
                SellRequestStatus::Pending
            },
            checker_id: None,
            checked_at: None,
            listed_account_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_notices_only_for_sent_friend_requests() {
        let requests = vec![request(None, false), request(Some("checker#0001"), true)];
        let notices = notices_for(&requests);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "checker#0001 sent you a friend request");
        assert_eq!(notices[0].title, "Immortal Account");
    }

    #[test]
    fn test_rejected_form_keeps_values_but_not_passwords() {
        let form = SellRequestForm {
            title: "Immortal Account".to_string(),
            game: "Valorant".to_string(),
            skin_names: "Prime Vandal\nOni Phantom".to_string(),
            game_password: "hunter2".to_string(),
            verification_password: "mail-pass".to_string(),
            ..SellRequestForm::default()
        };
        let view = SellFormView::from(&form);
        assert_eq!(view.title, "Immortal Account");
        assert_eq!(view.skin_names, "Prime Vandal\nOni Phantom");

        let games = vec![Game {
            tag: GameTag::parse("valorant").unwrap(),
            name: "Valorant".to_string(),
            verification: VerificationMethod::Discord,
            sort_order: 0,
        }];
        let page = SellTemplate {
            nav: Nav::default(),
            games: game_views(&games, &view.game),
            credential_games: String::new(),
            discord_games: names_needing(&games, VerificationMethod::Discord),
            form: view,
            error: Some(notice_for("skin_count_mismatch")),
        };
        assert!(page.games[0].selected);

        let html = page.render().unwrap();
        assert!(html.contains("value=\"Immortal Account\""));
        assert!(html.contains("Prime Vandal"));
        assert!(!html.contains("hunter2"));
        assert!(!html.contains("mail-pass"));
    }

    #[test]
    fn test_my_request_view() {
        let view = MyRequestView::from(&request(None, false));
        assert_eq!(view.status, "pending");
        assert_eq!(view.price, "$150.00");
        assert_eq!(view.notice, None);
    }
}
