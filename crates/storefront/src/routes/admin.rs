//! Admin route handlers.
//!
//! Catalog accounts, games and user roles. Every handler requires the admin
//! role; failures come back to `/admin` as `?error=` notices.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use gamehub_core::account::{Account, AccountForm, format_skin_lines};
use gamehub_core::{AccountId, Game, GameTag, Role, UserId, VerificationMethod};

use crate::db::{AccountRepository, GameRepository, RepositoryError, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::UserWithRole;
use crate::routes::{MessageQuery, Nav, OptionView};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Game create/edit form data.
#[derive(Debug, Default, Deserialize)]
pub struct GameForm {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub verification: String,
    #[serde(default)]
    pub sort_order: String,
}

impl GameForm {
    /// Validate into a [`Game`], or the notice code of the first problem.
    fn into_game(self) -> Result<Game, &'static str> {
        let tag = GameTag::parse(&self.slug).map_err(|_| "invalid_game")?;
        let name = self.name.trim();
        if name.is_empty() {
            return Err("missing_fields");
        }
        let verification = self
            .verification
            .parse::<VerificationMethod>()
            .map_err(|_| "invalid_game")?;
        let sort_order = match self.sort_order.trim() {
            "" => 0,
            value => value.parse::<i32>().map_err(|_| "invalid_game")?,
        };

        Ok(Game {
            tag,
            name: name.to_string(),
            verification,
            sort_order,
        })
    }
}

/// Role change form data.
#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub role: String,
}

// =============================================================================
// View Types
// =============================================================================

/// An account row in the admin table.
#[derive(Clone)]
pub struct AccountRowView {
    pub id: String,
    pub title: String,
    pub game: String,
    pub price: String,
    pub featured: bool,
    pub skin_count: usize,
}

impl From<&Account> for AccountRowView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            title: account.title.clone(),
            game: account.game.to_string(),
            price: account.price.display(),
            featured: account.featured,
            skin_count: account.skin_count(),
        }
    }
}

/// A game row in the admin table.
#[derive(Clone)]
pub struct GameRowView {
    pub slug: String,
    pub name: String,
    pub verification: &'static str,
    pub sort_order: i32,
}

impl From<&Game> for GameRowView {
    fn from(game: &Game) -> Self {
        Self {
            slug: game.tag.to_string(),
            name: game.name.clone(),
            verification: game.verification.as_str(),
            sort_order: game.sort_order,
        }
    }
}

/// A user row with their current role.
#[derive(Clone)]
pub struct UserRowView {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: &'static str,
    pub role_options: Vec<OptionView>,
    pub is_self: bool,
}

impl UserRowView {
    fn new(entry: &UserWithRole, current: UserId) -> Self {
        Self {
            id: entry.user.id.to_string(),
            email: entry.user.email.to_string(),
            display_name: entry.user.display_name.clone().unwrap_or_default(),
            role: entry.role.as_str(),
            role_options: role_options(entry.role),
            is_self: entry.user.id == current,
        }
    }
}

/// Prefilled values for the account form.
#[derive(Clone, Default)]
pub struct AccountFormView {
    pub title: String,
    pub price: String,
    pub bundle: String,
    pub image_url: String,
    pub featured: bool,
    pub skins: String,
}

impl From<&Account> for AccountFormView {
    fn from(account: &Account) -> Self {
        Self {
            title: account.title.clone(),
            price: account.price.amount().to_string(),
            bundle: account.bundle.clone().unwrap_or_default(),
            image_url: account.image_url.clone().unwrap_or_default(),
            featured: account.featured,
            skins: format_skin_lines(&account.skins),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/index.html")]
pub struct AdminIndexTemplate {
    pub nav: Nav,
    pub accounts: Vec<AccountRowView>,
    pub games: Vec<GameRowView>,
    pub users: Vec<UserRowView>,
    pub game_options: Vec<OptionView>,
    pub verification_options: Vec<OptionView>,
    pub new_account: AccountFormView,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Edit account template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/account_form.html")]
pub struct AccountEditTemplate {
    pub nav: Nav,
    pub id: String,
    pub account: AccountFormView,
    pub game_options: Vec<OptionView>,
}

/// Edit game template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/game_form.html")]
pub struct GameEditTemplate {
    pub nav: Nav,
    pub game: GameRowView,
    pub verification_options: Vec<OptionView>,
}

fn role_options(current: Role) -> Vec<OptionView> {
    let tokens: Vec<&str> = Role::ALL.iter().map(Role::as_str).collect();
    OptionView::tokens(&tokens, Some(current.as_str()))
}

fn verification_options(current: Option<VerificationMethod>) -> Vec<OptionView> {
    let tokens: Vec<&str> = VerificationMethod::ALL
        .iter()
        .map(VerificationMethod::as_str)
        .collect();
    OptionView::tokens(&tokens, current.as_ref().map(VerificationMethod::as_str))
}

fn game_options(games: &[Game], selected: &str) -> Vec<OptionView> {
    games
        .iter()
        .map(|game| OptionView {
            value: game.tag.to_string(),
            label: game.name.clone(),
            selected: game.tag.as_str() == selected,
        })
        .collect()
}

fn redirect_with(kind: &str, code: &str) -> Response {
    Redirect::to(&format!("/admin?{kind}={code}")).into_response()
}

// =============================================================================
// Dashboard
// =============================================================================

/// Display the admin dashboard.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let accounts = AccountRepository::new(state.pool()).list_all().await?;
    let games = GameRepository::new(state.pool()).list().await?;
    let users = UserRepository::new(state.pool()).list_with_roles().await?;
    let nav = Nav::load(&state, Some(&admin.user)).await?;

    let default_game = games.first().map(|g| g.tag.to_string()).unwrap_or_default();

    Ok(AdminIndexTemplate {
        nav,
        accounts: accounts.iter().map(AccountRowView::from).collect(),
        game_options: game_options(&games, &default_game),
        new_account: AccountFormView::default(),
        games: games.iter().map(GameRowView::from).collect(),
        users: users
            .iter()
            .map(|entry| UserRowView::new(entry, admin.user.id))
            .collect(),
        verification_options: verification_options(None),
        error: query.error_notice(),
        success: query.success_notice(),
    })
}

// =============================================================================
// Accounts
// =============================================================================

/// Create a catalog account.
#[instrument(skip(state, admin, form))]
pub async fn create_account(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Form(form): Form<AccountForm>,
) -> Result<Response, AppError> {
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(e) => return Ok(redirect_with("error", e.code())),
    };

    match AccountRepository::new(state.pool()).create(&draft).await {
        Ok(id) => {
            tracing::info!(account_id = %id, admin_id = %admin.user.id, "Account created");
            Ok(redirect_with("success", "saved"))
        }
        Err(RepositoryError::Conflict(_)) => Ok(redirect_with("error", "invalid_game")),
        Err(e) => Err(e.into()),
    }
}

/// Display the edit form for an account.
#[instrument(skip(state, admin))]
pub async fn edit_account(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<AccountId>,
) -> Result<impl IntoResponse, AppError> {
    let account = AccountRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("account {id}")))?;
    let games = GameRepository::new(state.pool()).list().await?;
    let nav = Nav::load(&state, Some(&admin.user)).await?;

    Ok(AccountEditTemplate {
        nav,
        id: id.to_string(),
        game_options: game_options(&games, account.game.as_str()),
        account: AccountFormView::from(&account),
    })
}

/// Update an account.
#[instrument(skip(state, admin, form))]
pub async fn update_account(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<AccountId>,
    Form(form): Form<AccountForm>,
) -> Result<Response, AppError> {
    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(e) => return Ok(redirect_with("error", e.code())),
    };

    match AccountRepository::new(state.pool()).update(id, &draft).await {
        Ok(()) => {
            tracing::info!(account_id = %id, admin_id = %admin.user.id, "Account updated");
            Ok(redirect_with("success", "saved"))
        }
        Err(RepositoryError::NotFound) => Ok(redirect_with("error", "not_found")),
        Err(RepositoryError::Conflict(_)) => Ok(redirect_with("error", "invalid_game")),
        Err(e) => Err(e.into()),
    }
}

/// Delete an account.
#[instrument(skip(state, admin))]
pub async fn delete_account(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(id): Path<AccountId>,
) -> Result<Response, AppError> {
    match AccountRepository::new(state.pool()).delete(id).await {
        Ok(()) => {
            tracing::info!(account_id = %id, admin_id = %admin.user.id, "Account deleted");
            Ok(redirect_with("success", "deleted"))
        }
        Err(RepositoryError::NotFound) => Ok(redirect_with("error", "not_found")),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Games
// =============================================================================

/// Create a game.
#[instrument(skip(state, admin, form))]
pub async fn create_game(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Form(form): Form<GameForm>,
) -> Result<Response, AppError> {
    let game = match form.into_game() {
        Ok(game) => game,
        Err(code) => return Ok(redirect_with("error", code)),
    };

    match GameRepository::new(state.pool()).create(&game).await {
        Ok(()) => {
            tracing::info!(game = %game.tag, admin_id = %admin.user.id, "Game created");
            Ok(redirect_with("success", "saved"))
        }
        Err(RepositoryError::Conflict(_)) => Ok(redirect_with("error", "game_exists")),
        Err(e) => Err(e.into()),
    }
}

/// Display the edit form for a game.
#[instrument(skip(state, admin))]
pub async fn edit_game(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(slug): Path<GameTag>,
) -> Result<impl IntoResponse, AppError> {
    let game = GameRepository::new(state.pool())
        .get(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("game {slug}")))?;
    let nav = Nav::load(&state, Some(&admin.user)).await?;

    Ok(GameEditTemplate {
        nav,
        verification_options: verification_options(Some(game.verification)),
        game: GameRowView::from(&game),
    })
}

/// Update a game.
#[instrument(skip(state, admin, form))]
pub async fn update_game(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(slug): Path<GameTag>,
    Form(form): Form<GameForm>,
) -> Result<Response, AppError> {
    let game = match form.into_game() {
        Ok(game) => game,
        Err(code) => return Ok(redirect_with("error", code)),
    };

    match GameRepository::new(state.pool()).update(&slug, &game).await {
        Ok(()) => {
            tracing::info!(game = %slug, admin_id = %admin.user.id, "Game updated");
            Ok(redirect_with("success", "saved"))
        }
        Err(RepositoryError::NotFound) => Ok(redirect_with("error", "not_found")),
        Err(RepositoryError::Conflict(_)) => Ok(redirect_with("error", "game_exists")),
        Err(e) => Err(e.into()),
    }
}

/// Delete a game with no remaining listings.
#[instrument(skip(state, admin))]
pub async fn delete_game(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(slug): Path<GameTag>,
) -> Result<Response, AppError> {
    match GameRepository::new(state.pool()).delete(&slug).await {
        Ok(()) => {
            tracing::info!(game = %slug, admin_id = %admin.user.id, "Game deleted");
            Ok(redirect_with("success", "deleted"))
        }
        Err(RepositoryError::NotFound) => Ok(redirect_with("error", "not_found")),
        Err(RepositoryError::Conflict(_)) => Ok(redirect_with("error", "game_in_use")),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Roles
// =============================================================================

/// Set a user's role.
///
/// Admins cannot change their own role, so the last admin cannot lock
/// everyone out.
#[instrument(skip(state, admin, form))]
pub async fn set_role(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Path(user_id): Path<UserId>,
    Form(form): Form<RoleForm>,
) -> Result<Response, AppError> {
    let Ok(role) = form.role.parse::<Role>() else {
        return Ok(redirect_with("error", "invalid_role"));
    };
    if user_id == admin.user.id {
        return Ok(redirect_with("error", "own_role"));
    }

    match UserRepository::new(state.pool()).set_role(user_id, role).await {
        Ok(()) => {
            tracing::info!(
                user_id = %user_id,
                role = %role,
                admin_id = %admin.user.id,
                "Role changed"
            );
            Ok(redirect_with("success", "saved"))
        }
        Err(RepositoryError::NotFound) => Ok(redirect_with("error", "not_found")),
        Err(e) => Err(e.into()),
    }
}
