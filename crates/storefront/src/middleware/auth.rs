//! Authentication middleware and extractors.
//!
//! `RequireAuth` and `OptionalAuth` read the signed-in user from the session.
//! `RequireRole` additionally looks up the user's role and checks it against a
//! [`RoleGate`]; signed-in users who do not pass are sent back to the home page.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use gamehub_core::{Role, RoleGate};

use crate::db::UserRepository;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires user authentication.
///
/// If the user is not logged in, returns a redirect to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication or a role is required.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed-in user lacks the role; send them home.
    RedirectHome,
    /// The role lookup failed.
    Internal,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::RedirectHome => Redirect::to("/").into_response(),
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

async fn session_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if parts.extensions.get::<Session>().is_none() {
            return Err(AuthRejection::Unauthorized);
        }

        let user = session_user(parts).await.ok_or_else(|| {
            let is_api = parts.uri.path().starts_with("/api/");
            if is_api {
                AuthRejection::Unauthorized
            } else {
                AuthRejection::RedirectToLogin
            }
        })?;

        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the user is not logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await))
    }
}

// =============================================================================
// Role Gates
// =============================================================================

/// A marker naming the gate a [`RequireRole`] extractor enforces.
pub trait GateSpec {
    const GATE: RoleGate;
}

/// Checkers and admins.
pub struct Reviewers;

impl GateSpec for Reviewers {
    const GATE: RoleGate = RoleGate::REVIEWERS;
}

/// Admins only.
pub struct Admins;

impl GateSpec for Admins {
    const GATE: RoleGate = RoleGate::ADMINS;
}

/// Extractor that requires a signed-in user whose role passes gate `G`.
///
/// Anonymous visitors are sent to sign in; signed-in users whose role is
/// not admitted are redirected to `/`.
pub struct RequireRole<G> {
    pub user: CurrentUser,
    pub role: Role,
    _gate: PhantomData<fn() -> G>,
}

/// Sell-request review queue.
pub type RequireReviewer = RequireRole<Reviewers>;

/// Admin management screens.
pub type RequireAdmin = RequireRole<Admins>;

impl<G: GateSpec> FromRequestParts<AppState> for RequireRole<G> {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = session_user(parts)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        let role = UserRepository::new(state.pool())
            .get_role(user.id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, user_id = %user.id, "Failed to load role");
                AuthRejection::Internal
            })?;

        if !G::GATE.admits(role) {
            tracing::debug!(user_id = %user.id, role = %role, "Role gate refused");
            return Err(AuthRejection::RedirectHome);
        }

        Ok(Self {
            user,
            role,
            _gate: PhantomData,
        })
    }
}

/// Helper to set the current user in the session.
///
/// Cycles the session ID first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_responses() {
        let response = AuthRejection::RedirectHome.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").map(|v| v.to_str().ok()),
            Some(Some("/"))
        );

        let response = AuthRejection::RedirectToLogin.into_response();
        assert_eq!(
            response.headers().get("location").map(|v| v.to_str().ok()),
            Some(Some("/auth/login"))
        );

        assert_eq!(
            AuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_marker_gates() {
        assert!(Reviewers::GATE.admits(Role::Checker));
        assert!(!Admins::GATE.admits(Role::Checker));
        assert!(Admins::GATE.admits(Role::Admin));
    }
}
