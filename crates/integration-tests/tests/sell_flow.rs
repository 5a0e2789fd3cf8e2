//! Sell form validation through to the approved catalog listing.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use secrecy::ExposeSecret;

use gamehub_core::review::{ApprovalForm, ReviewError, listing_for, prepare_approval};
use gamehub_core::sell_request::{SellRequest, SellRequestError, SellRequestForm, Verification};
use gamehub_core::{Price, SellRequestId, SellRequestStatus, UserId, VerificationMethod};
use gamehub_integration_tests::{sample_games, tag};

fn form(game: &str) -> SellRequestForm {
    SellRequestForm {
        title: "  Immortal Account  ".to_string(),
        game: game.to_string(),
        price: "150".to_string(),
        amount_of_skins: "2".to_string(),
        skin_names: "Prime Vandal\n\n  Oni Phantom \n".to_string(),
        game_username: "seller".to_string(),
        game_password: "hunter2".to_string(),
        ..SellRequestForm::default()
    }
}

fn stored(verification: VerificationMethod, status: SellRequestStatus) -> SellRequest {
    SellRequest {
        id: SellRequestId::generate(),
        user_id: UserId::generate(),
        title: "Immortal Account".to_string(),
        game: tag("valorant"),
        price: Price::from_dollars(150),
        amount_of_skins: 2,
        skin_names: vec!["Prime Vandal".to_string(), "Oni Phantom".to_string()],
        game_username: "seller".to_string(),
        verification,
        verification_email: None,
        seller_discord: Some("seller#1234".to_string()),
        reviewer_discord: None,
        friend_request_sent: false,
        status,
        checker_id: None,
        checked_at: None,
        listed_account_id: None,
        created_at: Utc::now(),
    }
}

#[test]
fn test_discord_game_requires_seller_handle() {
    let games = sample_games();
    let err = form("valorant").validate(&games).unwrap_err();
    assert_eq!(err, SellRequestError::MissingVerification);

    let mut with_handle = form("valorant");
    with_handle.seller_discord = " seller#1234 ".to_string();
    let request = with_handle.validate(&games).unwrap();
    assert_eq!(request.title, "Immortal Account");
    assert_eq!(request.skin_names, vec!["Prime Vandal", "Oni Phantom"]);
    assert!(matches!(
        request.verification,
        Verification::Discord { ref seller_handle } if seller_handle == "seller#1234"
    ));
}

#[test]
fn test_credentials_game_requires_valid_email() {
    let games = sample_games();
    let mut submitted = form("minecraft");
    submitted.verification_email = "not-an-email".to_string();
    submitted.verification_password = "mail-pass".to_string();
    assert_eq!(
        submitted.validate(&games).unwrap_err().code(),
        "invalid_verification_email"
    );

    submitted.verification_email = "seller@example.com".to_string();
    let request = submitted.validate(&games).unwrap();
    assert_eq!(request.verification.method(), VerificationMethod::Credentials);
    assert_eq!(request.credentials.password.expose_secret(), "hunter2");
}

#[test]
fn test_skin_count_must_match_names() {
    let games = sample_games();
    let mut submitted = form("other");
    submitted.amount_of_skins = "3".to_string();
    assert_eq!(
        submitted.validate(&games).unwrap_err(),
        SellRequestError::SkinCountMismatch
    );

    submitted.amount_of_skins = "zero".to_string();
    assert_eq!(
        submitted.validate(&games).unwrap_err(),
        SellRequestError::InvalidSkinCount
    );
}

#[test]
fn test_unknown_game_is_rejected() {
    let games = sample_games();
    assert_eq!(
        form("fortnite").validate(&games).unwrap_err(),
        SellRequestError::UnknownGame
    );
}

#[test]
fn test_discord_approval_sends_friend_request() {
    let request = stored(VerificationMethod::Discord, SellRequestStatus::Pending);
    let reviewer = UserId::generate();

    let missing = prepare_approval(&request, reviewer, &ApprovalForm::default());
    assert_eq!(missing, Err(ReviewError::MissingReviewerHandle));

    let approval = prepare_approval(
        &request,
        reviewer,
        &ApprovalForm {
            reviewer_discord: "checker#0001".to_string(),
        },
    )
    .unwrap();
    assert!(approval.friend_request_sent);
    assert_eq!(approval.reviewer_discord.as_deref(), Some("checker#0001"));
}

#[test]
fn test_reviewed_request_cannot_be_approved_again() {
    let request = stored(VerificationMethod::None, SellRequestStatus::Approved);
    let result = prepare_approval(&request, UserId::generate(), &ApprovalForm::default());
    assert_eq!(result, Err(ReviewError::AlreadyReviewed));
}

#[test]
fn test_listing_mirrors_request() {
    let request = stored(VerificationMethod::None, SellRequestStatus::Pending);
    let listing = listing_for(&request);

    assert_eq!(listing.title, request.title);
    assert_eq!(listing.price, request.price);
    assert!(!listing.featured);
    let names: Vec<&str> = listing.skins.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Prime Vandal", "Oni Phantom"]);
}
