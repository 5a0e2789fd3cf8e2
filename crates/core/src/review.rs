//! Reviewer decisions on pending sell requests.

use serde::Deserialize;

use crate::account::{AccountDraft, Skin, non_blank};
use crate::sell_request::SellRequest;
use crate::types::{UserId, VerificationMethod};

/// What a reviewer decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Deny,
}

/// Reasons a review cannot be applied.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Enter your Discord handle before approving this request")]
    MissingReviewerHandle,
    #[error("This request has already been reviewed")]
    AlreadyReviewed,
}

impl ReviewError {
    /// Short code used in redirect notices.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingReviewerHandle => "missing_reviewer_discord",
            Self::AlreadyReviewed => "already_reviewed",
        }
    }
}

/// Approve form posted from the review queue.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalForm {
    #[serde(default)]
    pub reviewer_discord: String,
}

/// Fields stamped on a request when it is approved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approval {
    pub reviewer_id: UserId,
    pub reviewer_discord: Option<String>,
    pub friend_request_sent: bool,
}

/// Check an approval before anything is written.
///
/// Discord-verified requests need the reviewer's own handle, which is shown
/// to the seller alongside the friend request. Other methods ignore it.
///
/// # Errors
///
/// Returns [`ReviewError::AlreadyReviewed`] if the request is no longer
/// pending, or [`ReviewError::MissingReviewerHandle`] if a Discord request
/// is approved without a handle.
pub fn prepare_approval(
    request: &SellRequest,
    reviewer_id: UserId,
    form: &ApprovalForm,
) -> Result<Approval, ReviewError> {
    if !request.status.is_pending() {
        return Err(ReviewError::AlreadyReviewed);
    }

    match request.verification {
        VerificationMethod::Discord => {
            let handle =
                non_blank(&form.reviewer_discord).ok_or(ReviewError::MissingReviewerHandle)?;
            Ok(Approval {
                reviewer_id,
                reviewer_discord: Some(handle),
                friend_request_sent: true,
            })
        }
        VerificationMethod::None | VerificationMethod::Credentials => Ok(Approval {
            reviewer_id,
            reviewer_discord: None,
            friend_request_sent: false,
        }),
    }
}

/// The catalog listing created when `request` is approved.
///
/// One unrated skin per submitted name; never featured.
#[must_use]
pub fn listing_for(request: &SellRequest) -> AccountDraft {
    AccountDraft {
        title: request.title.clone(),
        game: request.game.clone(),
        price: request.price,
        bundle: None,
        image_url: None,
        featured: false,
        skins: request.skin_names.iter().map(Skin::unrated).collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{GameTag, Price, SellRequestId, SellRequestStatus};

    fn request(verification: VerificationMethod) -> SellRequest {
        SellRequest {
            id: SellRequestId::generate(),
            user_id: UserId::generate(),
            title: "Immortal Smurf".to_string(),
            game: GameTag::parse("valorant").unwrap(),
            price: Price::from_dollars(189),
            amount_of_skins: 2,
            skin_names: vec!["Ion Sheriff".to_string(), "Glitchpop Vandal".to_string()],
            game_username: "seller1".to_string(),
            verification,
            verification_email: None,
            seller_discord: Some("seller#0001".to_string()),
            reviewer_discord: None,
            friend_request_sent: false,
            status: SellRequestStatus::Pending,
            checker_id: None,
            checked_at: None,
            listed_account_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_discord_approval_requires_handle() {
        let req = request(VerificationMethod::Discord);
        let reviewer = UserId::generate();

        let blank = ApprovalForm {
            reviewer_discord: "   ".to_string(),
        };
        assert_eq!(
            prepare_approval(&req, reviewer, &blank),
            Err(ReviewError::MissingReviewerHandle)
        );

        let form = ApprovalForm {
            reviewer_discord: " checker#9 ".to_string(),
        };
        let approval = prepare_approval(&req, reviewer, &form).unwrap();
        assert_eq!(approval.reviewer_discord.as_deref(), Some("checker#9"));
        assert!(approval.friend_request_sent);
    }

    #[test]
    fn test_other_methods_ignore_handle() {
        let req = request(VerificationMethod::Credentials);
        let form = ApprovalForm {
            reviewer_discord: "checker#9".to_string(),
        };
        let approval = prepare_approval(&req, UserId::generate(), &form).unwrap();
        assert_eq!(approval.reviewer_discord, None);
        assert!(!approval.friend_request_sent);
    }

    #[test]
    fn test_already_reviewed() {
        let mut req = request(VerificationMethod::None);
        req.status = SellRequestStatus::Approved;
        assert_eq!(
            prepare_approval(&req, UserId::generate(), &ApprovalForm::default()),
            Err(ReviewError::AlreadyReviewed)
        );
    }

    #[test]
    fn test_listing_for() {
        let draft = listing_for(&request(VerificationMethod::None));
        assert_eq!(draft.title, "Immortal Smurf");
        assert_eq!(draft.price, Price::from_dollars(189));
        assert!(!draft.featured);
        assert_eq!(
            draft.skins,
            vec![Skin::unrated("Ion Sheriff"), Skin::unrated("Glitchpop Vandal")]
        );
    }

    #[test]
    fn test_friend_request_notice() {
        let mut req = request(VerificationMethod::Discord);
        assert_eq!(req.friend_request_notice(), None);
        req.reviewer_discord = Some("checker#9".to_string());
        req.friend_request_sent = true;
        assert_eq!(
            req.friend_request_notice().as_deref(),
            Some("checker#9 sent you a friend request")
        );
    }
}
