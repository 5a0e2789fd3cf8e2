//! Seller submissions.
//!
//! A seller proposes an account for the catalog by posting a
//! [`SellRequestForm`]. Validation happens entirely here, before anything is
//! written: required fields, the declared skin count against the names given,
//! the price, and whatever extra verification the chosen game demands.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::account::non_blank;
use crate::types::{
    AccountId, Email, EmailError, Game, GameTag, Price, PriceError, SellRequestId,
    SellRequestStatus, UserId, VerificationMethod, find_game,
};

/// Reasons a sell request is rejected before submission.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SellRequestError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("Number of skins must be a positive whole number")]
    InvalidSkinCount,
    #[error("Number of skins must match the amount of skin names provided")]
    SkinCountMismatch,
    #[error("Please enter a valid price")]
    InvalidPrice(#[from] PriceError),
    #[error("Please choose a game from the list")]
    UnknownGame,
    #[error("Please enter a valid verification email")]
    InvalidVerificationEmail(#[from] EmailError),
    #[error("Please fill in the verification details for this game")]
    MissingVerification,
}

impl SellRequestError {
    /// Short code used in redirect notices.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::InvalidSkinCount => "invalid_skin_count",
            Self::SkinCountMismatch => "skin_count_mismatch",
            Self::InvalidPrice(_) => "invalid_price",
            Self::UnknownGame => "unknown_game",
            Self::InvalidVerificationEmail(_) => "invalid_verification_email",
            Self::MissingVerification => "missing_verification",
        }
    }

    /// Human notice for a code produced by [`Self::code`].
    #[must_use]
    pub fn message_for_code(code: &str) -> Option<&'static str> {
        Some(match code {
            "missing_fields" => "Please fill in all required fields",
            "invalid_skin_count" => "Number of skins must be a positive whole number",
            "skin_count_mismatch" => {
                "Number of skins must match the amount of skin names provided"
            }
            "invalid_price" => "Please enter a valid price",
            "unknown_game" => "Please choose a game from the list",
            "invalid_verification_email" => "Please enter a valid verification email",
            "missing_verification" => "Please fill in the verification details for this game",
            _ => return None,
        })
    }
}

/// The sell form as posted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SellRequestForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub game: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub amount_of_skins: String,
    /// One skin name per line.
    #[serde(default)]
    pub skin_names: String,
    #[serde(default)]
    pub game_username: String,
    #[serde(default)]
    pub game_password: String,
    #[serde(default)]
    pub verification_email: String,
    #[serde(default)]
    pub verification_password: String,
    #[serde(default)]
    pub seller_discord: String,
}

/// Login for the account being sold.
#[derive(Debug)]
pub struct GameCredentials {
    pub username: String,
    pub password: SecretString,
}

/// Extra verification supplied with a request.
#[derive(Debug)]
pub enum Verification {
    None,
    Credentials { email: Email, password: SecretString },
    Discord { seller_handle: String },
}

impl Verification {
    /// The method this verification satisfies.
    #[must_use]
    pub const fn method(&self) -> VerificationMethod {
        match self {
            Self::None => VerificationMethod::None,
            Self::Credentials { .. } => VerificationMethod::Credentials,
            Self::Discord { .. } => VerificationMethod::Discord,
        }
    }
}

/// A validated request ready to store.
#[derive(Debug)]
pub struct NewSellRequest {
    pub title: String,
    pub game: GameTag,
    pub price: Price,
    pub amount_of_skins: u32,
    pub skin_names: Vec<String>,
    pub credentials: GameCredentials,
    pub verification: Verification,
}

impl SellRequestForm {
    /// Non-blank, trimmed skin names in the order given.
    #[must_use]
    pub fn skin_name_list(&self) -> Vec<String> {
        self.skin_names.lines().filter_map(non_blank).collect()
    }

    /// Validate the form against the known games.
    ///
    /// # Errors
    ///
    /// Returns the first [`SellRequestError`] found, checking required
    /// fields, then the skin count, then the price, then the game and its
    /// verification fields.
    pub fn validate(&self, games: &[Game]) -> Result<NewSellRequest, SellRequestError> {
        let skin_names = self.skin_name_list();
        let required = [
            &self.title,
            &self.game,
            &self.price,
            &self.amount_of_skins,
            &self.game_username,
            &self.game_password,
        ];
        if required.iter().any(|field| field.trim().is_empty()) || skin_names.is_empty() {
            return Err(SellRequestError::MissingFields);
        }

        let amount_of_skins = self
            .amount_of_skins
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(SellRequestError::InvalidSkinCount)?;
        if usize::try_from(amount_of_skins).ok() != Some(skin_names.len()) {
            return Err(SellRequestError::SkinCountMismatch);
        }

        let price = Price::parse(&self.price)?;

        let game = GameTag::parse(&self.game)
            .ok()
            .and_then(|tag| find_game(games, &tag))
            .ok_or(SellRequestError::UnknownGame)?;

        let verification = match game.verification {
            VerificationMethod::None => Verification::None,
            VerificationMethod::Credentials => {
                if self.verification_email.trim().is_empty()
                    || self.verification_password.is_empty()
                {
                    return Err(SellRequestError::MissingVerification);
                }
                Verification::Credentials {
                    email: Email::parse(&self.verification_email)?,
                    password: SecretString::from(self.verification_password.clone()),
                }
            }
            VerificationMethod::Discord => Verification::Discord {
                seller_handle: non_blank(&self.seller_discord)
                    .ok_or(SellRequestError::MissingVerification)?,
            },
        };

        Ok(NewSellRequest {
            title: self.title.trim().to_string(),
            game: game.tag.clone(),
            price,
            amount_of_skins,
            skin_names,
            credentials: GameCredentials {
                username: self.game_username.trim().to_string(),
                password: SecretString::from(self.game_password.clone()),
            },
            verification,
        })
    }
}

/// A stored sell request, without its secrets.
///
/// Passwords stay encrypted in the database and are only decrypted on an
/// explicit reveal by a reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellRequest {
    pub id: SellRequestId,
    pub user_id: UserId,
    pub title: String,
    pub game: GameTag,
    pub price: Price,
    pub amount_of_skins: u32,
    pub skin_names: Vec<String>,
    pub game_username: String,
    pub verification: VerificationMethod,
    pub verification_email: Option<Email>,
    pub seller_discord: Option<String>,
    pub reviewer_discord: Option<String>,
    pub friend_request_sent: bool,
    pub status: SellRequestStatus,
    pub checker_id: Option<UserId>,
    pub checked_at: Option<DateTime<Utc>>,
    /// Catalog account created on approval.
    pub listed_account_id: Option<AccountId>,
    pub created_at: DateTime<Utc>,
}

impl SellRequest {
    /// Notice shown to the seller once a reviewer has sent a friend request.
    #[must_use]
    pub fn friend_request_notice(&self) -> Option<String> {
        if !self.friend_request_sent {
            return None;
        }
        self.reviewer_discord
            .as_deref()
            .map(|handle| format!("{handle} sent you a friend request"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn games() -> Vec<Game> {
        [
            ("valorant", VerificationMethod::Discord),
            ("minecraft", VerificationMethod::Credentials),
            ("pubg", VerificationMethod::None),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (tag, verification))| Game {
            tag: GameTag::parse(tag).unwrap(),
            name: tag.to_string(),
            verification,
            sort_order: i32::try_from(i).unwrap(),
        })
        .collect()
    }

    fn form() -> SellRequestForm {
        SellRequestForm {
            title: "Plat smurf".to_string(),
            game: "pubg".to_string(),
            price: "40".to_string(),
            amount_of_skins: "2".to_string(),
            skin_names: "Golden Pan\n\n  Pink Helmet  \n".to_string(),
            game_username: "seller1".to_string(),
            game_password: "hunter22".to_string(),
            ..SellRequestForm::default()
        }
    }

    #[test]
    fn test_valid_request() {
        let request = form().validate(&games()).unwrap();
        assert_eq!(request.skin_names, vec!["Golden Pan", "Pink Helmet"]);
        assert_eq!(request.amount_of_skins, 2);
        assert_eq!(request.credentials.password.expose_secret(), "hunter22");
        assert_eq!(request.verification.method(), VerificationMethod::None);
    }

    #[test]
    fn test_missing_fields() {
        let mut f = form();
        f.game_password.clear();
        assert_eq!(f.validate(&games()).unwrap_err(), SellRequestError::MissingFields);

        let mut f = form();
        f.skin_names = " \n \n".to_string();
        assert_eq!(f.validate(&games()).unwrap_err(), SellRequestError::MissingFields);
    }

    #[test]
    fn test_count_mismatch() {
        let mut f = form();
        f.amount_of_skins = "3".to_string();
        let err = f.validate(&games()).unwrap_err();
        assert_eq!(err, SellRequestError::SkinCountMismatch);
        assert_eq!(
            err.to_string(),
            "Number of skins must match the amount of skin names provided"
        );

        f.amount_of_skins = "two".to_string();
        assert_eq!(
            f.validate(&games()).unwrap_err(),
            SellRequestError::InvalidSkinCount
        );
    }

    #[test]
    fn test_invalid_price_and_game() {
        let mut f = form();
        f.price = "-5".to_string();
        assert_eq!(f.validate(&games()).unwrap_err().code(), "invalid_price");

        f.price = "123456789012".to_string();
        assert_eq!(
            f.validate(&games()).unwrap_err(),
            SellRequestError::InvalidPrice(PriceError::TooLarge)
        );

        let mut f = form();
        f.game = "tetris".to_string();
        assert_eq!(f.validate(&games()).unwrap_err(), SellRequestError::UnknownGame);
    }

    #[test]
    fn test_credentials_verification() {
        let mut f = form();
        f.game = "minecraft".to_string();
        assert_eq!(
            f.validate(&games()).unwrap_err(),
            SellRequestError::MissingVerification
        );

        f.verification_email = "not-an-email".to_string();
        f.verification_password = "pw".to_string();
        assert_eq!(
            f.validate(&games()).unwrap_err().code(),
            "invalid_verification_email"
        );

        f.verification_email = "Seller@Mail.com".to_string();
        let request = f.validate(&games()).unwrap();
        match request.verification {
            Verification::Credentials { email, password } => {
                assert_eq!(email.as_str(), "seller@mail.com");
                assert_eq!(password.expose_secret(), "pw");
            }
            other => panic!("unexpected verification: {other:?}"),
        }
    }

    #[test]
    fn test_discord_verification() {
        let mut f = form();
        f.game = "valorant".to_string();
        assert_eq!(
            f.validate(&games()).unwrap_err(),
            SellRequestError::MissingVerification
        );

        f.seller_discord = " seller#0001 ".to_string();
        let request = f.validate(&games()).unwrap();
        assert!(matches!(
            request.verification,
            Verification::Discord { ref seller_handle } if seller_handle == "seller#0001"
        ));
    }

    #[test]
    fn test_codes_have_messages() {
        let errors = [
            SellRequestError::MissingFields,
            SellRequestError::InvalidSkinCount,
            SellRequestError::SkinCountMismatch,
            SellRequestError::InvalidPrice(PriceError::Negative),
            SellRequestError::UnknownGame,
            SellRequestError::InvalidVerificationEmail(EmailError::Empty),
            SellRequestError::MissingVerification,
        ];
        for err in errors {
            assert_eq!(
                SellRequestError::message_for_code(err.code()),
                Some(err.to_string().as_str())
            );
        }
        assert_eq!(SellRequestError::message_for_code("nope"), None);
    }
}
