//! Games the storefront sells accounts for.
//!
//! Each game is identified by a short slug (`valorant`, `csgo`) and decides
//! which extra verification a seller must provide when listing an account.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`GameTag`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameTagError {
    #[error("game tag cannot be empty")]
    Empty,
    #[error("game tag must be at most {max} characters")]
    TooLong { max: usize },
    #[error("game tag may only contain a-z, 0-9 and '-'")]
    InvalidCharacter,
}

/// A game slug.
///
/// Slugs are lower-case ASCII letters, digits and hyphens. Parsing trims and
/// lower-cases the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameTag(String);

impl GameTag {
    /// Maximum slug length.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a game slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the slug is empty, too long, or contains
    /// characters outside `a-z`, `0-9` and `-`.
    pub fn parse(s: &str) -> Result<Self, GameTagError> {
        let s = s.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(GameTagError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(GameTagError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(GameTagError::InvalidCharacter);
        }
        Ok(Self(s))
    }

    /// The slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for GameTag {
    type Err = GameTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GameTag {
    type Error = GameTagError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<GameTag> for String {
    fn from(tag: GameTag) -> Self {
        tag.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for GameTag {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for GameTag {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for GameTag {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

/// Extra proof a seller must give that they control the listed account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.verification_method", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMethod {
    /// Game credentials alone are enough.
    #[default]
    None,
    /// A linked email address and its password.
    Credentials,
    /// The seller's Discord handle; a reviewer sends a friend request.
    Discord,
}

impl VerificationMethod {
    /// All methods in display order.
    pub const ALL: [Self; 3] = [Self::None, Self::Credentials, Self::Discord];

    /// Lower-case token stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Credentials => "credentials",
            Self::Discord => "discord",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VerificationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "credentials" => Ok(Self::Credentials),
            "discord" => Ok(Self::Discord),
            _ => Err(format!("invalid verification method: {s}")),
        }
    }
}

/// A game listed in the navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub tag: GameTag,
    pub name: String,
    pub verification: VerificationMethod,
    /// Navigation position, lowest first.
    pub sort_order: i32,
}

/// Find a game by slug.
#[must_use]
pub fn find_game<'a>(games: &'a [Game], tag: &GameTag) -> Option<&'a Game> {
    games.iter().find(|game| &game.tag == tag)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_game_tag() {
        assert_eq!(GameTag::parse(" Valorant ").unwrap().as_str(), "valorant");
        assert_eq!(GameTag::parse("cs-go2").unwrap().as_str(), "cs-go2");
        assert_eq!(GameTag::parse(""), Err(GameTagError::Empty));
        assert_eq!(
            GameTag::parse("league of legends"),
            Err(GameTagError::InvalidCharacter)
        );
        assert!(matches!(
            GameTag::parse(&"a".repeat(40)),
            Err(GameTagError::TooLong { .. })
        ));
    }

    #[test]
    fn test_game_tag_serde_validates() {
        let tag: GameTag = serde_json::from_str("\"Fortnite\"").unwrap();
        assert_eq!(tag.as_str(), "fortnite");
        assert!(serde_json::from_str::<GameTag>("\"no spaces\"").is_err());
    }

    #[test]
    fn test_verification_method_parse() {
        assert_eq!(
            "Discord".parse::<VerificationMethod>().unwrap(),
            VerificationMethod::Discord
        );
        assert_eq!(
            "".parse::<VerificationMethod>().unwrap(),
            VerificationMethod::None
        );
        assert!("sms".parse::<VerificationMethod>().is_err());
    }

    #[test]
    fn test_find_game() {
        let games = vec![Game {
            tag: GameTag::parse("minecraft").unwrap(),
            name: "Minecraft".to_string(),
            verification: VerificationMethod::Credentials,
            sort_order: 3,
        }];
        let tag = GameTag::parse("minecraft").unwrap();
        assert_eq!(
            find_game(&games, &tag).map(|g| g.verification),
            Some(VerificationMethod::Credentials)
        );
        assert!(find_game(&games, &GameTag::parse("pubg").unwrap()).is_none());
    }
}
