//! Listed gaming accounts and their skins.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccountId, GameTag, GameTagError, Price, PriceError, Rarity, highest_rarity};

/// A cosmetic item owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skin {
    pub name: String,
    /// `None` renders as common.
    pub rarity: Option<Rarity>,
}

impl Skin {
    /// A skin with no recorded rarity.
    #[must_use]
    pub fn unrated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rarity: None,
        }
    }

    /// Rarity for display; missing rarity is common.
    #[must_use]
    pub fn effective_rarity(&self) -> Rarity {
        self.rarity.unwrap_or_default()
    }
}

/// An account for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub title: String,
    pub game: GameTag,
    pub price: Price,
    pub bundle: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    /// Skins in display order.
    pub skins: Vec<Skin>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Number of skins on the account.
    #[must_use]
    pub fn skin_count(&self) -> usize {
        self.skins.len()
    }

    /// Highest rarity among the account's skins.
    #[must_use]
    pub fn highest_rarity(&self) -> Rarity {
        highest_rarity(self.skins.iter().map(|skin| skin.rarity))
    }

    /// Whether the title, bundle or any skin name contains `needle`.
    ///
    /// `needle` must already be lower-cased.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        contains_folded(&self.title, needle)
            || self
                .bundle
                .as_deref()
                .is_some_and(|bundle| contains_folded(bundle, needle))
            || self
                .skins
                .iter()
                .any(|skin| contains_folded(&skin.name, needle))
    }
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

// =============================================================================
// Admin input
// =============================================================================

/// Errors from parsing an [`AccountDraft`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountDraftError {
    #[error("title is required")]
    MissingTitle,
    #[error("invalid game: {0}")]
    InvalidGame(#[from] GameTagError),
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] PriceError),
}

impl AccountDraftError {
    /// Short code used in redirect notices.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingTitle => "missing_title",
            Self::InvalidGame(_) => "invalid_game",
            Self::InvalidPrice(_) => "invalid_price",
        }
    }
}

/// Raw account fields as posted by the admin form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub game: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub bundle: String,
    #[serde(default)]
    pub image_url: String,
    /// Checkbox: present when ticked.
    pub featured: Option<String>,
    /// One skin per line, `Name` or `Name:rarity`.
    #[serde(default)]
    pub skins: String,
}

/// Validated fields for creating or updating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDraft {
    pub title: String,
    pub game: GameTag,
    pub price: Price,
    pub bundle: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub skins: Vec<Skin>,
}

impl AccountForm {
    /// Validate the form into a draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is blank, or the game or price do not
    /// parse.
    pub fn into_draft(self) -> Result<AccountDraft, AccountDraftError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AccountDraftError::MissingTitle);
        }

        Ok(AccountDraft {
            title: title.to_string(),
            game: GameTag::parse(&self.game)?,
            price: Price::parse(&self.price)?,
            bundle: non_blank(&self.bundle),
            image_url: non_blank(&self.image_url),
            featured: self.featured.is_some(),
            skins: parse_skin_lines(&self.skins),
        })
    }
}

/// Parse a textarea of skins, one per line.
///
/// Each non-blank line is `Name` or `Name:rarity`. Unknown rarities are
/// dropped and the skin is stored without one.
#[must_use]
pub fn parse_skin_lines(text: &str) -> Vec<Skin> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.rsplit_once(':') {
            Some((name, rarity)) if !name.trim().is_empty() => Skin {
                name: name.trim().to_string(),
                rarity: Rarity::parse(rarity),
            },
            _ => Skin::unrated(line),
        })
        .collect()
}

/// Render skins back into the textarea format read by [`parse_skin_lines`].
#[must_use]
pub fn format_skin_lines(skins: &[Skin]) -> String {
    skins
        .iter()
        .map(|skin| match skin.rarity {
            Some(rarity) => format!("{}:{}", skin.name, rarity),
            None => skin.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn account(skins: Vec<Skin>) -> Account {
        Account {
            id: AccountId::generate(),
            title: "Diamond Account - Elderflame".to_string(),
            game: GameTag::parse("valorant").unwrap(),
            price: Price::from_dollars(125),
            bundle: Some("Elderflame Collection".to_string()),
            image_url: None,
            featured: false,
            skins,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_highest_rarity() {
        let acct = account(vec![
            Skin {
                name: "Classic Steve".to_string(),
                rarity: Some(Rarity::Common),
            },
            Skin {
                name: "Alpha Tester Cape".to_string(),
                rarity: Some(Rarity::Legendary),
            },
        ]);
        assert_eq!(acct.highest_rarity(), Rarity::Legendary);
        assert_eq!(account(Vec::new()).highest_rarity(), Rarity::Common);
        assert_eq!(
            account(vec![Skin::unrated("Mystery")]).highest_rarity(),
            Rarity::Common
        );
    }

    #[test]
    fn test_matches_text() {
        let acct = account(vec![Skin::unrated("Elderflame Knife")]);
        assert!(acct.matches_text("diamond"));
        assert!(acct.matches_text("collection"));
        assert!(acct.matches_text("knife"));
        assert!(!acct.matches_text("glitchpop"));
    }

    #[test]
    fn test_parse_skin_lines() {
        let skins = parse_skin_lines("Prime Vandal:Legendary\n\n  Ion Sheriff : epic \nPlain\nOdd:mythic\n");
        assert_eq!(
            skins,
            vec![
                Skin {
                    name: "Prime Vandal".to_string(),
                    rarity: Some(Rarity::Legendary)
                },
                Skin {
                    name: "Ion Sheriff".to_string(),
                    rarity: Some(Rarity::Epic)
                },
                Skin::unrated("Plain"),
                Skin::unrated("Odd"),
            ]
        );
    }

    #[test]
    fn test_format_skin_lines_reads_back() {
        let skins = vec![
            Skin {
                name: "AWP Asiimov".to_string(),
                rarity: Some(Rarity::Epic),
            },
            Skin::unrated("Classic Steve"),
        ];
        assert_eq!(format_skin_lines(&skins), "AWP Asiimov:epic\nClassic Steve");
        assert_eq!(parse_skin_lines(&format_skin_lines(&skins)), skins);
    }

    #[test]
    fn test_account_form_into_draft() {
        let form = AccountForm {
            title: "  OG Account ".to_string(),
            game: "Minecraft".to_string(),
            price: "89".to_string(),
            bundle: " ".to_string(),
            image_url: String::new(),
            featured: Some("on".to_string()),
            skins: "Alpha Tester Cape:legendary".to_string(),
        };
        let draft = form.into_draft().unwrap();
        assert_eq!(draft.title, "OG Account");
        assert_eq!(draft.game.as_str(), "minecraft");
        assert_eq!(draft.bundle, None);
        assert!(draft.featured);
        assert_eq!(draft.skins.len(), 1);
    }

    #[test]
    fn test_account_form_rejects() {
        let form = AccountForm {
            game: "valorant".to_string(),
            price: "10".to_string(),
            ..AccountForm::default()
        };
        assert_eq!(form.into_draft(), Err(AccountDraftError::MissingTitle));

        let form = AccountForm {
            title: "X".to_string(),
            game: "valorant".to_string(),
            price: "-3".to_string(),
            ..AccountForm::default()
        };
        assert_eq!(
            form.into_draft().unwrap_err().code(),
            "invalid_price"
        );

        let form = AccountForm {
            title: "X".to_string(),
            game: "valorant".to_string(),
            price: "100000000".to_string(),
            ..AccountForm::default()
        };
        assert_eq!(
            form.into_draft(),
            Err(AccountDraftError::InvalidPrice(PriceError::TooLarge))
        );
    }
}
