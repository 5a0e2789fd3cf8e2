//! Skin rarity tiers.
//!
//! Rarity has exactly one canonical spelling: the lower-case token. Input from
//! forms, seed files or older rows may arrive as `"Rare"` or `"LEGENDARY"`;
//! parsing folds case so the rest of the system only ever sees the enum.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Rarity tier of a skin, ordered from least to most valuable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Lookup table from canonical token to tier.
const RARITY_TOKENS: [(&str, Rarity); 4] = [
    ("common", Rarity::Common),
    ("rare", Rarity::Rare),
    ("epic", Rarity::Epic),
    ("legendary", Rarity::Legendary),
];

impl Rarity {
    /// All tiers, lowest first.
    pub const ALL: [Self; 4] = [Self::Common, Self::Rare, Self::Epic, Self::Legendary];

    /// Parse a rarity token, ignoring case and surrounding whitespace.
    ///
    /// Returns `None` for unknown tokens.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        RARITY_TOKENS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(token))
            .map(|(_, rarity)| *rarity)
    }

    /// Resolve an optional stored rarity; missing or unknown values are common.
    #[must_use]
    pub fn or_common(token: Option<&str>) -> Self {
        token.and_then(Self::parse).unwrap_or_default()
    }

    /// The canonical lower-case token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    /// Capitalized label for display (`"Legendary"`).
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest rarity among a set of skin rarities; `Common` when empty.
pub fn highest_rarity<I>(rarities: I) -> Rarity
where
    I: IntoIterator<Item = Option<Rarity>>,
{
    rarities
        .into_iter()
        .map(Option::unwrap_or_default)
        .max()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folds_case() {
        assert_eq!(Rarity::parse("rare"), Some(Rarity::Rare));
        assert_eq!(Rarity::parse("Rare"), Some(Rarity::Rare));
        assert_eq!(Rarity::parse(" LEGENDARY "), Some(Rarity::Legendary));
        assert_eq!(Rarity::parse("mythic"), None);
    }

    #[test]
    fn test_or_common() {
        assert_eq!(Rarity::or_common(None), Rarity::Common);
        assert_eq!(Rarity::or_common(Some("mythic")), Rarity::Common);
        assert_eq!(Rarity::or_common(Some("Epic")), Rarity::Epic);
    }

    #[test]
    fn test_ordering() {
        assert!(Rarity::Common < Rarity::Rare);
        assert!(Rarity::Rare < Rarity::Epic);
        assert!(Rarity::Epic < Rarity::Legendary);
    }

    #[test]
    fn test_highest_rarity() {
        assert_eq!(highest_rarity(Vec::new()), Rarity::Common);
        assert_eq!(
            highest_rarity([Some(Rarity::Rare), None, Some(Rarity::Epic)]),
            Rarity::Epic
        );
        assert_eq!(highest_rarity([None, None]), Rarity::Common);
    }

    #[test]
    fn test_canonical_token_roundtrip() {
        for rarity in Rarity::ALL {
            assert_eq!(Rarity::parse(rarity.as_str()), Some(rarity));
            assert_eq!(Rarity::parse(rarity.label()), Some(rarity));
        }
    }
}
