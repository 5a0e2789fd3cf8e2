//! Catalog filtering and sorting.
//!
//! The storefront grid shows one game at a time. [`filter_accounts`] narrows
//! that game's accounts by free text, price bucket and minimum skin count,
//! sorts them, then lifts featured accounts to the front without disturbing
//! the order inside either group.

use serde::Deserialize;

use crate::account::Account;
use crate::types::{GameTag, Price};

// =============================================================================
// Price buckets
// =============================================================================

/// Fixed price ranges offered by the price filter.
///
/// Each range is lower-exclusive and upper-inclusive, except the first which
/// also includes zero. A price on a boundary belongs to the lower bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceBucket {
    /// `0 <= p <= 50`
    UpTo50,
    /// `50 < p <= 100`
    From50To100,
    /// `100 < p <= 200`
    From100To200,
    /// `p > 200`
    Over200,
}

impl PriceBucket {
    /// All buckets in display order.
    pub const ALL: [Self; 4] = [
        Self::UpTo50,
        Self::From50To100,
        Self::From100To200,
        Self::Over200,
    ];

    /// Parse a query-string token; unknown tokens are `None`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "0-50" => Some(Self::UpTo50),
            "50-100" => Some(Self::From50To100),
            "100-200" => Some(Self::From100To200),
            "200+" => Some(Self::Over200),
            _ => None,
        }
    }

    /// Query-string token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UpTo50 => "0-50",
            Self::From50To100 => "50-100",
            Self::From100To200 => "100-200",
            Self::Over200 => "200+",
        }
    }

    /// Label shown in the filter dropdown.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::UpTo50 => "$0 - $50",
            Self::From50To100 => "$50 - $100",
            Self::From100To200 => "$100 - $200",
            Self::Over200 => "$200+",
        }
    }

    /// Whether `price` falls in this bucket.
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        let fifty = Price::from_dollars(50);
        let hundred = Price::from_dollars(100);
        let two_hundred = Price::from_dollars(200);
        match self {
            Self::UpTo50 => price >= Price::ZERO && price <= fifty,
            Self::From50To100 => price > fifty && price <= hundred,
            Self::From100To200 => price > hundred && price <= two_hundred,
            Self::Over200 => price > two_hundred,
        }
    }
}

// =============================================================================
// Sort keys
// =============================================================================

/// Sort order for the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    PriceAsc,
    PriceDesc,
    SkinsAsc,
    SkinsDesc,
}

impl SortKey {
    /// All keys in display order.
    pub const ALL: [Self; 4] = [Self::PriceAsc, Self::PriceDesc, Self::SkinsAsc, Self::SkinsDesc];

    /// Parse a query-string token; unknown tokens are `None`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            "skins-asc" => Some(Self::SkinsAsc),
            "skins-desc" => Some(Self::SkinsDesc),
            _ => None,
        }
    }

    /// Query-string token.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::SkinsAsc => "skins-asc",
            Self::SkinsDesc => "skins-desc",
        }
    }

    /// Label shown in the sort dropdown.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::SkinsAsc => "Skins: Fewest First",
            Self::SkinsDesc => "Skins: Most First",
        }
    }

    fn sort(self, accounts: &mut [&Account]) {
        match self {
            Self::PriceAsc => accounts.sort_by_key(|a| a.price),
            Self::PriceDesc => accounts.sort_by(|a, b| b.price.cmp(&a.price)),
            Self::SkinsAsc => accounts.sort_by_key(|a| a.skin_count()),
            Self::SkinsDesc => accounts.sort_by(|a, b| b.skin_count().cmp(&a.skin_count())),
        }
    }
}

// =============================================================================
// Query
// =============================================================================

/// Minimum-skin options offered by the filter dropdown.
pub const SKIN_COUNT_OPTIONS: [usize; 5] = [1, 2, 3, 4, 5];

/// Raw catalog query-string parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogParams {
    pub game: Option<String>,
    pub q: Option<String>,
    pub price: Option<String>,
    pub skins: Option<String>,
    pub sort: Option<String>,
}

/// A parsed catalog query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub game: GameTag,
    /// Trimmed search text; empty means no text filter.
    pub text: String,
    pub price: Option<PriceBucket>,
    pub min_skins: Option<usize>,
    /// `None` keeps the input order.
    pub sort: Option<SortKey>,
}

impl CatalogQuery {
    /// Unfiltered query for `game`, sorted by the default key.
    #[must_use]
    pub fn for_game(game: GameTag) -> Self {
        Self {
            game,
            text: String::new(),
            price: None,
            min_skins: None,
            sort: Some(SortKey::default()),
        }
    }
}

impl CatalogParams {
    /// Parse raw parameters, falling back to `default_game`.
    ///
    /// Unknown or malformed tokens are treated as unset. A missing sort
    /// parameter selects [`SortKey::PriceAsc`]; an unrecognized one keeps the
    /// stored order.
    #[must_use]
    pub fn into_query(self, default_game: GameTag) -> CatalogQuery {
        let game = self
            .game
            .as_deref()
            .and_then(|g| GameTag::parse(g).ok())
            .unwrap_or(default_game);
        let text = self.q.as_deref().map(str::trim).unwrap_or_default().to_string();
        let price = self.price.as_deref().and_then(PriceBucket::parse);
        let min_skins = self
            .skins
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0);
        let sort = match self.sort.as_deref() {
            None | Some("") => Some(SortKey::default()),
            Some(token) => SortKey::parse(token),
        };

        CatalogQuery {
            game,
            text,
            price,
            min_skins,
            sort,
        }
    }
}

/// Filter and order `accounts` for display.
#[must_use]
pub fn filter_accounts<'a>(accounts: &'a [Account], query: &CatalogQuery) -> Vec<&'a Account> {
    let needle = query.text.to_lowercase();

    let mut matched: Vec<&Account> = accounts
        .iter()
        .filter(|a| a.game == query.game)
        .filter(|a| needle.is_empty() || a.matches_text(&needle))
        .filter(|a| query.price.is_none_or(|bucket| bucket.contains(a.price)))
        .filter(|a| query.min_skins.is_none_or(|n| a.skin_count() >= n))
        .collect();

    if let Some(key) = query.sort {
        key.sort(&mut matched);
    }

    // Stable: featured first, each group keeps the sorted order.
    matched.sort_by_key(|a| !a.featured);
    matched
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::account::Skin;
    use crate::types::AccountId;

    fn game(tag: &str) -> GameTag {
        GameTag::parse(tag).unwrap()
    }

    fn account(title: &str, tag: &str, price: &str, skins: usize, featured: bool) -> Account {
        Account {
            id: AccountId::generate(),
            title: title.to_string(),
            game: game(tag),
            price: Price::parse(price).unwrap(),
            bundle: None,
            image_url: None,
            featured,
            skins: (0..skins).map(|i| Skin::unrated(format!("Skin {i}"))).collect(),
            created_at: Utc::now(),
        }
    }

    fn titles(accounts: &[&Account]) -> Vec<String> {
        accounts.iter().map(|a| a.title.clone()).collect()
    }

    #[test]
    fn test_bucket_boundaries_belong_to_lower_bucket() {
        let cases = [
            ("0", PriceBucket::UpTo50),
            ("50", PriceBucket::UpTo50),
            ("50.01", PriceBucket::From50To100),
            ("100", PriceBucket::From50To100),
            ("100.01", PriceBucket::From100To200),
            ("200", PriceBucket::From100To200),
            ("200.01", PriceBucket::Over200),
        ];
        for (price, expected) in cases {
            let price = Price::parse(price).unwrap();
            let hits: Vec<_> = PriceBucket::ALL
                .into_iter()
                .filter(|b| b.contains(price))
                .collect();
            assert_eq!(hits, vec![expected], "price {price}");
        }
    }

    #[test]
    fn test_parse_tokens() {
        for bucket in PriceBucket::ALL {
            assert_eq!(PriceBucket::parse(bucket.as_str()), Some(bucket));
        }
        for key in SortKey::ALL {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(PriceBucket::parse("cheap"), None);
        assert_eq!(SortKey::parse("newest"), None);
    }

    #[test]
    fn test_params_defaults() {
        let query = CatalogParams::default().into_query(game("valorant"));
        assert_eq!(query, CatalogQuery::for_game(game("valorant")));

        let query = CatalogParams {
            game: Some("csgo".to_string()),
            q: Some("  knife ".to_string()),
            price: Some("bogus".to_string()),
            skins: Some("0".to_string()),
            sort: Some("bogus".to_string()),
        }
        .into_query(game("valorant"));
        assert_eq!(query.game, game("csgo"));
        assert_eq!(query.text, "knife");
        assert_eq!(query.price, None);
        assert_eq!(query.min_skins, None);
        assert_eq!(query.sort, None);
    }

    #[test]
    fn test_filters_by_game_text_price_and_skins() {
        let accounts = vec![
            account("Alpha", "valorant", "30", 1, false),
            account("Bravo Knife", "valorant", "75", 3, false),
            account("Charlie", "valorant", "75", 1, false),
            account("Delta Knife", "csgo", "75", 3, false),
        ];

        let mut query = CatalogQuery::for_game(game("valorant"));
        assert_eq!(filter_accounts(&accounts, &query).len(), 3);

        query.text = "KNIFE".to_string();
        assert_eq!(titles(&filter_accounts(&accounts, &query)), vec!["Bravo Knife"]);

        query.text.clear();
        query.price = Some(PriceBucket::From50To100);
        query.min_skins = Some(2);
        assert_eq!(titles(&filter_accounts(&accounts, &query)), vec!["Bravo Knife"]);
    }

    #[test]
    fn test_featured_first_for_every_sort() {
        let accounts = vec![
            account("Cheap", "valorant", "10", 5, false),
            account("Featured Pricey", "valorant", "300", 1, true),
            account("Mid", "valorant", "60", 2, false),
            account("Featured Cheap", "valorant", "20", 4, true),
        ];

        for sort in SortKey::ALL.map(Some).into_iter().chain([None]) {
            let query = CatalogQuery {
                sort,
                ..CatalogQuery::for_game(game("valorant"))
            };
            let result = filter_accounts(&accounts, &query);
            let first_plain = result.iter().position(|a| !a.featured).unwrap();
            assert!(result[first_plain..].iter().all(|a| !a.featured), "{sort:?}");
        }

        let query = CatalogQuery::for_game(game("valorant"));
        assert_eq!(
            titles(&filter_accounts(&accounts, &query)),
            vec!["Featured Cheap", "Featured Pricey", "Cheap", "Mid"]
        );
    }

    #[test]
    fn test_unknown_sort_keeps_input_order() {
        let accounts = vec![
            account("B", "valorant", "90", 1, false),
            account("A", "valorant", "10", 1, false),
        ];
        let query = CatalogQuery {
            sort: None,
            ..CatalogQuery::for_game(game("valorant"))
        };
        assert_eq!(titles(&filter_accounts(&accounts, &query)), vec!["B", "A"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let accounts = vec![
            account("First", "valorant", "50", 2, false),
            account("Second", "valorant", "50", 2, false),
        ];
        let query = CatalogQuery {
            sort: Some(SortKey::SkinsDesc),
            ..CatalogQuery::for_game(game("valorant"))
        };
        assert_eq!(
            titles(&filter_accounts(&accounts, &query)),
            vec!["First", "Second"]
        );
    }
}
