//! Catalog (home page) route handler.
//!
//! One game's accounts at a time, narrowed by the query string. Filtering
//! happens in `gamehub_core::catalog` on the game's full listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use gamehub_core::account::{Account, Skin};
use gamehub_core::catalog::{
    CatalogParams, CatalogQuery, PriceBucket, SKIN_COUNT_OPTIONS, SortKey, filter_accounts,
};
use gamehub_core::{Game, GameTag};

use crate::db::{AccountRepository, GameRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::{Nav, OptionView};
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// A game tab in the navigation.
#[derive(Clone)]
pub struct GameTabView {
    pub slug: String,
    pub name: String,
    pub active: bool,
}

/// A skin chip on an account card.
#[derive(Clone)]
pub struct SkinView {
    pub name: String,
    /// Lower-case rarity, used as the CSS modifier.
    pub rarity: &'static str,
    pub rarity_label: &'static str,
}

impl From<&Skin> for SkinView {
    fn from(skin: &Skin) -> Self {
        let rarity = skin.effective_rarity();
        Self {
            name: skin.name.clone(),
            rarity: rarity.as_str(),
            rarity_label: rarity.label(),
        }
    }
}

/// An account card in the grid.
#[derive(Clone)]
pub struct AccountCardView {
    pub id: String,
    pub title: String,
    pub price: String,
    pub bundle: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub skin_count: usize,
    pub rarity: &'static str,
    pub skins: Vec<SkinView>,
}

impl From<&Account> for AccountCardView {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            title: account.title.clone(),
            price: account.price.display(),
            bundle: account.bundle.clone(),
            image_url: account.image_url.clone(),
            featured: account.featured,
            skin_count: account.skin_count(),
            rarity: account.highest_rarity().as_str(),
            skins: account.skins.iter().map(SkinView::from).collect(),
        }
    }
}

/// Current filter state, echoed back into the form.
#[derive(Clone)]
pub struct FilterView {
    pub game: String,
    pub text: String,
    pub prices: Vec<OptionView>,
    pub skin_counts: Vec<OptionView>,
    pub sorts: Vec<OptionView>,
}

impl FilterView {
    fn from_query(query: &CatalogQuery) -> Self {
        let prices = PriceBucket::ALL
            .iter()
            .map(|bucket| OptionView {
                value: bucket.as_str().to_string(),
                label: bucket.label().to_string(),
                selected: query.price == Some(*bucket),
            })
            .collect();
        let skin_counts = SKIN_COUNT_OPTIONS
            .iter()
            .map(|n| OptionView {
                value: n.to_string(),
                label: format!("{n}+ skins"),
                selected: query.min_skins == Some(*n),
            })
            .collect();
        let sorts = SortKey::ALL
            .iter()
            .map(|key| OptionView {
                value: key.as_str().to_string(),
                label: key.label().to_string(),
                selected: query.sort == Some(*key),
            })
            .collect();

        Self {
            game: query.game.to_string(),
            text: query.text.clone(),
            prices,
            skin_counts,
            sorts,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: Nav,
    pub games: Vec<GameTabView>,
    pub game_name: String,
    pub filters: FilterView,
    pub accounts: Vec<AccountCardView>,
    /// Total listed for the game before filtering.
    pub listed_count: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the catalog.
///
/// An unknown or missing `game` falls back to the first game in navigation
/// order.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(params): Query<CatalogParams>,
) -> Result<impl IntoResponse, AppError> {
    let games = GameRepository::new(state.pool()).list().await?;
    let Some(default_game) = games.first().map(|g| g.tag.clone()) else {
        return Err(AppError::Internal("no games configured".to_string()));
    };

    let mut query = params.into_query(default_game.clone());
    if !games.iter().any(|g| g.tag == query.game) {
        query.game = default_game;
    }

    let listed = AccountRepository::new(state.pool())
        .list_by_game(&query.game)
        .await?;
    let accounts = filter_accounts(&listed, &query)
        .into_iter()
        .map(AccountCardView::from)
        .collect();

    let nav = Nav::load(&state, user.as_ref()).await?;

    Ok(HomeTemplate {
        nav,
        games: game_tabs(&games, &query.game),
        game_name: game_name(&games, &query.game),
        filters: FilterView::from_query(&query),
        accounts,
        listed_count: listed.len(),
    })
}

fn game_tabs(games: &[Game], active: &GameTag) -> Vec<GameTabView> {
    games
        .iter()
        .map(|game| GameTabView {
            slug: game.tag.to_string(),
            name: game.name.clone(),
            active: &game.tag == active,
        })
        .collect()
}

fn game_name(games: &[Game], tag: &GameTag) -> String {
    gamehub_core::find_game(games, tag).map_or_else(|| tag.to_string(), |g| g.name.clone())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gamehub_core::{Rarity, VerificationMethod};

    use super::*;

    fn games() -> Vec<Game> {
        ["valorant", "minecraft"]
            .into_iter()
            .zip(0..)
            .map(|(slug, sort_order)| Game {
                tag: GameTag::parse(slug).unwrap(),
                name: slug.to_uppercase(),
                verification: VerificationMethod::None,
                sort_order,
            })
            .collect()
    }

    #[test]
    fn test_game_tabs_mark_active() {
        let games = games();
        let tabs = game_tabs(&games, &GameTag::parse("minecraft").unwrap());
        assert!(!tabs[0].active);
        assert!(tabs[1].active);
    }

    #[test]
    fn test_skin_view_defaults_to_common() {
        let view = SkinView::from(&Skin::unrated("Classic Steve"));
        assert_eq!(view.rarity, "common");

        let view = SkinView::from(&Skin {
            name: "Reaver Vandal".to_string(),
            rarity: Some(Rarity::Epic),
        });
        assert_eq!(view.rarity, "epic");
    }

    #[test]
    fn test_filter_view_selection() {
        let params = CatalogParams {
            price: Some("100-200".to_string()),
            skins: Some("3".to_string()),
            ..CatalogParams::default()
        };
        let query = params.into_query(GameTag::parse("valorant").unwrap());
        let view = FilterView::from_query(&query);

        let selected: Vec<_> = view.prices.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].value, "100-200");
        assert!(view.skin_counts.iter().any(|o| o.selected && o.value == "3"));
        assert!(view.sorts.iter().any(|o| o.selected && o.value == "price-asc"));
    }

    #[test]
    fn test_empty_grid_message() {
        let games = games();
        let valorant = GameTag::parse("valorant").unwrap();
        let page = HomeTemplate {
            nav: Nav::default(),
            games: game_tabs(&games, &valorant),
            game_name: game_name(&games, &valorant),
            filters: FilterView::from_query(&CatalogQuery::for_game(valorant)),
            accounts: Vec::new(),
            listed_count: 3,
        };

        let html = page.render().unwrap();
        assert!(html.contains("No accounts found"));
        assert!(html.contains("Showing 0 of 3 VALORANT accounts"));
    }
}
