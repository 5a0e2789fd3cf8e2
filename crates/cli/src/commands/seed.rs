//! Seed the storefront with its default games and a sample catalog.
//!
//! Safe to run repeatedly: existing games are left alone and sample
//! accounts are only inserted for games with an empty catalog.

use tracing::info;

use gamehub_core::account::{AccountDraft, Skin};
use gamehub_core::{Game, GameTag, Price, Rarity, VerificationMethod};
use gamehub_storefront::db::{AccountRepository, GameRepository, RepositoryError};

use super::{CommandError, connect};

/// `(slug, name, verification)` in navigation order.
const GAMES: &[(&str, &str, VerificationMethod)] = &[
    ("valorant", "Valorant", VerificationMethod::Discord),
    ("csgo", "CS:GO", VerificationMethod::Discord),
    ("minecraft", "Minecraft", VerificationMethod::Credentials),
    ("fortnite", "Fortnite", VerificationMethod::Credentials),
    ("pubg", "PUBG", VerificationMethod::None),
    ("other", "Other", VerificationMethod::None),
];

struct SampleAccount {
    game: &'static str,
    title: &'static str,
    price: u32,
    bundle: &'static str,
    featured: bool,
    skins: &'static [(&'static str, Rarity)],
}

const SAMPLE_ACCOUNTS: &[SampleAccount] = &[
    SampleAccount {
        game: "valorant",
        title: "Radiant Account - Prime Collection",
        price: 299,
        bundle: "Prime 2.0 Bundle",
        featured: true,
        skins: &[
            ("Prime Vandal", Rarity::Legendary),
            ("Prime Phantom", Rarity::Legendary),
            ("Prime Spectre", Rarity::Legendary),
            ("Reaver Operator", Rarity::Epic),
            ("Dragon Knife", Rarity::Legendary),
        ],
    },
    SampleAccount {
        game: "valorant",
        title: "Immortal Smurf - Glitchpop",
        price: 189,
        bundle: "Glitchpop Bundle",
        featured: false,
        skins: &[
            ("Glitchpop Vandal", Rarity::Epic),
            ("Glitchpop Phantom", Rarity::Epic),
            ("Ion Sheriff", Rarity::Epic),
        ],
    },
    SampleAccount {
        game: "valorant",
        title: "Diamond Account - Elderflame",
        price: 125,
        bundle: "Elderflame Collection",
        featured: false,
        skins: &[
            ("Elderflame Vandal", Rarity::Legendary),
            ("Elderflame Knife", Rarity::Legendary),
        ],
    },
    SampleAccount {
        game: "minecraft",
        title: "Premium Java + Bedrock",
        price: 45,
        bundle: "Minecon Cape Collection",
        featured: true,
        skins: &[
            ("Minecon 2016 Cape", Rarity::Legendary),
            ("Pancape", Rarity::Rare),
            ("Translator Cape", Rarity::Epic),
            ("Cobalt Skin", Rarity::Rare),
        ],
    },
    SampleAccount {
        game: "minecraft",
        title: "OG Account - 2010 Join Date",
        price: 89,
        bundle: "Vintage Collection",
        featured: false,
        skins: &[
            ("Alpha Tester Cape", Rarity::Legendary),
            ("Classic Steve", Rarity::Common),
        ],
    },
    SampleAccount {
        game: "minecraft",
        title: "Hypixel VIP++ Account",
        price: 65,
        bundle: "Hypixel Exclusive",
        featured: false,
        skins: &[
            ("VIP Skin", Rarity::Epic),
            ("MVP++ Cosmetics", Rarity::Rare),
            ("Network Level Cape", Rarity::Rare),
        ],
    },
    SampleAccount {
        game: "csgo",
        title: "Global Elite - Dragon Lore",
        price: 450,
        bundle: "Dragon Collection",
        featured: true,
        skins: &[
            ("AWP Dragon Lore", Rarity::Legendary),
            ("AK-47 Fire Serpent", Rarity::Legendary),
            ("M4A4 Howl", Rarity::Legendary),
            ("Karambit Fade", Rarity::Legendary),
        ],
    },
    SampleAccount {
        game: "csgo",
        title: "Supreme Master - Asiimov Set",
        price: 180,
        bundle: "Asiimov Collection",
        featured: false,
        skins: &[
            ("AWP Asiimov", Rarity::Epic),
            ("M4A4 Asiimov", Rarity::Epic),
            ("P250 Asiimov", Rarity::Rare),
        ],
    },
    SampleAccount {
        game: "csgo",
        title: "Legendary Eagle - Knife Collection",
        price: 220,
        bundle: "Knife Paradise",
        featured: false,
        skins: &[
            ("Butterfly Knife Doppler", Rarity::Legendary),
            ("AK-47 Redline", Rarity::Rare),
            ("USP-S Kill Confirmed", Rarity::Epic),
        ],
    },
];

fn tag(slug: &str) -> Result<GameTag, CommandError> {
    GameTag::parse(slug).map_err(|e| CommandError::InvalidArgument("game", e.to_string()))
}

fn default_games() -> Result<Vec<Game>, CommandError> {
    GAMES
        .iter()
        .zip(0..)
        .map(|(&(slug, name, verification), sort_order)| {
            Ok(Game {
                tag: tag(slug)?,
                name: name.to_string(),
                verification,
                sort_order,
            })
        })
        .collect()
}

impl SampleAccount {
    fn draft(&self) -> Result<AccountDraft, CommandError> {
        Ok(AccountDraft {
            title: self.title.to_string(),
            game: tag(self.game)?,
            price: Price::from_dollars(self.price),
            bundle: Some(self.bundle.to_string()),
            image_url: None,
            featured: self.featured,
            skins: self
                .skins
                .iter()
                .map(|&(name, rarity)| Skin {
                    name: name.to_string(),
                    rarity: Some(rarity),
                })
                .collect(),
        })
    }
}

/// Insert default games and, unless `games_only`, the sample catalog.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run(games_only: bool) -> Result<(), CommandError> {
    let pool = connect().await?;
    let game_repo = GameRepository::new(&pool);

    for game in default_games()? {
        match game_repo.create(&game).await {
            Ok(()) => info!(game = %game.tag, "Inserted game"),
            Err(RepositoryError::Conflict(_)) => info!(game = %game.tag, "Game exists, skipping"),
            Err(e) => return Err(e.into()),
        }
    }

    if games_only {
        return Ok(());
    }

    let account_repo = AccountRepository::new(&pool);
    let mut inserted = 0_usize;
    for game in GAMES.iter().map(|&(slug, _, _)| slug) {
        let game_tag = tag(game)?;
        if !account_repo.list_by_game(&game_tag).await?.is_empty() {
            info!(game, "Catalog not empty, skipping samples");
            continue;
        }
        for sample in SAMPLE_ACCOUNTS.iter().filter(|s| s.game == game) {
            account_repo.create(&sample.draft()?).await?;
            inserted += 1;
        }
    }

    info!(inserted, "Seeding complete");
    Ok(())
}
