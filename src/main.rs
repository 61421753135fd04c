use pokedex_core::achievements;
use pokedex_core::effectiveness;
use pokedex_core::provider::random_pokemon_id;
use pokedex_core::storage::{self, FileStore};
use pokedex_core::{AttackOutcome, BattleStateMachine, Config, PokeApiClient, PokemonType, Profile};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PROFILE_PATH_ENV: &str = "POKEDEX_PROFILE";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let client = match PokeApiClient::new(&config.pokemon) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let mut args = std::env::args().skip(1);
    let id_a = args.next().unwrap_or_else(|| random_pokemon_id().to_string());
    let id_b = args.next().unwrap_or_else(|| random_pokemon_id().to_string());

    let mut battle = BattleStateMachine::new(client, config.battle.clone());
    if let Err(e) = battle.start(&id_a, &id_b).await {
        tracing::error!("Battle could not start: {}", e);
        for line in battle.log() {
            println!("{}", line);
        }
        std::process::exit(1);
    }

    let winner = loop {
        match battle.attack() {
            Ok(AttackOutcome::Victory { winner, .. }) => break winner,
            Ok(AttackOutcome::Hit(_)) => continue,
            Ok(AttackOutcome::AlreadyConcluded) => {
                break battle.winner().unwrap_or_default().to_string();
            }
            Err(e) => {
                tracing::error!("Battle aborted: {}", e);
                std::process::exit(1);
            }
        }
    };

    for line in battle.log() {
        println!("{}", line);
    }

    let profile_path = match std::env::var_os(PROFILE_PATH_ENV) {
        Some(path) => PathBuf::from(path),
        None => match storage::profile_save_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::error!("Failed to resolve profile path: {}", e);
                std::process::exit(1);
            }
        },
    };
    let profile = Profile::new(FileStore::open(&profile_path));
    if let Err(e) = profile.record_battle_won() {
        tracing::warn!(
            "Could not record the win in {}: {}",
            profile.store().path().display(),
            e
        );
    }

    if let Some(state) = battle.state() {
        println!();
        for participant in [&state.participant_a, &state.participant_b] {
            println!(
                "{}: {}/{} HP ({:.0}%)",
                participant.name(),
                participant.current_hp,
                participant.max_hp,
                participant.hp_percentage()
            );
        }

        let champion = if state.participant_a.name() == winner {
            &state.participant_a
        } else {
            &state.participant_b
        };
        let types: Vec<PokemonType> = champion
            .snapshot
            .types
            .iter()
            .filter_map(|t| PokemonType::parse(t))
            .collect();
        let matchups = effectiveness::defensive_matchups(&types);
        println!();
        println!("{} ({})", winner, champion.snapshot.types.join("/"));
        println!("  weak to:   {}", join_types(&matchups.double_damage_from));
        println!("  resists:   {}", join_types(&matchups.half_damage_from));
        println!("  immune to: {}", join_types(&matchups.no_damage_from));
    }

    let ctx = profile.achievement_context();
    println!();
    println!("Achievements ({} points):", achievements::total_points(&ctx));
    for status in achievements::statuses(&ctx) {
        let mark = if status.unlocked { "x" } else { " " };
        println!(
            "  [{}] {} ({}/{})",
            mark, status.name, status.current, status.target
        );
    }
}

fn join_types(types: &[PokemonType]) -> String {
    if types.is_empty() {
        return "-".to_string();
    }
    types
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
