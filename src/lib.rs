pub mod achievements;
pub mod battle;
pub mod breeding;
pub mod cache;
pub mod config;
pub mod damage;
pub mod effectiveness;
pub mod error;
pub mod moves;
pub mod pokedex;
pub mod pokemon;
pub mod profile;
pub mod provider;
pub mod storage;
pub mod team;
pub mod type_chart;

#[cfg(test)]
mod testing;

pub use battle::{AttackOutcome, BattlePhase, BattleStateMachine};
pub use cache::{CacheTrait, SessionCache};
pub use config::Config;
pub use error::{AppError, StoreError, ValidationError};
pub use moves::MoveBrowser;
pub use pokedex::PokedexBrowser;
pub use pokemon::PokemonSnapshot;
pub use profile::Profile;
pub use provider::{DataProvider, PokeApiClient};
pub use type_chart::PokemonType;
