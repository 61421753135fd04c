use crate::error::AppError;
use serde::{Deserialize, Serialize};

const EMBEDDED_CONFIG: &str = include_str!("../config/config.toml");

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Config {
    pub pokemon: PokemonConfig,
    pub cache: CacheConfig,
    #[serde(default)]
    pub battle: BattleDefaults,
    #[serde(default)]
    pub pokedex: PokedexConfig,
    #[serde(default)]
    pub moves: MovesConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PokemonConfig {
    pub api_url: String,
    pub timeout: u32,
    pub cache_enabled: bool,
}

impl Default for PokemonConfig {
    fn default() -> Self {
        Self {
            api_url: "https://pokeapi.co/api/v2".to_string(),
            timeout: 10,
            cache_enabled: true,
        }
    }
}

/// `max_size == 0` means unbounded, `expiration == 0` means entries live
/// until the cache is dropped.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CacheConfig {
    pub r#type: String,
    pub max_size: u32,
    pub expiration: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            r#type: "memory".to_string(),
            max_size: 0,
            expiration: 0,
        }
    }
}

/// Fallback values used when a fetched record lacks a stat or a type.
///
/// These only apply to battle simulation; sorting treats a missing stat as 0.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BattleDefaults {
    /// Max HP when the record has no `hp` stat.
    pub default_hp: u32,
    /// Attack when the attacker has no `attack` stat.
    pub default_attack: u32,
    /// Defense when the defender has no `defense` stat.
    pub default_defense: u32,
    /// Attack type when the attacker lists no types.
    pub fallback_attack_type: String,
}

impl Default for BattleDefaults {
    fn default() -> Self {
        Self {
            default_hp: 100,
            default_attack: 30,
            default_defense: 30,
            fallback_attack_type: "normal".to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PokedexConfig {
    pub items_per_page: usize,
    pub list_limit: u32,
}

impl Default for PokedexConfig {
    fn default() -> Self {
        Self {
            items_per_page: 20,
            list_limit: 1500,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MovesConfig {
    pub items_per_page: usize,
    pub list_limit: u32,
}

impl Default for MovesConfig {
    fn default() -> Self {
        Self {
            items_per_page: 20,
            list_limit: 1000,
        }
    }
}

impl Config {
    /// Parse the configuration bundled with the crate.
    pub fn load() -> Result<Config, AppError> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Config, AppError> {
        toml::from_str(config_str).map_err(|e| {
            tracing::error!("Failed to parse config.toml: {}", e);
            AppError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_embedded_config_parses() {
        let config = Config::load().unwrap();
        assert_eq!(config.pokemon.api_url, "https://pokeapi.co/api/v2");
        assert_eq!(config.cache.r#type, "memory");
        assert_eq!(config.battle, BattleDefaults::default());
        assert_eq!(config.pokedex.items_per_page, 20);
        assert_eq!(config.moves, MovesConfig::default());
    }

    #[test]
    fn test_missing_optional_tables_use_defaults() {
        let config = Config::from_toml_str(
            r#"
            [pokemon]
            api_url = "http://localhost:8080"
            timeout = 3
            cache_enabled = false

            [cache]
            type = "memory"
            max_size = 50
            expiration = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.pokemon.timeout, 3);
        assert_eq!(config.cache.max_size, 50);
        assert_eq!(config.battle.default_hp, 100);
        assert_eq!(config.pokedex.list_limit, 1500);
        assert_eq!(config.moves.list_limit, 1000);
    }

    #[test]
    fn test_invalid_config_is_config_error() {
        let result = Config::from_toml_str("[pokemon]\napi_url = 5");
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
