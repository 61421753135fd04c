use crate::config::PokemonConfig;
use crate::error::AppError;
use crate::pokemon::{
    EvolutionChain, Move, Pokemon, PokemonListResponse, PokemonSnapshot, PokemonSpecies,
    SpeciesMeta,
};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// Highest national dex number served by the upstream API.
pub const MAX_POKEMON_ID: u32 = 1025;

/// Read-only source of Pokémon data.
///
/// Every call may fail with [`AppError::DataFetch`]; callers decide how to
/// degrade. No retries happen at this layer.
pub trait DataProvider {
    fn get_pokemon(
        &self,
        id_or_name: &str,
    ) -> impl Future<Output = Result<PokemonSnapshot, AppError>>;

    fn get_species(&self, id_or_name: &str) -> impl Future<Output = Result<SpeciesMeta, AppError>>;

    fn get_evolution_chain(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<EvolutionChain, AppError>>;

    fn list_pokemon(
        &self,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<PokemonListResponse, AppError>>;

    fn get_move(&self, id_or_name: &str) -> impl Future<Output = Result<Move, AppError>>;

    /// Same `{name, url}` page shape as [`DataProvider::list_pokemon`].
    fn list_moves(
        &self,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<PokemonListResponse, AppError>>;
}

/// HTTP client for the public PokeAPI.
#[derive(Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    api_url: String,
}

impl PokeApiClient {
    pub fn new(config: &PokemonConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout as u64))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        tracing::debug!("Fetching from URL: {}", url);

        let response = self.http.get(url).send().await.map_err(|e| {
            tracing::error!("Failed to make HTTP request to {}: {}", url, e);
            AppError::from(e)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("API request to {} failed with status: {}", url, status);
            return Err(AppError::fetch(url, format!("status {}", status)));
        }

        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to parse JSON response from {}: {}", url, e);
            AppError::fetch(url, format!("JSON parsing failed: {}", e))
        })
    }
}

impl DataProvider for PokeApiClient {
    async fn get_pokemon(&self, id_or_name: &str) -> Result<PokemonSnapshot, AppError> {
        let url = format!("{}/pokemon/{}", self.api_url, id_or_name.trim().to_lowercase());
        let pokemon: Pokemon = self.get_json(&url).await?;
        tracing::debug!(
            "Successfully fetched Pokemon: {} (ID: {})",
            pokemon.name,
            pokemon.id
        );
        Ok(pokemon.into())
    }

    async fn get_species(&self, id_or_name: &str) -> Result<SpeciesMeta, AppError> {
        let url = format!(
            "{}/pokemon-species/{}",
            self.api_url,
            id_or_name.trim().to_lowercase()
        );
        let species: PokemonSpecies = self.get_json(&url).await?;
        Ok(species.into())
    }

    async fn get_evolution_chain(&self, url: &str) -> Result<EvolutionChain, AppError> {
        self.get_json(url).await
    }

    async fn list_pokemon(&self, limit: u32, offset: u32) -> Result<PokemonListResponse, AppError> {
        let url = format!("{}/pokemon?limit={}&offset={}", self.api_url, limit, offset);
        self.get_json(&url).await
    }

    async fn get_move(&self, id_or_name: &str) -> Result<Move, AppError> {
        let url = format!("{}/move/{}", self.api_url, id_or_name.trim().to_lowercase());
        let found: Move = self.get_json(&url).await?;
        tracing::debug!("Successfully fetched move: {} (ID: {})", found.name, found.id);
        Ok(found)
    }

    async fn list_moves(&self, limit: u32, offset: u32) -> Result<PokemonListResponse, AppError> {
        let url = format!("{}/move?limit={}&offset={}", self.api_url, limit, offset);
        self.get_json(&url).await
    }
}

/// A uniformly random national dex number.
pub fn random_pokemon_id() -> u32 {
    rand::random_range(1..=MAX_POKEMON_ID)
}
