// In-memory provider and fixtures shared by the unit tests.

use crate::error::AppError;
use crate::pokemon::{
    BaseStat, EvolutionChain, Move, NamedAPIResource, PokemonListResponse, PokemonSnapshot,
    SpeciesMeta,
};
use crate::provider::DataProvider;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn snapshot(id: u32, name: &str, types: &[&str], stats: [u32; 6]) -> PokemonSnapshot {
    let names = crate::pokemon::STAT_NAMES;
    PokemonSnapshot {
        id,
        name: name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
        stats: names
            .iter()
            .zip(stats)
            .map(|(name, value)| BaseStat {
                name: name.to_string(),
                value,
            })
            .collect(),
        ..Default::default()
    }
}

pub fn bulbasaur() -> PokemonSnapshot {
    snapshot(1, "bulbasaur", &["grass", "poison"], [45, 49, 49, 65, 65, 45])
}

pub fn charmander() -> PokemonSnapshot {
    snapshot(4, "charmander", &["fire"], [39, 52, 43, 60, 50, 65])
}

pub fn squirtle() -> PokemonSnapshot {
    snapshot(7, "squirtle", &["water"], [44, 48, 65, 50, 64, 43])
}

pub fn pikachu() -> PokemonSnapshot {
    snapshot(25, "pikachu", &["electric"], [35, 55, 40, 50, 50, 90])
}

pub fn gyarados() -> PokemonSnapshot {
    snapshot(130, "gyarados", &["water", "flying"], [95, 125, 79, 60, 100, 81])
}

pub fn pelipper() -> PokemonSnapshot {
    snapshot(279, "pelipper", &["water", "flying"], [60, 50, 100, 95, 70, 65])
}

pub fn move_record(
    id: u32,
    name: &str,
    move_type: &str,
    damage_class: &str,
    power: Option<u32>,
) -> Move {
    let resource = |name: &str| NamedAPIResource {
        name: name.to_string(),
        url: String::new(),
    };
    Move {
        id,
        name: name.to_string(),
        accuracy: Some(100),
        power,
        pp: Some(15),
        r#type: resource(move_type),
        damage_class: resource(damage_class),
        effect_entries: Vec::new(),
    }
}

#[derive(Default)]
pub struct FakeProvider {
    pokemon: HashMap<String, PokemonSnapshot>,
    species: HashMap<String, SpeciesMeta>,
    chains: HashMap<String, EvolutionChain>,
    moves: HashMap<String, Move>,
    pokemon_calls: AtomicUsize,
    move_calls: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn with(pokemon: Vec<PokemonSnapshot>) -> Self {
        let mut provider = Self::default();
        for p in pokemon {
            provider.pokemon.insert(p.id.to_string(), p.clone());
            provider.pokemon.insert(p.name.clone(), p);
        }
        provider
    }

    pub fn with_species(mut self, meta: SpeciesMeta) -> Self {
        self.species.insert(meta.name.clone(), meta);
        self
    }

    pub fn with_chain(mut self, url: &str, chain: EvolutionChain) -> Self {
        self.chains.insert(url.to_string(), chain);
        self
    }

    pub fn with_moves(mut self, moves: Vec<Move>) -> Self {
        for m in moves {
            self.moves.insert(m.id.to_string(), m.clone());
            self.moves.insert(m.name.clone(), m);
        }
        self
    }

    pub fn move_calls(&self) -> usize {
        self.move_calls.load(Ordering::SeqCst)
    }

    /// Move list entries in id order.
    pub fn move_entries(&self) -> Vec<NamedAPIResource> {
        let mut unique: Vec<&Move> = self
            .moves
            .iter()
            .filter(|(key, m)| **key == m.id.to_string())
            .map(|(_, m)| m)
            .collect();
        unique.sort_by_key(|m| m.id);
        unique
            .into_iter()
            .map(|m| NamedAPIResource {
                name: m.name.clone(),
                url: format!("https://pokeapi.co/api/v2/move/{}/", m.id),
            })
            .collect()
    }

    pub fn pokemon_calls(&self) -> usize {
        self.pokemon_calls.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// List entries in id order, with PokeAPI-shaped urls.
    pub fn entries(&self) -> Vec<NamedAPIResource> {
        let mut unique: Vec<&PokemonSnapshot> = self
            .pokemon
            .iter()
            .filter(|(key, p)| **key == p.id.to_string())
            .map(|(_, p)| p)
            .collect();
        unique.sort_by_key(|p| p.id);
        unique
            .into_iter()
            .map(|p| NamedAPIResource {
                name: p.name.clone(),
                url: format!("https://pokeapi.co/api/v2/pokemon/{}/", p.id),
            })
            .collect()
    }
}

impl DataProvider for FakeProvider {
    async fn get_pokemon(&self, id_or_name: &str) -> Result<PokemonSnapshot, AppError> {
        // suspend once, like a real request would
        tokio::task::yield_now().await;
        self.pokemon_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(id_or_name.to_string());
        }
        self.pokemon
            .get(&id_or_name.to_lowercase())
            .cloned()
            .ok_or_else(|| AppError::fetch(format!("pokemon/{}", id_or_name), "404 Not Found"))
    }

    async fn get_species(&self, id_or_name: &str) -> Result<SpeciesMeta, AppError> {
        self.species
            .get(id_or_name)
            .cloned()
            .ok_or_else(|| AppError::fetch(format!("pokemon-species/{}", id_or_name), "404 Not Found"))
    }

    async fn get_evolution_chain(&self, url: &str) -> Result<EvolutionChain, AppError> {
        self.chains
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "404 Not Found"))
    }

    async fn list_pokemon(&self, limit: u32, offset: u32) -> Result<PokemonListResponse, AppError> {
        let entries = self.entries();
        let count = entries.len() as u32;
        Ok(PokemonListResponse {
            count,
            next: None,
            previous: None,
            results: entries
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
        })
    }

    async fn get_move(&self, id_or_name: &str) -> Result<Move, AppError> {
        tokio::task::yield_now().await;
        self.move_calls.fetch_add(1, Ordering::SeqCst);
        self.moves
            .get(&id_or_name.to_lowercase())
            .cloned()
            .ok_or_else(|| AppError::fetch(format!("move/{}", id_or_name), "404 Not Found"))
    }

    async fn list_moves(&self, limit: u32, offset: u32) -> Result<PokemonListResponse, AppError> {
        let entries = self.move_entries();
        Ok(PokemonListResponse {
            count: entries.len() as u32,
            next: None,
            previous: None,
            results: entries
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect(),
        })
    }
}
