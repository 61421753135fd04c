//! Move database: name search over the full move list, then a page of
//! details filtered by type and damage class.

use crate::cache::{CacheTrait, SessionCache};
use crate::config::{CacheConfig, MovesConfig};
use crate::error::AppError;
use crate::pokedex::{self, Generation, PageLoad, Sequencer};
use crate::pokemon::{Move, NamedAPIResource};
use crate::provider::DataProvider;
use crate::type_chart::PokemonType;
use futures_util::future::try_join_all;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DamageClass {
    Physical,
    Special,
    Status,
}

impl DamageClass {
    pub const ALL: [DamageClass; 3] = [
        DamageClass::Physical,
        DamageClass::Special,
        DamageClass::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DamageClass::Physical => "physical",
            DamageClass::Special => "special",
            DamageClass::Status => "status",
        }
    }
}

impl fmt::Display for DamageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DamageClass {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidState(format!("unknown damage class: {}", s)))
    }
}

/// Detail filters; `None` means "all".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveFilter {
    pub move_type: Option<PokemonType>,
    pub damage_class: Option<DamageClass>,
}

impl MoveFilter {
    pub fn matches(&self, candidate: &Move) -> bool {
        let type_ok = self
            .move_type
            .is_none_or(|t| candidate.r#type.name.eq_ignore_ascii_case(t.as_str()));
        let class_ok = self
            .damage_class
            .is_none_or(|c| candidate.damage_class.name.eq_ignore_ascii_case(c.as_str()));
        type_ok && class_ok
    }
}

/// Case-insensitive substring search over move names. List order is kept.
pub fn search_moves(entries: &[NamedAPIResource], search: &str) -> Vec<NamedAPIResource> {
    let needle = search.trim().to_lowercase();
    entries
        .iter()
        .filter(|entry| needle.is_empty() || entry.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

pub fn filter_moves(moves: Vec<Move>, filter: &MoveFilter) -> Vec<Move> {
    moves.into_iter().filter(|m| filter.matches(m)).collect()
}

pub struct MoveBrowser<P> {
    provider: P,
    cache: SessionCache<Move>,
    config: MovesConfig,
    sequencer: Sequencer,
}

impl<P: DataProvider> MoveBrowser<P> {
    pub fn new(provider: P, config: MovesConfig, cache_config: CacheConfig) -> Self {
        Self {
            provider,
            cache: SessionCache::new(cache_config),
            config,
            sequencer: Sequencer::default(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn page_count(&self, matching: usize) -> usize {
        pokedex::page_count(matching, self.config.items_per_page)
    }

    pub async fn load_entries(&self) -> Result<Vec<NamedAPIResource>, AppError> {
        let list = self.provider.list_moves(self.config.list_limit, 0).await?;
        tracing::info!("Loaded {} of {} move entries", list.results.len(), list.count);
        Ok(list.results)
    }

    pub async fn details(&self, entry: &NamedAPIResource) -> Result<Move, AppError> {
        let key = entry
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| entry.name.clone());
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let fetched = self.provider.get_move(&key).await?;
        if let Err(e) = self.cache.insert(key.clone(), fetched.clone()) {
            tracing::warn!("Failed to cache move {}: {}", key, e);
        }
        Ok(fetched)
    }

    /// Fetch one page of the already-searched `entries` and filter it.
    ///
    /// Unlike the Pokédex page, a single failed detail fails the whole page.
    pub async fn load_page(
        &self,
        entries: &[NamedAPIResource],
        page: usize,
        filter: &MoveFilter,
    ) -> Result<PageLoad<Move>, AppError> {
        let generation = self.sequencer.next();
        let window = pokedex::page_window(entries, page, self.config.items_per_page);

        let moves = try_join_all(window.iter().map(|entry| self.details(entry)))
            .await
            .map_err(|e| {
                tracing::error!("Failed to load move details for page {}: {}", page, e);
                e
            })?;

        if !self.is_current(generation) {
            tracing::debug!("Discarding stale move page {} ({:?})", page, generation);
            return Ok(PageLoad::Stale(generation));
        }
        Ok(PageLoad::Current(filter_moves(moves, filter)))
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.sequencer.is_current(generation)
    }
}
