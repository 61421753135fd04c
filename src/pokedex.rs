//! Browsing pipeline: name-list filtering, page windows, detail loading and
//! the stat-derived filters and sort orders applied to a loaded page.

use crate::cache::{CacheTrait, SessionCache};
use crate::config::{CacheConfig, PokedexConfig};
use crate::effectiveness::{self, EffectivenessBreakdown};
use crate::error::AppError;
use crate::pokemon::{EvolutionStage, NamedAPIResource, PokemonSnapshot, SpeciesMeta};
use crate::provider::DataProvider;
use futures_util::future::join_all;
use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Id,
    Name,
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
    Total,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Name => "name",
            SortKey::Hp => "hp",
            SortKey::Attack => "attack",
            SortKey::Defense => "defense",
            SortKey::SpecialAttack => "special-attack",
            SortKey::SpecialDefense => "special-defense",
            SortKey::Speed => "speed",
            SortKey::Total => "total",
        }
    }

    /// Keys that need fetched details to sort by.
    pub fn is_stat(&self) -> bool {
        !matches!(self, SortKey::Id | SortKey::Name)
    }

    /// Sort value of a numeric key; a missing stat counts as 0.
    fn value(&self, pokemon: &PokemonSnapshot) -> u32 {
        match self {
            SortKey::Id => pokemon.id,
            SortKey::Name => 0,
            SortKey::Total => pokemon.total_stats(),
            stat => pokemon.stat(stat.as_str()).unwrap_or(0),
        }
    }
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim().to_lowercase().as_str() {
            "id" => SortKey::Id,
            "name" => SortKey::Name,
            "hp" => SortKey::Hp,
            "attack" => SortKey::Attack,
            "defense" => SortKey::Defense,
            "special-attack" => SortKey::SpecialAttack,
            "special-defense" => SortKey::SpecialDefense,
            "speed" => SortKey::Speed,
            "total" => SortKey::Total,
            other => {
                return Err(AppError::InvalidState(format!("unknown sort key: {}", other)));
            }
        };
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::Id,
            direction: SortDirection::Asc,
        }
    }
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    fn apply(&self, ordering: Ordering) -> Ordering {
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Case-insensitive name order, falling back to the raw text on ties.
///
/// This approximates locale collation with Unicode lowercasing: names are
/// ASCII in practice, and an accented letter sorts after `z`.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Keep records holding every required type (AND semantics).
pub fn filter_by_types<S: AsRef<str>>(
    records: Vec<PokemonSnapshot>,
    required_types: &[S],
) -> Vec<PokemonSnapshot> {
    records
        .into_iter()
        .filter(|p| required_types.iter().all(|t| p.has_type(t.as_ref())))
        .collect()
}

/// Stable sort, so equal keys keep their incoming order.
pub fn sort_records(records: &mut [PokemonSnapshot], sort: &SortConfig) {
    records.sort_by(|a, b| {
        let ordering = match sort.key {
            SortKey::Name => compare_names(&a.name, &b.name),
            key => key.value(a).cmp(&key.value(b)),
        };
        sort.apply(ordering)
    });
}

/// Filter then sort a loaded page for display.
pub fn arrange<S: AsRef<str>>(
    records: Vec<PokemonSnapshot>,
    required_types: &[S],
    sort: &SortConfig,
) -> Vec<PokemonSnapshot> {
    let mut records = filter_by_types(records, required_types);
    sort_records(&mut records, sort);
    records
}

/// Filters applied to the full name list before any details are fetched.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: String,
    /// When set, only these ids are kept.
    pub favorites_only: Option<Vec<String>>,
    pub sort: SortConfig,
}

/// Search, favorites and id/name ordering over `{name, url}` entries.
///
/// Stat keys leave the list order untouched; they are applied per page.
pub fn filter_entries(entries: &[NamedAPIResource], query: &ListQuery) -> Vec<NamedAPIResource> {
    let needle = query.search.trim().to_lowercase();
    let mut filtered: Vec<NamedAPIResource> = entries
        .iter()
        .filter(|entry| match &query.favorites_only {
            Some(favorites) => entry
                .id()
                .is_some_and(|id| favorites.iter().any(|f| *f == id.to_string())),
            None => true,
        })
        .filter(|entry| needle.is_empty() || entry.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    if !query.sort.key.is_stat() {
        filtered.sort_by(|a, b| {
            let ordering = match query.sort.key {
                SortKey::Name => compare_names(&a.name, &b.name),
                _ => a.id().unwrap_or(0).cmp(&b.id().unwrap_or(0)),
            };
            query.sort.apply(ordering)
        });
    }
    filtered
}

pub fn page_count(total: usize, items_per_page: usize) -> usize {
    if items_per_page == 0 {
        return 0;
    }
    total.div_ceil(items_per_page)
}

/// Entries on 1-based `page`. Out-of-range pages are empty.
pub fn page_window<T>(entries: &[T], page: usize, items_per_page: usize) -> &[T] {
    if page == 0 || items_per_page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(items_per_page);
    if start >= entries.len() {
        return &[];
    }
    let end = (start + items_per_page).min(entries.len());
    &entries[start..end]
}

/// Monotonic stamp identifying one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Hands out generations; only the most recent one is current.
#[derive(Debug, Default)]
pub(crate) struct Sequencer(AtomicU64);

impl Sequencer {
    pub(crate) fn next(&self) -> Generation {
        Generation(self.0.fetch_add(1, AtomicOrdering::SeqCst) + 1)
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        self.0.load(AtomicOrdering::SeqCst) == generation.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLoad<T> {
    Current(Vec<T>),
    /// A newer request started while this one was in flight.
    Stale(Generation),
}

/// Everything the detail page shows for one species.
#[derive(Debug, Clone)]
pub struct PokemonDetailView {
    pub pokemon: PokemonSnapshot,
    pub species: SpeciesMeta,
    /// Empty when the chain could not be fetched.
    pub evolution: Vec<EvolutionStage>,
    pub defenses: EffectivenessBreakdown,
}

/// Loads page windows of details, memoizing every record by id for the
/// lifetime of the browser.
pub struct PokedexBrowser<P> {
    provider: P,
    cache: SessionCache<PokemonSnapshot>,
    cache_enabled: bool,
    config: PokedexConfig,
    sequencer: Sequencer,
}

impl<P: DataProvider> PokedexBrowser<P> {
    pub fn new(
        provider: P,
        config: PokedexConfig,
        cache_config: CacheConfig,
        cache_enabled: bool,
    ) -> Self {
        let cache = SessionCache::new(cache_config);
        let cache_enabled = cache_enabled && cache.is_enabled();
        Self {
            provider,
            cache,
            cache_enabled,
            config,
            sequencer: Sequencer::default(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &SessionCache<PokemonSnapshot> {
        &self.cache
    }

    pub fn items_per_page(&self) -> usize {
        self.config.items_per_page
    }

    /// The complete `{name, url}` list the pipeline starts from.
    pub async fn load_entries(&self) -> Result<Vec<NamedAPIResource>, AppError> {
        let list = self.provider.list_pokemon(self.config.list_limit, 0).await?;
        tracing::info!("Loaded {} of {} list entries", list.results.len(), list.count);
        Ok(list.results)
    }

    /// Cached record for an entry, fetching it on a miss.
    pub async fn details(&self, entry: &NamedAPIResource) -> Result<PokemonSnapshot, AppError> {
        let key = entry
            .id()
            .map(|id| id.to_string())
            .unwrap_or_else(|| entry.name.clone());

        if self.cache_enabled {
            if let Some(pokemon) = self.cache.get(&key) {
                return Ok(pokemon);
            }
        }

        let pokemon = self.provider.get_pokemon(&key).await?;
        if self.cache_enabled {
            if let Err(e) = self.cache.insert(key.clone(), pokemon.clone()) {
                tracing::warn!("Failed to cache Pokémon {}: {}", key, e);
            }
        }
        Ok(pokemon)
    }

    /// Fetch, filter and sort one page of `entries`.
    ///
    /// The page's details are fetched concurrently. An entry whose fetch
    /// fails is left out of the page. If another call started while this one
    /// was waiting, the result is discarded as [`PageLoad::Stale`].
    pub async fn load_page<S: AsRef<str>>(
        &self,
        entries: &[NamedAPIResource],
        page: usize,
        required_types: &[S],
        sort: &SortConfig,
    ) -> PageLoad<PokemonSnapshot> {
        let generation = self.sequencer.next();
        let window = page_window(entries, page, self.config.items_per_page);

        let results = join_all(window.iter().map(|entry| self.details(entry))).await;
        let records: Vec<PokemonSnapshot> = results
            .into_iter()
            .zip(window)
            .filter_map(|(result, entry)| match result {
                Ok(pokemon) => Some(pokemon),
                Err(e) => {
                    tracing::warn!("Failed to fetch details for {}: {}", entry.name, e);
                    None
                }
            })
            .collect();

        if !self.is_current(generation) {
            tracing::debug!("Discarding stale page {} ({:?})", page, generation);
            return PageLoad::Stale(generation);
        }
        PageLoad::Current(arrange(records, required_types, sort))
    }

    /// Details and species concurrently, then the evolution chain.
    ///
    /// A failed evolution fetch degrades to an empty chain.
    pub async fn detail_view(&self, id_or_name: &str) -> Result<PokemonDetailView, AppError> {
        let (pokemon, species) = tokio::join!(
            self.provider.get_pokemon(id_or_name),
            self.provider.get_species(id_or_name)
        );
        let (pokemon, species) = (pokemon?, species?);

        let evolution = match &species.evolution_chain_url {
            Some(url) => match self.provider.get_evolution_chain(url).await {
                Ok(chain) => chain.stages(),
                Err(e) => {
                    tracing::warn!("No evolution chain for {}: {}", species.name, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let defenses = effectiveness::effectiveness_breakdown(&pokemon.types);
        Ok(PokemonDetailView {
            pokemon,
            species,
            evolution,
            defenses,
        })
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.sequencer.is_current(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        bulbasaur, charmander, gyarados, pelipper, pikachu, snapshot, squirtle, FakeProvider,
    };
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn names(records: &[PokemonSnapshot]) -> Vec<&str> {
        records.iter().map(|p| p.name.as_str()).collect()
    }

    fn roster() -> Vec<PokemonSnapshot> {
        vec![bulbasaur(), charmander(), squirtle(), pikachu(), gyarados(), pelipper()]
    }

    fn browser(pokemon: Vec<PokemonSnapshot>, items_per_page: usize) -> PokedexBrowser<FakeProvider> {
        PokedexBrowser::new(
            FakeProvider::with(pokemon),
            PokedexConfig {
                items_per_page,
                list_limit: 1500,
            },
            CacheConfig::default(),
            true,
        )
    }

    #[test]
    fn test_type_filter_requires_every_type() {
        let filtered = filter_by_types(roster(), &["water", "flying"]);
        assert_eq!(names(&filtered), vec!["gyarados", "pelipper"]);

        let filtered = filter_by_types(roster(), &["WATER"]);
        assert_eq!(names(&filtered), vec!["squirtle", "gyarados", "pelipper"]);

        let none: [&str; 0] = [];
        assert_eq!(filter_by_types(roster(), &none).len(), 6);
    }

    #[rstest]
    #[case(SortKey::Total, SortDirection::Desc, vec!["gyarados", "pelipper", "pikachu", "bulbasaur", "squirtle", "charmander"])]
    #[case(SortKey::Speed, SortDirection::Asc, vec!["squirtle", "bulbasaur", "charmander", "pelipper", "gyarados", "pikachu"])]
    #[case(SortKey::Name, SortDirection::Desc, vec!["squirtle", "pikachu", "pelipper", "gyarados", "charmander", "bulbasaur"])]
    #[case(SortKey::Id, SortDirection::Desc, vec!["pelipper", "gyarados", "pikachu", "squirtle", "charmander", "bulbasaur"])]
    fn test_sort_orders(
        #[case] key: SortKey,
        #[case] direction: SortDirection,
        #[case] expected: Vec<&str>,
    ) {
        let mut records = roster();
        sort_records(&mut records, &SortConfig::new(key, direction));
        assert_eq!(names(&records), expected);
    }

    #[test]
    fn test_sort_ties_keep_incoming_order() {
        let a = snapshot(10, "a", &["normal"], [50; 6]);
        let b = snapshot(11, "b", &["normal"], [60, 40, 50, 50, 50, 50]);
        let c = snapshot(12, "c", &["normal"], [40, 60, 50, 50, 50, 50]);
        let mut records = vec![c, a, b];

        sort_records(&mut records, &SortConfig::new(SortKey::Total, SortDirection::Desc));
        assert_eq!(names(&records), vec!["c", "a", "b"]);
        sort_records(&mut records, &SortConfig::new(SortKey::Total, SortDirection::Asc));
        assert_eq!(names(&records), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_missing_stat_sorts_as_zero() {
        let mut blank = snapshot(3, "blank", &["normal"], [0; 6]);
        blank.stats.clear();
        let mut records = vec![pikachu(), blank];
        sort_records(&mut records, &SortConfig::new(SortKey::Hp, SortDirection::Asc));
        assert_eq!(names(&records), vec!["blank", "pikachu"]);
    }

    #[test]
    fn test_filter_applies_before_sort() {
        let arranged = arrange(
            roster(),
            &["water", "flying"],
            &SortConfig::new(SortKey::Defense, SortDirection::Desc),
        );
        assert_eq!(names(&arranged), vec!["pelipper", "gyarados"]);
    }

    #[rstest]
    #[case("id", SortKey::Id)]
    #[case("Special-Attack", SortKey::SpecialAttack)]
    #[case("total", SortKey::Total)]
    fn test_sort_key_parsing(#[case] input: &str, #[case] expected: SortKey) {
        assert_eq!(input.parse::<SortKey>().unwrap(), expected);
    }

    #[test]
    fn test_stat_key_keeps_list_order() {
        assert!(SortKey::Speed.is_stat());
        assert!(!SortKey::Name.is_stat());

        let provider = FakeProvider::with(roster());
        let entries = provider.entries();
        let query = ListQuery {
            sort: SortConfig::new(SortKey::Speed, SortDirection::Desc),
            ..Default::default()
        };
        assert_eq!(filter_entries(&entries, &query), entries);
    }

    #[test]
    fn test_unknown_sort_key() {
        assert!("weight".parse::<SortKey>().is_err());
    }

    #[test]
    fn test_filter_entries() {
        let provider = FakeProvider::with(roster());
        let entries = provider.entries();

        let query = ListQuery {
            search: "P".to_string(),
            favorites_only: None,
            sort: SortConfig::new(SortKey::Name, SortDirection::Asc),
        };
        let found: Vec<String> = filter_entries(&entries, &query)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(found, vec!["pelipper", "pikachu"]);

        let query = ListQuery {
            favorites_only: Some(vec!["4".to_string(), "130".to_string()]),
            sort: SortConfig::new(SortKey::Id, SortDirection::Desc),
            ..Default::default()
        };
        let found: Vec<String> = filter_entries(&entries, &query)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(found, vec!["gyarados", "charmander"]);
    }

    #[test]
    fn test_pagination() {
        let items: Vec<u32> = (1..=45).collect();
        assert_eq!(page_count(items.len(), 20), 3);
        assert_eq!(page_count(0, 20), 0);
        assert_eq!(page_window(&items, 1, 20).len(), 20);
        assert_eq!(page_window(&items, 3, 20), &[41, 42, 43, 44, 45]);
        assert!(page_window(&items, 4, 20).is_empty());
        assert!(page_window(&items, 0, 20).is_empty());
    }

    #[tokio::test]
    async fn test_load_page_memoizes_details() {
        let browser = browser(roster(), 4);
        let entries = browser.load_entries().await.unwrap();
        assert_eq!(entries.len(), 6);

        let sort = SortConfig::new(SortKey::Total, SortDirection::Desc);
        let none: [&str; 0] = [];
        let PageLoad::Current(page) = browser.load_page(&entries, 1, &none, &sort).await else {
            panic!("first load should be current");
        };
        assert_eq!(names(&page), vec!["pikachu", "bulbasaur", "squirtle", "charmander"]);
        assert_eq!(browser.provider().pokemon_calls(), 4);

        // same page again, filtered differently: all cache hits
        browser.load_page(&entries, 1, &["fire"], &sort).await;
        assert_eq!(browser.provider().pokemon_calls(), 4);

        let PageLoad::Current(page) = browser.load_page(&entries, 2, &["water", "flying"], &sort).await
        else {
            panic!("second page should be current");
        };
        assert_eq!(names(&page), vec!["gyarados", "pelipper"]);
        assert_eq!(browser.provider().pokemon_calls(), 6);
        assert_eq!(browser.cache().size(), 6);
    }

    #[tokio::test]
    async fn test_failed_detail_is_dropped_from_page() {
        let browser = browser(vec![bulbasaur()], 20);
        let entries = vec![
            NamedAPIResource {
                name: "bulbasaur".to_string(),
                url: "https://pokeapi.co/api/v2/pokemon/1/".to_string(),
            },
            NamedAPIResource {
                name: "ghost-entry".to_string(),
                url: "https://pokeapi.co/api/v2/pokemon/9999/".to_string(),
            },
        ];
        let none: [&str; 0] = [];
        let page = browser
            .load_page(&entries, 1, &none, &SortConfig::default())
            .await;
        assert_eq!(page, PageLoad::Current(vec![bulbasaur()]));
    }

    #[tokio::test]
    async fn test_superseded_request_is_stale() {
        let browser = browser(roster(), 2);
        let entries = browser.load_entries().await.unwrap();
        let none: [&str; 0] = [];
        let sort = SortConfig::default();

        let (first, second) = tokio::join!(
            browser.load_page(&entries, 1, &none, &sort),
            browser.load_page(&entries, 2, &none, &sort)
        );

        assert!(matches!(first, PageLoad::Stale(_)));
        let PageLoad::Current(page) = second else {
            panic!("latest request should win");
        };
        assert_eq!(names(&page), vec!["squirtle", "pikachu"]);
    }

    #[tokio::test]
    async fn test_cache_disabled_refetches() {
        let browser = PokedexBrowser::new(
            FakeProvider::with(vec![pikachu()]),
            PokedexConfig::default(),
            CacheConfig::default(),
            false,
        );
        let entry = NamedAPIResource {
            name: "pikachu".to_string(),
            url: "https://pokeapi.co/api/v2/pokemon/25/".to_string(),
        };
        browser.details(&entry).await.unwrap();
        browser.details(&entry).await.unwrap();
        assert_eq!(browser.provider().pokemon_calls(), 2);
        assert_eq!(browser.provider().fetched(), vec!["25", "25"]);
    }

    const PICHU_CHAIN: &str = r#"{
        "id": 10,
        "chain": {
            "species": {"name": "pichu", "url": "https://pokeapi.co/api/v2/pokemon-species/172/"},
            "is_baby": true,
            "evolves_to": [{
                "species": {"name": "pikachu", "url": "https://pokeapi.co/api/v2/pokemon-species/25/"},
                "evolves_to": [{
                    "species": {"name": "raichu", "url": "https://pokeapi.co/api/v2/pokemon-species/26/"},
                    "evolves_to": []
                }]
            }]
        }
    }"#;

    #[tokio::test]
    async fn test_detail_view_attaches_evolution_stages() {
        let chain_url = "https://pokeapi.co/api/v2/evolution-chain/10/";
        let provider = FakeProvider::with(vec![pikachu()])
            .with_species(SpeciesMeta {
                name: "pikachu".to_string(),
                egg_groups: vec!["ground".to_string(), "fairy".to_string()],
                evolution_chain_url: Some(chain_url.to_string()),
                flavor_text: "It keeps its tail raised.".to_string(),
            })
            .with_chain(chain_url, serde_json::from_str(PICHU_CHAIN).unwrap());
        let browser = PokedexBrowser::new(
            provider,
            PokedexConfig::default(),
            CacheConfig::default(),
            true,
        );

        let view = browser.detail_view("pikachu").await.unwrap();
        let stages: Vec<(&str, Option<u32>, usize)> = view
            .evolution
            .iter()
            .map(|s| (s.name.as_str(), s.id, s.depth))
            .collect();
        assert_eq!(
            stages,
            vec![
                ("pichu", Some(172), 0),
                ("pikachu", Some(25), 1),
                ("raichu", Some(26), 2),
            ]
        );
        assert_eq!(view.species.flavor_text, "It keeps its tail raised.");
        assert_eq!(view.defenses.takes_2x, vec![crate::type_chart::PokemonType::Ground]);
        assert_eq!(view.defenses.takes_half.len(), 3);
    }

    #[tokio::test]
    async fn test_detail_view_degrades_without_evolution_chain() {
        let provider = FakeProvider::with(vec![pikachu()]).with_species(SpeciesMeta {
            name: "pikachu".to_string(),
            egg_groups: vec!["ground".to_string(), "fairy".to_string()],
            evolution_chain_url: Some("https://pokeapi.co/api/v2/evolution-chain/10/".to_string()),
            flavor_text: "It keeps its tail raised.".to_string(),
        });
        let browser = PokedexBrowser::new(
            provider,
            PokedexConfig::default(),
            CacheConfig::default(),
            true,
        );

        let view = browser.detail_view("pikachu").await.unwrap();
        assert_eq!(view.pokemon.id, 25);
        assert!(view.evolution.is_empty());
        assert_eq!(view.defenses.takes_2x, vec![crate::type_chart::PokemonType::Ground]);

        assert!(matches!(
            browser.detail_view("missingno").await,
            Err(AppError::DataFetch { .. })
        ));
    }
}
