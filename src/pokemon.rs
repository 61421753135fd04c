// pokemon.rs
// Wire records returned by the data provider and the immutable snapshot the
// engine computes over.

use serde::{Deserialize, Serialize};

/// Stat names in the order the provider reports them.
pub const STAT_NAMES: [&str; 6] = [
    "hp",
    "attack",
    "defense",
    "special-attack",
    "special-defense",
    "speed",
];

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct NamedAPIResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl NamedAPIResource {
    /// Numeric id embedded in the resource url, if any.
    pub fn id(&self) -> Option<u32> {
        id_from_url(&self.url)
    }
}

/// Extract the id from urls shaped like `.../pokemon/25/`.
///
/// The id is the second-to-last path segment, so the trailing slash matters.
pub fn id_from_url(url: &str) -> Option<u32> {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 2 {
        return None;
    }
    parts[parts.len() - 2].parse().ok()
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Pokemon {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub types: Vec<PokemonType>,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub abilities: Vec<PokemonAbility>,
    #[serde(default)]
    pub sprites: PokemonSprites,
    #[serde(default)]
    pub species: Option<NamedAPIResource>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PokemonType {
    pub slot: u32,
    pub r#type: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PokemonStat {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PokemonAbility {
    pub is_hidden: bool,
    pub slot: u32,
    pub ability: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PokemonSprites {
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<SpriteVariant>,
    #[serde(default)]
    pub home: Option<SpriteVariant>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SpriteVariant {
    pub front_default: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PokemonSpecies {
    pub name: String,
    #[serde(default)]
    pub evolution_chain: Option<ApiResource>,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorText>,
    #[serde(default)]
    pub egg_groups: Vec<NamedAPIResource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ApiResource {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FlavorText {
    pub flavor_text: String,
    pub language: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EvolutionChain {
    pub id: u32,
    pub chain: EvolutionLink,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EvolutionLink {
    pub species: NamedAPIResource,
    #[serde(default)]
    pub evolves_to: Vec<EvolutionLink>,
    #[serde(default)]
    pub is_baby: bool,
}

/// One species in a flattened evolution tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionStage {
    pub name: String,
    pub id: Option<u32>,
    pub depth: usize,
}

impl EvolutionChain {
    /// Flatten the tree in pre-order, recording how many evolutions deep
    /// each species sits.
    pub fn stages(&self) -> Vec<EvolutionStage> {
        let mut stages = Vec::new();
        let mut pending = vec![(&self.chain, 0)];
        while let Some((link, depth)) = pending.pop() {
            stages.push(EvolutionStage {
                name: link.species.name.clone(),
                id: link.species.id(),
                depth,
            });
            for next in link.evolves_to.iter().rev() {
                pending.push((next, depth + 1));
            }
        }
        stages
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct PokemonListResponse {
    pub count: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<NamedAPIResource>,
}

/// Move details as served by `/move/{id or name}`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Move {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub accuracy: Option<u32>,
    #[serde(default)]
    pub power: Option<u32>,
    #[serde(default)]
    pub pp: Option<u32>,
    pub r#type: NamedAPIResource,
    pub damage_class: NamedAPIResource,
    #[serde(default)]
    pub effect_entries: Vec<EffectEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct EffectEntry {
    pub effect: String,
    pub short_effect: String,
    pub language: NamedAPIResource,
}

impl Move {
    /// English short effect, if the provider has one.
    pub fn short_effect(&self) -> Option<&str> {
        self.effect_entries
            .iter()
            .find(|entry| entry.language.name == "en")
            .map(|entry| entry.short_effect.as_str())
    }
}

/// Breeding and description data for a species.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesMeta {
    pub name: String,
    pub egg_groups: Vec<String>,
    pub evolution_chain_url: Option<String>,
    pub flavor_text: String,
}

impl From<PokemonSpecies> for SpeciesMeta {
    fn from(species: PokemonSpecies) -> Self {
        let flavor_text = species
            .flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == "en")
            .map(|entry| entry.flavor_text.replace(['\u{c}', '\n'], " "))
            .unwrap_or_else(|| "No description available.".to_string());

        Self {
            name: species.name,
            egg_groups: species.egg_groups.into_iter().map(|g| g.name).collect(),
            evolution_chain_url: species.evolution_chain.map(|c| c.url),
            flavor_text,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BaseStat {
    pub name: String,
    pub value: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct SpriteRefs {
    pub front_default: Option<String>,
    pub official_artwork: Option<String>,
}

/// Immutable view of a species as fetched. Replaced, never mutated.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct PokemonSnapshot {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    pub stats: Vec<BaseStat>,
    #[serde(default)]
    pub abilities: Vec<String>,
    #[serde(default)]
    pub sprites: SpriteRefs,
}

impl PokemonSnapshot {
    pub fn stat(&self, name: &str) -> Option<u32> {
        self.stats.iter().find(|s| s.name == name).map(|s| s.value)
    }

    /// Sum of every reported base stat.
    pub fn total_stats(&self) -> u32 {
        self.stats.iter().map(|s| s.value).sum()
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(type_name))
    }
}

impl From<Pokemon> for PokemonSnapshot {
    fn from(pokemon: Pokemon) -> Self {
        let mut types = pokemon.types;
        types.sort_by_key(|t| t.slot);

        let official_artwork = pokemon
            .sprites
            .other
            .as_ref()
            .and_then(|o| o.official_artwork.as_ref())
            .and_then(|a| a.front_default.clone());

        Self {
            id: pokemon.id,
            name: pokemon.name,
            types: types.into_iter().map(|t| t.r#type.name).collect(),
            stats: pokemon
                .stats
                .into_iter()
                .map(|s| BaseStat {
                    name: s.stat.name,
                    value: s.base_stat,
                })
                .collect(),
            abilities: pokemon
                .abilities
                .into_iter()
                .map(|a| a.ability.name)
                .collect(),
            sprites: SpriteRefs {
                front_default: pokemon.sprites.front_default,
                official_artwork,
            },
        }
    }
}
