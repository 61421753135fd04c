//! The 18 elemental types and the attacker-perspective type chart.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

use PokemonType::*;

impl PokemonType {
    pub const ALL: [PokemonType; 18] = [
        Normal, Fire, Water, Electric, Grass, Ice, Fighting, Poison, Ground, Flying, Psychic, Bug,
        Rock, Ghost, Dragon, Dark, Steel, Fairy,
    ];

    pub fn all() -> &'static [PokemonType] {
        &Self::ALL
    }

    /// Lowercase identifier as used by the data provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Normal => "normal",
            Fire => "fire",
            Water => "water",
            Electric => "electric",
            Grass => "grass",
            Ice => "ice",
            Fighting => "fighting",
            Poison => "poison",
            Ground => "ground",
            Flying => "flying",
            Psychic => "psychic",
            Bug => "bug",
            Rock => "rock",
            Ghost => "ghost",
            Dragon => "dragon",
            Dark => "dark",
            Steel => "steel",
            Fairy => "fairy",
        }
    }

    /// Case-insensitive lookup; `None` for anything outside the 18 types.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(name.trim()))
    }

    pub fn chart_entry(&self) -> &'static TypeChartEntry {
        &TYPE_CHART[*self as usize]
    }
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown type: {0}")]
pub struct UnknownType(pub String);

impl FromStr for PokemonType {
    type Err = UnknownType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownType(s.to_string()))
    }
}

/// How one attacking type fares against each defending type.
///
/// `strengths` take double damage, `weaknesses` resist (half damage) and
/// `immunes` take none. A type appears in at most one of the three lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeChartEntry {
    pub name: PokemonType,
    pub immunes: &'static [PokemonType],
    pub weaknesses: &'static [PokemonType],
    pub strengths: &'static [PokemonType],
}

/// Indexed by `PokemonType as usize`.
pub static TYPE_CHART: [TypeChartEntry; 18] = [
    TypeChartEntry {
        name: Normal,
        immunes: &[Ghost],
        weaknesses: &[Rock, Steel],
        strengths: &[],
    },
    TypeChartEntry {
        name: Fire,
        immunes: &[],
        weaknesses: &[Fire, Water, Rock, Dragon],
        strengths: &[Grass, Ice, Bug, Steel],
    },
    TypeChartEntry {
        name: Water,
        immunes: &[],
        weaknesses: &[Water, Grass, Dragon],
        strengths: &[Fire, Ground, Rock],
    },
    TypeChartEntry {
        name: Electric,
        immunes: &[Ground],
        weaknesses: &[Electric, Grass, Dragon],
        strengths: &[Water, Flying],
    },
    TypeChartEntry {
        name: Grass,
        immunes: &[],
        weaknesses: &[Fire, Grass, Poison, Flying, Bug, Dragon, Steel],
        strengths: &[Water, Ground, Rock],
    },
    TypeChartEntry {
        name: Ice,
        immunes: &[],
        weaknesses: &[Fire, Water, Ice, Steel],
        strengths: &[Grass, Ground, Flying, Dragon],
    },
    TypeChartEntry {
        name: Fighting,
        immunes: &[Ghost],
        weaknesses: &[Poison, Flying, Psychic, Bug, Fairy],
        strengths: &[Normal, Ice, Rock, Dark, Steel],
    },
    TypeChartEntry {
        name: Poison,
        immunes: &[Steel],
        weaknesses: &[Poison, Ground, Rock, Ghost],
        strengths: &[Grass, Fairy],
    },
    TypeChartEntry {
        name: Ground,
        immunes: &[Flying],
        weaknesses: &[Grass, Bug],
        strengths: &[Fire, Electric, Poison, Rock, Steel],
    },
    TypeChartEntry {
        name: Flying,
        immunes: &[],
        weaknesses: &[Electric, Rock, Steel],
        strengths: &[Grass, Fighting, Bug],
    },
    TypeChartEntry {
        name: Psychic,
        immunes: &[Dark],
        weaknesses: &[Psychic, Steel],
        strengths: &[Fighting, Poison],
    },
    TypeChartEntry {
        name: Bug,
        immunes: &[],
        weaknesses: &[Fire, Fighting, Poison, Flying, Ghost, Steel, Fairy],
        strengths: &[Grass, Psychic, Dark],
    },
    TypeChartEntry {
        name: Rock,
        immunes: &[],
        weaknesses: &[Fighting, Ground, Steel],
        strengths: &[Fire, Ice, Flying, Bug],
    },
    TypeChartEntry {
        name: Ghost,
        immunes: &[Normal],
        weaknesses: &[Dark],
        strengths: &[Psychic, Ghost],
    },
    TypeChartEntry {
        name: Dragon,
        immunes: &[Fairy],
        weaknesses: &[Steel],
        strengths: &[Dragon],
    },
    TypeChartEntry {
        name: Dark,
        immunes: &[],
        weaknesses: &[Fighting, Dark, Fairy],
        strengths: &[Psychic, Ghost],
    },
    TypeChartEntry {
        name: Steel,
        immunes: &[],
        weaknesses: &[Fire, Water, Electric, Steel],
        strengths: &[Ice, Rock, Fairy],
    },
    TypeChartEntry {
        name: Fairy,
        immunes: &[],
        weaknesses: &[Fire, Poison, Steel],
        strengths: &[Fighting, Dragon, Dark],
    },
];

/// Case-insensitive chart lookup by type name.
pub fn lookup(name: &str) -> Option<&'static TypeChartEntry> {
    PokemonType::parse(name).map(|t| t.chart_entry())
}
