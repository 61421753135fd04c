//! Type effectiveness resolution and the matchup tables derived from it.

use crate::type_chart::{self, PokemonType};
use serde::Serialize;

/// Damage multiplier of `attacking_type` against a set of defending types.
///
/// Each defending type contributes a factor of 2 (strength), 0.5 (resisted)
/// or 0 (immune). An unknown attacking type is neutral, and so is any
/// defending type the chart does not mention.
pub fn resolve<S: AsRef<str>>(attacking_type: &str, defending_types: &[S]) -> f64 {
    let Some(entry) = type_chart::lookup(attacking_type) else {
        return 1.0;
    };

    let mut multiplier = 1.0;
    for defending in defending_types {
        let Some(defending) = PokemonType::parse(defending.as_ref()) else {
            continue;
        };
        if entry.strengths.contains(&defending) {
            multiplier *= 2.0;
        }
        if entry.weaknesses.contains(&defending) {
            multiplier *= 0.5;
        }
        if entry.immunes.contains(&defending) {
            multiplier *= 0.0;
        }
    }
    multiplier
}

pub fn resolve_types(attacking_type: PokemonType, defending_types: &[PokemonType]) -> f64 {
    let names: Vec<&str> = defending_types.iter().map(|t| t.as_str()).collect();
    resolve(attacking_type.as_str(), &names)
}

/// Coarse three-bucket view used by the type calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DefensiveMatchups {
    /// Attacking types dealing 2x or 4x.
    pub double_damage_from: Vec<PokemonType>,
    /// Attacking types dealing 0.5x or 0.25x.
    pub half_damage_from: Vec<PokemonType>,
    pub no_damage_from: Vec<PokemonType>,
}

pub fn defensive_matchups(defending_types: &[PokemonType]) -> DefensiveMatchups {
    let mut matchups = DefensiveMatchups::default();
    if defending_types.is_empty() {
        return matchups;
    }

    for &attacking in PokemonType::all() {
        let multiplier = resolve_types(attacking, defending_types);
        if multiplier == 0.0 {
            matchups.no_damage_from.push(attacking);
        } else if multiplier >= 2.0 {
            matchups.double_damage_from.push(attacking);
        } else if multiplier <= 0.5 {
            matchups.half_damage_from.push(attacking);
        }
    }
    matchups
}

/// Every attacking type bucketed by its exact multiplier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EffectivenessBreakdown {
    pub takes_4x: Vec<PokemonType>,
    pub takes_2x: Vec<PokemonType>,
    pub takes_1x: Vec<PokemonType>,
    pub takes_half: Vec<PokemonType>,
    pub takes_quarter: Vec<PokemonType>,
    pub takes_0x: Vec<PokemonType>,
}

pub fn effectiveness_breakdown<S: AsRef<str>>(defending_types: &[S]) -> EffectivenessBreakdown {
    let mut breakdown = EffectivenessBreakdown::default();
    for &attacking in PokemonType::all() {
        let multiplier = resolve(attacking.as_str(), defending_types);
        let bucket = if multiplier == 0.0 {
            &mut breakdown.takes_0x
        } else if multiplier == 0.25 {
            &mut breakdown.takes_quarter
        } else if multiplier == 0.5 {
            &mut breakdown.takes_half
        } else if multiplier == 2.0 {
            &mut breakdown.takes_2x
        } else if multiplier == 4.0 {
            &mut breakdown.takes_4x
        } else {
            &mut breakdown.takes_1x
        };
        bucket.push(attacking);
    }
    breakdown
}

/// Two-slot type picker. Picking the same type in both slots counts once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeSelection {
    first: Option<PokemonType>,
    second: Option<PokemonType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

impl TypeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `selected` in `slot`. Selecting the type already held by the
    /// other slot swaps the two slots.
    pub fn select(&mut self, slot: Slot, selected: PokemonType) {
        let (this, other) = match slot {
            Slot::First => (&mut self.first, &mut self.second),
            Slot::Second => (&mut self.second, &mut self.first),
        };
        if *this == Some(selected) {
            *this = None;
        } else if *other == Some(selected) {
            *other = *this;
            *this = Some(selected);
        } else {
            *this = Some(selected);
        }
    }

    pub fn types(&self) -> Vec<PokemonType> {
        let mut types = Vec::with_capacity(2);
        types.extend(self.first);
        if let Some(second) = self.second {
            if self.first != Some(second) {
                types.push(second);
            }
        }
        types
    }

    pub fn matchups(&self) -> DefensiveMatchups {
        defensive_matchups(&self.types())
    }
}
