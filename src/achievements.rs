//! Achievement rules evaluated over a snapshot of the stored counters.

use serde::Serialize;
use std::collections::BTreeSet;

/// Counter values at one point in time. The host takes the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AchievementContext {
    pub pokemon_viewed_count: u64,
    pub favorites_count: u64,
    pub battles_won: u64,
    pub teams_saved: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    PokemonViewed,
    Favorites,
    BattlesWon,
    TeamsSaved,
}

impl Metric {
    fn read(self, ctx: &AchievementContext) -> u64 {
        match self {
            Metric::PokemonViewed => ctx.pokemon_viewed_count,
            Metric::Favorites => ctx.favorites_count,
            Metric::BattlesWon => ctx.battles_won,
            // only whether a team exists counts
            Metric::TeamsSaved => ctx.teams_saved.min(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub points: u32,
    pub metric: Metric,
    pub target: u64,
}

impl Achievement {
    pub fn is_unlocked(&self, ctx: &AchievementContext) -> bool {
        self.metric.read(ctx) >= self.target
    }

    /// `(current, target)`, current not clamped to the target.
    pub fn progress(&self, ctx: &AchievementContext) -> (u64, u64) {
        (self.metric.read(ctx), self.target)
    }
}

pub const ACHIEVEMENTS: [Achievement; 5] = [
    Achievement {
        id: "view_10_pokemon",
        name: "Rookie Explorer",
        description: "View details of 10 different Pokémon.",
        points: 10,
        metric: Metric::PokemonViewed,
        target: 10,
    },
    Achievement {
        id: "view_50_pokemon",
        name: "Seasoned Adventurer",
        description: "View details of 50 different Pokémon.",
        points: 50,
        metric: Metric::PokemonViewed,
        target: 50,
    },
    Achievement {
        id: "add_favorite",
        name: "First Favorite!",
        description: "Mark your first Pokémon as a favorite.",
        points: 5,
        metric: Metric::Favorites,
        target: 1,
    },
    Achievement {
        id: "win_battle",
        name: "Battle Novice",
        description: "Win your first simulated battle.",
        points: 20,
        metric: Metric::BattlesWon,
        target: 1,
    },
    Achievement {
        id: "create_team",
        name: "Team Strategist",
        description: "Create and save your first Pokémon team.",
        points: 15,
        metric: Metric::TeamsSaved,
        target: 1,
    },
];

/// Ids of every unlocked achievement.
pub fn evaluate(ctx: &AchievementContext) -> BTreeSet<&'static str> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| a.is_unlocked(ctx))
        .map(|a| a.id)
        .collect()
}

pub fn total_points(ctx: &AchievementContext) -> u32 {
    ACHIEVEMENTS
        .iter()
        .filter(|a| a.is_unlocked(ctx))
        .map(|a| a.points)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AchievementStatus {
    pub id: &'static str,
    pub name: &'static str,
    pub points: u32,
    pub unlocked: bool,
    pub current: u64,
    pub target: u64,
}

pub fn statuses(ctx: &AchievementContext) -> Vec<AchievementStatus> {
    ACHIEVEMENTS
        .iter()
        .map(|a| {
            let (current, target) = a.progress(ctx);
            AchievementStatus {
                id: a.id,
                name: a.name,
                points: a.points,
                unlocked: a.is_unlocked(ctx),
                current,
                target,
            }
        })
        .collect()
}
