//! Favorites, achievement counters and saved teams for one user, persisted
//! through a [`KeyValueStore`].

use crate::achievements::AchievementContext;
use crate::error::{AppError, ValidationError};
use crate::pokemon::PokemonSnapshot;
use crate::storage::{
    self, BATTLES_WON_KEY, ChangeEvent, FAVORITES_COUNT_KEY, FAVORITES_KEY, KeyValueStore,
    SAVED_TEAMS_KEY, Subscribers, SubscriptionId, VIEWED_COUNT_KEY,
};
use crate::team::{MAX_TEAM_SIZE, SavedTeam};

pub struct Profile<S> {
    store: S,
    subscribers: Subscribers,
}

impl<S: KeyValueStore> Profile<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            subscribers: Subscribers::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(ChangeEvent) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    pub fn favorites(&self) -> Vec<String> {
        storage::read_json(&self.store, FAVORITES_KEY)
    }

    pub fn is_favorite(&self, pokemon_id: &str) -> bool {
        self.favorites().iter().any(|id| id == pokemon_id)
    }

    /// Returns `false` when the id was already a favorite.
    ///
    /// The favorites counter only ever grows, so removing and re-adding a
    /// favorite counts twice.
    pub fn add_favorite(&self, pokemon_id: &str) -> Result<bool, AppError> {
        let mut favorites = self.favorites();
        if favorites.iter().any(|id| id == pokemon_id) {
            return Ok(false);
        }
        favorites.push(pokemon_id.to_string());
        storage::write_json(&self.store, FAVORITES_KEY, &favorites)?;
        storage::increment_counter(&self.store, FAVORITES_COUNT_KEY)?;

        tracing::debug!("Added favorite {}", pokemon_id);
        self.subscribers.notify(ChangeEvent::FavoritesChanged);
        self.subscribers
            .notify(ChangeEvent::AchievementCountersChanged);
        Ok(true)
    }

    /// Returns `false` when the id was not a favorite.
    pub fn remove_favorite(&self, pokemon_id: &str) -> Result<bool, AppError> {
        let mut favorites = self.favorites();
        let before = favorites.len();
        favorites.retain(|id| id != pokemon_id);
        if favorites.len() == before {
            return Ok(false);
        }
        storage::write_json(&self.store, FAVORITES_KEY, &favorites)?;

        tracing::debug!("Removed favorite {}", pokemon_id);
        self.subscribers.notify(ChangeEvent::FavoritesChanged);
        self.subscribers
            .notify(ChangeEvent::AchievementCountersChanged);
        Ok(true)
    }

    /// Flip the favorite flag and return the new state.
    pub fn toggle_favorite(&self, pokemon_id: &str) -> Result<bool, AppError> {
        if self.is_favorite(pokemon_id) {
            self.remove_favorite(pokemon_id)?;
            Ok(false)
        } else {
            self.add_favorite(pokemon_id)?;
            Ok(true)
        }
    }

    /// Count one detail-page view.
    pub fn record_view(&self) -> Result<u64, AppError> {
        let count = storage::increment_counter(&self.store, VIEWED_COUNT_KEY)?;
        self.subscribers
            .notify(ChangeEvent::AchievementCountersChanged);
        Ok(count)
    }

    pub fn record_battle_won(&self) -> Result<u64, AppError> {
        let count = storage::increment_counter(&self.store, BATTLES_WON_KEY)?;
        tracing::info!("Battles won: {}", count);
        self.subscribers
            .notify(ChangeEvent::AchievementCountersChanged);
        Ok(count)
    }

    /// Zero every counter. Favorites and teams are kept.
    pub fn reset_counters(&self) -> Result<(), AppError> {
        for key in [FAVORITES_COUNT_KEY, VIEWED_COUNT_KEY, BATTLES_WON_KEY] {
            self.store.set(key, "0".to_string())?;
        }
        self.subscribers
            .notify(ChangeEvent::AchievementCountersChanged);
        Ok(())
    }

    pub fn saved_teams(&self) -> Vec<SavedTeam> {
        storage::read_json(&self.store, SAVED_TEAMS_KEY)
    }

    /// Save under `name`, replacing any team already stored with that name.
    pub fn save_team(&self, name: &str, members: &[PokemonSnapshot]) -> Result<(), AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyTeamName.into());
        }
        if members.is_empty() {
            return Err(ValidationError::EmptyTeam.into());
        }
        if members.len() > MAX_TEAM_SIZE {
            return Err(ValidationError::TeamFull.into());
        }

        let mut teams = self.saved_teams();
        teams.retain(|team| team.name != name);
        teams.push(SavedTeam {
            name: name.to_string(),
            members: members.to_vec(),
        });
        storage::write_json(&self.store, SAVED_TEAMS_KEY, &teams)?;

        tracing::info!("Saved team '{}' with {} members", name, members.len());
        self.subscribers
            .notify(ChangeEvent::AchievementCountersChanged);
        Ok(())
    }

    pub fn load_team(&self, name: &str) -> Result<SavedTeam, AppError> {
        self.saved_teams()
            .into_iter()
            .find(|team| team.name == name)
            .ok_or_else(|| ValidationError::UnknownTeam(name.to_string()).into())
    }

    pub fn delete_team(&self, name: &str) -> Result<bool, AppError> {
        let mut teams = self.saved_teams();
        let before = teams.len();
        teams.retain(|team| team.name != name);
        if teams.len() == before {
            return Ok(false);
        }
        storage::write_json(&self.store, SAVED_TEAMS_KEY, &teams)?;

        tracing::info!("Deleted team '{}'", name);
        self.subscribers
            .notify(ChangeEvent::AchievementCountersChanged);
        Ok(true)
    }

    /// Snapshot of the counters for [`crate::achievements::evaluate`].
    pub fn achievement_context(&self) -> AchievementContext {
        AchievementContext {
            pokemon_viewed_count: storage::read_counter(&self.store, VIEWED_COUNT_KEY),
            favorites_count: storage::read_counter(&self.store, FAVORITES_COUNT_KEY),
            battles_won: storage::read_counter(&self.store, BATTLES_WON_KEY),
            teams_saved: self.saved_teams().len() as u64,
        }
    }
}
