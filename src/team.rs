use crate::error::{AppError, ValidationError};
use crate::pokemon::PokemonSnapshot;
use crate::provider::DataProvider;
use serde::{Deserialize, Serialize};

pub const MAX_TEAM_SIZE: usize = 6;

/// A named team as persisted. Names are unique within the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTeam {
    pub name: String,
    pub members: Vec<PokemonSnapshot>,
}

/// The team currently being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamBuilder {
    members: Vec<PokemonSnapshot>,
}

impl TeamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[PokemonSnapshot] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= MAX_TEAM_SIZE
    }

    /// Reject a candidate before anything is fetched for it.
    ///
    /// `id_or_name` matches a member by case-insensitive name or by id.
    pub fn check_can_add(&self, id_or_name: &str) -> Result<(), ValidationError> {
        if self.is_full() {
            return Err(ValidationError::TeamFull);
        }
        let wanted = id_or_name.trim();
        let duplicate = self
            .members
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(wanted) || p.id.to_string() == wanted);
        if duplicate {
            return Err(ValidationError::DuplicateMember(wanted.to_string()));
        }
        Ok(())
    }

    pub fn add(&mut self, pokemon: PokemonSnapshot) -> Result<(), ValidationError> {
        if self.is_full() {
            return Err(ValidationError::TeamFull);
        }
        if self.members.iter().any(|p| p.id == pokemon.id) {
            return Err(ValidationError::DuplicateMember(pokemon.name));
        }
        self.members.push(pokemon);
        Ok(())
    }

    /// Validate, fetch and append a member.
    pub async fn add_from<P: DataProvider>(
        &mut self,
        provider: &P,
        id_or_name: &str,
    ) -> Result<&PokemonSnapshot, AppError> {
        self.check_can_add(id_or_name)?;
        let pokemon = provider.get_pokemon(&id_or_name.trim().to_lowercase()).await?;
        self.add(pokemon)?;
        Ok(&self.members[self.members.len() - 1])
    }

    pub fn remove(&mut self, id: u32) -> Option<PokemonSnapshot> {
        let index = self.members.iter().position(|p| p.id == id)?;
        Some(self.members.remove(index))
    }

    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Replace the current members with a saved team's.
    pub fn load(&mut self, team: &SavedTeam) {
        self.members = team.members.iter().take(MAX_TEAM_SIZE).cloned().collect();
    }
}
