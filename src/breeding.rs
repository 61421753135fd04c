//! Egg-group based breeding compatibility. Gender is not modelled.

use crate::error::AppError;
use crate::provider::DataProvider;
use std::fmt;

const DITTO: &str = "ditto";
/// Egg group id of the Undiscovered group.
const NO_EGGS: &str = "no-eggs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedingCandidate {
    pub name: String,
    pub egg_groups: Vec<String>,
}

impl BreedingCandidate {
    pub fn new(name: &str, egg_groups: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            egg_groups: egg_groups.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn is_ditto(&self) -> bool {
        self.name.eq_ignore_ascii_case(DITTO)
    }

    fn is_undiscovered(&self) -> bool {
        self.egg_groups.iter().any(|g| g == NO_EGGS)
    }

    fn shares_group_with(&self, other: &BreedingCandidate) -> bool {
        self.egg_groups.iter().any(|g| other.egg_groups.contains(g))
    }
}

impl From<crate::pokemon::SpeciesMeta> for BreedingCandidate {
    fn from(meta: crate::pokemon::SpeciesMeta) -> Self {
        Self {
            name: meta.name,
            egg_groups: meta.egg_groups,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// One parent is Ditto and the other can breed.
    CompatibleWithDitto,
    SharedEggGroup,
    TwoDittos,
    Undiscovered,
    NoSharedEggGroup,
}

impl Compatibility {
    pub fn is_compatible(self) -> bool {
        matches!(
            self,
            Compatibility::CompatibleWithDitto | Compatibility::SharedEggGroup
        )
    }
}

/// Verdict plus the names it was computed for, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedingResult {
    pub compatibility: Compatibility,
    pub parent_a: String,
    pub parent_b: String,
}

impl fmt::Display for BreedingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = (&self.parent_a, &self.parent_b);
        match self.compatibility {
            Compatibility::CompatibleWithDitto => {
                let tag = |name: &str| {
                    if name.eq_ignore_ascii_case(DITTO) {
                        format!("{} (Ditto)", name)
                    } else {
                        name.to_string()
                    }
                };
                write!(
                    f,
                    "{} and {} are compatible for breeding!",
                    tag(a.as_str()),
                    tag(b.as_str())
                )
            }
            Compatibility::SharedEggGroup => write!(
                f,
                "{} and {} share an egg group and are likely compatible for breeding!",
                a, b
            ),
            Compatibility::TwoDittos => f.write_str("Two Dittos cannot breed with each other."),
            Compatibility::Undiscovered => f.write_str(
                "One or both Pokémon are in the Undiscovered egg group and cannot breed.",
            ),
            Compatibility::NoSharedEggGroup => write!(
                f,
                "{} and {} do not share a common egg group and are not compatible.",
                a, b
            ),
        }
    }
}

/// First matching rule wins: two Dittos, one Ditto, Undiscovered, shared group.
pub fn check_compatibility(a: &BreedingCandidate, b: &BreedingCandidate) -> BreedingResult {
    let compatibility = match (a.is_ditto(), b.is_ditto()) {
        (true, true) => Compatibility::TwoDittos,
        (true, false) | (false, true) => {
            let other = if a.is_ditto() { b } else { a };
            if other.is_undiscovered() {
                Compatibility::Undiscovered
            } else {
                Compatibility::CompatibleWithDitto
            }
        }
        (false, false) if a.is_undiscovered() || b.is_undiscovered() => {
            Compatibility::Undiscovered
        }
        (false, false) if a.shares_group_with(b) => Compatibility::SharedEggGroup,
        (false, false) => Compatibility::NoSharedEggGroup,
    };

    tracing::debug!("Breeding {} + {}: {:?}", a.name, b.name, compatibility);
    BreedingResult {
        compatibility,
        parent_a: a.name.clone(),
        parent_b: b.name.clone(),
    }
}

/// Fetch both species' egg groups and check them.
pub async fn check_species<P: DataProvider>(
    provider: &P,
    name_a: &str,
    name_b: &str,
) -> Result<BreedingResult, AppError> {
    let (a, b) = tokio::join!(provider.get_species(name_a), provider.get_species(name_b));
    let (a, b) = (BreedingCandidate::from(a?), BreedingCandidate::from(b?));
    Ok(check_compatibility(&a, &b))
}
