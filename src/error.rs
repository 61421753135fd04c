use thiserror::Error;

// Errors surfaced to the presentation layer. None of them is fatal.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to fetch {resource}: {reason}")]
    DataFetch { resource: String, reason: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl AppError {
    pub fn fetch(resource: impl Into<String>, reason: impl ToString) -> Self {
        AppError::DataFetch {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        let resource = err
            .url()
            .map(|url| url.to_string())
            .unwrap_or_else(|| "resource".to_string());
        AppError::fetch(resource, err)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Rejected user mutations. The requested change is not applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Team is full!")]
    TeamFull,

    #[error("{0} is already in your team!")]
    DuplicateMember(String),

    #[error("Please enter a name for your team.")]
    EmptyTeamName,

    #[error("Cannot save an empty team.")]
    EmptyTeam,

    #[error("No saved team named '{0}'")]
    UnknownTeam(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Failed to acquire store lock: {0}")]
    LockError(String),

    #[error("Invalid store key: {0}")]
    InvalidKey(String),

    #[error("Failed to serialize value for {key}: {reason}")]
    Serialize { key: String, reason: String },

    #[error("Failed to persist {key}: {reason}")]
    Io { key: String, reason: String },

    #[error("Could not determine home directory")]
    NoHomeDir,
}
