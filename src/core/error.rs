use thiserror::Error;

use crate::core::types::{CultureId, EntityId, ReligionId};

#[derive(Error, Debug)]
pub enum CivError {
    #[error("Agent not found: {0:?}")]
    AgentNotFound(EntityId),

    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityId),

    #[error("Culture not found: {0:?}")]
    CultureNotFound(CultureId),

    #[error("Religion not found: {0:?}")]
    ReligionNotFound(ReligionId),

    #[error("Action not found: {0}")]
    ActionNotFound(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Oracle timed out")]
    OracleTimeout,

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, CivError>;
