use thiserror::Error;

use crate::core::types::PlayerId;

#[derive(Error, Debug)]
pub enum FirstAidError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Player not attached: {0:?}")]
    UnknownPlayer(PlayerId),

    #[error("Unsupported snapshot schema version {found} (newest known is {supported})")]
    UnsupportedSchema { found: u32, supported: u32 },

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FirstAidError>;
