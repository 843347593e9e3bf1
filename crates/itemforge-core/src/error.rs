use std::path::PathBuf;

use crate::config::InvalidConfiguration;
use crate::types::ItemIdentifier;

/// Errors raised while loading an item catalog. All of them are data errors
/// and fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{0}': {1}")]
    Io(PathBuf, std::io::Error),

    #[error("failed to parse TOML catalog: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("item {0} is defined more than once")]
    DuplicateItem(ItemIdentifier),

    #[error("option {0} is defined more than once")]
    DuplicateOption(u16),

    #[error("item {item} references unknown option {option}")]
    UnknownOption { item: ItemIdentifier, option: u16 },

    #[error("option {0} has level entries that are not strictly increasing from 1")]
    NonMonotonicLevels(u16),

    #[error("option {0} skips a level between its level entries")]
    LevelGap(u16),

    #[error("item {item} has an invalid consume configuration: {source}")]
    InvalidConfiguration {
        item: ItemIdentifier,
        #[source]
        source: InvalidConfiguration,
    },
}
