//! itemforge core - item data model and collaborator interfaces
//!
//! This crate provides the foundational types used by the consume engine:
//! - Item definitions, item instances, and option links
//! - Configuration value objects for upgrades and recoveries
//! - Magic effect definitions and live effects
//! - The attribute store, effect list, character, and random source traits
//! - The item catalog loaded at startup

pub mod attribute;
pub mod catalog;
pub mod character;
pub mod config;
pub mod effect;
pub mod error;
pub mod item;
pub mod random;
pub mod types;

pub use attribute::{AttributeKind, AttributePool, AttributeStore};
pub use catalog::ItemCatalog;
pub use character::{Character, CharacterHandle};
pub use config::{
    FailResult, InvalidConfiguration, LevelUpgradeConfiguration, RecoverConfiguration,
    RecoverStep, UpgradeConfiguration, UpgradeGuard,
};
pub use effect::{
    AggregateType, BoostElement, EffectList, MagicEffect, MagicEffectDefinition,
    PowerUpDefinition,
};
pub use error::CatalogError;
pub use item::{
    BasePowerUp, ConsumeSpec, IncreasableItemOption, Item, ItemDefinition, ItemOptionLink,
    LevelDependentOption, OptionType, MAX_ITEM_LEVEL,
};
pub use random::{select_random, FixedRandom, GameRandom, RandomSource};
pub use types::{CharacterId, EffectInstanceId, ItemIdentifier, ItemInstanceId};
