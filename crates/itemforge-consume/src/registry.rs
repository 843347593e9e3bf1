//! Maps item definitions to their consume handlers
//!
//! The table is built once, on `initialize` or first use, from every
//! consumable in the catalog. Later lookups are plain reads.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use itemforge_core::{
    ConsumeSpec, InvalidConfiguration, ItemCatalog, ItemDefinition, ItemIdentifier,
};
use tracing::{debug, info, warn};

use crate::contract::{ConsumeEffect, ConsumeHandler};
use crate::handlers::{self, HandlerServices};
use crate::magic::MagicEffectBehavior;
use crate::recovery::RecoverBehavior;
use crate::upgrade::level::LevelUpgradeEffect;
use crate::upgrade::UpgradeEffect;

/// Catalog content that cannot be turned into a handler
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("item {item} names unknown consume handler '{name}'")]
    UnknownHandler { item: ItemIdentifier, name: String },

    #[error("handler '{handler}' of item {item} needs a consume effect definition")]
    MissingEffectDefinition { item: ItemIdentifier, handler: String },

    #[error("item {item} recovers no attribute pools")]
    NoPools { item: ItemIdentifier },

    #[error("item {item} has an invalid consume configuration")]
    Invalid {
        item: ItemIdentifier,
        #[source]
        source: InvalidConfiguration,
    },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("no consume handler for item {0}")]
    NotFound(ItemIdentifier),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

type HandlerTable = HashMap<ItemIdentifier, Arc<ConsumeHandler>>;

pub struct ConsumeRegistry {
    catalog: Arc<ItemCatalog>,
    services: HandlerServices,
    handlers: OnceLock<Result<HandlerTable, ConfigError>>,
    builds: AtomicUsize,
}

impl ConsumeRegistry {
    pub fn new(catalog: Arc<ItemCatalog>, services: HandlerServices) -> Self {
        Self {
            catalog,
            services,
            handlers: OnceLock::new(),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn catalog(&self) -> &Arc<ItemCatalog> {
        &self.catalog
    }

    /// Build the table now. Returns the number of registered handlers.
    pub fn initialize(&self) -> Result<usize, ConfigError> {
        self.table().map(HashMap::len)
    }

    /// The handler for `definition`
    pub fn resolve(&self, definition: &ItemDefinition) -> Result<Arc<ConsumeHandler>, ResolveError> {
        self.table()?
            .get(&definition.id)
            .cloned()
            .ok_or(ResolveError::NotFound(definition.id))
    }

    /// How many times the table was built; at most once per registry
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    fn table(&self) -> Result<&HandlerTable, ConfigError> {
        self.handlers
            .get_or_init(|| self.build())
            .as_ref()
            .map_err(Clone::clone)
    }

    fn build(&self) -> Result<HandlerTable, ConfigError> {
        self.builds.fetch_add(1, Ordering::SeqCst);

        let mut table = HashMap::new();
        for definition in self.catalog.consumables() {
            let handler = match build_handler(definition, &self.services) {
                Ok(Some(handler)) => handler,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Consume registry build failed: {}", e);
                    return Err(e);
                }
            };
            debug!("'{}' uses handler '{}'", definition.name, handler.name());
            table.insert(definition.id, Arc::new(handler));
        }

        info!("Consume registry built with {} handlers", table.len());
        Ok(table)
    }
}

/// Build the handler an item declares, if it declares one
fn build_handler(
    definition: &ItemDefinition,
    services: &HandlerServices,
) -> Result<Option<ConsumeHandler>, ConfigError> {
    let invalid = |source| ConfigError::Invalid {
        item: definition.id,
        source,
    };

    let handler = match (&definition.consume, &definition.consume_effect) {
        (Some(ConsumeSpec::Handler { name }), _) => handlers::create(name, definition, services)?,
        (Some(ConsumeSpec::Recover { pools, config }), _) => {
            config.validate().map_err(invalid)?;
            if pools.is_empty() {
                return Err(ConfigError::NoPools { item: definition.id });
            }
            let effects = pools
                .iter()
                .map(|pool| {
                    Box::new(RecoverBehavior::for_pool(
                        *pool,
                        config.clone(),
                        Arc::clone(&services.scheduler),
                    )) as Box<dyn ConsumeEffect>
                })
                .collect();
            ConsumeHandler::new("recover", effects)
        }
        (Some(ConsumeSpec::Upgrade(config)), _) => {
            config.validate().map_err(invalid)?;
            ConsumeHandler::single("upgrade", UpgradeEffect::new(config.clone()))
        }
        (Some(ConsumeSpec::LevelUpgrade(config)), _) => {
            config.validate().map_err(invalid)?;
            ConsumeHandler::single("level_upgrade", LevelUpgradeEffect::new(config.clone()))
        }
        (None, Some(effect)) => ConsumeHandler::single(
            "magic_effect",
            MagicEffectBehavior::new(Arc::clone(effect), services.observer()),
        ),
        (None, None) => return Ok(None),
    };
    Ok(Some(handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use std::thread;

    #[test]
    fn test_resolves_every_consumable() {
        let registry = fixtures::registry();
        assert_eq!(registry.initialize(), Ok(fixtures::catalog().consumables().count()));

        let catalog = Arc::clone(registry.catalog());
        let potion = catalog.get(fixtures::LARGE_HEALING_POTION).unwrap();
        assert_eq!(registry.resolve(potion).unwrap().name(), "large_healing_potion");

        let ale = catalog.get(fixtures::ALE).unwrap();
        assert_eq!(registry.resolve(ale).unwrap().name(), "magic_effect");
    }

    #[test]
    fn test_non_consumable_not_found() {
        let registry = fixtures::registry();
        let sword = fixtures::sword_definition();
        assert_eq!(
            registry.resolve(&sword).unwrap_err(),
            ResolveError::NotFound(sword.id)
        );
    }

    #[test]
    fn test_initialize_builds_once() {
        let registry = fixtures::registry();
        registry.initialize().unwrap();
        registry.initialize().unwrap();
        let catalog = Arc::clone(registry.catalog());
        registry.resolve(catalog.get(fixtures::JEWEL_OF_BLESS).unwrap()).unwrap();
        assert_eq!(registry.build_count(), 1);
    }

    #[test]
    fn test_concurrent_first_use_builds_once() {
        let registry = Arc::new(fixtures::registry());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    let catalog = Arc::clone(registry.catalog());
                    let jewel = catalog.get(fixtures::JEWEL_OF_SOUL).unwrap();
                    registry.resolve(jewel).map(|h| h.name().to_string())
                })
            })
            .collect();

        for worker in workers {
            assert_eq!(worker.join().unwrap(), Ok("jewel_of_soul".to_string()));
        }
        assert_eq!(registry.build_count(), 1);
    }

    #[test]
    fn test_unknown_handler_is_fatal() {
        let mut broken = fixtures::potion_definition(1);
        broken.consume = Some(ConsumeSpec::Handler {
            name: "philosophers_stone".to_string(),
        });
        let catalog = ItemCatalog::from_definitions([broken]).unwrap();
        let registry = ConsumeRegistry::new(Arc::new(catalog), fixtures::services());

        assert!(matches!(
            registry.initialize(),
            Err(ConfigError::UnknownHandler { .. })
        ));
        // the failure is remembered rather than rebuilt
        assert!(registry.initialize().is_err());
        assert_eq!(registry.build_count(), 1);
    }

    #[test]
    fn test_alcohol_without_effect_is_fatal() {
        let mut broken = fixtures::potion_definition(1);
        broken.consume = Some(ConsumeSpec::Handler {
            name: "alcohol".to_string(),
        });
        let catalog = ItemCatalog::from_definitions([broken.clone()]).unwrap();
        let registry = ConsumeRegistry::new(Arc::new(catalog), fixtures::services());

        assert_eq!(
            registry.resolve(&broken).unwrap_err(),
            ResolveError::Config(ConfigError::MissingEffectDefinition {
                item: broken.id,
                handler: "alcohol".to_string(),
            })
        );
    }
}
