//! Entry point for consumption requests

use std::sync::Arc;

use itemforge_core::{CharacterHandle, CharacterId, Item, ItemCatalog, RandomSource};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::contract::{ConsumeRequest, UsageHint};
use crate::handlers::HandlerServices;
use crate::observer::ConsumeObserver;
use crate::outcome::ConsumeOutcome;
use crate::recovery::RecoveryScheduler;
use crate::registry::{ConfigError, ConsumeRegistry, ResolveError};

/// Resolves handlers and runs requests against them
pub struct ConsumeEngine {
    registry: ConsumeRegistry,
    scheduler: Arc<RecoveryScheduler>,
}

impl ConsumeEngine {
    /// Create an engine whose timed recoveries run on `runtime`
    pub fn new(
        catalog: Arc<ItemCatalog>,
        runtime: Handle,
        observer: Arc<dyn ConsumeObserver>,
    ) -> Self {
        let scheduler = Arc::new(RecoveryScheduler::new(runtime, observer));
        let registry = ConsumeRegistry::new(catalog, HandlerServices::new(Arc::clone(&scheduler)));
        Self { registry, scheduler }
    }

    /// Build the handler table. Call once when the world starts.
    pub fn initialize(&self) -> Result<usize, ConfigError> {
        let count = self.registry.initialize()?;
        info!("Consume engine ready ({} consumable items)", count);
        Ok(count)
    }

    pub fn registry(&self) -> &ConsumeRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Arc<RecoveryScheduler> {
        &self.scheduler
    }

    /// Consume `item`, optionally on `target`.
    ///
    /// An `Err` means the item has no usable handler; every refusal of a
    /// usable item is an `Ok` outcome. Destroying a depleted item is left to
    /// the caller.
    pub fn try_consume(
        &self,
        character: &CharacterHandle,
        item: &mut Item,
        target: Option<&mut Item>,
        usage: UsageHint,
        rng: &mut dyn RandomSource,
    ) -> Result<ConsumeOutcome, ResolveError> {
        let handler = self.registry.resolve(&item.definition)?;
        let item_name = item.definition.name.clone();
        let outcome = handler.try_consume(ConsumeRequest {
            character,
            item,
            target,
            usage,
            rng,
            now: tokio::time::Instant::now().into_std(),
        });
        debug!("Consuming '{}': {}", item_name, outcome);
        Ok(outcome)
    }

    /// Drop all pending work of a character that left the world
    pub fn character_removed(&self, id: CharacterId) -> usize {
        self.scheduler.cancel_character(id)
    }
}
