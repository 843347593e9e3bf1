//! Scripted session that drives every kind of consumable once
//!
//! A single player enters the world, refines a weapon with jewels and
//! stones, drinks potions while hurt, and has a drink at the tavern.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use itemforge_consume::{ConsumeEngine, ConsumeOutcome, UsageHint};
use itemforge_core::{
    AttributePool, Character, CharacterHandle, GameRandom, Item, ItemCatalog, ItemIdentifier,
    ItemInstanceId,
};
use itemforge_world::{Player, PlayerSnapshot, World};
use serde::Serialize;
use tracing::{debug, info};

use crate::settings::DemoSettings;

const WEAPON: ItemIdentifier = ItemIdentifier::new(0, 0);
const JEWEL_OF_BLESS: ItemIdentifier = ItemIdentifier::new(14, 13);
const JEWEL_OF_SOUL: ItemIdentifier = ItemIdentifier::new(14, 14);
const JEWEL_OF_LIFE: ItemIdentifier = ItemIdentifier::new(14, 16);
const JEWEL_OF_HARMONY: ItemIdentifier = ItemIdentifier::new(14, 42);
const LOWER_REFINE_STONE: ItemIdentifier = ItemIdentifier::new(14, 43);
const LARGE_HEALING_POTION: ItemIdentifier = ItemIdentifier::new(14, 3);
const SIEGE_MANA_POTION: ItemIdentifier = ItemIdentifier::new(14, 41);
const ALE: ItemIdentifier = ItemIdentifier::new(14, 9);

/// Longest stepped recovery in the default catalog, with some slack
const RECOVERY_WAIT: Duration = Duration::from_millis(1200);

/// What happened during a session
#[derive(Debug, Clone, Serialize)]
pub struct DemoSummary {
    pub before: PlayerSnapshot,
    pub after: PlayerSnapshot,
    pub weapon: ItemSummary,
    pub uses: Vec<UseRecord>,
    /// Recoveries still pending when the player left
    pub cancelled_recoveries: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemSummary {
    pub name: String,
    pub level: u8,
    pub durability: u8,
    pub options: Vec<OptionSummary>,
}

impl ItemSummary {
    fn of(item: &Item) -> Self {
        Self {
            name: item.name().to_string(),
            level: item.level,
            durability: item.durability,
            options: item
                .options
                .iter()
                .map(|link| OptionSummary {
                    name: link.option.name.clone(),
                    level: link.level,
                    value: link.value(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionSummary {
    pub name: String,
    pub level: u8,
    pub value: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UseRecord {
    pub item: String,
    pub target: Option<String>,
    pub success: bool,
    pub outcome: String,
}

struct Session<'a> {
    engine: &'a ConsumeEngine,
    catalog: &'a ItemCatalog,
    character: CharacterHandle,
    rng: GameRandom,
    next_instance: u64,
    uses: Vec<UseRecord>,
}

impl Session<'_> {
    fn create(&mut self, id: ItemIdentifier) -> anyhow::Result<Item> {
        self.next_instance += 1;
        self.catalog
            .instantiate(id, ItemInstanceId(self.next_instance))
            .with_context(|| format!("item {} is not in the catalog", id))
    }

    fn consume(&mut self, item: &mut Item, target: Option<&mut Item>) -> anyhow::Result<ConsumeOutcome> {
        let item_name = item.name().to_string();
        let target_name = target.as_ref().map(|t| t.name().to_string());
        let outcome = self
            .engine
            .try_consume(&self.character, item, target, UsageHint::default(), &mut self.rng)
            .with_context(|| format!("'{}' cannot be consumed", item_name))?;

        debug!("{} -> {}", item_name, outcome);
        self.uses.push(UseRecord {
            item: item_name,
            target: target_name,
            success: outcome.is_success(),
            outcome: outcome.to_string(),
        });
        Ok(outcome)
    }

    /// Use a fresh copy of `id` on `target`, `times` times
    fn apply_to(&mut self, id: ItemIdentifier, target: &mut Item, times: u32) -> anyhow::Result<()> {
        for _ in 0..times {
            let mut jewel = self.create(id)?;
            self.consume(&mut jewel, Some(&mut *target))?;
        }
        Ok(())
    }
}

/// Run the scripted session on the current tokio runtime
pub async fn run(catalog: Arc<ItemCatalog>, engine: &ConsumeEngine, settings: &DemoSettings) -> anyhow::Result<DemoSummary> {
    let rng = match settings.seed {
        Some(seed) => GameRandom::seeded(seed),
        None => GameRandom::from_entropy(),
    };

    let mut world = World::new();
    let player = world.add_player(
        Player::new("Wanderer")
            .with_level(settings.character_level)
            .with_pool(AttributePool::Health, 40.0, 200.0)
            .with_pool(AttributePool::Mana, 10.0, 100.0),
    );
    let id = player.lock().id();
    let character = world
        .character(id)
        .context("player vanished right after entering")?;
    let before = player.lock().snapshot();

    let mut session = Session {
        engine,
        catalog: &catalog,
        character,
        rng,
        next_instance: 0,
        uses: Vec::new(),
    };

    info!("Refining the weapon");
    let mut weapon = session.create(WEAPON)?;
    session.apply_to(JEWEL_OF_BLESS, &mut weapon, 6)?;
    session.apply_to(JEWEL_OF_SOUL, &mut weapon, settings.upgrade_attempts)?;
    session.apply_to(JEWEL_OF_LIFE, &mut weapon, 3)?;
    session.apply_to(JEWEL_OF_HARMONY, &mut weapon, 1)?;
    session.apply_to(LOWER_REFINE_STONE, &mut weapon, 2)?;

    info!("Drinking potions");
    let mut healing = session.create(LARGE_HEALING_POTION)?;
    session.consume(&mut healing, None)?;
    // Second gulp lands inside the cooldown
    session.consume(&mut healing, None)?;
    tokio::time::sleep(RECOVERY_WAIT).await;

    let mut mana = session.create(SIEGE_MANA_POTION)?;
    session.consume(&mut mana, None)?;
    tokio::time::sleep(RECOVERY_WAIT).await;

    info!("Visiting the tavern");
    let mut ale = session.create(ALE)?;
    session.consume(&mut ale, None)?;
    session.consume(&mut ale, None)?;

    // Leave while one more recovery is in flight
    session.consume(&mut healing, None)?;
    let after = player.lock().snapshot();
    world.remove_player(id);
    let cancelled_recoveries = engine.character_removed(id);

    Ok(DemoSummary {
        before,
        after,
        weapon: ItemSummary::of(&weapon),
        uses: session.uses,
        cancelled_recoveries,
    })
}
