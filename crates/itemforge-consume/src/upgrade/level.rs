//! Level upgrades: jewels that raise the item level itself

use itemforge_core::{Item, LevelUpgradeConfiguration, RandomSource};
use tracing::debug;

use crate::contract::{ConsumeEffect, EffectContext};
use crate::outcome::{EffectReport, NotApplicable, Precondition, Refusal};
use crate::upgrade::chance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelUpgradeOutcome {
    Raised { from: u8, to: u8 },
    Lowered { from: u8, to: u8 },
    Reset { from: u8 },
}

impl LevelUpgradeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Raised { .. })
    }
}

/// Raises the target's level on success; lowers or resets it on failure
#[derive(Debug, Clone)]
pub struct LevelUpgradeBehavior {
    config: LevelUpgradeConfiguration,
}

impl LevelUpgradeBehavior {
    pub fn new(config: LevelUpgradeConfiguration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LevelUpgradeConfiguration {
        &self.config
    }

    /// Whether `item` may be rolled at all
    pub fn check(&self, item: &Item) -> Result<(), Refusal> {
        if !item.definition.upgradable {
            return Err(Precondition::TargetNotUpgradable.into());
        }
        if !self.config.accepts_level(item.level) {
            return Err(Precondition::TargetLevelOutOfRange { level: item.level }.into());
        }
        if item.level >= item.definition.maximum_level {
            return Err(NotApplicable::ItemLevelMaxed.into());
        }
        Ok(())
    }

    /// Roll and apply. Callers run [`check`](Self::check) first.
    pub fn upgrade_item(&self, item: &mut Item, rng: &mut dyn RandomSource) -> LevelUpgradeOutcome {
        let from = item.level;
        let success = chance::roll(
            rng,
            item,
            self.config.success_chance,
            self.config.success_chance_boost,
            self.config.boost_option_type,
        );

        let outcome = if success {
            let to = from
                .saturating_add(self.config.level_increase)
                .min(item.definition.maximum_level);
            item.level = to;
            item.durability = item.maximum_durability();
            LevelUpgradeOutcome::Raised { from, to }
        } else {
            let reset = self.config.reset_threshold.is_some_and(|t| from >= t);
            item.level = if reset { 0 } else { from.saturating_sub(1) };
            item.durability = item.durability.min(item.maximum_durability());
            if reset {
                LevelUpgradeOutcome::Reset { from }
            } else {
                LevelUpgradeOutcome::Lowered { from, to: item.level }
            }
        };
        debug!("Level upgrade of '{}': {:?}", item.name(), outcome);
        outcome
    }
}

/// Consume effect wrapping a level upgrade of the target item
pub struct LevelUpgradeEffect {
    behavior: LevelUpgradeBehavior,
}

impl LevelUpgradeEffect {
    pub fn new(config: LevelUpgradeConfiguration) -> Self {
        Self {
            behavior: LevelUpgradeBehavior::new(config),
        }
    }
}

impl ConsumeEffect for LevelUpgradeEffect {
    fn name(&self) -> &str {
        "level upgrade"
    }

    fn check(&self, ctx: &EffectContext<'_>) -> Result<(), Refusal> {
        self.behavior.check(ctx.require_target()?)
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectReport {
        match ctx.target.as_deref_mut() {
            Some(target) => {
                EffectReport::LevelUpgrade(self.behavior.upgrade_item(target, &mut *ctx.rng))
            }
            None => EffectReport::Skipped(NotApplicable::ItemLevelMaxed),
        }
    }
}
