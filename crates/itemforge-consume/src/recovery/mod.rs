//! Potion recovery: instant or stepped refills of a current/maximum pool

pub mod scheduler;

use std::sync::Arc;
use std::time::{Duration, Instant};

use itemforge_core::{AttributeKind, AttributePool, Character, RecoverConfiguration};

use crate::contract::{ConsumeEffect, EffectContext};
use crate::outcome::{EffectReport, Precondition, Refusal};

pub use scheduler::{RecoveryScheduler, RecoveryStart};

/// One delayed portion of a recovery
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedStep {
    pub delay: Duration,
    pub amount: f32,
}

/// A computed recovery, fixed at the moment the potion is consumed
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryPlan {
    pub current: AttributeKind,
    pub maximum: AttributeKind,
    pub total_amount: f32,
    /// Empty for an instant recovery
    pub steps: Vec<PlannedStep>,
}

impl RecoveryPlan {
    pub fn is_instant(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Restores a current attribute relative to its maximum
pub struct RecoverBehavior {
    current: AttributeKind,
    maximum: AttributeKind,
    config: RecoverConfiguration,
    scheduler: Arc<RecoveryScheduler>,
}

impl RecoverBehavior {
    pub fn new(
        current: AttributeKind,
        maximum: AttributeKind,
        config: RecoverConfiguration,
        scheduler: Arc<RecoveryScheduler>,
    ) -> Self {
        Self {
            current,
            maximum,
            config,
            scheduler,
        }
    }

    pub fn for_pool(
        pool: AttributePool,
        config: RecoverConfiguration,
        scheduler: Arc<RecoveryScheduler>,
    ) -> Self {
        Self::new(pool.current(), pool.maximum(), config, scheduler)
    }

    pub fn config(&self) -> &RecoverConfiguration {
        &self.config
    }

    /// Work out how much to restore and when, given the live maximum
    pub fn plan(&self, item_level: u8, character_level: u16, maximum_value: f32) -> RecoveryPlan {
        let level = f32::from(item_level);
        let percentage = self.config.total_recover_percentage
            + level * self.config.recover_percentage_increase_by_potion_level;
        let additional = (self.config.additional_recover_minus_character_level
            - f32::from(character_level))
        .max(0.0);
        let total_amount = maximum_value * percentage / 100.0 + additional;

        let delay_reduction =
            (self.config.recover_delay_reduction_by_potion_level * level).clamp(0.0, 1.0);
        let steps = if self.config.steps.is_empty() || delay_reduction >= 1.0 {
            Vec::new()
        } else {
            self.config
                .steps
                .iter()
                .map(|step| PlannedStep {
                    delay: reduce_delay(step.delay_ms, delay_reduction),
                    amount: total_amount * step.recover_percentage / 100.0,
                })
                .collect()
        };

        RecoveryPlan {
            current: self.current,
            maximum: self.maximum,
            total_amount,
            steps,
        }
    }

    /// Remaining cooldown of this behavior's attribute family, if any
    pub fn cooldown_remaining(&self, character: &dyn Character, now: Instant) -> Option<Duration> {
        character
            .cooldown_until(self.current)
            .filter(|until| *until > now)
            .map(|until| until - now)
    }
}

/// Shorten a step delay by a fraction in 0..=1, rounded to whole milliseconds
fn reduce_delay(delay_ms: u64, reduction: f32) -> Duration {
    let remaining = 1.0 - f64::from(reduction);
    Duration::from_millis((delay_ms as f64 * remaining).round() as u64)
}

impl ConsumeEffect for RecoverBehavior {
    fn name(&self) -> &str {
        self.current.name()
    }

    fn check(&self, ctx: &EffectContext<'_>) -> Result<(), Refusal> {
        match self.cooldown_remaining(&*ctx.character, ctx.now) {
            Some(remaining) => Err(Precondition::CooldownActive { remaining }.into()),
            None => Ok(()),
        }
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectReport {
        let cooldown = self.config.cooldown();
        if !cooldown.is_zero() {
            ctx.character
                .set_cooldown_until(self.current, ctx.now + cooldown);
        }

        let maximum_value = ctx.character.attributes().get(self.maximum);
        let plan = self.plan(ctx.item.level, ctx.character.level(), maximum_value);
        let total = plan.total_amount;
        match self.scheduler.start(ctx.handle, &mut *ctx.character, plan) {
            RecoveryStart::Immediate { applied } => EffectReport::Recovered {
                attribute: self.current,
                amount: applied,
            },
            RecoveryStart::Scheduled { steps } => EffectReport::RecoveryScheduled {
                attribute: self.current,
                total,
                steps,
            },
        }
    }
}
