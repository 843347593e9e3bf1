//! Timed magic effects applied by consumables such as alcohol
//!
//! At most one effect per sub type is active on a character; applying a new
//! one replaces whatever was there.

use std::sync::Arc;
use std::time::{Duration, Instant};

use itemforge_core::{BoostElement, Character, EffectInstanceId, MagicEffect, MagicEffectDefinition};
use tracing::debug;

use crate::contract::{ConsumeEffect, EffectContext};
use crate::observer::ConsumeObserver;
use crate::outcome::{EffectReport, NotApplicable, Refusal};

/// Check that a definition can produce a live effect, returning its duration
pub fn validate_definition(definition: &MagicEffectDefinition) -> Result<Duration, NotApplicable> {
    if definition.power_ups.is_empty() {
        return Err(NotApplicable::NoBoostElements);
    }
    definition.duration().ok_or(NotApplicable::NoDuration)
}

/// Activate `definition` on `character`, replacing any effect of the same sub type.
///
/// Returns the new effect and whether one was replaced.
pub fn apply_effect(
    character: &mut dyn Character,
    definition: &Arc<MagicEffectDefinition>,
    now: Instant,
) -> Result<(MagicEffect, bool), NotApplicable> {
    let duration = validate_definition(definition)?;

    let effects = character.effects_mut();
    let previous = effects.find_active(definition.sub_type).map(|e| e.id);
    if let Some(id) = previous {
        effects.remove(id);
    }

    let effect = MagicEffect {
        id: EffectInstanceId::new(),
        definition: Arc::clone(definition),
        duration,
        started_at: now,
        elements: definition.power_ups.iter().map(BoostElement::from).collect(),
    };
    effects.add(effect.clone());
    Ok((effect, previous.is_some()))
}

/// Consume effect that activates a magic effect on the consumer
pub struct MagicEffectBehavior {
    definition: Arc<MagicEffectDefinition>,
    observer: Arc<dyn ConsumeObserver>,
}

impl MagicEffectBehavior {
    pub fn new(definition: Arc<MagicEffectDefinition>, observer: Arc<dyn ConsumeObserver>) -> Self {
        Self { definition, observer }
    }

    pub fn definition(&self) -> &MagicEffectDefinition {
        &self.definition
    }
}

impl ConsumeEffect for MagicEffectBehavior {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn check(&self, _ctx: &EffectContext<'_>) -> Result<(), Refusal> {
        validate_definition(&self.definition)?;
        Ok(())
    }

    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectReport {
        match apply_effect(&mut *ctx.character, &self.definition, ctx.now) {
            Ok((effect, replaced)) => {
                debug!(
                    "'{}' applied to {} (replaced: {})",
                    self.definition.name,
                    ctx.character.name(),
                    replaced
                );
                let duration = self.definition.send_duration.then_some(effect.duration);
                self.observer
                    .effect_activated(ctx.character.id(), &effect, duration);
                EffectReport::EffectApplied {
                    name: self.definition.name.clone(),
                    replaced,
                }
            }
            Err(reason) => EffectReport::Skipped(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use itemforge_core::{AttributeKind, EffectList};
    use itemforge_world::Player;

    #[test]
    fn test_apply_adds_effect() {
        let mut player = Player::new("Elf");
        let now = Instant::now();
        let (effect, replaced) = apply_effect(&mut player, &fixtures::ale_effect(), now).unwrap();
        assert!(!replaced);
        assert_eq!(effect.duration, Duration::from_secs(60));
        assert_eq!(player.effects.active_count(), 1);
        assert_eq!(player.effects.additive_boost(AttributeKind::AttackSpeed), 20.0);
    }

    #[test]
    fn test_same_sub_type_is_exclusive() {
        let mut player = Player::new("Elf");
        let start = Instant::now();
        let definition = fixtures::ale_effect();

        let (first, _) = apply_effect(&mut player, &definition, start).unwrap();
        let later = start + Duration::from_secs(30);
        let (second, replaced) = apply_effect(&mut player, &definition, later).unwrap();

        assert!(replaced);
        assert_ne!(first.id, second.id);
        assert_eq!(player.effects.count_sub_type(definition.sub_type), 1);
        let active = player.effects.find_active(definition.sub_type).unwrap();
        assert_eq!(active.id, second.id);
        assert_eq!(active.remaining(later), Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_definitions_refused() {
        let mut player = Player::new("Elf");
        let now = Instant::now();

        let mut no_boosts = (*fixtures::ale_effect()).clone();
        no_boosts.power_ups.clear();
        assert_eq!(
            apply_effect(&mut player, &Arc::new(no_boosts), now).map(|(_, r)| r),
            Err(NotApplicable::NoBoostElements)
        );

        let mut no_duration = (*fixtures::ale_effect()).clone();
        no_duration.duration_ms = Some(0);
        assert_eq!(
            apply_effect(&mut player, &Arc::new(no_duration), now).map(|(_, r)| r),
            Err(NotApplicable::NoDuration)
        );
        assert_eq!(player.effects.active_count(), 0);
    }
}
