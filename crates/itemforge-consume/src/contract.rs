//! The consume contract shared by every handler
//!
//! A request runs in two phases under the character lock. First every effect
//! checks the request without side effects; any refusal ends the request with
//! nothing mutated. Then the source item loses one durability point and every
//! effect is applied in order.

use std::time::Instant;

use itemforge_core::{Character, CharacterHandle, Item, RandomSource};
use tracing::debug;

use crate::outcome::{ConsumeOutcome, EffectReport, Precondition, Refusal};

/// Opaque client hint passed through to effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageHint(pub u8);

/// One consumption request
pub struct ConsumeRequest<'a> {
    pub character: &'a CharacterHandle,
    pub item: &'a mut Item,
    pub target: Option<&'a mut Item>,
    pub usage: UsageHint,
    pub rng: &'a mut dyn RandomSource,
    pub now: Instant,
}

/// What an effect sees while checking or applying
pub struct EffectContext<'a> {
    pub character: &'a mut dyn Character,
    /// Shared handle, for work that outlives the request
    pub handle: &'a CharacterHandle,
    /// The source item
    pub item: &'a Item,
    pub target: Option<&'a mut Item>,
    pub usage: UsageHint,
    pub rng: &'a mut dyn RandomSource,
    pub now: Instant,
}

impl EffectContext<'_> {
    /// The target item, or a refusal when none was supplied
    pub fn require_target(&self) -> Result<&Item, Refusal> {
        self.target
            .as_deref()
            .ok_or(Refusal::Precondition(Precondition::MissingTarget))
    }
}

/// One thing a consumable does
pub trait ConsumeEffect: Send + Sync {
    fn name(&self) -> &str;

    /// Decide whether the request can go ahead. Must not mutate anything.
    fn check(&self, ctx: &EffectContext<'_>) -> Result<(), Refusal>;

    /// Apply the effect. Only called after every check passed and the source
    /// was consumed.
    fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectReport;
}

/// Spend one durability point of the source item.
///
/// Returns false when the item was already depleted.
pub fn consume_source(item: &mut Item) -> bool {
    if item.durability == 0 {
        return false;
    }
    item.durability -= 1;
    true
}

/// A named list of effects run under the consume contract
pub struct ConsumeHandler {
    name: String,
    effects: Vec<Box<dyn ConsumeEffect>>,
}

impl ConsumeHandler {
    pub fn new(name: impl Into<String>, effects: Vec<Box<dyn ConsumeEffect>>) -> Self {
        Self {
            name: name.into(),
            effects,
        }
    }

    pub fn single(name: impl Into<String>, effect: impl ConsumeEffect + 'static) -> Self {
        Self::new(name, vec![Box::new(effect)])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn effects(&self) -> impl Iterator<Item = &dyn ConsumeEffect> {
        self.effects.iter().map(|e| e.as_ref())
    }

    pub fn try_consume(&self, request: ConsumeRequest<'_>) -> ConsumeOutcome {
        let ConsumeRequest {
            character: handle,
            item,
            mut target,
            usage,
            rng,
            now,
        } = request;

        let mut character = handle.lock();
        if !character.is_alive_and_active() {
            return ConsumeOutcome::PreconditionFailed(Precondition::CharacterInactive);
        }
        if item.is_depleted() {
            return ConsumeOutcome::PreconditionFailed(Precondition::ItemDepleted);
        }

        {
            let ctx = EffectContext {
                character: &mut *character,
                handle,
                item: &*item,
                target: target.as_deref_mut(),
                usage,
                rng: &mut *rng,
                now,
            };
            for effect in &self.effects {
                if let Err(refusal) = effect.check(&ctx) {
                    debug!(
                        "'{}' refused by {}: {:?}",
                        item.name(),
                        effect.name(),
                        refusal
                    );
                    return refusal.into();
                }
            }
        }

        if !consume_source(item) {
            return ConsumeOutcome::PreconditionFailed(Precondition::ItemDepleted);
        }
        debug!(
            "'{}' consumed by {} ({} durability left)",
            item.name(),
            character.name(),
            item.durability
        );

        let mut ctx = EffectContext {
            character: &mut *character,
            handle,
            item: &*item,
            target,
            usage,
            rng,
            now,
        };
        let reports = self
            .effects
            .iter()
            .map(|effect| effect.apply(&mut ctx))
            .collect();
        ConsumeOutcome::Consumed(reports)
    }
}

impl std::fmt::Debug for ConsumeHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsumeHandler")
            .field("name", &self.name)
            .field(
                "effects",
                &self.effects.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::outcome::NotApplicable;
    use itemforge_core::{AttributeKind, AttributePool, AttributeStore, FixedRandom};
    use itemforge_world::Player;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Adds 1 health, or refuses with the given reason
    struct Bump {
        refuse: Option<Refusal>,
    }

    impl ConsumeEffect for Bump {
        fn name(&self) -> &str {
            "bump"
        }

        fn check(&self, _ctx: &EffectContext<'_>) -> Result<(), Refusal> {
            match self.refuse {
                Some(refusal) => Err(refusal),
                None => Ok(()),
            }
        }

        fn apply(&self, ctx: &mut EffectContext<'_>) -> EffectReport {
            ctx.character.attributes_mut().add(AttributeKind::CurrentHealth, 1.0);
            EffectReport::Recovered {
                attribute: AttributeKind::CurrentHealth,
                amount: 1.0,
            }
        }
    }

    fn wounded() -> CharacterHandle {
        let player = Player::new("Elf").with_pool(AttributePool::Health, 10.0, 100.0);
        Arc::new(Mutex::new(player))
    }

    fn consume(handler: &ConsumeHandler, character: &CharacterHandle, item: &mut Item) -> ConsumeOutcome {
        let mut rng = FixedRandom::succeeding();
        handler.try_consume(ConsumeRequest {
            character,
            item,
            target: None,
            usage: UsageHint::default(),
            rng: &mut rng,
            now: Instant::now(),
        })
    }

    fn health(character: &CharacterHandle) -> f32 {
        character.lock().attributes().get(AttributeKind::CurrentHealth)
    }

    #[test]
    fn test_success_spends_one_durability() {
        let handler = ConsumeHandler::single("bump", Bump { refuse: None });
        let character = wounded();
        let mut item = fixtures::potion_item(3);

        let outcome = consume(&handler, &character, &mut item);
        assert!(outcome.is_success());
        assert_eq!(outcome.reports().len(), 1);
        assert_eq!(item.durability, 2);
        assert_eq!(health(&character), 11.0);
    }

    #[test]
    fn test_refusal_changes_nothing() {
        let handler = ConsumeHandler::new(
            "mixed",
            vec![
                Box::new(Bump { refuse: None }),
                Box::new(Bump {
                    refuse: Some(Refusal::NotApplicable(NotApplicable::OptionMaxed)),
                }),
            ],
        );
        let character = wounded();
        let mut item = fixtures::potion_item(3);

        let outcome = consume(&handler, &character, &mut item);
        assert_eq!(outcome, ConsumeOutcome::NotApplicable(NotApplicable::OptionMaxed));
        assert_eq!(item.durability, 3);
        assert_eq!(health(&character), 10.0);
    }

    #[test]
    fn test_inactive_character_refused() {
        let handler = ConsumeHandler::single("bump", Bump { refuse: None });
        let mut player = Player::new("Ghost");
        player.die();
        let character: CharacterHandle = Arc::new(Mutex::new(player));
        let mut item = fixtures::potion_item(3);

        let outcome = consume(&handler, &character, &mut item);
        assert_eq!(
            outcome,
            ConsumeOutcome::PreconditionFailed(Precondition::CharacterInactive)
        );
        assert_eq!(item.durability, 3);
    }

    #[test]
    fn test_depleted_item_refused() {
        let handler = ConsumeHandler::single("bump", Bump { refuse: None });
        let character = wounded();
        let mut item = fixtures::potion_item(1);

        assert!(consume(&handler, &character, &mut item).is_success());
        assert_eq!(item.durability, 0);
        assert_eq!(
            consume(&handler, &character, &mut item),
            ConsumeOutcome::PreconditionFailed(Precondition::ItemDepleted)
        );
        assert_eq!(health(&character), 11.0);
    }

    #[test]
    fn test_consume_source_never_underflows() {
        let mut item = fixtures::potion_item(1);
        assert!(consume_source(&mut item));
        assert!(!consume_source(&mut item));
        assert_eq!(item.durability, 0);
    }
}
