//! Outbound notifications about state the engine changed

use std::time::Duration;

use itemforge_core::{AttributeKind, CharacterId, MagicEffect};
use tracing::info;

/// Receives changes that clients need to hear about
pub trait ConsumeObserver: Send + Sync {
    /// A current-value attribute changed, possibly from a delayed step
    fn attribute_changed(&self, character: CharacterId, attribute: AttributeKind, value: f32);

    /// A magic effect became active. `duration` is only set for effects
    /// whose definition asks for it to be sent.
    fn effect_activated(&self, character: CharacterId, effect: &MagicEffect, duration: Option<Duration>);
}

/// Observer that only writes log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ConsumeObserver for TracingObserver {
    fn attribute_changed(&self, character: CharacterId, attribute: AttributeKind, value: f32) {
        info!("{} of {} is now {:.1}", attribute.name(), character, value);
    }

    fn effect_activated(&self, character: CharacterId, effect: &MagicEffect, duration: Option<Duration>) {
        match duration {
            Some(duration) => info!(
                "Effect '{}' active on {} for {:?}",
                effect.definition.name, character, duration
            ),
            None => info!("Effect '{}' active on {}", effect.definition.name, character),
        }
    }
}
