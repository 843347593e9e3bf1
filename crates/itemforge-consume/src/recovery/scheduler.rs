//! Runs stepped recoveries as tokio tasks
//!
//! Steps sleep without holding the character lock. Before each step the
//! character is re-checked and the live maximum re-read, so a character that
//! died or left mid-sequence simply stops recovering.

use std::collections::HashMap;
use std::sync::Arc;

use itemforge_core::{Character, CharacterHandle, CharacterId};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::observer::ConsumeObserver;
use crate::recovery::RecoveryPlan;

/// How a recovery was started
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecoveryStart {
    /// Applied in full; `applied` is what fit under the maximum
    Immediate { applied: f32 },
    /// Handed to a background task with this many steps
    Scheduled { steps: usize },
}

pub struct RecoveryScheduler {
    runtime: Handle,
    observer: Arc<dyn ConsumeObserver>,
    tasks: Mutex<HashMap<CharacterId, Vec<AbortHandle>>>,
}

impl RecoveryScheduler {
    pub fn new(runtime: Handle, observer: Arc<dyn ConsumeObserver>) -> Self {
        Self {
            runtime,
            observer,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn observer(&self) -> &Arc<dyn ConsumeObserver> {
        &self.observer
    }

    /// Start a recovery for a character whose lock the caller holds.
    ///
    /// Instant plans are applied right away through `character`; stepped
    /// plans are spawned and only touch the character through `handle`.
    pub fn start(
        &self,
        handle: &CharacterHandle,
        character: &mut dyn Character,
        plan: RecoveryPlan,
    ) -> RecoveryStart {
        let id = character.id();

        if plan.is_instant() {
            let applied = character
                .attributes_mut()
                .add_bounded(plan.current, plan.maximum, plan.total_amount);
            let value = character.attributes().get(plan.current);
            self.observer.attribute_changed(id, plan.current, value);
            return RecoveryStart::Immediate { applied };
        }

        let steps = plan.steps.len();
        let task = self.runtime.spawn(run_steps(
            Arc::clone(handle),
            id,
            plan,
            Arc::clone(&self.observer),
        ));

        let mut tasks = self.tasks.lock();
        // Characters whose recoveries all finished drop out here
        tasks.retain(|_, running| {
            running.retain(|t| !t.is_finished());
            !running.is_empty()
        });
        tasks.entry(id).or_default().push(task.abort_handle());
        debug!("Scheduled {} recovery steps for {}", steps, id);

        RecoveryStart::Scheduled { steps }
    }

    /// Abort every pending recovery of a character. Returns how many were
    /// still running.
    pub fn cancel_character(&self, id: CharacterId) -> usize {
        let Some(running) = self.tasks.lock().remove(&id) else {
            return 0;
        };
        let mut cancelled = 0;
        for task in running {
            if !task.is_finished() {
                task.abort();
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            debug!("Cancelled {} recoveries for {}", cancelled, id);
        }
        cancelled
    }

    /// Characters with at least one tracked recovery
    pub fn tracked_characters(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Number of unfinished recoveries of a character
    pub fn in_flight(&self, id: CharacterId) -> usize {
        self.tasks
            .lock()
            .get(&id)
            .map_or(0, |running| running.iter().filter(|t| !t.is_finished()).count())
    }
}

async fn run_steps(
    handle: CharacterHandle,
    id: CharacterId,
    plan: RecoveryPlan,
    observer: Arc<dyn ConsumeObserver>,
) {
    for (index, step) in plan.steps.iter().enumerate() {
        tokio::time::sleep(step.delay).await;

        let value = {
            let mut character = handle.lock();
            if !character.is_alive_and_active() {
                debug!("Recovery for {} abandoned at step {}", id, index + 1);
                return;
            }
            let attributes = character.attributes_mut();
            attributes.add_bounded(plan.current, plan.maximum, step.amount);
            attributes.get(plan.current)
        };
        observer.attribute_changed(id, plan.current, value);
    }
}
