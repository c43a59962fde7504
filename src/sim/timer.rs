//! Delayed one-shot effects
//!
//! Timers never hold a reference to their owner, only its id. Whoever drains
//! the queue checks the owner is still alive before acting.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// One pending effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer<E> {
    /// Absolute fire time (seconds on the owning clock)
    pub due: f32,
    /// Entity the effect acts on, if any
    pub owner: Option<EntityId>,
    pub effect: E,
}

/// Queue of pending timers, drained in due order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timers<E> {
    pending: Vec<Timer<E>>,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `effect` once `now >= due`
    pub fn schedule(&mut self, due: f32, owner: Option<EntityId>, effect: E) {
        self.pending.push(Timer { due, owner, effect });
    }

    /// Remove and return every timer due at `now`, earliest first.
    ///
    /// Timers due at the same instant fire in scheduling order.
    pub fn drain_due(&mut self, now: f32) -> Vec<Timer<E>> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|t| t.due <= now);
        self.pending = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due));
        due
    }

    /// Drop every timer owned by `id`
    pub fn cancel_owner(&mut self, id: EntityId) {
        self.pending.retain(|t| t.owner != Some(id));
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
