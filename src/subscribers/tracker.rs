//! # Last reported lifecycle state per component.
//!
//! [`LifecycleTracker`] folds report events into a map of
//! `token → (last bus seq, last reported state)`. It is always installed by
//! the runtime builder and answers "which components are still alive" when a
//! shutdown exceeds its grace period.
//!
//! ## Rules
//! - Only `Launched`, `Resumed`, `Paused`, `Stopped`, `Destroyed`, `Failed` change state
//! - Events with `seq <= last_seq` for a token are rejected
//! - Reads are eventually consistent with the dispatcher

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Subscribe;
use crate::components::ComponentToken;
use crate::events::{Event, EventKind};
use crate::lifecycle::LifecycleState;

#[derive(Debug, Clone, Copy)]
struct Tracked {
    last_seq: u64,
    state: LifecycleState,
    failed: bool,
}

/// Report-driven view of component liveness.
#[derive(Default)]
pub struct LifecycleTracker {
    state: RwLock<HashMap<ComponentToken, Tracked>>,
}

impl LifecycleTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `ev` if it is newer than the last event seen for its token.
    ///
    /// Returns true if the tracked state changed.
    pub async fn update(&self, ev: &Event) -> bool {
        let Some(token) = ev.token else {
            return false;
        };
        let next = match ev.kind {
            EventKind::Launched => Some(LifecycleState::Initialized),
            EventKind::Resumed | EventKind::Paused | EventKind::Stopped => ev.state,
            EventKind::Destroyed => Some(LifecycleState::Destroyed),
            EventKind::Failed => None,
            _ => return false,
        };

        let mut state = self.state.write().await;
        let entry = state.entry(token).or_insert(Tracked {
            last_seq: 0,
            state: LifecycleState::Initialized,
            failed: false,
        });
        if ev.seq <= entry.last_seq {
            return false;
        }
        entry.last_seq = ev.seq;
        if ev.kind == EventKind::Failed {
            entry.failed = true;
        }
        if let Some(next) = next {
            entry.state = next;
        }
        true
    }

    /// Sorted tokens whose last report is not `Destroyed`.
    pub async fn snapshot(&self) -> Vec<ComponentToken> {
        let state = self.state.read().await;
        let mut alive: Vec<ComponentToken> = state
            .iter()
            .filter(|(_, t)| t.state != LifecycleState::Destroyed)
            .map(|(token, _)| *token)
            .collect();
        alive.sort_unstable();
        alive
    }

    /// Last reported state of `token`.
    pub async fn state_of(&self, token: ComponentToken) -> Option<LifecycleState> {
        self.state.read().await.get(&token).map(|t| t.state)
    }

    /// True if a `Failed` report was seen for `token`.
    pub async fn has_failed(&self, token: ComponentToken) -> bool {
        self.state
            .read()
            .await
            .get(&token)
            .is_some_and(|t| t.failed)
    }
}

#[async_trait]
impl Subscribe for LifecycleTracker {
    async fn on_event(&self, ev: &Event) {
        self.update(ev).await;
    }

    fn name(&self) -> &'static str {
        "lifecycle-tracker"
    }

    fn queue_capacity(&self) -> usize {
        4096
    }
}
