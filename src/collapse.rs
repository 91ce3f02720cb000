//! Per-user collapse state of to-dos in the widget.

use tracing::{debug, info};

use crate::error::Result;
use crate::fields::CollapseState;
use crate::settings::SettingsStore;

/// Settings key holding the collapse flag of `task_id` for `user_id`.
pub fn collapse_key(user_id: u64, task_id: u64) -> String {
    format!("user.{user_id}.taskCollapsed.{task_id}")
}

/// Flips the collapse flag of a task in a settings store.
///
/// The read-modify-write is not atomic: two concurrent toggles for the same
/// user and task may both read the same value.
pub struct TaskCollapseToggle<'a, S: SettingsStore> {
    store: &'a mut S,
}

impl<'a, S: SettingsStore> TaskCollapseToggle<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Current state without changing it.
    pub fn collapse_state(&self, task_id: u64, user_id: u64) -> Result<CollapseState> {
        let key = collapse_key(user_id, task_id);
        let raw = self.store.get_setting(&key, CollapseState::Open.as_str())?;
        Ok(CollapseState::from_setting(&raw))
    }

    /// Flip the flag, persist it, and return the new state.
    pub fn toggle_task_collapse(&mut self, task_id: u64, user_id: u64) -> Result<CollapseState> {
        let key = collapse_key(user_id, task_id);
        let current = self.store.get_setting(&key, CollapseState::Open.as_str())?;
        let next = CollapseState::from_setting(&current).toggled();
        debug!(%key, %current, next = next.as_str(), "toggling task collapse");
        self.store.save_setting(&key, next.as_str())?;
        info!(task_id, user_id, state = next.as_str(), "task collapse toggled");
        Ok(next)
    }
}
