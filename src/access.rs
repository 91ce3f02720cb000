//! Update permission for tasks.
//!
//! There is no policy here: a task is updatable when the ticket service
//! hands it back, which means it exists and the caller may see it.

use tracing::warn;

use crate::db::TicketService;
use crate::error::Result;

pub struct AccessGuard<'a, T: TicketService> {
    tickets: &'a T,
}

impl<'a, T: TicketService> AccessGuard<'a, T> {
    pub fn new(tickets: &'a T) -> Self {
        Self { tickets }
    }

    /// Whether the current caller may update `task_id`. Lookup errors propagate.
    pub fn can_user_update_task(&self, task_id: u64) -> Result<bool> {
        let allowed = self.tickets.get_ticket(task_id)?.is_some();
        if !allowed {
            warn!(task_id, "ticket not accessible");
        }
        Ok(allowed)
    }
}
