//! Inline edits made from the widget: title, due date, status, milestone,
//! subtasks and the manual order of to-dos.
//!
//! Every edit asks `AccessGuard` first. Input the ticket cannot take comes
//! back as `UpdateOutcome::Rejected` and leaves the store untouched.

use std::collections::HashSet;

use chrono::{Duration, Local, NaiveDate, Utc};
use tracing::{info, warn};

use crate::access::AccessGuard;
use crate::db::TicketService;
use crate::error::{Error, Result};
use crate::fields::{Kind, Status};
use crate::task::Ticket;
use crate::widget::Notification;

/// The ticket property an edit touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Title,
    DueDate,
    Status,
    Milestone,
    Subtask,
    Sorting,
}

impl Change {
    fn saved_key(self) -> &'static str {
        match self {
            Change::Title => "notifications.title_updated",
            Change::DueDate => "notifications.date_updated",
            Change::Status => "notifications.status_updated",
            Change::Milestone => "notifications.milestone_updated",
            Change::Subtask => "notifications.subtask_saved",
            Change::Sorting => "notifications.sorting_saved",
        }
    }

    fn error_key(self) -> &'static str {
        match self {
            Change::Title => "notifications.title_update_error",
            Change::DueDate => "notifications.date_update_error",
            Change::Status => "notifications.status_update_error",
            Change::Milestone => "notifications.milestone_update_error",
            Change::Subtask => "notifications.subtask_save_error",
            Change::Sorting => "notifications.sorting_error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Saved(Change),
    /// A new subtask was stored under this id.
    SubtaskAdded(u64),
    Rejected(Change),
}

impl Notification for UpdateOutcome {
    fn notification_key(&self) -> &'static str {
        match self {
            UpdateOutcome::Saved(change) => change.saved_key(),
            UpdateOutcome::SubtaskAdded(_) => Change::Subtask.saved_key(),
            UpdateOutcome::Rejected(change) => change.error_key(),
        }
    }

    fn succeeded(&self) -> bool {
        !matches!(self, UpdateOutcome::Rejected(_))
    }
}

/// The ticket behind `task_id`, once the guard has allowed the update.
fn editable<T: TicketService>(tickets: &T, task_id: u64) -> Result<Ticket> {
    if !AccessGuard::new(tickets).can_user_update_task(task_id)? {
        return Err(Error::AccessDenied(task_id));
    }
    tickets.get_ticket(task_id)?.ok_or(Error::TicketNotFound(task_id))
}

fn save<T: TicketService>(tickets: &mut T, mut ticket: Ticket, change: Change) -> Result<UpdateOutcome> {
    let id = ticket.id;
    ticket.updated_at_utc = Utc::now().timestamp();
    tickets.save_ticket(ticket)?;
    info!(id, ?change, "ticket updated");
    Ok(UpdateOutcome::Saved(change))
}

fn reject(task_id: u64, change: Change, reason: &str) -> Result<UpdateOutcome> {
    warn!(task_id, ?change, reason, "update rejected");
    Ok(UpdateOutcome::Rejected(change))
}

pub fn update_title<T: TicketService>(tickets: &mut T, task_id: u64, title: &str) -> Result<UpdateOutcome> {
    let mut ticket = editable(&*tickets, task_id)?;
    let title = title.trim();
    if title.is_empty() {
        return reject(task_id, Change::Title, "empty title");
    }
    ticket.headline = title.to_string();
    save(tickets, ticket, Change::Title)
}

/// Set the due date from user input as of today. Blank input clears it.
pub fn update_due_date<T: TicketService>(tickets: &mut T, task_id: u64, raw: &str) -> Result<UpdateOutcome> {
    update_due_date_on(tickets, task_id, raw, Local::now().date_naive())
}

pub fn update_due_date_on<T: TicketService>(
    tickets: &mut T,
    task_id: u64,
    raw: &str,
    today: NaiveDate,
) -> Result<UpdateOutcome> {
    let mut ticket = editable(&*tickets, task_id)?;
    ticket.date_to_finish = if raw.trim().is_empty() {
        None
    } else {
        match parse_due_input(raw, today) {
            Some(date) => Some(date),
            None => return reject(task_id, Change::DueDate, "unrecognised date"),
        }
    };
    save(tickets, ticket, Change::DueDate)
}

pub fn update_status<T: TicketService>(tickets: &mut T, task_id: u64, raw: &str) -> Result<UpdateOutcome> {
    let mut ticket = editable(&*tickets, task_id)?;
    let Some(status) = Status::parse(raw) else {
        return reject(task_id, Change::Status, "unknown status");
    };
    ticket.status = status;
    save(tickets, ticket, Change::Status)
}

/// Attach the ticket to a milestone, or detach it with `None`.
pub fn update_milestone<T: TicketService>(
    tickets: &mut T,
    task_id: u64,
    milestone_id: Option<u64>,
) -> Result<UpdateOutcome> {
    let mut ticket = editable(&*tickets, task_id)?;
    if let Some(m) = milestone_id {
        if m == task_id {
            return reject(task_id, Change::Milestone, "ticket cannot be its own milestone");
        }
        match tickets.get_ticket(m)? {
            Some(target) if target.kind == Kind::Milestone => {}
            _ => return reject(task_id, Change::Milestone, "not a milestone"),
        }
    }
    ticket.milestone_id = milestone_id;
    save(tickets, ticket, Change::Milestone)
}

/// Create a subtask under `parent_id`. It inherits the parent's project and milestone.
pub fn add_subtask<T: TicketService>(tickets: &mut T, parent_id: u64, headline: &str) -> Result<UpdateOutcome> {
    let parent = editable(&*tickets, parent_id)?;
    let headline = headline.trim();
    if headline.is_empty() {
        return reject(parent_id, Change::Subtask, "empty headline");
    }
    if parent.kind != Kind::Task {
        return reject(parent_id, Change::Subtask, "only tasks take subtasks");
    }
    let id = tickets.create_ticket(Ticket {
        kind: Kind::Subtask,
        parent_id: Some(parent_id),
        project_id: parent.project_id,
        milestone_id: parent.milestone_id,
        ..Ticket::new(0, headline)
    })?;
    info!(id, parent_id, "subtask created");
    Ok(UpdateOutcome::SubtaskAdded(id))
}

/// Store a manual order: each ticket's `sort_index` becomes its position in `order`.
/// The whole order is rejected when it is empty, repeats an id, or names a ticket
/// the user may not update.
pub fn update_sorting<T: TicketService>(tickets: &mut T, order: &[u64]) -> Result<UpdateOutcome> {
    if order.is_empty() {
        return reject(0, Change::Sorting, "empty order");
    }
    let mut seen = HashSet::new();
    if let Some(&dup) = order.iter().find(|&&id| !seen.insert(id)) {
        return reject(dup, Change::Sorting, "duplicate id");
    }

    let mut sorted = Vec::with_capacity(order.len());
    for &id in order {
        match editable(&*tickets, id) {
            Ok(ticket) => sorted.push(ticket),
            Err(Error::AccessDenied(_)) => return reject(id, Change::Sorting, "not accessible"),
            Err(err) => return Err(err),
        }
    }

    let now = Utc::now().timestamp();
    for (position, mut ticket) in sorted.into_iter().enumerate() {
        ticket.sort_index = Some(position as i64);
        ticket.updated_at_utc = now;
        tickets.save_ticket(ticket)?;
    }
    info!(count = order.len(), "sort order saved");
    Ok(UpdateOutcome::Saved(Change::Sorting))
}

/// Parse a due date: "today", "tomorrow", "yesterday", "in Nd", "in Nw" or YYYY-MM-DD.
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            return nd.trim().parse::<i64>().ok().map(|days| today + Duration::days(days));
        }
        if let Some(nw) = rest.strip_suffix('w') {
            return nw.trim().parse::<i64>().ok().map(|weeks| today + Duration::weeks(weeks));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}
