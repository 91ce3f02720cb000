//! Moving to-dos between widget groups.
//!
//! Dropping a to-do into another group rewrites the ticket fields that group
//! stands for: a time group sets the due date, a project group the project,
//! a priority group the priority.

use chrono::{Local, NaiveDate, Utc};
use tracing::{info, warn};

use crate::access::AccessGuard;
use crate::collapse::TaskCollapseToggle;
use crate::db::TicketService;
use crate::error::{Error, Result};
use crate::fields::{CollapseState, Status};
use crate::group::{map_group_to_fields_on, time_group_of};
use crate::settings::SettingsStore;
use crate::task::Ticket;

/// A widget action result that is reported to the user as a localized notification.
pub trait Notification {
    /// Language key of the notification shown for this result.
    fn notification_key(&self) -> &'static str;

    /// Whether the action changed what it was asked to change.
    fn succeeded(&self) -> bool;
}

/// Result of a group move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The ticket as saved after the move.
    Applied(Ticket),
    /// The group did not map to a value the ticket accepts; nothing changed.
    Failed,
}

impl Notification for MoveOutcome {
    fn notification_key(&self) -> &'static str {
        match self {
            MoveOutcome::Applied(_) => "notifications.group_changes_applied",
            MoveOutcome::Failed => "notifications.group_changes_failed",
        }
    }

    fn succeeded(&self) -> bool {
        matches!(self, MoveOutcome::Applied(_))
    }
}

/// Per-ticket results of moving several to-dos into one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupChanges {
    pub applied: Vec<u64>,
    pub failed: Vec<u64>,
}

impl Notification for GroupChanges {
    fn notification_key(&self) -> &'static str {
        match (self.applied.is_empty(), self.failed.is_empty()) {
            (false, true) => "notifications.group_changes_applied",
            (false, false) => "notifications.group_changes_partial",
            (true, _) => "notifications.group_changes_failed",
        }
    }

    fn succeeded(&self) -> bool {
        !self.applied.is_empty() && self.failed.is_empty()
    }
}

/// Move `task_id` into the group `(dimension, value)` as of today.
pub fn move_task<T: TicketService>(
    tickets: &mut T,
    task_id: u64,
    dimension: &str,
    value: Option<&str>,
) -> Result<MoveOutcome> {
    move_task_on(tickets, task_id, dimension, value, Local::now().date_naive())
}

/// Move `task_id` into the group `(dimension, value)` relative to `today`.
pub fn move_task_on<T: TicketService>(
    tickets: &mut T,
    task_id: u64,
    dimension: &str,
    value: Option<&str>,
    today: NaiveDate,
) -> Result<MoveOutcome> {
    if !AccessGuard::new(&*tickets).can_user_update_task(task_id)? {
        return Err(Error::AccessDenied(task_id));
    }

    let fields = map_group_to_fields_on(dimension, value, today);
    if fields.is_empty() {
        warn!(task_id, dimension, ?value, "group does not map to any field");
        return Ok(MoveOutcome::Failed);
    }

    let mut ticket = tickets.get_ticket(task_id)?.ok_or(Error::TicketNotFound(task_id))?;
    // Patch a copy so a rejected value never reaches the store.
    if let Err(err) = ticket.apply_fields(&fields) {
        warn!(task_id, dimension, ?value, %err, "group fields rejected by ticket");
        return Ok(MoveOutcome::Failed);
    }
    ticket.updated_at_utc = Utc::now().timestamp();
    tickets.save_ticket(ticket.clone())?;
    info!(task_id, dimension, ?value, "moved ticket to group");
    Ok(MoveOutcome::Applied(ticket))
}

/// Move every ticket in `task_ids` into one group as of today.
pub fn move_tasks<T: TicketService>(
    tickets: &mut T,
    task_ids: &[u64],
    dimension: &str,
    value: Option<&str>,
) -> Result<GroupChanges> {
    move_tasks_on(tickets, task_ids, dimension, value, Local::now().date_naive())
}

/// Move every ticket in `task_ids` into one group. Denied and failed tickets are
/// collected; store errors abort the batch.
pub fn move_tasks_on<T: TicketService>(
    tickets: &mut T,
    task_ids: &[u64],
    dimension: &str,
    value: Option<&str>,
    today: NaiveDate,
) -> Result<GroupChanges> {
    let mut changes = GroupChanges::default();
    for &id in task_ids {
        match move_task_on(tickets, id, dimension, value, today) {
            Ok(MoveOutcome::Applied(_)) => changes.applied.push(id),
            Ok(MoveOutcome::Failed) | Err(Error::AccessDenied(_)) => changes.failed.push(id),
            Err(err) => return Err(err),
        }
    }
    info!(applied = changes.applied.len(), failed = changes.failed.len(), "moved tickets to group");
    Ok(changes)
}

/// One to-do as the widget lists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetRow {
    pub id: u64,
    pub status: Status,
    /// Time group the due date falls into.
    pub group: &'static str,
    /// Collapse state for the current user; `None` without a user.
    pub state: Option<CollapseState>,
    pub headline: String,
    pub parent_id: Option<u64>,
}

/// Rows in manual order (unsorted tickets last, then by id).
pub fn widget_rows<S: SettingsStore>(
    tickets: &[Ticket],
    toggle: &TaskCollapseToggle<'_, S>,
    user: Option<u64>,
    today: NaiveDate,
) -> Result<Vec<WidgetRow>> {
    let mut ordered: Vec<&Ticket> = tickets.iter().collect();
    ordered.sort_by_key(|t| (t.sort_index.unwrap_or(i64::MAX), t.id));

    ordered
        .into_iter()
        .map(|t| {
            let state = match user {
                Some(user) => Some(toggle.collapse_state(t.id, user)?),
                None => None,
            };
            Ok(WidgetRow {
                id: t.id,
                status: t.status,
                group: time_group_of(t.date_to_finish, today),
                state,
                headline: t.headline.clone(),
                parent_id: t.parent_id,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TicketDatabase;
    use crate::fields::Kind;
    use crate::settings::MemorySettingsStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded(dir: &tempfile::TempDir) -> (TicketDatabase, u64) {
        let mut db = TicketDatabase::load(&dir.path().join("tickets.json")).unwrap();
        let id = db.add("Prepare demo".into(), Kind::Task, Some(4), Some(2), Some(date(2024, 6, 1))).unwrap();
        (db, id)
    }

    #[test]
    fn test_move_into_time_groups() {
        let dir = tempfile::tempdir().unwrap();
        let (mut db, id) = seeded(&dir);
        let wednesday = date(2024, 5, 15);

        let outcome = move_task_on(&mut db, id, "time", Some("thisWeek"), wednesday).unwrap();
        assert_eq!(outcome.notification_key(), "notifications.group_changes_applied");
        assert!(outcome.succeeded());
        assert_eq!(db.get(id).unwrap().date_to_finish, Some(date(2024, 5, 17)));

        move_task_on(&mut db, id, "time", Some("overdue"), wednesday).unwrap();
        assert_eq!(db.get(id).unwrap().date_to_finish, Some(date(2024, 5, 14)));

        move_task_on(&mut db, id, "time", Some("later"), wednesday).unwrap();
        assert_eq!(db.get(id).unwrap().date_to_finish, None);
    }

    #[test]
    fn test_move_into_project_and_priority_groups() {
        let dir = tempfile::tempdir().unwrap();
        let (mut db, id) = seeded(&dir);
        let today = date(2024, 5, 15);

        move_task_on(&mut db, id, "project", Some("12"), today).unwrap();
        move_task_on(&mut db, id, "priority", Some("1"), today).unwrap();
        let t = db.get(id).unwrap();
        assert_eq!((t.project_id, t.priority), (Some(12), Some(1)));

        move_task_on(&mut db, id, "priority", Some("999"), today).unwrap();
        assert_eq!(db.get(id).unwrap().priority, None);

        let reloaded = TicketDatabase::load(&dir.path().join("tickets.json")).unwrap();
        assert_eq!(reloaded.get(id), db.get(id));
    }

    #[test]
    fn test_invalid_group_leaves_ticket_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (mut db, id) = seeded(&dir);
        let before = db.get(id).cloned();

        for (dim, value) in [("project", Some("0")), ("priority", Some("5")), ("time", None), ("colour", Some("red"))] {
            let outcome = move_task_on(&mut db, id, dim, value, date(2024, 5, 15)).unwrap();
            assert_eq!(outcome, MoveOutcome::Failed);
            assert_eq!(outcome.notification_key(), "notifications.group_changes_failed");
        }
        assert_eq!(db.get(id).cloned(), before);
    }

    #[test]
    fn test_negative_project_group_fails_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let (mut db, id) = seeded(&dir);
        let before = db.get(id).cloned();

        let outcome = move_task_on(&mut db, id, "project", Some("-5"), date(2024, 5, 15)).unwrap();
        assert_eq!(outcome, MoveOutcome::Failed);
        assert!(!outcome.succeeded());
        assert_eq!(db.get(id).cloned(), before);
        let reloaded = TicketDatabase::load(&dir.path().join("tickets.json")).unwrap();
        assert_eq!(reloaded.get(id).cloned(), before);
    }

    #[test]
    fn test_move_unknown_ticket_is_denied() {
        let dir = tempfile::tempdir().unwrap();
        let (mut db, _) = seeded(&dir);
        let err = move_task(&mut db, 404, "priority", Some("1")).unwrap_err();
        assert!(matches!(err, Error::AccessDenied(404)));
    }

    #[test]
    fn test_move_tasks_reports_partial_changes() {
        let dir = tempfile::tempdir().unwrap();
        let (mut db, first) = seeded(&dir);
        let second = db.add("Review slides".into(), Kind::Task, None, None, None).unwrap();
        let today = date(2024, 5, 15);

        let all = move_tasks_on(&mut db, &[first, second], "priority", Some("3"), today).unwrap();
        assert_eq!(all.applied, vec![first, second]);
        assert_eq!(all.notification_key(), "notifications.group_changes_applied");

        let some = move_tasks_on(&mut db, &[first, 404], "priority", Some("4"), today).unwrap();
        assert_eq!(some.notification_key(), "notifications.group_changes_partial");
        assert_eq!(some, GroupChanges { applied: vec![first], failed: vec![404] });
        assert_eq!(db.get(first).unwrap().priority, Some(4));

        let none = move_tasks_on(&mut db, &[first, second], "project", Some("-1"), today).unwrap();
        assert!(none.applied.is_empty());
        assert_eq!(none.notification_key(), "notifications.group_changes_failed");
        assert!(!none.succeeded());
    }

    #[test]
    fn test_widget_rows_order_group_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let (mut db, first) = seeded(&dir);
        let second = db.add("Review slides".into(), Kind::Task, None, None, Some(date(2024, 5, 10))).unwrap();
        let third = db.add("Send invites".into(), Kind::Task, None, None, Some(date(2024, 5, 16))).unwrap();
        crate::updates::update_sorting(&mut db, &[third, first]).unwrap();

        let mut store = MemorySettingsStore::new();
        TaskCollapseToggle::new(&mut store).toggle_task_collapse(first, 7).unwrap();
        let toggle = TaskCollapseToggle::new(&mut store);

        let rows = widget_rows(db.tickets(), &toggle, Some(7), date(2024, 5, 15)).unwrap();
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![third, first, second]);
        let groups: Vec<&str> = rows.iter().map(|r| r.group).collect();
        assert_eq!(groups, vec!["thisWeek", "later", "overdue"]);
        assert_eq!(rows[1].state, Some(CollapseState::Closed));
        assert_eq!(rows[0].state, Some(CollapseState::Open));

        let anonymous = widget_rows(db.tickets(), &toggle, None, date(2024, 5, 15)).unwrap();
        assert!(anonymous.iter().all(|r| r.state.is_none()));
    }
}
