//! Ticket data structure and group field patching.
//!
//! This module defines the `Ticket` record the widget lists and how a
//! `FieldFilter` produced by a group is written onto it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fields::*;

/// A to-do item as stored in the ticket database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub headline: String,
    #[serde(default)]
    pub project_id: Option<u64>,
    /// 1 (highest) to 4; `None` when unset.
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub date_to_finish: Option<NaiveDate>,
    #[serde(default)]
    pub kind: Kind,
    #[serde(default)]
    pub status: Status,
    /// Milestone ticket this to-do belongs to.
    #[serde(default)]
    pub milestone_id: Option<u64>,
    /// Parent ticket of a subtask.
    #[serde(default)]
    pub parent_id: Option<u64>,
    /// Position in the user's manual ordering; unsorted tickets come last.
    #[serde(default)]
    pub sort_index: Option<i64>,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

impl Ticket {
    /// A plain task with no project, priority or due date.
    pub fn new(id: u64, headline: &str) -> Self {
        Ticket {
            id,
            headline: headline.to_string(),
            project_id: None,
            priority: None,
            date_to_finish: None,
            kind: Kind::Task,
            status: Status::New,
            milestone_id: None,
            parent_id: None,
            sort_index: None,
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    /// Write every field of `filter` onto the ticket. Empty-string values clear the field.
    pub fn apply_fields(&mut self, filter: &FieldFilter) -> Result<()> {
        for (field, value) in filter.iter() {
            match (field, value) {
                (FilterField::DateToFinish, FilterValue::Text(s)) if s.is_empty() => {
                    self.date_to_finish = None;
                }
                (FilterField::DateToFinish, FilterValue::Text(s)) => {
                    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .map_err(|e| Error::InvalidArgument(format!("date '{s}': {e}")))?;
                    self.date_to_finish = Some(date);
                }
                (FilterField::ProjectId, FilterValue::Int(id)) if *id > 0 => {
                    self.project_id = Some(*id as u64);
                }
                (FilterField::Priority, FilterValue::Text(s)) if s.is_empty() => {
                    self.priority = None;
                }
                (FilterField::Priority, FilterValue::Int(p)) if (1..=4).contains(p) => {
                    self.priority = Some(*p as u8);
                }
                (field, value) => {
                    return Err(Error::InvalidArgument(format!(
                        "cannot set {} to '{}'",
                        field.as_str(),
                        value
                    )));
                }
            }
        }
        Ok(())
    }
}
