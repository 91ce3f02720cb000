//! Enumerations and field types for grouping to-dos.
//!
//! This module defines the grouping dimensions of the MyToDos widget, the
//! filter fields a group maps onto, and the per-task collapse state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Grouping axis for to-do items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Time,
    Project,
    Priority,
}

impl Dimension {
    /// Parse a dimension name. Matching is case-sensitive; unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Dimension> {
        match s {
            "time" => Some(Dimension::Time),
            "project" => Some(Dimension::Project),
            "priority" => Some(Dimension::Priority),
            _ => None,
        }
    }
}

/// Ticket fields a group can filter or patch.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    DateToFinish,
    ProjectId,
    Priority,
}

impl FilterField {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterField::DateToFinish => "dateToFinish",
            FilterField::ProjectId => "projectId",
            FilterField::Priority => "priority",
        }
    }
}

/// Value of a filter field: either text (dates and the empty "cleared" sentinel) or an integer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FilterValue {
    Int(i64),
    Text(String),
}

impl FilterValue {
    /// The empty-string sentinel meaning "clear this field".
    pub fn cleared() -> Self {
        FilterValue::Text(String::new())
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Int(n) => write!(f, "{n}"),
            FilterValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Mapping from filter field to value. An empty filter means "no filter / invalid input".
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldFilter(BTreeMap<FilterField, FilterValue>);

impl FieldFilter {
    pub fn empty() -> Self {
        FieldFilter::default()
    }

    /// A filter holding exactly one field.
    pub fn single(field: FilterField, value: FilterValue) -> Self {
        let mut map = BTreeMap::new();
        map.insert(field, value);
        FieldFilter(map)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: FilterField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn get(&self, field: FilterField) -> Option<&FilterValue> {
        self.0.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterField, &FilterValue)> {
        self.0.iter()
    }
}

/// Kind of ticket shown in the widget.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Kind {
    #[default]
    Task,
    Subtask,
    Milestone,
}

/// Workflow status of a ticket.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    New,
    InProgress,
    Waiting,
    Blocked,
    Done,
}

impl Status {
    /// Parse a status name as typed on the command line. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Status> {
        match s.trim().to_lowercase().as_str() {
            "new" => Some(Status::New),
            "in-progress" | "inprogress" => Some(Status::InProgress),
            "waiting" => Some(Status::Waiting),
            "blocked" => Some(Status::Blocked),
            "done" => Some(Status::Done),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::New => "new",
            Status::InProgress => "in-progress",
            Status::Waiting => "waiting",
            Status::Blocked => "blocked",
            Status::Done => "done",
        }
    }
}

/// Per-user, per-task expand/collapse state of a to-do in the widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollapseState {
    #[default]
    Open,
    Closed,
}

impl CollapseState {
    pub fn as_str(self) -> &'static str {
        match self {
            CollapseState::Open => "open",
            CollapseState::Closed => "closed",
        }
    }

    /// Read a stored value. Anything other than `"closed"` counts as open.
    pub fn from_setting(s: &str) -> Self {
        if s == "closed" {
            CollapseState::Closed
        } else {
            CollapseState::Open
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            CollapseState::Open => CollapseState::Closed,
            CollapseState::Closed => CollapseState::Open,
        }
    }
}

impl fmt::Display for CollapseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
