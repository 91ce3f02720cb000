//! Mapping of widget groups onto ticket filter fields.
//!
//! A to-do group is named by a dimension (`time`, `project`, `priority`) and a
//! raw value coming from the client. Malformed input never fails: it maps to an
//! empty filter. The `later` and `999` groups are the exception, they map to a
//! present field holding an empty string, meaning "clear this field".

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use tracing::debug;

use crate::fields::*;

/// Priority value the widget uses for the "no priority" group.
pub const UNSET_PRIORITY: i64 = 999;

/// Highest priority a ticket can carry; priorities run 1 (highest) to 4.
pub const MAX_PRIORITY: i64 = 4;

/// Map a group to filter fields using today's local date.
pub fn map_group_to_fields(dimension: &str, raw: Option<&str>) -> FieldFilter {
    map_group_to_fields_on(dimension, raw, Local::now().date_naive())
}

/// Map a group to filter fields relative to `today`.
pub fn map_group_to_fields_on(dimension: &str, raw: Option<&str>, today: NaiveDate) -> FieldFilter {
    let filter = match Dimension::parse(dimension) {
        Some(Dimension::Time) => map_time_group_to_fields(raw, today),
        Some(Dimension::Project) => map_project_group_to_fields(raw),
        Some(Dimension::Priority) => map_priority_group_to_fields(raw),
        None => FieldFilter::empty(),
    };
    debug!(dimension, ?raw, ?filter, "mapped group to fields");
    filter
}

/// `overdue` -> yesterday, `thisWeek` -> next Friday, `later` -> cleared due date.
pub fn map_time_group_to_fields(raw: Option<&str>, today: NaiveDate) -> FieldFilter {
    let date = match raw {
        Some("overdue") => today - Duration::days(1),
        Some("thisWeek") => next_weekday(today, Weekday::Fri),
        Some("later") => return FieldFilter::single(FilterField::DateToFinish, FilterValue::cleared()),
        _ => return FieldFilter::empty(),
    };
    FieldFilter::single(FilterField::DateToFinish, FilterValue::Text(format_date(date)))
}

/// Any non-zero integer is a project id.
pub fn map_project_group_to_fields(raw: Option<&str>) -> FieldFilter {
    match raw.and_then(|s| s.parse::<i64>().ok()) {
        Some(0) | None => FieldFilter::empty(),
        Some(id) => FieldFilter::single(FilterField::ProjectId, FilterValue::Int(id)),
    }
}

/// Priorities 1 to 4 map through; `999` clears the priority.
pub fn map_priority_group_to_fields(raw: Option<&str>) -> FieldFilter {
    match raw.and_then(|s| s.parse::<i64>().ok()) {
        Some(UNSET_PRIORITY) => FieldFilter::single(FilterField::Priority, FilterValue::cleared()),
        Some(p) if (1..=MAX_PRIORITY).contains(&p) => {
            FieldFilter::single(FilterField::Priority, FilterValue::Int(p))
        }
        _ => FieldFilter::empty(),
    }
}

/// Time group a due date falls into: the inverse of `map_time_group_to_fields`.
pub fn time_group_of(due: Option<NaiveDate>, today: NaiveDate) -> &'static str {
    match due {
        Some(d) if d < today => "overdue",
        Some(d) if d <= next_weekday(today, Weekday::Fri) => "thisWeek",
        _ => "later",
    }
}

/// The next occurrence of `target` strictly after `today`.
pub fn next_weekday(today: NaiveDate, target: Weekday) -> NaiveDate {
    let current = today.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let days_ahead = (wanted - current + 7) % 7;
    today + Duration::days(if days_ahead == 0 { 7 } else { days_ahead })
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
