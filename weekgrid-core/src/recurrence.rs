//! Recurrence expansion for repeating events.
//!
//! Expands each recurring base event into concrete occurrences within a
//! bounded horizon. Expansion is a pure function of the input events and
//! the `now` reference, so re-running it with the same inputs produces an
//! identical occurrence set; callers replace their previous generated set
//! wholesale with the result of each pass.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WeekgridError;
use crate::event::{CalendarEvent, EventId};

/// How far open-ended recurrences are materialized, in months from `now`.
pub const DEFAULT_HORIZON_MONTHS: u32 = 3;

/// The supported recurrence rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Daily,
    Weekly,
    /// Every day Monday through Friday.
    Weekdays,
    /// Same day-of-month as the base event, clamped to shorter months.
    Monthly,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::Daily => "daily",
            RecurrenceType::Weekly => "weekly",
            RecurrenceType::Weekdays => "weekdays",
            RecurrenceType::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RecurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecurrenceType {
    type Err = WeekgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(RecurrenceType::Daily),
            "weekly" => Ok(RecurrenceType::Weekly),
            "weekdays" => Ok(RecurrenceType::Weekdays),
            "monthly" => Ok(RecurrenceType::Monthly),
            other => Err(WeekgridError::Validation(format!(
                "unknown recurrence rule '{other}'"
            ))),
        }
    }
}

/// Expand recurring base events into materialized occurrences.
///
/// Every input event passes through unchanged exactly once; events that are
/// not generated and carry a recurrence rule additionally contribute their
/// occurrences up to `now + horizon_months` (or their own end date,
/// whichever is earlier). The base event is never re-emitted as an
/// occurrence: it already is the first instance.
pub fn expand(
    events: &[CalendarEvent],
    now: NaiveDateTime,
    horizon_months: u32,
) -> Vec<CalendarEvent> {
    let horizon_end = now
        .checked_add_months(Months::new(horizon_months))
        .unwrap_or(NaiveDateTime::MAX);

    let mut expanded: Vec<CalendarEvent> = events.to_vec();

    for event in events {
        if event.is_generated {
            continue;
        }
        let Some(rule) = event.recurrence else {
            continue;
        };
        let occurrences = occurrences_for(event, rule, horizon_end);
        debug!(id = %event.id, rule = %rule, count = occurrences.len(), "expanded recurring event");
        expanded.extend(occurrences);
    }

    expanded
}

/// Materialize the occurrences of one recurring base event.
fn occurrences_for(
    base: &CalendarEvent,
    rule: RecurrenceType,
    horizon_end: NaiveDateTime,
) -> Vec<CalendarEvent> {
    let window_end = match base.recurrence_end {
        Some(end) => end.min(horizon_end),
        None => horizon_end,
    };

    let mut occurrences = Vec::new();

    // Occurrences are start + k*step, computed from the base start each
    // time so monthly runs stay anchored to the base day-of-month instead
    // of drifting after a clamped February.
    for step in 1u32.. {
        let Some(cursor) = advance(base.date, rule, step) else {
            break;
        };
        if cursor > window_end {
            break;
        }
        if rule == RecurrenceType::Weekdays && is_weekend(&cursor) {
            continue;
        }
        occurrences.push(occurrence(base, cursor));
    }

    occurrences
}

fn advance(start: NaiveDateTime, rule: RecurrenceType, steps: u32) -> Option<NaiveDateTime> {
    match rule {
        RecurrenceType::Daily | RecurrenceType::Weekdays => {
            start.checked_add_days(Days::new(steps as u64))
        }
        RecurrenceType::Weekly => start.checked_add_days(Days::new(7 * steps as u64)),
        // checked_add_months clamps Jan 31 to Feb 28/29 rather than rolling
        // into March.
        RecurrenceType::Monthly => start.checked_add_months(Months::new(steps)),
    }
}

fn is_weekend(dt: &NaiveDateTime) -> bool {
    matches!(dt.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Copy the base event into a generated occurrence at `cursor`.
///
/// Date stepping preserves the base start's hour and minute, so the
/// occurrence keeps the base's time-of-day on its new date.
fn occurrence(base: &CalendarEvent, cursor: NaiveDateTime) -> CalendarEvent {
    let start_ms = cursor.and_utc().timestamp_millis();
    let mut event = base.clone();
    event.id = EventId::occurrence(&base.id, start_ms);
    event.date = cursor;
    event.is_generated = true;
    event
}
