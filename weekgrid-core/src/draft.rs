//! Event drafts: form state that has not passed validation yet.
//!
//! A draft accumulates optional fields while the user is still typing;
//! [`EventDraft::build`] is the one boundary where a draft becomes a
//! validated [`CalendarEvent`], and the only place that can fail.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{WeekgridError, WeekgridResult};
use crate::event::{
    CalendarEvent, EventId, EventSource, Participant, TimeOfDay, DEFAULT_DURATION_MINUTES,
};
use crate::recurrence::RecurrenceType;

/// A manual event under construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: Option<String>,
    pub day: Option<NaiveDate>,
    pub time: Option<TimeOfDay>,
    pub duration: Option<i64>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub recurrence: Option<RecurrenceType>,
    pub recurrence_end: Option<NaiveDateTime>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl EventDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft and produce a persistable manual event.
    pub fn build(self) -> WeekgridResult<CalendarEvent> {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| WeekgridError::Validation("an event needs a title".into()))?;

        let day = self
            .day
            .ok_or_else(|| WeekgridError::Validation("an event needs a start date".into()))?;
        let time = self
            .time
            .ok_or_else(|| WeekgridError::Validation("an event needs a start time".into()))?;

        if let Some(duration) = self.duration {
            if duration <= 0 {
                return Err(WeekgridError::Validation(format!(
                    "duration must be positive, got {duration}"
                )));
            }
        }

        Ok(CalendarEvent {
            id: EventId::new_local(),
            title,
            date: day.and_time(time.to_naive_time()),
            time,
            duration: self.duration.unwrap_or(DEFAULT_DURATION_MINUTES),
            description: self.description,
            location: self.location,
            source: EventSource::Manual,
            recurrence: self.recurrence,
            // An end date without a rule is meaningless; drop it here.
            recurrence_end: self.recurrence_end.filter(|_| self.recurrence.is_some()),
            is_generated: false,
            all_day: false,
            priority: None,
            participants: self.participants,
        })
    }
}
