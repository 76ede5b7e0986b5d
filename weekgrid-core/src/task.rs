//! Tasks and task-to-event conversion.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::WeekgridError;
use crate::event::{CalendarEvent, EventId, EventSource, TimeOfDay, DEFAULT_DURATION_MINUTES};

/// Task priority, carried into the event when a task is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = WeekgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(WeekgridError::Validation(format!(
                "unknown priority '{other}'"
            ))),
        }
    }
}

/// A day-scoped to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    /// The day the task belongs to (`YYYY-MM-DD`).
    pub date: NaiveDate,
}

impl Task {
    /// Convert this task into a calendar event scheduled at `time` on the
    /// task's day.
    ///
    /// The event gets a fresh local id and the `task` source tag; the
    /// caller is responsible for removing the task from its list.
    pub fn into_event(self, time: TimeOfDay) -> CalendarEvent {
        CalendarEvent {
            id: EventId::new_local(),
            title: self.title,
            date: self.date.and_time(time.to_naive_time()),
            time,
            duration: DEFAULT_DURATION_MINUTES,
            description: self.description,
            location: None,
            source: EventSource::Task,
            recurrence: None,
            recurrence_end: None,
            is_generated: false,
            all_day: false,
            priority: Some(self.priority),
            participants: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_keeps_title_and_priority() {
        let task = Task {
            id: "t1".into(),
            title: "Write report".into(),
            description: Some("quarterly numbers".into()),
            priority: Priority::High,
            completed: false,
            date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
        };

        let time = TimeOfDay::new(14, 0).unwrap();
        let event = task.into_event(time);

        assert_eq!(event.title, "Write report");
        assert_eq!(event.description.as_deref(), Some("quarterly numbers"));
        assert_eq!(event.priority, Some(Priority::High));
        assert_eq!(event.source, EventSource::Task);
        assert_eq!(event.duration, DEFAULT_DURATION_MINUTES);
        assert!(!event.is_generated);
    }

    #[test]
    fn conversion_schedules_at_the_given_time() {
        let task = Task {
            id: "t2".into(),
            title: "Dentist".into(),
            description: None,
            priority: Priority::Low,
            completed: false,
            date: NaiveDate::from_ymd_opt(2025, 5, 9).unwrap(),
        };

        let event = task.into_event(TimeOfDay::new(9, 30).unwrap());

        assert_eq!(event.day(), NaiveDate::from_ymd_opt(2025, 5, 9).unwrap());
        assert_eq!(event.time, TimeOfDay::new(9, 30).unwrap());
        assert_eq!(TimeOfDay::from_datetime(&event.date), event.time);
    }

    #[test]
    fn conversions_get_distinct_local_ids() {
        let task = Task {
            id: "t3".into(),
            title: "Call".into(),
            description: None,
            priority: Priority::Medium,
            completed: false,
            date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
        };

        let a = task.clone().into_event(TimeOfDay::new(10, 0).unwrap());
        let b = task.into_event(TimeOfDay::new(10, 0).unwrap());
        assert_ne!(a.id, b.id);
    }
}
