//! Source-neutral calendar event types.
//!
//! Events from every origin (manually created, task-converted, externally
//! synced) share this one shape. The reconciliation service, the recurrence
//! expander and the layout engine all work exclusively with these types.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{WeekgridError, WeekgridResult};
use crate::recurrence::RecurrenceType;
use crate::task::Priority;

/// Event length when the input doesn't carry one, in minutes.
pub const DEFAULT_DURATION_MINUTES: i64 = 60;

fn default_duration() -> i64 {
    DEFAULT_DURATION_MINUTES
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A calendar event.
///
/// `date` is the concrete start instant and is authoritative for day
/// bucketing; `time` mirrors its time-of-day as `"HH:MM"` and is
/// authoritative for grid placement. Mutations go through [`reschedule`]
/// so the two never drift apart.
///
/// [`reschedule`]: CalendarEvent::reschedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: EventId,
    pub title: String,
    pub date: NaiveDateTime,
    pub time: TimeOfDay,
    #[serde(default = "default_duration")]
    pub duration: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "EventSource::is_manual")]
    pub source: EventSource,

    // Recurrence fields
    #[serde(
        default,
        rename = "recurrenceType",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurrence: Option<RecurrenceType>,
    #[serde(
        default,
        rename = "recurrenceEndDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurrence_end: Option<NaiveDateTime>,
    /// Marks a materialized occurrence. Occurrences are recomputed on every
    /// expansion pass and never persisted.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_generated: bool,

    #[serde(default, rename = "isAllDay", skip_serializing_if = "is_false")]
    pub all_day: bool,
    /// Carried over when a task is converted into an event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<Participant>,
}

impl CalendarEvent {
    /// Start of the event in minutes from midnight, from the `time` field.
    pub fn start_minute(&self) -> i64 {
        self.time.minute_of_day() as i64
    }

    /// Exclusive end in minutes from midnight.
    pub fn end_minute(&self) -> i64 {
        self.start_minute() + self.duration
    }

    /// The day this event belongs to, from the `date` field.
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    /// Move the event to a new day and time-of-day.
    ///
    /// `date` and `time` are updated together; this is the only supported
    /// way to change either.
    pub fn reschedule(&mut self, day: NaiveDate, time: TimeOfDay) {
        self.date = day.and_time(time.to_naive_time());
        self.time = time;
    }
}

impl fmt::Display for CalendarEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Where an event came from.
///
/// `Outlook` and `Caldav` are the synced sources: the reconciliation
/// service keeps them in their own bucket, replaced wholesale on every
/// sync. Everything else is locally owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    #[default]
    Manual,
    Task,
    Outlook,
    Caldav,
    External,
}

impl EventSource {
    pub fn is_manual(&self) -> bool {
        matches!(self, EventSource::Manual)
    }

    /// Whether events from this source live in the synced bucket.
    pub fn is_synced(&self) -> bool {
        matches!(self, EventSource::Outlook | EventSource::Caldav)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Manual => "manual",
            EventSource::Task => "task",
            EventSource::Outlook => "outlook",
            EventSource::Caldav => "caldav",
            EventSource::External => "external",
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventSource {
    type Err = WeekgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            // Absent sources serialize as "default" in some upstream payloads.
            "manual" | "default" => Ok(EventSource::Manual),
            "task" => Ok(EventSource::Task),
            "outlook" => Ok(EventSource::Outlook),
            "caldav" => Ok(EventSource::Caldav),
            "external" => Ok(EventSource::External),
            other => Err(WeekgridError::Validation(format!(
                "unknown event source '{other}'"
            ))),
        }
    }
}

/// Composite event identity.
///
/// Identity is compared structurally, so two named sources that happen to
/// reuse an origin id can never collide: the dedup key for a synced event
/// is always the (source, origin id) pair. `Display` renders the flat
/// string forms used by the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventId {
    /// Locally generated token for manually created and task-converted events.
    Local(String),
    /// An event owned by an external origin.
    Origin {
        source: EventSource,
        origin_id: String,
    },
    /// A materialized occurrence of a recurring base event. `start_ms` is
    /// the occurrence start as epoch milliseconds.
    Occurrence { base: Box<EventId>, start_ms: i64 },
}

impl EventId {
    /// A fresh local id.
    pub fn new_local() -> Self {
        EventId::Local(Uuid::new_v4().to_string())
    }

    pub fn origin(source: EventSource, origin_id: impl Into<String>) -> Self {
        EventId::Origin {
            source,
            origin_id: origin_id.into(),
        }
    }

    pub fn occurrence(base: &EventId, start_ms: i64) -> Self {
        EventId::Occurrence {
            base: Box::new(base.clone()),
            start_ms,
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventId::Local(token) => write!(f, "{token}"),
            EventId::Origin { source, origin_id } => write!(f, "{source}-{origin_id}"),
            EventId::Occurrence { base, start_ms } => {
                write!(f, "{base}-recurrence-{start_ms}")
            }
        }
    }
}

/// Time of day with minute precision, serialized as `"HH:MM"`.
///
/// The fields are private so a value in range 00:00–23:59 is the only thing
/// that can exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> WeekgridResult<Self> {
        if hour >= 24 || minute >= 60 {
            return Err(WeekgridError::Validation(format!(
                "time {hour:02}:{minute:02} out of range"
            )));
        }
        Ok(TimeOfDay { hour, minute })
    }

    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        TimeOfDay {
            hour: dt.hour() as u8,
            minute: dt.minute() as u8,
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes from midnight.
    pub fn minute_of_day(&self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }

    pub fn to_naive_time(self) -> NaiveTime {
        // In range by construction
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0).unwrap()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = WeekgridError;

    /// Accepts `H:MM` and `HH:MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WeekgridError::Validation(format!("invalid time '{s}', expected HH:MM"));

        let (hour_part, minute_part) = s.split_once(':').ok_or_else(invalid)?;
        if hour_part.is_empty() || hour_part.len() > 2 || minute_part.len() != 2 {
            return Err(invalid());
        }

        let hour: u8 = hour_part.parse().map_err(|_| invalid())?;
        let minute: u8 = minute_part.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hour, minute)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An event participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ParticipantStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ParticipantRole>,
    #[serde(default, rename = "isOrganizer", skip_serializing_if = "is_false")]
    pub is_organizer: bool,
}

/// Participation status, with the iCalendar wire spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantStatus {
    #[serde(rename = "NEEDS-ACTION")]
    NeedsAction,
    #[serde(rename = "ACCEPTED")]
    Accepted,
    #[serde(rename = "DECLINED")]
    Declined,
    #[serde(rename = "TENTATIVE")]
    Tentative,
}

/// Participant role, with the iCalendar wire spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantRole {
    #[serde(rename = "REQ-PARTICIPANT")]
    ReqParticipant,
    #[serde(rename = "OPT-PARTICIPANT")]
    OptParticipant,
    #[serde(rename = "CHAIR")]
    Chair,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(title: &str) -> CalendarEvent {
        CalendarEvent {
            id: EventId::new_local(),
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 6)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            time: TimeOfDay::new(10, 0).unwrap(),
            duration: 60,
            description: None,
            location: None,
            source: EventSource::Manual,
            recurrence: None,
            recurrence_end: None,
            is_generated: false,
            all_day: false,
            priority: None,
            participants: Vec::new(),
        }
    }

    // --- TimeOfDay ---

    #[test]
    fn time_of_day_parses_both_widths() {
        assert_eq!("9:30".parse::<TimeOfDay>().unwrap(), TimeOfDay::new(9, 30).unwrap());
        assert_eq!("09:30".parse::<TimeOfDay>().unwrap(), TimeOfDay::new(9, 30).unwrap());
        assert_eq!("23:59".parse::<TimeOfDay>().unwrap(), TimeOfDay::new(23, 59).unwrap());
    }

    #[test]
    fn time_of_day_rejects_malformed_input() {
        assert!("".parse::<TimeOfDay>().is_err());
        assert!("10".parse::<TimeOfDay>().is_err());
        assert!("24:00".parse::<TimeOfDay>().is_err());
        assert!("10:60".parse::<TimeOfDay>().is_err());
        assert!("10:5".parse::<TimeOfDay>().is_err());
        assert!("aa:bb".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn time_of_day_serializes_as_string() {
        let time = TimeOfDay::new(9, 5).unwrap();
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"09:05\"");

        let parsed: TimeOfDay = serde_json::from_str("\"14:30\"").unwrap();
        assert_eq!(parsed, TimeOfDay::new(14, 30).unwrap());
    }

    // --- EventId ---

    #[test]
    fn origin_ids_compare_structurally() {
        let a = EventId::origin(EventSource::Caldav, "abc-123");
        let b = EventId::origin(EventSource::Caldav, "abc-123");
        let c = EventId::origin(EventSource::Outlook, "abc-123");

        assert_eq!(a, b);
        // Same origin suffix, different source: not the same event
        assert_ne!(a, c);
    }

    #[test]
    fn id_display_matches_wire_forms() {
        let origin = EventId::origin(EventSource::Caldav, "evt-7");
        assert_eq!(origin.to_string(), "caldav-evt-7");

        let occurrence = EventId::occurrence(&EventId::Local("1".into()), 1747130400000);
        assert_eq!(occurrence.to_string(), "1-recurrence-1747130400000");
    }

    // --- CalendarEvent ---

    #[test]
    fn reschedule_keeps_date_and_time_consistent() {
        let mut event = event("Standup");
        let day = NaiveDate::from_ymd_opt(2025, 5, 9).unwrap();
        let time = TimeOfDay::new(14, 30).unwrap();

        event.reschedule(day, time);

        assert_eq!(event.day(), day);
        assert_eq!(event.time, time);
        assert_eq!(TimeOfDay::from_datetime(&event.date), time);
    }

    #[test]
    fn event_roundtrips_through_json() {
        let mut original = event("Planning");
        original.source = EventSource::Caldav;
        original.id = EventId::origin(EventSource::Caldav, "uid-1");
        original.participants = vec![Participant {
            id: "p1".into(),
            name: "Dana".into(),
            email: "dana@example.com".into(),
            avatar: None,
            status: Some(ParticipantStatus::Accepted),
            role: Some(ParticipantRole::Chair),
            is_organizer: true,
        }];

        let json = serde_json::to_string(&original).unwrap();
        let back: CalendarEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn duration_defaults_to_an_hour() {
        let json = r#"{
            "id": {"local": "x"},
            "title": "No duration",
            "date": "2025-05-06T10:00:00",
            "time": "10:00"
        }"#;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.duration, DEFAULT_DURATION_MINUTES);
        assert_eq!(event.source, EventSource::Manual);
        assert!(!event.is_generated);
    }

    #[test]
    fn participant_status_uses_wire_spelling() {
        let json = serde_json::to_string(&ParticipantStatus::NeedsAction).unwrap();
        assert_eq!(json, "\"NEEDS-ACTION\"");
        let json = serde_json::to_string(&ParticipantRole::ReqParticipant).unwrap();
        assert_eq!(json, "\"REQ-PARTICIPANT\"");
    }
}
