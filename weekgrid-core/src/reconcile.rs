//! Multi-source event reconciliation.
//!
//! Merges manually authored, task-converted and externally synced events
//! into one consistent collection across two persisted buckets. Sync
//! batches replace the synced bucket wholesale (external sources always
//! report their current full state for the queried window), so repeated
//! syncs are idempotent and events dropped by the server disappear here
//! too.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{WeekgridError, WeekgridResult};
use crate::event::{CalendarEvent, EventId, EventSource, TimeOfDay, DEFAULT_DURATION_MINUTES};
use crate::recurrence::RecurrenceType;
use crate::store::{KeyValueStore, MANUAL_EVENTS_KEY, SYNCED_EVENTS_KEY};

/// Raw event record as delivered by a sync gateway.
///
/// Gateways translate provider-native payloads (iCalendar VEVENTs,
/// Exchange appointments) into this loose shape; [`validate`] is the
/// boundary where a record becomes a typed [`CalendarEvent`] or is
/// rejected.
///
/// [`validate`]: RawEventRecord::validate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, rename = "recurrenceType")]
    pub recurrence_type: Option<String>,
    #[serde(default, rename = "recurrenceEndDate")]
    pub recurrence_end_date: Option<String>,
    #[serde(default, rename = "isAllDay")]
    pub all_day: bool,
}

impl RawEventRecord {
    /// Validate this record into a calendar event.
    ///
    /// An unrecognized recurrence rule degrades to non-recurring with a
    /// logged skip; everything else malformed is an error.
    pub fn validate(self) -> WeekgridResult<CalendarEvent> {
        if self.id.is_empty() {
            return Err(WeekgridError::Validation("record has no id".into()));
        }
        if self.title.is_empty() {
            return Err(WeekgridError::Validation("record has no title".into()));
        }

        let date = parse_start_instant(&self.date)?;
        let time: TimeOfDay = self.time.parse()?;

        // Records without a named origin still came from outside.
        let source = match self.source.as_deref() {
            Some(s) => s.parse::<EventSource>()?,
            None => EventSource::External,
        };

        let recurrence = match self.recurrence_type.as_deref() {
            Some(rule) => match rule.parse::<RecurrenceType>() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    warn!(id = %self.id, rule, "unrecognized recurrence rule, treating event as non-recurring");
                    None
                }
            },
            None => None,
        };
        let recurrence_end = self
            .recurrence_end_date
            .as_deref()
            .map(parse_start_instant)
            .transpose()?;

        Ok(CalendarEvent {
            id: EventId::origin(source, self.id),
            title: self.title,
            date,
            time,
            duration: self.duration.unwrap_or(DEFAULT_DURATION_MINUTES),
            description: self.description,
            location: self.location,
            source,
            recurrence,
            recurrence_end,
            is_generated: false,
            all_day: self.all_day,
            priority: None,
            participants: Vec::new(),
        })
    }
}

/// Parse the ISO-8601 start instants gateways send: plain local datetimes,
/// RFC 3339 with an offset or `Z`, or a bare date (midnight).
fn parse_start_instant(s: &str) -> WeekgridResult<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        // Midnight; the time field still decides grid placement
        return Ok(d.and_hms_opt(0, 0, 0).unwrap());
    }
    Err(WeekgridError::Validation(format!(
        "unparseable date '{s}'"
    )))
}

/// Drop events whose id was already seen; first seen wins, order preserved.
pub fn dedupe_by_id(events: Vec<CalendarEvent>) -> Vec<CalendarEvent> {
    let mut seen: HashSet<EventId> = HashSet::with_capacity(events.len());
    events
        .into_iter()
        .filter(|event| seen.insert(event.id.clone()))
        .collect()
}

/// Merges and persists events from every origin.
///
/// The store is an explicit dependency: construct one service per session
/// and thread it to whoever needs persistence access.
pub struct ReconciliationService<S> {
    store: S,
}

impl<S: KeyValueStore> ReconciliationService<S> {
    pub fn new(store: S) -> Self {
        ReconciliationService { store }
    }

    /// Persist a full event collection, partitioned by origin.
    ///
    /// `Outlook`/`Caldav` events go to the synced bucket; everything else
    /// (manual, task-converted, external) is locally owned and goes to the
    /// manual bucket. Generated occurrences are never persisted and are
    /// filtered out here. Each bucket is deduplicated by id, first seen
    /// wins, and written wholesale.
    pub async fn save(&self, events: &[CalendarEvent]) -> WeekgridResult<()> {
        let base_events: Vec<CalendarEvent> = events
            .iter()
            .filter(|event| !event.is_generated)
            .cloned()
            .collect();
        let skipped = events.len() - base_events.len();
        if skipped > 0 {
            debug!(skipped, "not persisting generated occurrences");
        }

        let (synced, manual): (Vec<_>, Vec<_>) = base_events
            .into_iter()
            .partition(|event| event.source.is_synced());

        self.write_bucket(MANUAL_EVENTS_KEY, &dedupe_by_id(manual))
            .await?;
        self.write_bucket(SYNCED_EVENTS_KEY, &dedupe_by_id(synced))
            .await
    }

    /// Ingest a sync batch and return the merged collection.
    ///
    /// Invalid records are dropped with a warning, never failing the
    /// batch. The validated batch replaces the synced bucket in one write;
    /// the manual bucket is untouched.
    pub async fn sync(&self, batch: Vec<RawEventRecord>) -> WeekgridResult<Vec<CalendarEvent>> {
        let total = batch.len();
        let mut validated = Vec::with_capacity(total);
        for record in batch {
            let record_id = record.id.clone();
            match record.validate() {
                Ok(event) => validated.push(event),
                Err(err) => warn!(id = %record_id, %err, "dropping invalid synced record"),
            }
        }
        debug!(kept = validated.len(), total, "validated sync batch");

        let synced = dedupe_by_id(validated);
        self.write_bucket(SYNCED_EVENTS_KEY, &synced).await?;

        let manual = self.read_bucket(MANUAL_EVENTS_KEY).await?;
        Ok(dedupe_by_id(manual.into_iter().chain(synced).collect()))
    }

    /// The merged collection: manual and synced buckets, deduplicated by id.
    pub async fn get_all(&self) -> WeekgridResult<Vec<CalendarEvent>> {
        let manual = self.read_bucket(MANUAL_EVENTS_KEY).await?;
        let synced = self.read_bucket(SYNCED_EVENTS_KEY).await?;
        Ok(dedupe_by_id(manual.into_iter().chain(synced).collect()))
    }

    async fn read_bucket(&self, key: &str) -> WeekgridResult<Vec<CalendarEvent>> {
        match self.store.read_value(key).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    async fn write_bucket(&self, key: &str, events: &[CalendarEvent]) -> WeekgridResult<()> {
        self.store
            .write_value(key, serde_json::to_value(events)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, title: &str) -> RawEventRecord {
        RawEventRecord {
            id: id.to_string(),
            title: title.to_string(),
            date: "2025-05-06T10:00:00".to_string(),
            time: "10:00".to_string(),
            duration: Some(30),
            description: None,
            location: None,
            source: Some("caldav".to_string()),
            recurrence_type: None,
            recurrence_end_date: None,
            all_day: false,
        }
    }

    // --- RawEventRecord::validate ---

    #[test]
    fn valid_record_becomes_an_event() {
        let event = raw("uid-1", "Review").validate().unwrap();

        assert_eq!(event.id, EventId::origin(EventSource::Caldav, "uid-1"));
        assert_eq!(event.title, "Review");
        assert_eq!(event.source, EventSource::Caldav);
        assert_eq!(event.duration, 30);
        assert_eq!(event.time, TimeOfDay::new(10, 0).unwrap());
        assert!(!event.is_generated);
    }

    #[test]
    fn missing_id_or_title_is_rejected() {
        assert!(raw("", "Review").validate().is_err());
        assert!(raw("uid-1", "").validate().is_err());
    }

    #[test]
    fn unparseable_date_or_time_is_rejected() {
        let mut record = raw("uid-1", "Review");
        record.date = "yesterday-ish".into();
        assert!(record.validate().is_err());

        let mut record = raw("uid-1", "Review");
        record.time = "25:99".into();
        assert!(record.validate().is_err());
    }

    #[test]
    fn date_parsing_accepts_gateway_variants() {
        let mut record = raw("uid-1", "Review");
        record.date = "2025-05-06T10:00:00.000Z".into();
        assert!(record.validate().is_ok());

        let mut record = raw("uid-2", "Review");
        record.date = "2025-05-06".into();
        assert!(record.validate().is_ok());
    }

    #[test]
    fn unknown_source_is_rejected_missing_source_is_external() {
        let mut record = raw("uid-1", "Review");
        record.source = Some("fax".into());
        assert!(record.validate().is_err());

        let mut record = raw("uid-1", "Review");
        record.source = None;
        let event = record.validate().unwrap();
        assert_eq!(event.source, EventSource::External);
    }

    #[test]
    fn unknown_recurrence_rule_degrades_to_non_recurring() {
        let mut record = raw("uid-1", "Review");
        record.recurrence_type = Some("fortnightly".into());
        let event = record.validate().unwrap();
        assert!(event.recurrence.is_none());

        let mut record = raw("uid-2", "Review");
        record.recurrence_type = Some("weekly".into());
        record.recurrence_end_date = Some("2025-06-01T10:00:00".into());
        let event = record.validate().unwrap();
        assert_eq!(event.recurrence, Some(RecurrenceType::Weekly));
        assert!(event.recurrence_end.is_some());
    }

    #[test]
    fn duration_defaults_when_absent() {
        let mut record = raw("uid-1", "Review");
        record.duration = None;
        let event = record.validate().unwrap();
        assert_eq!(event.duration, DEFAULT_DURATION_MINUTES);
    }

    // --- dedupe_by_id ---

    #[test]
    fn first_seen_wins() {
        let a = raw("uid-1", "A").validate().unwrap();
        let b = raw("uid-1", "B").validate().unwrap();

        let deduped = dedupe_by_id(vec![a, b]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].title, "A");
    }

    #[test]
    fn same_origin_id_different_source_both_survive() {
        let caldav = raw("uid-1", "From caldav").validate().unwrap();
        let mut outlook_record = raw("uid-1", "From outlook");
        outlook_record.source = Some("outlook".into());
        let outlook = outlook_record.validate().unwrap();

        let deduped = dedupe_by_id(vec![caldav, outlook]);
        assert_eq!(deduped.len(), 2);
    }
}
