//! Day layout: overlap grouping and lane assignment.
//!
//! Given the timed events of one calendar day, partitions them into
//! overlap groups and assigns each member a vertical position (from its
//! start minute and duration) and a horizontal lane (equal division of the
//! group's width), so overlapping events render side by side.

use crate::event::CalendarEvent;

/// Vertical scale applied to minute values.
pub const DEFAULT_PIXELS_PER_MINUTE: f64 = 0.75;

/// An event annotated with its computed position on the day grid.
///
/// `top` and `height` are in pixels (minutes scaled by the
/// pixels-per-minute factor); `width_fraction` and `left_fraction` are in
/// `0.0..=1.0` of the day column's width.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedEvent {
    pub event: CalendarEvent,
    pub top: f64,
    pub height: f64,
    pub width_fraction: f64,
    pub left_fraction: f64,
}

/// Partition one day's events into overlap groups.
///
/// Events are scanned in ascending start order (stable, so ties keep their
/// input order). An event joins the open group when its half-open
/// `[start, end)` interval intersects any member; otherwise the group is
/// closed and a new one starts. Groups are all-or-nothing: membership is
/// transitive through shared members, and no attempt is made to re-pack a
/// group into fewer columns.
pub fn group_by_overlap(events: &[CalendarEvent]) -> Vec<Vec<CalendarEvent>> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(CalendarEvent::start_minute);

    let mut groups: Vec<Vec<CalendarEvent>> = Vec::new();
    let mut current: Vec<CalendarEvent> = Vec::new();

    for event in sorted {
        if current.iter().any(|member| overlaps(&event, member)) {
            current.push(event);
        } else {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            current.push(event);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// Half-open interval intersection on minutes-of-day.
fn overlaps(a: &CalendarEvent, b: &CalendarEvent) -> bool {
    a.start_minute() < b.end_minute() && b.start_minute() < a.end_minute()
}

/// Lay out one day's events into positioned overlap groups.
///
/// Within a group of n members, member i (in insertion order) gets
/// `width_fraction = 1/n` and `left_fraction = i/n`. Values are reported
/// raw; clamping non-positive durations to a minimum visible height is the
/// renderer's concern.
pub fn layout_day(events: &[CalendarEvent], pixels_per_minute: f64) -> Vec<Vec<PositionedEvent>> {
    group_by_overlap(events)
        .into_iter()
        .map(|group| {
            let lanes = group.len() as f64;
            group
                .into_iter()
                .enumerate()
                .map(|(index, event)| PositionedEvent {
                    top: event.start_minute() as f64 * pixels_per_minute,
                    height: event.duration as f64 * pixels_per_minute,
                    width_fraction: 1.0 / lanes,
                    left_fraction: index as f64 / lanes,
                    event,
                })
                .collect()
        })
        .collect()
}
