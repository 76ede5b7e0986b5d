//! Terminal rendering for weekgrid types.
//!
//! Extension traits that add colored output to weekgrid-core types using
//! owo_colors.

use owo_colors::OwoColorize;
use weekgrid_core::event::{CalendarEvent, EventSource};
use weekgrid_core::task::{Priority, Task};

/// Extension trait for colored terminal rendering.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for CalendarEvent {
    fn render(&self) -> String {
        let span = format!("{}-{}", self.time, end_time_label(self));

        let mut label = match self.source {
            EventSource::Outlook | EventSource::Caldav | EventSource::External => {
                format!("{} {}", self.title, format!("[{}]", self.source).cyan())
            }
            EventSource::Task => format!("{} {}", self.title, "[task]".yellow()),
            EventSource::Manual => self.title.clone(),
        };
        if self.is_generated {
            label = format!("{} {}", label, "(repeat)".dimmed());
        }
        if let Some(location) = &self.location {
            label = format!("{} {}", label, format!("@ {location}").dimmed());
        }

        format!("{} {}", span.dimmed(), label)
    }
}

impl Render for Task {
    fn render(&self) -> String {
        let marker = if self.completed {
            "[x]".green().to_string()
        } else {
            "[ ]".to_string()
        };

        let priority = match self.priority {
            Priority::High => "high".red().to_string(),
            Priority::Medium => "medium".yellow().to_string(),
            Priority::Low => "low".dimmed().to_string(),
        };

        format!("{} {} ({})", marker, self.title, priority)
    }
}

/// End of the event as HH:MM, wrapping past midnight.
fn end_time_label(event: &CalendarEvent) -> String {
    let end = event.end_minute().rem_euclid(24 * 60);
    format!("{:02}:{:02}", end / 60, end % 60)
}
