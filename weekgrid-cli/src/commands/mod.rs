pub mod day;
pub mod events;
pub mod move_event;
pub mod new;
pub mod sync;
pub mod task;

use anyhow::Result;
use chrono::NaiveDate;

/// Parse a YYYY-MM-DD day argument.
pub(crate) fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}
