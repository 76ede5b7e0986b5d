use anyhow::Result;
use chrono::Local;
use dialoguer::Input;
use owo_colors::OwoColorize;
use weekgrid_core::draft::EventDraft;
use weekgrid_core::reconcile::ReconciliationService;
use weekgrid_core::recurrence::RecurrenceType;
use weekgrid_core::store::KeyValueStore;
use weekgrid_core::TimeOfDay;

#[allow(clippy::too_many_arguments)]
pub async fn run<S: KeyValueStore>(
    service: &ReconciliationService<S>,
    title: Option<String>,
    date: Option<String>,
    time: Option<String>,
    duration: Option<String>,
    location: Option<String>,
    repeat: Option<String>,
    until: Option<String>,
) -> Result<()> {
    let mut draft = EventDraft::new();

    // --- Title ---
    draft.title = Some(match title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?,
    });

    // --- Day ---
    draft.day = Some(match date {
        Some(d) => super::parse_day(&d)?,
        None => Local::now().date_naive(),
    });

    // --- Time ---
    let time = match time {
        Some(t) => t.parse::<TimeOfDay>()?,
        None => prompt_time()?,
    };
    draft.time = Some(time);

    // --- Duration ---
    if let Some(dur) = duration {
        draft.duration = Some(parse_duration_minutes(&dur)?);
    }

    // --- Location ---
    draft.location = location.filter(|l| !l.is_empty());

    // --- Recurrence ---
    if let Some(rule) = repeat {
        draft.recurrence = Some(rule.parse::<RecurrenceType>()?);
        if let Some(until) = until {
            let last_day = super::parse_day(&until)?;
            // Ending at the event's own time keeps the last day's
            // occurrence inside the window
            draft.recurrence_end = Some(last_day.and_time(time.to_naive_time()));
        }
    }

    let event = draft.build()?;
    let summary = format!(
        "  Created: {} on {} at {}",
        event.title,
        event.day(),
        event.time
    );

    let mut events = service.get_all().await?;
    events.push(event);
    service.save(&events).await?;

    println!("{}", summary.green());

    Ok(())
}

/// Prompt for a start time with retry on parse errors.
fn prompt_time() -> Result<TimeOfDay> {
    loop {
        let input: String = Input::new().with_prompt("  When? (HH:MM)").interact_text()?;
        match input.parse() {
            Ok(time) => return Ok(time),
            Err(e) => {
                eprintln!("  {}", e.to_string().red());
            }
        }
    }
}

/// Parse a human duration ("45m", "1h 30m") into whole minutes.
fn parse_duration_minutes(input: &str) -> Result<i64> {
    let duration = humantime::parse_duration(input)
        .map_err(|_| anyhow::anyhow!("Could not parse duration: \"{}\"", input))?;

    let minutes = (duration.as_secs() / 60) as i64;
    if minutes == 0 {
        anyhow::bail!("Duration must be at least one minute");
    }
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- parse_duration_minutes ---

    #[test]
    fn duration_minutes() {
        assert_eq!(parse_duration_minutes("45m").unwrap(), 45);
        assert_eq!(parse_duration_minutes("30 minutes").unwrap(), 30);
    }

    #[test]
    fn duration_hours_and_minutes() {
        assert_eq!(parse_duration_minutes("1h 30m").unwrap(), 90);
        assert_eq!(parse_duration_minutes("2hours").unwrap(), 120);
    }

    #[test]
    fn duration_rejects_sub_minute_and_garbage() {
        assert!(parse_duration_minutes("30s").is_err());
        assert!(parse_duration_minutes("soon").is_err());
    }
}
