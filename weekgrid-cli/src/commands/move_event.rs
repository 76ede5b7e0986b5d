use anyhow::Result;
use owo_colors::OwoColorize;
use weekgrid_core::reconcile::ReconciliationService;
use weekgrid_core::store::KeyValueStore;
use weekgrid_core::TimeOfDay;

pub async fn run<S: KeyValueStore>(
    service: &ReconciliationService<S>,
    id: &str,
    date: Option<&str>,
    time: Option<&str>,
) -> Result<()> {
    let mut events = service.get_all().await?;

    let matches: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.id.to_string().starts_with(id))
        .map(|(i, _)| i)
        .collect();
    let index = match matches.as_slice() {
        [index] => *index,
        [] => anyhow::bail!("No event matching '{}'", id),
        _ => anyhow::bail!("Event id '{}' is ambiguous", id),
    };

    if events[index].source.is_synced() {
        anyhow::bail!(
            "'{}' comes from {} and is read-only here",
            events[index].title,
            events[index].source
        );
    }

    let day = match date {
        Some(d) => super::parse_day(d)?,
        None => events[index].day(),
    };
    let new_time = match time {
        Some(t) => t.parse::<TimeOfDay>()?,
        None => events[index].time,
    };

    events[index].reschedule(day, new_time);
    let summary = format!(
        "  Moved: {} to {} at {}",
        events[index].title,
        events[index].day(),
        events[index].time
    );

    service.save(&events).await?;
    println!("{}", summary.green());

    Ok(())
}
