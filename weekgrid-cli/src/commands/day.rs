use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;
use weekgrid_core::config::WeekgridConfig;
use weekgrid_core::event::CalendarEvent;
use weekgrid_core::layout::layout_day;
use weekgrid_core::reconcile::ReconciliationService;
use weekgrid_core::recurrence::expand;
use weekgrid_core::store::KeyValueStore;

use crate::render::Render;

/// One rendered bar character per this many layout pixels.
const PIXELS_PER_CELL: f64 = 11.25;

pub async fn run<S: KeyValueStore>(
    service: &ReconciliationService<S>,
    config: &WeekgridConfig,
    date: Option<&str>,
) -> Result<()> {
    let day = match date {
        Some(s) => super::parse_day(s)?,
        None => Local::now().date_naive(),
    };
    let now = Local::now().naive_local();

    let all = service.get_all().await?;
    let (all_day, timed): (Vec<CalendarEvent>, Vec<CalendarEvent>) =
        expand(&all, now, config.horizon_months)
            .into_iter()
            .filter(|e| e.day() == day)
            .partition(|e| e.all_day);

    println!("  {}", day.format("%A, %B %-d, %Y").to_string().bold());

    for event in &all_day {
        println!("   {} {}", "all day".dimmed(), event.title);
    }

    if timed.is_empty() {
        if all_day.is_empty() {
            println!("{}", "   No events".dimmed());
        }
        return Ok(());
    }

    let layout = layout_day(&timed, config.pixels_per_minute);
    for group in &layout {
        println!();
        let lanes = group.len();
        for positioned in group {
            let lane = (positioned.left_fraction * lanes as f64).round() as usize;
            let indent = "    ".repeat(lane);
            let cells = ((positioned.height / PIXELS_PER_CELL).round() as usize).clamp(1, 32);
            let bar = "▏".repeat(cells);

            let lane_tag = if lanes > 1 {
                format!(" [lane {}/{}]", lane + 1, lanes).dimmed().to_string()
            } else {
                String::new()
            };

            println!(
                "   {}{} {}{}",
                indent,
                bar.dimmed(),
                positioned.event.render(),
                lane_tag
            );
        }
    }

    Ok(())
}
