use anyhow::Result;
use owo_colors::OwoColorize;
use weekgrid_core::reconcile::ReconciliationService;
use weekgrid_core::store::KeyValueStore;

use crate::render::Render;

pub async fn run<S: KeyValueStore>(service: &ReconciliationService<S>) -> Result<()> {
    let mut events = service.get_all().await?;

    if events.is_empty() {
        println!("{}", "  No events yet. Create one with: weekgrid new".dimmed());
        return Ok(());
    }

    events.sort_by_key(|e| e.date);

    let mut current_day = None;
    for event in &events {
        if current_day != Some(event.day()) {
            current_day = Some(event.day());
            println!();
            println!("  {}", event.day().format("%A, %B %-d").to_string().bold());
        }
        let id = event.id.to_string();
        println!("   {} {}", event.render(), format!("({id})").dimmed());
    }

    Ok(())
}
