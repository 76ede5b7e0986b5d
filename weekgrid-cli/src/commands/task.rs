use anyhow::Result;
use chrono::Local;
use clap::Subcommand;
use owo_colors::OwoColorize;
use uuid::Uuid;
use weekgrid_core::reconcile::ReconciliationService;
use weekgrid_core::store::KeyValueStore;
use weekgrid_core::task::{Priority, Task};
use weekgrid_core::TimeOfDay;

use crate::render::Render;

/// Bucket holding the task list.
const TASKS_KEY: &str = "tasks";

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Add a task
    Add {
        title: String,

        /// Day (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// high, medium or low (defaults to medium)
        #[arg(short, long)]
        priority: Option<String>,
    },
    /// List tasks
    List,
    /// Mark a task as completed
    Done {
        /// Task id (or unique prefix)
        id: String,
    },
    /// Convert a task into a calendar event; the task is removed
    Convert {
        /// Task id (or unique prefix)
        id: String,

        /// Start time for the event (HH:MM)
        #[arg(short, long)]
        time: String,
    },
}

pub async fn run<S: KeyValueStore>(
    service: &ReconciliationService<S>,
    store: &impl KeyValueStore,
    command: TaskCommand,
) -> Result<()> {
    match command {
        TaskCommand::Add {
            title,
            date,
            priority,
        } => {
            let task = Task {
                id: Uuid::new_v4().to_string(),
                title,
                description: None,
                priority: match priority {
                    Some(p) => p.parse()?,
                    None => Priority::Medium,
                },
                completed: false,
                date: match date {
                    Some(d) => super::parse_day(&d)?,
                    None => Local::now().date_naive(),
                },
            };

            let mut tasks = load_tasks(store).await?;
            let summary = format!("  Added task: {}", task.title);
            tasks.push(task);
            save_tasks(store, &tasks).await?;
            println!("{}", summary.green());
        }
        TaskCommand::List => {
            let mut tasks = load_tasks(store).await?;
            if tasks.is_empty() {
                println!("{}", "  No tasks. Add one with: weekgrid task add".dimmed());
                return Ok(());
            }
            tasks.sort_by_key(|t| t.date);
            for task in &tasks {
                let id = &task.id[..8.min(task.id.len())];
                println!(
                    "   {} {} {}",
                    task.render(),
                    task.date.to_string().dimmed(),
                    format!("({id})").dimmed()
                );
            }
        }
        TaskCommand::Done { id } => {
            let mut tasks = load_tasks(store).await?;
            let index = find_task(&tasks, &id)?;
            tasks[index].completed = true;
            let summary = format!("  Done: {}", tasks[index].title);
            save_tasks(store, &tasks).await?;
            println!("{}", summary.green());
        }
        TaskCommand::Convert { id, time } => {
            let time: TimeOfDay = time.parse()?;
            let mut tasks = load_tasks(store).await?;
            let index = find_task(&tasks, &id)?;

            // Conversion removes the task and creates the event
            let task = tasks.remove(index);
            let event = task.into_event(time);
            let summary = format!(
                "  Converted task into event: {} on {} at {}",
                event.title,
                event.day(),
                event.time
            );

            let mut events = service.get_all().await?;
            events.push(event);
            service.save(&events).await?;
            save_tasks(store, &tasks).await?;
            println!("{}", summary.green());
        }
    }

    Ok(())
}

async fn load_tasks(store: &impl KeyValueStore) -> Result<Vec<Task>> {
    Ok(match store.read_value(TASKS_KEY).await? {
        Some(value) => serde_json::from_value(value)?,
        None => Vec::new(),
    })
}

async fn save_tasks(store: &impl KeyValueStore, tasks: &[Task]) -> Result<()> {
    store
        .write_value(TASKS_KEY, serde_json::to_value(tasks)?)
        .await?;
    Ok(())
}

fn find_task(tasks: &[Task], id: &str) -> Result<usize> {
    let matches: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| t.id.starts_with(id))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => anyhow::bail!("No task matching '{}'", id),
        _ => anyhow::bail!("Task id '{}' is ambiguous", id),
    }
}
