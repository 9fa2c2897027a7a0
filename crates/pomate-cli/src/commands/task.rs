//! Task management commands for CLI.

use clap::Subcommand;
use pomate_core::Config;
use uuid::Uuid;

use crate::context::{open_settings, print_json};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task name
        name: String,
    },
    /// List tasks
    List,
    /// Flip a task between open and completed
    Toggle {
        /// Task ID
        id: Uuid,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: Uuid,
    },
    /// Show the current task, or make the given task current
    Current {
        /// Task ID
        id: Option<Uuid>,
    },
    /// Clear the current task
    ClearCurrent,
}

pub fn run(action: TaskAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = open_settings(config)?;

    match action {
        TaskAction::Add { name } => {
            let id = settings
                .add_task(&name)
                .ok_or("task name must not be empty")?;
            println!("Task created: {id}");
        }
        TaskAction::List => {
            print_json(settings.tasks())?;
        }
        TaskAction::Toggle { id } => {
            let task = settings.task(id).ok_or_else(|| format!("task not found: {id}"))?;
            let now_completed = !task.is_completed;
            settings.toggle_task_completion(id);
            println!("{}", if now_completed { "completed" } else { "reopened" });
        }
        TaskAction::Delete { id } => {
            if settings.task(id).is_none() {
                return Err(format!("task not found: {id}").into());
            }
            settings.delete_task(id);
            println!("Task deleted: {id}");
        }
        TaskAction::Current { id: Some(id) } => {
            if settings.task(id).is_none() {
                return Err(format!("task not found: {id}").into());
            }
            settings.set_current_task(Some(id));
            println!("Current task: {id}");
        }
        TaskAction::Current { id: None } => match settings.current_task() {
            Some(task) => print_json(task)?,
            None => println!("null"),
        },
        TaskAction::ClearCurrent => {
            settings.set_current_task(None);
            println!("ok");
        }
    }
    Ok(())
}
