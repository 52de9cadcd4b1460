use clap::{Parser, Subcommand};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AquaError;
use crate::models::Habit;
use crate::session::{Session, Summary};
use crate::utils::format_percent;

/// Plants drawn in the tank
const PLANT_COUNT: usize = 3;

#[derive(Parser)]
#[command(name = "aquaritual")]
#[command(about = "Daily habits that grow an aquarium")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new habit
    Add {
        /// Habit title
        title: String,
    },
    /// Mark a habit done today, or undo today's mark
    Toggle {
        /// Habit id or a unique prefix of it
        id: String,
    },
    /// Delete a habit
    Delete {
        /// Habit id or a unique prefix of it
        id: String,
    },
    /// List habits with today's marks (default if no subcommand)
    List,
    /// Show progress, streak and the aquarium
    Status,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Domain(#[from] AquaError),
    #[error("No habit matches '{0}'")]
    NoMatch(String),
    #[error("'{0}' matches more than one habit, use a longer prefix")]
    Ambiguous(String),
}

/// Resolve a full id or unique prefix against the current habits
pub fn resolve_id(habits: &[Habit], input: &str) -> Result<Uuid, CliError> {
    let needle = input.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(CliError::NoMatch(input.to_string()));
    }
    if let Ok(id) = Uuid::parse_str(&needle) {
        return Ok(id);
    }

    let mut matches = habits
        .iter()
        .filter(|h| h.id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(habit), None) => Ok(habit.id),
        (Some(_), Some(_)) => Err(CliError::Ambiguous(input.to_string())),
        (None, _) => Err(CliError::NoMatch(input.to_string())),
    }
}

/// Handle the add command
pub fn handle_add(title: String, session: &mut Session) -> Result<(), CliError> {
    let habit = session.add_habit(&title)?;
    println!("Habit created: {} ({})", habit.title, short_id(habit.id));
    Ok(())
}

/// Handle the toggle command
pub fn handle_toggle(id: String, session: &mut Session) -> Result<(), CliError> {
    let id = resolve_id(session.habits().habits(), &id)?;
    let report = session.toggle_habit(id)?;

    if report.completed_now {
        println!("Done for today.");
    } else {
        println!("Unmarked for today.");
    }
    println!(
        "Progress {}  Streak {}",
        format_percent(report.progress),
        report.streak
    );

    if let Some(reward) = report.reward {
        if reward.fish_spawned {
            println!("A new fish joined the tank!");
        }
        for decor in reward.unlocked {
            println!("Unlocked decoration: {}", decor);
        }
    }

    if let Some(e) = report.persist_error {
        return Err(e.into());
    }
    Ok(())
}

/// Handle the delete command
pub fn handle_delete(id: String, session: &mut Session) -> Result<(), CliError> {
    // Stale ids are fine here, deleting twice is harmless
    let id = match resolve_id(session.habits().habits(), &id) {
        Ok(id) => id,
        Err(CliError::NoMatch(_)) => {
            println!("Nothing to delete.");
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    if session.delete_habit(id)? {
        println!("Habit deleted.");
    } else {
        println!("Nothing to delete.");
    }
    Ok(())
}

/// Handle the list command
pub fn handle_list(session: &Session) -> Result<(), CliError> {
    let store = session.habits();
    if store.habits().is_empty() {
        println!("No habits yet. Add one with `aquaritual add <title>`.");
        return Ok(());
    }
    for habit in store.habits() {
        let mark = if store.is_completed_today(habit.id) { "x" } else { " " };
        println!("[{}] {}  {}", mark, short_id(habit.id), habit.title);
    }
    Ok(())
}

/// Handle the status command
pub fn handle_status(session: &Session) -> Result<(), CliError> {
    print!("{}", render_summary(&session.summary()));
    Ok(())
}

pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Today ({}): {}/{} habits ({})\n",
        summary.today,
        summary.completed_today,
        summary.habits.len(),
        format_percent(summary.progress)
    ));
    out.push_str(&format!("Streak: {} day(s)\n", summary.streak));

    let heights: Vec<String> = (0..PLANT_COUNT)
        .map(|i| format!("{:.0}", summary.plants.height(i)))
        .collect();
    out.push_str(&format!(
        "Plants: {}{}\n",
        heights.join(" / "),
        if summary.plants.grown { " (grown)" } else { "" }
    ));

    out.push_str(&format!(
        "Fish: {} (spawned today: {})\n",
        summary.aquarium.fishes.len(),
        summary.aquarium.daily_fish_spawns
    ));
    let slots: Vec<&str> = summary.aquarium.decor_slots.iter().map(|d| d.as_str()).collect();
    if slots.is_empty() {
        out.push_str("Decor: none yet\n");
    } else {
        out.push_str(&format!("Decor: {}\n", slots.join(", ")));
    }
    out
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}
