//! Command handlers for the gymwatch CLI
//!
//! Each handler opens the store, initializes the collection manager,
//! runs one operation, and renders the result. The `log` command
//! composes its draft exactly like the detail screen of the original
//! app: blank row first, then patch it with the parsed values.

use crate::cli::Commands;
use crate::config::Config;
use crate::draft::SessionDraft;
use crate::error::{GymwatchError, Result};
use crate::manager::ExerciseManager;
use crate::model::{Difficulty, Exercise, Session};
use crate::store::SledStore;
use colored::Colorize;
use prettytable::{format, Table};
use std::sync::Arc;

/// Values parsed from one `--set` argument
#[derive(Debug, PartialEq)]
struct ParsedSet {
    weight: Option<f64>,
    reps: Option<u32>,
    difficulty: Difficulty,
}

/// Parse a set spec of the form `WxR[@difficulty]`
///
/// Either side of the `x` may be omitted (`x12` for bodyweight work,
/// `60x` for reps not counted), but not both.
fn parse_set_spec(spec: &str, default_difficulty: Difficulty) -> Result<ParsedSet> {
    let (body, difficulty) = match spec.split_once('@') {
        Some((body, diff)) => {
            let difficulty: Difficulty = diff
                .parse()
                .map_err(GymwatchError::Validation)?;
            (body, difficulty)
        }
        None => (spec, default_difficulty),
    };

    let (weight_str, reps_str) = body.split_once(|c| c == 'x' || c == 'X').ok_or_else(|| {
        GymwatchError::Validation(format!(
            "invalid set spec '{}' (expected WxR, e.g. 60x5)",
            spec
        ))
    })?;

    let weight = if weight_str.is_empty() {
        None
    } else {
        let w: f64 = weight_str.parse().map_err(|_| {
            GymwatchError::Validation(format!("invalid weight '{}' in '{}'", weight_str, spec))
        })?;
        if !w.is_finite() || w <= 0.0 {
            return Err(
                GymwatchError::Validation(format!("weight must be positive in '{}'", spec)).into(),
            );
        }
        Some(w)
    };

    let reps = if reps_str.is_empty() {
        None
    } else {
        let r: u32 = reps_str.parse().map_err(|_| {
            GymwatchError::Validation(format!("invalid rep count '{}' in '{}'", reps_str, spec))
        })?;
        Some(r)
    };

    if weight.is_none() && reps.is_none() {
        return Err(GymwatchError::Validation(format!("set spec '{}' is blank", spec)).into());
    }

    Ok(ParsedSet {
        weight,
        reps,
        difficulty,
    })
}

fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

/// Render an RFC-3339 timestamp as a date, falling back to the raw
/// string for anything unparsable
fn format_date(created_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(created_at)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| created_at.to_string())
}

fn print_exercise_table(items: &[Exercise]) {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Title".bold(),
        "Sessions".bold(),
        "Created".bold()
    ]);

    for exercise in items {
        table.add_row(prettytable::row![
            short_id(&exercise.id).cyan(),
            exercise.title,
            exercise.sessions.len(),
            format_date(&exercise.created_at)
        ]);
    }

    table.printstd();
}

fn print_session(session: &Session) {
    println!(
        "{}  {}  ({} sets)",
        short_id(&session.id).cyan(),
        format_date(&session.created_at),
        session.sets.len()
    );
    for set in &session.sets {
        let weight = set
            .weight
            .map(|w| format!("{}kg", w))
            .unwrap_or_else(|| "bw".to_string());
        let reps = set
            .reps
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("    {} x {}  ({})", weight, reps, set.difficulty);
    }
}

/// Execute one CLI command against the local store
pub async fn run(command: Commands, config: &Config) -> Result<()> {
    let store = Arc::new(SledStore::new()?);
    let mut manager = ExerciseManager::new(store);
    manager.initialize().await;

    match command {
        Commands::List => {
            if manager.items().is_empty() {
                println!("{}", "No exercises yet. Add one with `gymwatch add`.".yellow());
                return Ok(());
            }
            print_exercise_table(manager.items());
            println!();
            println!(
                "Use {} to log a session.",
                "gymwatch log <ID> --set 60x5".cyan()
            );
        }

        Commands::Add { title } => {
            let exercise = manager.create_exercise(&title).await?;
            println!(
                "{}",
                format!("Added '{}' ({})", exercise.title, short_id(&exercise.id)).green()
            );
        }

        Commands::Rename { id, title } => {
            let exercise_id = manager.resolve_exercise(&id)?.id.clone();
            manager.update_exercise_title(&exercise_id, &title).await?;
            println!("{}", format!("Renamed {} to '{}'", short_id(&exercise_id), title.trim()).green());
        }

        Commands::Delete { id, yes } => {
            let exercise = manager.resolve_exercise(&id)?;
            let (exercise_id, title) = (exercise.id.clone(), exercise.title.clone());
            if !yes {
                println!(
                    "{}",
                    format!(
                        "This deletes '{}' and all {} of its sessions. Re-run with --yes to confirm.",
                        title,
                        exercise.sessions.len()
                    )
                    .yellow()
                );
                return Ok(());
            }
            manager.delete_exercise(&exercise_id).await?;
            println!("{}", format!("Deleted '{}'", title).green());
        }

        Commands::Log { id, sets } => {
            let exercise_id = manager.resolve_exercise(&id)?.id.clone();

            let mut draft = SessionDraft::new();
            for spec in &sets {
                let parsed = parse_set_spec(spec, config.sets.default_difficulty)?;
                // A parsed spec is never blank, so the tail is always
                // fillable and add_blank_set cannot refuse
                let row = draft
                    .add_blank_set()
                    .ok_or_else(|| GymwatchError::Validation("draft tail still blank".into()))?;
                draft.update_set(&row, |s| {
                    s.weight = parsed.weight;
                    s.reps = parsed.reps;
                    s.difficulty = parsed.difficulty;
                });
            }

            let session = manager.append_session(&exercise_id, draft.sets()).await?;
            draft.clear();

            println!(
                "{}",
                format!(
                    "Logged session {} with {} sets",
                    short_id(&session.id),
                    session.sets.len()
                )
                .green()
            );
        }

        Commands::Sessions { id } => {
            let exercise = manager.resolve_exercise(&id)?;
            if exercise.sessions.is_empty() {
                println!("{}", format!("No sessions for '{}' yet.", exercise.title).yellow());
                return Ok(());
            }
            println!("\nSessions for '{}':\n", exercise.title);
            for session in &exercise.sessions {
                print_session(session);
            }
        }

        Commands::DeleteSession { id, session_id } => {
            let exercise = manager.resolve_exercise(&id)?;
            let exercise_id = exercise.id.clone();

            let mut matches = exercise
                .sessions
                .iter()
                .filter(|s| s.id == session_id || s.id.starts_with(&session_id));
            let resolved = match (matches.next(), matches.next()) {
                (Some(only), None) => only.id.clone(),
                (Some(_), Some(_)) => {
                    return Err(GymwatchError::Validation(format!(
                        "ambiguous session id prefix '{}'",
                        session_id
                    ))
                    .into())
                }
                (None, _) => {
                    return Err(GymwatchError::Validation(format!(
                        "unknown session '{}'",
                        session_id
                    ))
                    .into())
                }
            };

            manager.delete_session(&exercise_id, &resolved).await?;
            println!("{}", format!("Deleted session {}", short_id(&resolved)).green());
        }
    }

    Ok(())
}
