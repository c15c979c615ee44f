//! Spot commands: log attempts and list due spots.

use clap::Subcommand;
use etude_core::{due_spots, Config, PracticeAttempt};
use serde::Serialize;

use super::{print_json, LibraryArgs};

#[derive(Subcommand)]
pub enum SpotAction {
    /// Log a practice attempt and reschedule the spot
    Record {
        /// Spot id
        spot_id: String,
        /// Practice time in minutes
        #[arg(long)]
        minutes: f64,
        /// Self-rated quality 1-5; omit for an unrated run-through
        #[arg(long)]
        quality: Option<u8>,
        /// Free-form note
        #[arg(long)]
        note: Option<String>,
        /// Print the outcome without saving the library
        #[arg(long)]
        dry_run: bool,
        #[command(flatten)]
        args: LibraryArgs,
    },
    /// List spots due for practice
    Due {
        #[command(flatten)]
        args: LibraryArgs,
    },
}

#[derive(Serialize)]
struct Recorded<'a> {
    spot_id: &'a str,
    attempt_id: &'a str,
    #[serde(flatten)]
    outcome: etude_core::ScheduleOutcome,
}

pub fn run(action: SpotAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SpotAction::Record {
            spot_id,
            minutes,
            quality,
            note,
            dry_run,
            args,
        } => {
            let now = args.now()?;
            let path = args.path()?;
            let mut library = args.load()?;
            let scheduler = Config::load_or_default().scheduler();

            let mut attempt = PracticeAttempt::new(spot_id.clone(), now, minutes, quality)?;
            if let Some(note) = note {
                attempt = attempt.with_note(note);
            }
            let attempt_id = attempt.id.clone();
            let outcome = library.record_attempt(&scheduler, attempt)?;

            if dry_run {
                tracing::debug!(spot = %spot_id, "dry run, library not saved");
            } else {
                library.save(&path)?;
                tracing::debug!(path = %path.display(), "saved library");
            }
            print_json(&Recorded {
                spot_id: &spot_id,
                attempt_id: &attempt_id,
                outcome,
            })?;
        }
        SpotAction::Due { args } => {
            let now = args.now()?;
            let library = args.load()?;
            print_json(&due_spots(&library.pieces, now))?;
        }
    }
    Ok(())
}
