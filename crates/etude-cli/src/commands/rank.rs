use clap::Subcommand;
use etude_core::Config;

use super::{print_json, LibraryArgs};

#[derive(Subcommand)]
pub enum RankAction {
    /// Pieces by practice priority
    Pieces {
        /// Focus tag; pieces carrying it get a boost (repeatable)
        #[arg(long = "focus", value_name = "TAG")]
        focus: Vec<String>,
        #[command(flatten)]
        args: LibraryArgs,
    },
    /// Spots across all pieces in session order
    Spots {
        /// Focus tag; spots in pieces carrying it get a boost (repeatable)
        #[arg(long = "focus", value_name = "TAG")]
        focus: Vec<String>,
        /// Show at most this many spots
        #[arg(long)]
        limit: Option<usize>,
        #[command(flatten)]
        args: LibraryArgs,
    },
}

pub fn run(action: RankAction) -> Result<(), Box<dyn std::error::Error>> {
    let ranker = Config::load_or_default().ranker();
    match action {
        RankAction::Pieces { focus, args } => {
            let now = args.now()?;
            let library = args.load()?;
            print_json(&ranker.rank_pieces(&library.pieces, &focus, now))?;
        }
        RankAction::Spots { focus, limit, args } => {
            let now = args.now()?;
            let library = args.load()?;
            let mut ranked = ranker.rank_spots(&library.pieces, &focus, now);
            if let Some(limit) = limit {
                ranked.truncate(limit);
            }
            print_json(&ranked)?;
        }
    }
    Ok(())
}
