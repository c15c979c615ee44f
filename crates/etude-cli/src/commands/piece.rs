use chrono::NaiveDate;
use clap::Subcommand;
use etude_core::{Config, CoreError};

use super::{print_json, LibraryArgs};

#[derive(Subcommand)]
pub enum PieceAction {
    /// Readiness score with every contributing factor
    Score {
        /// Piece id
        piece_id: String,
        /// Concert date (YYYY-MM-DD); overrides the piece's own date
        #[arg(long)]
        concert: Option<NaiveDate>,
        #[command(flatten)]
        args: LibraryArgs,
    },
    /// List pieces in the library
    List {
        #[command(flatten)]
        args: LibraryArgs,
    },
}

pub fn run(action: PieceAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PieceAction::Score {
            piece_id,
            concert,
            args,
        } => {
            let now = args.now()?;
            let library = args.load()?;
            let piece = library
                .piece(&piece_id)
                .ok_or_else(|| CoreError::Custom(format!("piece not found: {piece_id}")))?;
            let aggregator = Config::load_or_default().aggregator();
            print_json(&aggregator.breakdown(piece, concert, now))?;
        }
        PieceAction::List { args } => {
            let library = args.load()?;
            print_json(&library.pieces)?;
        }
    }
    Ok(())
}
