use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "etude", version, about = "Etude practice planner CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Practice spot scheduling
    Spot {
        #[command(subcommand)]
        action: commands::spot::SpotAction,
    },
    /// Piece readiness
    Piece {
        #[command(subcommand)]
        action: commands::piece::PieceAction,
    },
    /// What to practice next
    Rank {
        #[command(subcommand)]
        action: commands::rank::RankAction,
    },
    /// Concert project planning
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Spot { action } => commands::spot::run(action),
        Commands::Piece { action } => commands::piece::run(action),
        Commands::Rank { action } => commands::rank::run(action),
        Commands::Project { action } => commands::project::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
