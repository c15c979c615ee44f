//! Project planning commands for CLI.

use clap::Subcommand;
use etude_core::{Config, CoreError};

use super::{print_json, LibraryArgs};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Readiness report and recommendations for a concert program
    Plan {
        /// Project id
        project_id: String,
        #[command(flatten)]
        args: LibraryArgs,
    },
    /// List projects in the library
    List {
        #[command(flatten)]
        args: LibraryArgs,
    },
}

pub fn run(action: ProjectAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProjectAction::Plan { project_id, args } => {
            let now = args.now()?;
            let library = args.load()?;
            let project = library
                .project(&project_id)
                .ok_or_else(|| CoreError::Custom(format!("project not found: {project_id}")))?;
            let planner = Config::load_or_default().planner();
            print_json(&planner.plan(project, &library.pieces, now))?;
        }
        ProjectAction::List { args } => {
            let library = args.load()?;
            print_json(&library.projects)?;
        }
    }
    Ok(())
}
