pub mod completions;
pub mod config;
pub mod piece;
pub mod project;
pub mod rank;
pub mod spot;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use etude_core::storage::data_dir;
use etude_core::{CoreError, Library};

/// Options shared by every command that reads the library.
#[derive(Args, Debug)]
pub struct LibraryArgs {
    /// Library snapshot (JSON); defaults to library.json in the data directory
    #[arg(long, value_name = "FILE")]
    pub library: Option<PathBuf>,
    /// Evaluate as of this instant (RFC 3339) instead of the system clock
    #[arg(long, value_name = "RFC3339")]
    pub now: Option<String>,
}

impl LibraryArgs {
    pub fn path(&self) -> Result<PathBuf, CoreError> {
        match &self.library {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("library.json")),
        }
    }

    pub fn load(&self) -> Result<Library, CoreError> {
        let path = self.path()?;
        if !path.exists() {
            return Err(CoreError::Custom(format!(
                "library not found: {}",
                path.display()
            )));
        }
        let library = Library::load(&path)?;
        tracing::debug!(
            path = %path.display(),
            pieces = library.pieces.len(),
            projects = library.projects.len(),
            "loaded library"
        );
        Ok(library)
    }

    pub fn now(&self) -> Result<DateTime<Utc>, CoreError> {
        parse_now(self.now.as_deref())
    }
}

pub fn parse_now(value: Option<&str>) -> Result<DateTime<Utc>, CoreError> {
    match value {
        None => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| CoreError::Custom(format!("invalid --now '{s}': {e}"))),
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
