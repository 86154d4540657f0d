//! CLI command implementations.

pub mod terrain;
pub mod texture;

use std::fmt;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use terramesh::progress::{Progress, Stage};

/// Simple error carrying a user-facing message.
#[derive(Debug)]
pub struct CliError {
    message: String,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<terramesh::TerrainError> for CliError {
    fn from(e: terramesh::TerrainError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Progress bar driven by the library's stage-tagged progress callbacks.
pub fn stage_progress_bar() -> (Arc<ProgressBar>, impl Fn(Stage, Progress)) {
    let bar = Arc::new(ProgressBar::new(1));
    bar.set_style(
        ProgressStyle::with_template("{msg:12} [{bar:40}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let bar_for_updates = Arc::clone(&bar);
    let callback = move |stage: Stage, progress: Progress| {
        let label = match stage {
            Stage::TextureFetch => "texture",
            Stage::HeightFetch => "elevation",
            Stage::MeshBuild => "mesh",
        };
        bar_for_updates.set_message(label);
        bar_for_updates.set_length(progress.total as u64);
        bar_for_updates.set_position(progress.completed as u64);
    };

    (bar, callback)
}
