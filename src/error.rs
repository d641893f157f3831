// Error types shared by the catalog, nutrition and import paths

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// The catalog database file does not exist. Views show an empty state.
    #[error("catalog store not found at {0}")]
    StoreMissing(PathBuf),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl DashboardError {
    /// True when the failure means "nothing to show" rather than a broken store.
    pub fn is_empty_state(&self) -> bool {
        matches!(self, DashboardError::StoreMissing(_))
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
