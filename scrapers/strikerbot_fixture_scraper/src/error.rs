use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ScraperError>;

// Errors surfaced by an extraction pass or a snapshot fetch
#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("No snapshot found at {0}")]
    NoSnapshot(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Fetch failed: HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Invalid selector: {0}")]
    Selector(String),
}
