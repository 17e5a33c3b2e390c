use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Incomplete page {url}: marker '{marker}' not found")]
    IncompletePage { url: String, marker: String },

    #[error("Giving up on {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Missing input file: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Integrity error: {0}")]
    Integrity(String),
}

impl ScraperError {
    /// Errors worth another fetch attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ScraperError::Http(_) | ScraperError::Fetch { .. } | ScraperError::IncompletePage { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScraperError>;
