use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Bitbucket API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to get a successful response after {attempts} attempts (rate limited)")]
    RetriesExhausted { attempts: u32 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Probe task failed: {0}")]
    Worker(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
