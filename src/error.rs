//! Errors for configuration and leaderboard files
//!
//! The simulation itself never fails: gameplay conditions are clamped,
//! ignored or end the run. Only file I/O on the edges returns errors.

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
