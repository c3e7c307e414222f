//! Error types for the board, its store and its configuration.

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// I/O error while touching the store, config or an export file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Board JSON could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown quadrant: {0}")]
    UnknownQuadrant(String),

    /// Due date not in `YYYY-MM-DD` form.
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, BoardError>;
