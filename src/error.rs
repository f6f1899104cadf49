//! Error types for the itinerary loader, view and export pipeline

use thiserror::Error;

/// Result type alias for itinerary operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, rendering or exporting the itinerary
#[derive(Error, Debug)]
pub enum Error {
    /// Fetching the remote schedule failed (transport or non-success status)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The fetched payload was not a JSON array of activities
    #[error("Invalid schedule data: {0}")]
    InvalidData(String),

    /// A day-key could not be parsed as "Month-Day-Year"
    #[error("Invalid day key: {0:?}")]
    InvalidDayKey(String),

    /// Rasterizing or encoding the exported subtree failed
    #[error("Rendering failed: {0}")]
    RenderError(String),

    /// Assembling the PDF document failed
    #[error("Document generation failed: {0}")]
    DocumentError(String),

    /// A DOM node id did not refer to an element of the document
    #[error("Unknown node: {0}")]
    UnknownNode(usize),

    /// Another export is already running on this engine
    #[error("An export is already in progress")]
    ExportInProgress,

    /// Operation timed out
    #[error("Operation timed out after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Filesystem failure while writing artifacts or reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

