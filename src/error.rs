use thiserror::Error;

/// Why the editor widget could not be brought up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitError {
    #[error("editor container '{0}' not found")]
    ContainerMissing(String),
    #[error("editor library is not loaded")]
    LibraryMissing,
    #[error("editor construction failed: {0}")]
    Construct(String),
    #[error("editor configuration failed: {0}")]
    Configure(String),
}

/// Failure of a single widget operation. Callers treat these as best-effort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("cursor position {row}:{column} is outside the document")]
    CursorOutOfRange { row: u32, column: u32 },
    #[error("editor widget error: {0}")]
    Widget(String),
}

/// Failure at the fetch boundary. `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),
    #[error("Server returned non-JSON response (Status: {status} {status_text})")]
    NonJson { status: u16, status_text: String },
    #[error("{0}")]
    Status(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
