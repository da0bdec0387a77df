//! Error types for gnmi-docs

use thiserror::Error;

/// Result type alias for gnmi-docs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reshaping gNMI data
#[derive(Error, Debug)]
pub enum Error {
    /// A path segment carried a bracket predicate that is not `key=value`
    #[error("Malformed path predicate `[{predicate}]` in `{path}`")]
    PathFormat { path: String, predicate: String },

    /// A typed value arrived with a tag outside the known union
    #[error("Unknown typed value tag: {0}")]
    UnknownValueTag(String),

    /// A value that does not carry JSON was routed to the flattener
    #[error("Unsupported encoding for flattening: {0}")]
    UnsupportedEncoding(String),

    /// No keyword set is registered for a root namespace
    #[error("No keywords registered for namespace `{0}`")]
    MissingKeywordNamespace(String),

    /// The path portion of an index name was truncated to nothing
    #[error("Index name for `{0}` cannot fit the 255 byte limit")]
    IndexDerivationOverflow(String),

    /// A leaf's field name would overwrite a document metadata member
    #[error("Leaf `{0}` collides with a document metadata field")]
    FieldCollision(String),

    /// Failed to load or parse the keyword index file
    #[error("Keywords file error: {0}")]
    KeywordsFile(String),

    /// The device transport failed or returned unusable metadata
    #[error("Device error: {0}")]
    Device(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
