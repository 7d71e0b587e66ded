//! Grade roster client error types

use thiserror::Error;

/// Errors surfaced by the grade roster client and document model
#[derive(Error, Debug)]
pub enum SwsError {
    /// IO error from a data-access implementation
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-2xx response from the grade roster service
    #[error("request failed: {url} [{status}] {message}")]
    DataFailure {
        /// Request URL, including the encoded graderoster label
        url: String,
        /// HTTP status code returned by the service
        status: u16,
        /// Human-readable message extracted from the error body
        message: String,
    },

    /// Response body that could not be parsed as a graderoster document
    #[error("malformed graderoster document from {url}: {source}")]
    MalformedResponse {
        /// Request URL the body came from
        url: String,
        /// Underlying parse failure
        source: Box<SwsError>,
    },

    /// XML syntax error while reading a document
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required vocabulary element missing from an otherwise well-formed document
    #[error("missing element: {0}")]
    MissingElement(String),

    /// UTF-8 decoding error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias using SwsError
pub type Result<T> = std::result::Result<T, SwsError>;
