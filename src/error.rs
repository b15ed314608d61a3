//! Error types for request building, rendering and storage.

use thiserror::Error;

/// Errors raised while configuring or generating a PDF.
#[derive(Error, Debug)]
pub enum PdfError {
    /// API URL or key missing at construction.
    #[error("Cannot instantiate PdfService without an API Key and API URL")]
    InvalidCredentials,

    /// Unknown page format key.
    #[error("Invalid format specified: {0:?}")]
    InvalidFormat(String),

    /// Raw page size rejected.
    #[error("{0}")]
    InvalidSize(String),

    /// Disk name is not in the configured registry.
    #[error("Disk \"{0}\" is not defined in filesystems config")]
    InvalidDisk(String),

    /// Generation attempted without body HTML.
    #[error("No content set. Use view() or html() to set content.")]
    InvalidContent,

    /// Template rendering failed or no renderer is installed.
    #[error("Template error: {0}")]
    Template(String),

    /// The rendering backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Writing to or reading from a disk failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures talking to the rendering backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection, timeout or body read failure.
    #[error("Rendering backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Rendering backend error ({status}): {message}")]
    Status { status: u16, message: String },
}

/// Failures from a [`BlobStore`](crate::storage::BlobStore).
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Key escapes the store root or is otherwise unusable.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl PdfError {
    /// True for both transport failures and error statuses from the backend.
    pub fn is_backend(&self) -> bool {
        matches!(self, PdfError::Backend(_))
    }
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;
