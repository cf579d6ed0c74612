//! Error types for pdfium-bridge

use crate::surface::SurfaceError;
use thiserror::Error;

/// Result type for pdfium-bridge operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Error types for bridge operations
#[derive(Error, Debug)]
pub enum PdfError {
    /// The engine's global initialization failed
    #[error("Failed to initialize PDF engine: {reason}")]
    InitializationFailed { reason: String },

    /// Password required or incorrect password
    #[error("Password required or incorrect password.")]
    InvalidPassword,

    /// Failed to open PDF document for a reason other than the password
    #[error("{reason}")]
    OpenFailed { reason: String },

    /// Handle was never opened, already closed, or belongs to a reused slot
    #[error("Invalid {kind} handle")]
    InvalidHandle { kind: &'static str },

    /// Failed to load the text layer of a page
    #[error("Failed to load text layer for page {index}")]
    TextLoadFailed { index: usize },

    /// Search operation failed
    #[error("Search error: {0}")]
    SearchError(String),

    /// Pixel format of the target surface is not RGBA_8888 or RGB_565
    #[error("Bitmap format must be RGBA_8888 or RGB_565, got {0}")]
    UnsupportedFormat(String),

    /// Host surface failure (info, lock)
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PNG encoding error
    #[error("PNG encoding error: {0}")]
    PngEncoding(String),
}
