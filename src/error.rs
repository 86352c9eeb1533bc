//! Error types shared across the crate

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PdfStackError>;

/// Main error type for pdfstack
#[derive(Error, Debug)]
pub enum PdfStackError {
    /// Assembly was requested with nothing selected
    #[error("No images selected")]
    EmptySelection,

    /// An image could not be decoded; assembly stops at this page
    #[error("Failed to decode page {page} ({}): {source}", path.display())]
    DecodeFailure {
        path: PathBuf,
        /// 1-based page number the image would have become
        page: usize,
        /// Pages already placed before the failure
        pages_placed: usize,
        #[source]
        source: DecodeError,
    },

    /// Position outside the current selection
    #[error("Index {index} out of range for {len} selected images")]
    IndexOutOfRange { index: usize, len: usize },

    /// A reorder that is not a permutation of the current selection
    #[error("New order is not a permutation of the current selection")]
    NotAPermutation,

    /// Manual sort received a different number of ranks than tiles
    #[error("Expected {expected} ranks, got {found}")]
    RankCountMismatch { expected: usize, found: usize },

    /// Output name that would place the document outside its directory
    #[error("Output name must not contain a path separator: '{0}'")]
    InvalidOutputName(String),

    /// The selection cannot change while a document is being assembled
    #[error("Selection is locked while the PDF is being created")]
    SelectionLocked,

    /// Building or saving the output document failed
    #[error("Document error: {0}")]
    Artifact(String),

    /// Reading or writing user configuration failed
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons a single image could not be turned into pixels
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("could not read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("unsupported or corrupt image: {0}")]
    Image(#[from] image::ImageError),

    #[error("image has zero width or height")]
    EmptyImage,

    #[error("decode task failed: {0}")]
    Task(String),
}

impl PdfStackError {
    /// Whether the error should be surfaced as a blocking notice rather than a status line
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            PdfStackError::EmptySelection | PdfStackError::DecodeFailure { .. }
        )
    }
}
