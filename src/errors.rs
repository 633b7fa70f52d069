/*!
 * Error types for the fcptitles application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while extracting titles from a project document
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The document is not well-formed XML
    #[error("XML parse error: {0}")]
    Parse(String),
}

/// Errors that can occur while locating the project XML on disk or in a bundle
#[derive(Error, Debug)]
pub enum SourceError {
    /// The input file extension is not one we know how to read
    #[error("Unsupported file type: {0}. Expected .fcpxml, .fcpbundle or .fcpxmld")]
    UnsupportedFileType(String),

    /// A bundle was opened but held no project document
    #[error("No FCPXML file found in bundle: {0}")]
    NoProjectFile(String),

    /// The bundle file could not be read as a ZIP archive
    #[error("Invalid bundle archive: {0}")]
    InvalidArchive(String),

    /// The input exceeds the configured size ceiling
    #[error("Input too large: {size} bytes (limit: {limit} bytes)")]
    TooLarge {
        /// Size of the rejected input
        size: u64,
        /// Configured ceiling
        limit: u64,
    },

    /// The project document is not valid UTF-8
    #[error("Project file is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// Underlying file system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for SourceError {
    fn from(error: zip::result::ZipError) -> Self {
        match error {
            zip::result::ZipError::Io(e) => Self::Io(e),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}

/// Errors that can occur when exporting title records
#[derive(Error, Debug)]
pub enum ExportError {
    /// A record carries a timecode that is not `HH:MM:SS:FF`
    #[error("Invalid title record {index}: {reason}")]
    InvalidRecord {
        /// Position of the record in the input
        index: usize,
        /// What was wrong with it
        reason: String,
    },

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Writing the output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error while reading the project source
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Error from title extraction
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Error while writing the results
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// The project parsed but contained no usable titles
    #[error("No titles found in {0}")]
    NoTitles(String),
}
