//! Error types for KML reconciliation

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a reconciliation run
#[derive(Debug, Error)]
pub enum KmlError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input file does not exist
    #[error("Specified KML file does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    /// XML tokenizer error (malformed markup)
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Well-formedness problem found while building the tree
    #[error("KML parsing error: {0}")]
    Parse(String),

    /// Required KML element is absent (no `Document`, `Schema` or `Folder`)
    #[error("Invalid KML structure: {0}")]
    Structure(String),

    /// A placemark lacks the field its display name is built from
    #[error("Placemark #{index}: {source}")]
    MissingField {
        /// Zero-based placemark position in document order
        index: usize,
        /// The failed lookup
        source: MissingFieldError,
    },

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Name synthesis failed because the placemark's extended data lacks a field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("extended data has no field named '{field}'")]
pub struct MissingFieldError {
    /// Name of the absent field
    pub field: String,
}

/// Result type for KML operations
pub type Result<T> = std::result::Result<T, KmlError>;
