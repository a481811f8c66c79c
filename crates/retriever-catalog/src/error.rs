//! Error types for catalog listing parsing

use thiserror::Error;

/// Errors that can occur while parsing a manual listing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A label expected in the description cell is absent
    #[error("Label '{label}' not found in listing for '{title}'")]
    MissingLabel {
        /// The label text, e.g. `Covers:`
        label: &'static str,
        /// Title of the listing, empty if unknown
        title: String,
    },

    /// The row has no link of the given kind
    #[error("Listing has no '{0}' link")]
    MissingLink(&'static str),

    /// A numeric value could not be parsed
    #[error("Invalid {field}: '{value}'")]
    InvalidNumber {
        /// Which value was being parsed
        field: &'static str,
        /// The text that failed to parse
        value: String,
    },

    /// Two listings share a book id
    #[error("Duplicate id {id} found for titles:\n'{existing}'\n'{incoming}'")]
    DuplicateBook {
        /// The shared book id
        id: u32,
        /// Title already in the index
        existing: String,
        /// Title being added
        incoming: String,
    },
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
