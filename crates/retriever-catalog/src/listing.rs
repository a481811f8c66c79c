//! Manual listing records
//!
//! A catalog browse page lists one manual per table row. The row's links
//! give the book id and the first page; its description cell is a run of
//! label/value strings:
//!
//! ```text
//! Effective: | April 1960 | Published By: | Chevrolet Motor Division |
//! Covers: | 1960 1960 Chevrolet Corvair | Pages: | 160
//! ```
//!
//! A blank value shows up as two labels in a row.

use crate::covers::fix_covered_model_text;
use crate::error::{CatalogError, Result};
use tracing::{debug, warn};

/// Link prefix of the book index link, which carries the book id
pub const INDEX_KEY: &str = "/bookindex";

/// Link prefix of the title link, which carries the first page id
pub const TITLE_KEY: &str = "/getpage";

const EFFECTIVE_LABEL: &str = "Effective:";
const PUBLISHER_LABEL: &str = "Published By:";
const COVERS_LABEL: &str = "Covers:";
const PAGES_LABEL: &str = "Pages:";

/// One `<a>` in a listing row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingLink {
    /// Link text, already trimmed
    pub text: String,
    /// The `href` attribute
    pub href: String,
}

impl ListingLink {
    /// Create a link
    #[must_use]
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
        }
    }
}

/// The raw pieces of one listing row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingRow {
    /// Every link in the row
    pub links: Vec<ListingLink>,
    /// Stripped strings of the description cell
    pub cell: Vec<String>,
}

/// A parsed manual listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualListing {
    /// Book id from the index link
    pub book_id: u32,
    /// Title from the title link
    pub title: String,
    /// First page id, `-1` if the title link has none
    pub start_page: i64,
    /// Effective date, e.g. `April 1960`; empty if not given
    pub date: String,
    /// Publisher; empty if not given
    pub publisher: String,
    /// Models covered, cleaned up by [`fix_covered_model_text`]; empty if not given
    pub covers: String,
    /// Page count, 0 if not given
    pub pages: u32,
}

impl ManualListing {
    /// Folder the manual's pages are saved in
    ///
    /// `"<covers> - <title> - <date>"`, or with the publisher in place of
    /// the covered models when those are blank:
    ///
    /// * `1960 Chevrolet Corvair - Parts and Accessories Catalog P&A 34 - April 1960`
    /// * `Chevrolet Motor Division - Master Parts List Six Cylinder Models - August 1941`
    #[must_use]
    pub fn folder_name(&self) -> String {
        let lead = if self.covers.is_empty() {
            &self.publisher
        } else {
            &self.covers
        };
        let folder = format!("{lead} - {} - {}", self.title, self.date);
        debug!("Output folder name: '{folder}'");
        folder
    }
}

/// Build a [`ManualListing`] from a row's links and description cell
///
/// # Errors
///
/// * [`CatalogError::MissingLink`] if the row has no index or title link
/// * [`CatalogError::MissingLabel`] if a description label is absent
/// * [`CatalogError::InvalidNumber`] for a non-numeric book id or page count
pub fn parse_listing(row: &ListingRow) -> Result<ManualListing> {
    let mut book_id = None;
    let mut title_link = None;

    for link in &row.links {
        debug!("Found link: '{}': '{}'", link.text, link.href);
        if link.href.starts_with(INDEX_KEY) {
            book_id = Some(parse_number::<u32>("book id", trailing_value(&link.href))?);
        } else if link.href.starts_with(TITLE_KEY) {
            let start_page = trailing_value(&link.href).parse::<i64>().unwrap_or_else(|_| {
                warn!("'{}': No page id specified", link.text);
                -1
            });
            title_link = Some((link.text.clone(), start_page));
        }
    }

    let book_id = book_id.ok_or(CatalogError::MissingLink(INDEX_KEY))?;
    let (title, start_page) = title_link.ok_or(CatalogError::MissingLink(TITLE_KEY))?;

    let cell = &row.cell;
    debug!("Second cell: {cell:?}");
    let label = |name: &'static str| {
        cell.iter()
            .position(|s| s == name)
            .ok_or_else(|| CatalogError::MissingLabel {
                label: name,
                title: title.clone(),
            })
    };
    let effective = label(EFFECTIVE_LABEL)?;
    let publisher = label(PUBLISHER_LABEL)?;
    let covers = label(COVERS_LABEL)?;
    let pages = label(PAGES_LABEL)?;

    let date = value_between(cell, effective, publisher, "Effective date", &title);
    let publisher = value_between(cell, publisher, covers, "Publisher", &title);
    let covers = value_between(cell, covers, pages, "Models covered", &title);
    let covers = if covers.is_empty() {
        covers
    } else {
        fix_covered_model_text(&covers)
    };
    let pages = match cell.get(pages + 1) {
        Some(value) => parse_number::<u32>("page count", value)?,
        None => {
            warn!("'{title}': Total pages not given");
            0
        }
    };

    let listing = ManualListing {
        book_id,
        title,
        start_page,
        date,
        publisher,
        covers,
        pages,
    };
    debug!("Parsed record: {listing:?}");
    Ok(listing)
}

/// The value after the label at `label`, blank when the next label follows directly
fn value_between(cell: &[String], label: usize, next_label: usize, what: &str, title: &str) -> String {
    if next_label > label + 1 {
        let value = cell[label + 1].clone();
        debug!("{what} [{}]: {value}", label + 1);
        value
    } else {
        warn!("'{title}': {what} not given");
        String::new()
    }
}

/// Text after the last `=` of an href
fn trailing_value(href: &str) -> &str {
    href.rsplit('=').next().unwrap_or(href)
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| CatalogError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
