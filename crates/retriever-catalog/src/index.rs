//! Index of parsed manual listings keyed by book id

use crate::error::{CatalogError, Result};
use crate::listing::{parse_listing, ListingRow, ManualListing};
use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, info};

/// Manual listings in page order, keyed by book id
#[derive(Debug, Clone, Default)]
pub struct ManualIndex {
    manuals: IndexMap<u32, ManualListing>,
}

impl ManualIndex {
    /// Create an empty index
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listing
    ///
    /// # Errors
    ///
    /// [`CatalogError::DuplicateBook`] if the book id is already present.
    pub fn insert(&mut self, listing: ManualListing) -> Result<()> {
        match self.manuals.entry(listing.book_id) {
            Entry::Occupied(existing) => Err(CatalogError::DuplicateBook {
                id: listing.book_id,
                existing: existing.get().title.clone(),
                incoming: listing.title,
            }),
            Entry::Vacant(slot) => {
                debug!("Indexed book {}: '{}'", listing.book_id, listing.title);
                slot.insert(listing);
                Ok(())
            }
        }
    }

    /// Number of listings
    #[must_use]
    pub fn len(&self) -> usize {
        self.manuals.len()
    }

    /// True if no listings were added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.manuals.is_empty()
    }

    /// Look up a listing by book id
    #[must_use]
    pub fn get(&self, book_id: u32) -> Option<&ManualListing> {
        self.manuals.get(&book_id)
    }

    /// All listings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ManualListing> {
        self.manuals.values()
    }

    /// Listings with a book id of at least `start_with`, or all of them
    pub fn starting_with(&self, start_with: Option<u32>) -> impl Iterator<Item = &ManualListing> {
        let first = start_with.unwrap_or(0);
        self.manuals.values().filter(move |m| m.book_id >= first)
    }
}

/// Parse every row of a listing page into an index
///
/// # Errors
///
/// The first row that fails [`parse_listing`], or a duplicate book id.
pub fn parse_listings<'a, I>(rows: I) -> Result<ManualIndex>
where
    I: IntoIterator<Item = &'a ListingRow>,
{
    let mut index = ManualIndex::new();
    for row in rows {
        index.insert(parse_listing(row)?)?;
    }
    info!("Found {} manuals", index.len());
    Ok(index)
}
