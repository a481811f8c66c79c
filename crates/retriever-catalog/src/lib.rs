//! # retriever-catalog
//!
//! Parsing of parts-catalog manual listings.
//!
//! A listing row is reduced by the caller to its links and the stripped
//! strings of its description cell ([`ListingRow`]). This crate turns those
//! into [`ManualListing`] records, cleans up the "Covers:" text and builds
//! the folder name each manual is saved under.
//!
//! ## Example
//!
//! ```
//! use retriever_catalog::{parse_listing, ListingLink, ListingRow};
//!
//! let row = ListingRow {
//!     links: vec![
//!         ListingLink::new("Index", "/bookindex?bookid=12"),
//!         ListingLink::new("Shop Manual", "/getpage?pageid=340"),
//!     ],
//!     cell: ["Effective:", "May 1965", "Published By:", "GM", "Covers:",
//!            "1964 1965 Chevrolet Chevelle, Chevrolet El Camino", "Pages:", "412"]
//!         .iter()
//!         .map(|s| s.to_string())
//!         .collect(),
//! };
//!
//! let listing = parse_listing(&row)?;
//! assert_eq!(listing.book_id, 12);
//! assert_eq!(listing.covers, "1964-1965 Chevrolet Chevelle, El Camino");
//! assert_eq!(
//!     listing.folder_name(),
//!     "1964-1965 Chevrolet Chevelle, El Camino - Shop Manual - May 1965"
//! );
//! # Ok::<(), retriever_catalog::CatalogError>(())
//! ```

pub mod covers;
pub mod error;
pub mod index;
pub mod listing;

pub use covers::fix_covered_model_text;
pub use error::{CatalogError, Result};
pub use index::{parse_listings, ManualIndex};
pub use listing::{parse_listing, ListingLink, ListingRow, ManualListing, INDEX_KEY, TITLE_KEY};
