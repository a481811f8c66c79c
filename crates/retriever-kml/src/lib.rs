//! # retriever-kml
//!
//! Fills in KML placemark names from their extended data.
//!
//! Some published KML files (state land inventories, for example) carry
//! everything about a placemark in `<ExtendedData>` and leave `<name>` out,
//! so map viewers show unlabeled shapes. This crate inserts a `<name>` into
//! every placemark, taken from one extended data field, and exports all the
//! extended data as CSV with the document's schema as the header.
//!
//! ## Quick Start
//!
//! ```no_run
//! use retriever_kml::{run, ReconcileConfig};
//!
//! let config = ReconcileConfig::new("State-Owned_Lands.kml", "fixed_kml");
//! let report = run(&config)?;
//! println!("Named {} placemarks", report.placemarks);
//! println!("KML: {}", report.kml_path.display());
//! println!("CSV: {}", report.csv_path.display());
//! # Ok::<(), retriever_kml::KmlError>(())
//! ```
//!
//! ## Step by Step
//!
//! ```
//! use retriever_kml::{
//!     extract_extended_fields, extract_schema_field_names, find_placemarks, insert_name,
//!     synthesize_name, KmlDocument,
//! };
//!
//! let kml = r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Document>
//!   <Schema name="Lands"><SimpleField name="ComplexNam"/></Schema>
//!   <Folder><Placemark><ExtendedData><SchemaData>
//!     <SimpleData name="ComplexNam">Main St Depot</SimpleData>
//!   </SchemaData></ExtendedData></Placemark></Folder>
//! </Document></kml>"#;
//!
//! let mut doc = KmlDocument::parse_str(kml)?;
//! assert_eq!(extract_schema_field_names(&doc)?, ["ComplexNam"]);
//!
//! for placemark in find_placemarks(&doc) {
//!     let fields = extract_extended_fields(&doc, placemark);
//!     let name = synthesize_name(&fields, "ComplexNam").expect("name field present");
//!     insert_name(&mut doc, placemark, &name);
//! }
//! # Ok::<(), retriever_kml::KmlError>(())
//! ```
//!
//! ## Outputs
//!
//! | File | Content |
//! |------|---------|
//! | `<out>/<name>.kml` | Input document, re-indented, each placemark with a leading `<name>` |
//! | `<out>/<name>.csv` | Schema field names as header, one row per placemark |
//!
//! ## Error Handling
//!
//! Malformed input, a missing schema or folder, and a placemark without the
//! name field all abort the run. A CSV write failure does not: it is logged
//! and reported as [`TabularOutcome::Failed`] in the [`ReconcileReport`].

pub mod config;
pub mod document;
pub mod error;
pub mod reconcile;
pub mod runner;
pub mod tabular;
pub mod tree;

pub use config::{LogLevel, ReconcileConfig, DEFAULT_INPUT_FILE, DEFAULT_NAME_FIELD, DEFAULT_OUTPUT_PATH};
pub use document::{Folder, KmlDocument, Placemark, Schema, KML_NAMESPACE};
pub use error::{KmlError, MissingFieldError, Result};
pub use reconcile::{
    extract_extended_fields, extract_schema_field_names, find_placemarks, insert_name, load,
    select_folder, serialize_document, synthesize_name, ExtendedFields,
};
pub use runner::{run, ReconcileReport};
pub use tabular::{write_tabular, TabularOutcome};
pub use tree::{NodeId, NodeKind, XmlElement, XmlTree};
