//! Placemark name reconciliation
//!
//! The individual steps of a run: load the document, read the schema's
//! field names, pick the folder, collect placemarks, read each placemark's
//! extended data, derive its name and insert it.

use crate::document::{Folder, KmlDocument, Placemark};
use crate::error::{MissingFieldError, Result};
use crate::tree::{NodeId, XmlElement};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// A placemark's extended data, field name to text, in first-seen order
pub type ExtendedFields = IndexMap<String, String>;

/// Read and parse a KML file. Every call re-reads the file.
///
/// The file is decoded according to its XML declaration (UTF-8 when it
/// declares nothing).
///
/// # Errors
///
/// Returns [`crate::KmlError::Io`] if the file cannot be read and
/// [`crate::KmlError::Xml`] / [`crate::KmlError::Parse`] if it is malformed.
#[must_use = "this function returns the parsed document"]
pub fn load<P: AsRef<Path>>(path: P) -> Result<KmlDocument> {
    let content = fs::read(path.as_ref())?;
    KmlDocument::parse_bytes(&content)
}

/// Names of the schema's `SimpleField` declarations, in declaration order
///
/// A schema without fields gives an empty list. Fields without a `name`
/// attribute are skipped.
///
/// # Errors
///
/// Returns [`crate::KmlError::Structure`] if the document declares no schema.
pub fn extract_schema_field_names(doc: &KmlDocument) -> Result<Vec<String>> {
    let schema = doc.schema()?;
    info!(
        schema = schema.identifier(doc).unwrap_or_default(),
        "Found schema"
    );

    let tree = doc.tree();
    let names = doc
        .children_named(schema.node(), "SimpleField")
        .filter_map(|field| tree.element(field).and_then(|e| e.attribute("name")))
        .map(str::to_string)
        .collect();
    Ok(names)
}

/// The document's first folder
///
/// Only one folder is supported; with several, the rest are ignored and a
/// warning is logged.
///
/// # Errors
///
/// Returns [`crate::KmlError::Structure`] if there is no folder.
pub fn select_folder(doc: &KmlDocument) -> Result<Folder> {
    let folders = doc.folders()?;
    let Some(&first) = folders.first() else {
        return Err(crate::KmlError::Structure(
            "no <Folder> in <Document>".to_string(),
        ));
    };
    if folders.len() > 1 {
        warn!(
            "Not supported: Found {} Folders; will process FIRST only",
            folders.len()
        );
    }
    Ok(first)
}

/// All placemarks in the document, regardless of which folder holds them
#[must_use]
pub fn find_placemarks(doc: &KmlDocument) -> Vec<Placemark> {
    doc.placemarks()
}

/// Collect the named values under a placemark's `<ExtendedData>`
///
/// Both `<SimpleData name="k">v</SimpleData>` and
/// `<Data name="k"><value>v</value></Data>` are read. Elements without a
/// `name` are skipped; a repeated name keeps the last value.
#[must_use]
pub fn extract_extended_fields(doc: &KmlDocument, placemark: Placemark) -> ExtendedFields {
    let mut fields = ExtendedFields::new();
    let Some(extended) = placemark.extended_data(doc) else {
        return fields;
    };

    let tree = doc.tree();
    for id in tree.descendants(extended) {
        let Some(element) = tree.element(id) else {
            continue;
        };
        let Some(name) = element.attribute("name") else {
            continue;
        };
        let value = if element.local_name() == "Data" {
            doc.children_named(id, "value")
                .next()
                .and_then(|value| tree.text(value))
        } else {
            tree.text(id)
        };
        fields.insert(name.to_string(), value.unwrap_or_default());
    }
    fields
}

/// Display name for a placemark: the value of `name_field`, verbatim
///
/// # Errors
///
/// Returns [`MissingFieldError`] if the field is absent.
pub fn synthesize_name(
    fields: &ExtendedFields,
    name_field: &str,
) -> std::result::Result<String, MissingFieldError> {
    fields
        .get(name_field)
        .cloned()
        .ok_or_else(|| MissingFieldError {
            field: name_field.to_string(),
        })
}

/// Insert `<name>name</name>` as the placemark's first child
///
/// An existing `<name>` is left in place; the new one goes before it.
/// The new element uses the placemark's namespace prefix.
pub fn insert_name(doc: &mut KmlDocument, placemark: Placemark, name: &str) -> NodeId {
    let element = match doc.tree().element(placemark.node()) {
        Some(mark) => {
            let tag = mark
                .prefix()
                .map_or_else(|| "name".to_string(), |prefix| format!("{prefix}:name"));
            XmlElement::new(tag, mark.namespace.clone())
        }
        None => XmlElement::new("name", None),
    };
    debug!(name, "Inserting placemark name");
    doc.tree_mut()
        .insert_element(placemark.node(), 0, element, Some(name))
}

/// Serialize the whole document, indented
///
/// # Errors
///
/// Returns [`crate::KmlError::Xml`] if the writer fails.
pub fn serialize_document(doc: &KmlDocument) -> Result<Vec<u8>> {
    doc.to_xml()
}
