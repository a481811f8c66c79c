//! KML view over an [`XmlTree`]
//!
//! `Document`, `Schema`, `Folder` and `ExtendedData` are located as children
//! in the namespace of the root `<kml>` element. Placemarks are searched
//! document-wide in the KML 2.2 namespace, independent of any folder.

use crate::error::{KmlError, Result};
use crate::tree::{NodeId, XmlTree};

/// Namespace URI placemarks must carry to be found
pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// A parsed KML document
#[derive(Debug, Clone)]
pub struct KmlDocument {
    tree: XmlTree,
}

/// Handle to a `<Schema>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Schema(NodeId);

/// Handle to a `<Folder>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Folder(NodeId);

/// Handle to a `<Placemark>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placemark(NodeId);

impl KmlDocument {
    /// Parse KML text
    ///
    /// # Errors
    ///
    /// Returns [`KmlError::Xml`] or [`KmlError::Parse`] for malformed XML.
    pub fn parse_str(content: &str) -> Result<Self> {
        Ok(Self {
            tree: XmlTree::parse_str(content)?,
        })
    }

    /// Parse KML bytes in whatever encoding the XML declaration names
    ///
    /// # Errors
    ///
    /// Returns [`KmlError::Xml`] or [`KmlError::Parse`] for malformed XML
    /// or bytes that do not match the declared encoding.
    pub fn parse_bytes(content: &[u8]) -> Result<Self> {
        Ok(Self {
            tree: XmlTree::parse_bytes(content)?,
        })
    }

    /// Underlying element tree
    #[inline]
    #[must_use]
    pub const fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// Underlying element tree, mutable
    #[inline]
    pub fn tree_mut(&mut self) -> &mut XmlTree {
        &mut self.tree
    }

    /// Namespace of the root element; structural lookups are made in it
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.tree
            .element(self.tree.root())
            .and_then(|root| root.namespace.as_deref())
    }

    /// Children of `parent` with the given local name, in the document namespace
    pub fn children_named<'a>(
        &'a self,
        parent: NodeId,
        local_name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        let namespace = self.namespace();
        self.tree.child_elements(parent).filter(move |&child| {
            self.tree
                .element(child)
                .is_some_and(|element| element.is(namespace, local_name))
        })
    }

    /// The `<Document>` element under the root
    ///
    /// # Errors
    ///
    /// Returns [`KmlError::Structure`] if there is none.
    pub fn document_element(&self) -> Result<NodeId> {
        self.children_named(self.tree.root(), "Document")
            .next()
            .ok_or_else(|| KmlError::Structure("no <Document> element under <kml>".to_string()))
    }

    /// The first `<Schema>` declared in the `<Document>`
    ///
    /// # Errors
    ///
    /// Returns [`KmlError::Structure`] if the document or schema is missing.
    pub fn schema(&self) -> Result<Schema> {
        let document = self.document_element()?;
        self.children_named(document, "Schema")
            .next()
            .map(Schema)
            .ok_or_else(|| KmlError::Structure("no <Schema> declared in <Document>".to_string()))
    }

    /// Every `<Folder>` directly under the `<Document>`, in document order
    ///
    /// # Errors
    ///
    /// Returns [`KmlError::Structure`] if there is no `<Document>`.
    pub fn folders(&self) -> Result<Vec<Folder>> {
        let document = self.document_element()?;
        Ok(self.children_named(document, "Folder").map(Folder).collect())
    }

    /// Every KML 2.2 `<Placemark>` anywhere in the document, in document order
    #[must_use]
    pub fn placemarks(&self) -> Vec<Placemark> {
        self.tree
            .descendants(self.tree.root())
            .filter(|&id| {
                self.tree
                    .element(id)
                    .is_some_and(|element| element.is(Some(KML_NAMESPACE), "Placemark"))
            })
            .map(Placemark)
            .collect()
    }

    /// Serialize the document
    ///
    /// # Errors
    ///
    /// Returns [`KmlError::Xml`] if the writer fails.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        self.tree.to_xml()
    }
}

impl Schema {
    /// Tree node of the schema element
    #[inline]
    #[must_use]
    pub const fn node(self) -> NodeId {
        self.0
    }

    /// The schema's `name` attribute, falling back to its `id`
    #[must_use]
    pub fn identifier(self, doc: &KmlDocument) -> Option<&str> {
        let element = doc.tree().element(self.0)?;
        element.attribute("name").or_else(|| element.attribute("id"))
    }
}

impl Folder {
    /// Tree node of the folder element
    #[inline]
    #[must_use]
    pub const fn node(self) -> NodeId {
        self.0
    }

    /// Text of the folder's `<name>` child
    #[must_use]
    pub fn name(self, doc: &KmlDocument) -> Option<String> {
        doc.children_named(self.0, "name")
            .next()
            .and_then(|name| doc.tree().text(name))
    }
}

impl Placemark {
    /// Tree node of the placemark element
    #[inline]
    #[must_use]
    pub const fn node(self) -> NodeId {
        self.0
    }

    /// The placemark's `<ExtendedData>` child, if any
    #[must_use]
    pub fn extended_data(self, doc: &KmlDocument) -> Option<NodeId> {
        doc.children_named(self.0, "ExtendedData").next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> KmlDocument {
        let xml = format!(r#"<kml xmlns="{KML_NAMESPACE}">{body}</kml>"#);
        KmlDocument::parse_str(&xml).expect("Failed to parse KML")
    }

    #[test]
    fn test_schema_identifier() {
        let kml = doc(r#"<Document><Schema name="Lands" id="S_1"/></Document>"#);
        assert_eq!(kml.schema().unwrap().identifier(&kml), Some("Lands"));

        let kml = doc(r#"<Document><Schema id="S_1"/></Document>"#);
        assert_eq!(kml.schema().unwrap().identifier(&kml), Some("S_1"));
    }

    #[test]
    fn test_missing_document() {
        let kml = doc("<Folder/>");
        assert!(matches!(kml.schema(), Err(KmlError::Structure(_))));
        assert!(matches!(kml.folders(), Err(KmlError::Structure(_))));
    }

    #[test]
    fn test_folder_name() {
        let kml = doc("<Document><Folder><name>Lands</name></Folder><Folder/></Document>");
        let folders = kml.folders().unwrap();
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].name(&kml).as_deref(), Some("Lands"));
        assert_eq!(folders[1].name(&kml), None);
    }

    #[test]
    fn test_placemarks_found_outside_folders() {
        let kml = doc(
            "<Document><Placemark/><Folder><Placemark/><Folder><Placemark/></Folder></Folder></Document>",
        );
        assert_eq!(kml.placemarks().len(), 3);
    }

    #[test]
    fn test_placemarks_require_kml_namespace() {
        let kml = KmlDocument::parse_str(
            r#"<kml xmlns="http://earth.google.com/kml/2.1"><Document><Placemark/></Document></kml>"#,
        )
        .unwrap();
        assert!(kml.placemarks().is_empty());
        // structural lookups follow the root namespace, so the document is still found
        assert!(kml.document_element().is_ok());
    }
}
