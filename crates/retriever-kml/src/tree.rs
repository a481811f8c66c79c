//! Owned, mutable XML tree
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Ids stay
//! valid for the lifetime of the tree: nodes are only ever added, so a
//! handle taken before an insertion still points at the same node after it.
//!
//! The tree keeps element names exactly as written (`kml:Placemark` stays
//! prefixed) and resolves each element's namespace URI from the `xmlns`
//! declarations in scope while parsing. Whitespace-only text between
//! elements is dropped and serialization re-indents the whole document;
//! whitespace that is an element's entire content is kept. Comments,
//! processing instructions and the doctype are kept in place. The XML
//! declaration is not: output always declares version 1.0 and UTF-8.

use crate::error::{KmlError, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;

/// Handle to a node inside an [`XmlTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Arena slot of the synthetic document node that owns the root element
const DOCUMENT: NodeId = NodeId(0);

/// An element's tag and attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name as written in the source, e.g. `kml:Placemark`
    pub name: String,
    /// Resolved namespace URI, `None` when the element is unqualified
    pub namespace: Option<String>,
    /// Attributes in source order, values unescaped
    pub attributes: Vec<(String, String)>,
}

impl XmlElement {
    /// Create an element with no attributes
    #[inline]
    #[must_use = "creates a detached element description"]
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            attributes: Vec::new(),
        }
    }

    /// Name without its namespace prefix
    #[inline]
    #[must_use]
    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// Namespace prefix, if the name carries one
    #[inline]
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Value of the attribute with the given (qualified) key
    #[inline]
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True when the element has this local name in this namespace
    #[inline]
    #[must_use]
    pub fn is(&self, namespace: Option<&str>, local_name: &str) -> bool {
        self.local_name() == local_name && self.namespace.as_deref() == namespace
    }
}

/// Content of a tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The synthetic document node at the top of every tree
    Document,
    /// An element
    Element(XmlElement),
    /// Character data, unescaped
    Text(String),
    /// A `<![CDATA[...]]>` section
    CData(String),
    /// A `<!-- ... -->` comment
    Comment(String),
    /// A `<? ... ?>` processing instruction, target and content as written
    ProcessingInstruction(String),
    /// A `<!DOCTYPE ...>` declaration, content as written
    DocType(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Namespace declarations made on one open element: `(prefix, uri)`,
/// prefix `None` for the default namespace
type Scope = Vec<(Option<String>, String)>;

/// An element whose end tag has not been read yet
///
/// Whitespace-only text is held back until it is known whether the element
/// has element children. Between child elements it is indentation and is
/// dropped; as the element's only content it is data and is kept.
#[derive(Debug)]
struct OpenElement {
    id: NodeId,
    has_elements: bool,
    whitespace: String,
}

impl OpenElement {
    fn new(id: NodeId) -> Self {
        Self {
            id,
            has_elements: false,
            whitespace: String::new(),
        }
    }

    fn hold_whitespace(&mut self, text: &str) {
        if !self.has_elements {
            self.whitespace.push_str(text);
        }
    }

    fn flush_whitespace(&mut self, nodes: &mut Vec<Node>) {
        if !self.whitespace.is_empty() {
            let text = std::mem::take(&mut self.whitespace);
            push_node(nodes, self.id, NodeKind::Text(text));
        }
    }

    fn add_element(&mut self) {
        self.has_elements = true;
        self.whitespace.clear();
    }
}

/// An XML document held as an arena of nodes
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl XmlTree {
    /// Parse a complete XML document held in a string
    ///
    /// # Errors
    ///
    /// Returns [`KmlError::Xml`] for tokenizer errors (bad markup, mismatched
    /// end tags) and [`KmlError::Parse`] when the document has no root
    /// element, more than one root, unclosed elements, or text outside the
    /// root.
    pub fn parse_str(content: &str) -> Result<Self> {
        Self::parse_events(Reader::from_str(content))
    }

    /// Parse a complete XML document from raw bytes, decoded according to
    /// its byte order mark or the `encoding` of its XML declaration
    ///
    /// # Errors
    ///
    /// As [`XmlTree::parse_str`], plus [`KmlError::Xml`] for bytes that are
    /// not valid in the declared encoding.
    pub fn parse_bytes(content: &[u8]) -> Result<Self> {
        Self::parse_events(Reader::from_reader(content))
    }

    fn parse_events(mut reader: Reader<&[u8]>) -> Result<Self> {
        let mut nodes = vec![Node {
            kind: NodeKind::Document,
            parent: None,
            children: Vec::new(),
        }];
        let mut root = None;
        let mut open: Vec<OpenElement> = Vec::new();
        let mut scopes: Vec<Scope> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => {
                    let id =
                        open_element(&mut nodes, &mut root, &mut open, &mut scopes, &reader, &e)?;
                    open.push(OpenElement::new(id));
                }
                Event::Empty(e) => {
                    open_element(&mut nodes, &mut root, &mut open, &mut scopes, &reader, &e)?;
                    scopes.pop();
                }
                Event::End(e) => {
                    let Some(mut closed) = open.pop() else {
                        return Err(KmlError::Parse(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        )));
                    };
                    closed.flush_whitespace(&mut nodes);
                    scopes.pop();
                }
                Event::Text(e) => {
                    let text = e.unescape()?;
                    if text.trim().is_empty() {
                        // indentation outside the root is not kept
                        if let Some(current) = open.last_mut() {
                            current.hold_whitespace(&text);
                        }
                    } else {
                        let current = open.last_mut().ok_or_else(|| {
                            KmlError::Parse("text content outside the root element".to_string())
                        })?;
                        current.flush_whitespace(&mut nodes);
                        push_node(&mut nodes, current.id, NodeKind::Text(text.into_owned()));
                    }
                }
                Event::CData(e) => {
                    let text = reader.decoder().decode(&e)?.into_owned();
                    let current = open.last_mut().ok_or_else(|| {
                        KmlError::Parse("CDATA section outside the root element".to_string())
                    })?;
                    current.flush_whitespace(&mut nodes);
                    push_node(&mut nodes, current.id, NodeKind::CData(text));
                }
                Event::Comment(e) => {
                    let text = reader.decoder().decode(&e)?.into_owned();
                    push_markup(&mut nodes, &mut open, NodeKind::Comment(text));
                }
                Event::PI(e) => {
                    let text = reader.decoder().decode(&e)?.into_owned();
                    push_markup(&mut nodes, &mut open, NodeKind::ProcessingInstruction(text));
                }
                Event::DocType(e) => {
                    let text = reader.decoder().decode(&e)?.trim().to_string();
                    push_markup(&mut nodes, &mut open, NodeKind::DocType(text));
                }
                // rewritten as version 1.0, utf-8 on output
                Event::Decl(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        if let Some(unclosed) = open.last() {
            let name = match &nodes[unclosed.id.0].kind {
                NodeKind::Element(element) => element.name.clone(),
                _ => String::new(),
            };
            return Err(KmlError::Parse(format!(
                "unexpected end of document: <{name}> is never closed"
            )));
        }

        let root =
            root.ok_or_else(|| KmlError::Parse("document has no root element".to_string()))?;
        Ok(Self { nodes, root })
    }

    /// The document's root element
    #[inline]
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of nodes, including the document node
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a parsed tree has at least the document node and a root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Content of a node
    #[inline]
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// The element stored at `id`, or `None` for text, comments and the document node
    #[inline]
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&XmlElement> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Parent node; the root element's parent is the document node
    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// All children in document order
    #[inline]
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children in document order
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.element(child).is_some())
    }

    /// Every node below `id` in document (pre-)order, `id` itself excluded
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Concatenated text and CDATA directly inside `id`, `None` when there is none
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<String> {
        let mut text: Option<String> = None;
        for &child in self.children(id) {
            if let NodeKind::Text(chunk) | NodeKind::CData(chunk) = self.kind(child) {
                text.get_or_insert_with(String::new).push_str(chunk);
            }
        }
        text
    }

    /// Insert a new element under `parent` at child position `index`
    /// (clamped to the number of children), optionally holding `text`.
    /// Returns the id of the new element.
    pub fn insert_element(
        &mut self,
        parent: NodeId,
        index: usize,
        element: XmlElement,
        text: Option<&str>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind: NodeKind::Element(element),
            parent: Some(parent),
            children: Vec::new(),
        });
        let siblings = &mut self.nodes[parent.0].children;
        siblings.insert(index.min(siblings.len()), id);

        if let Some(text) = text {
            push_node(&mut self.nodes, id, NodeKind::Text(text.to_string()));
        }
        id
    }

    /// Serialize the whole tree with an XML declaration and two-space indentation
    ///
    /// # Errors
    ///
    /// Returns [`KmlError::Xml`] if the writer fails.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        self.write_node(&mut writer, DOCUMENT)?;

        let mut output = writer.into_inner();
        output.push(b'\n');
        Ok(output)
    }

    fn write_node<W: Write>(&self, writer: &mut Writer<W>, id: NodeId) -> Result<()> {
        match self.kind(id) {
            NodeKind::Document => {
                for &child in self.children(id) {
                    self.write_node(writer, child)?;
                }
            }
            NodeKind::Element(element) => {
                let mut start = BytesStart::new(element.name.as_str());
                for (key, value) in &element.attributes {
                    start.push_attribute((key.as_str(), value.as_str()));
                }

                let children = self.children(id);
                if children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for &child in children {
                        self.write_node(writer, child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
                }
            }
            NodeKind::Text(text) => {
                writer.write_event(Event::Text(BytesText::new(text)))?;
            }
            NodeKind::CData(text) => {
                writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
            }
            NodeKind::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
            }
            NodeKind::ProcessingInstruction(text) => {
                writer.write_event(Event::PI(BytesText::from_escaped(text.as_str())))?;
            }
            NodeKind::DocType(text) => {
                writer.write_event(Event::DocType(BytesText::from_escaped(text.as_str())))?;
            }
        }
        Ok(())
    }
}

/// Pre-order iterator returned by [`XmlTree::descendants`]
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

fn push_node(nodes: &mut Vec<Node>, parent: NodeId, kind: NodeKind) -> NodeId {
    let id = NodeId(nodes.len());
    nodes.push(Node {
        kind,
        parent: Some(parent),
        children: Vec::new(),
    });
    nodes[parent.0].children.push(id);
    id
}

/// Add a comment, processing instruction or doctype under the innermost
/// open element, or at document level outside the root
fn push_markup(nodes: &mut Vec<Node>, open: &mut [OpenElement], kind: NodeKind) {
    let parent = match open.last_mut() {
        Some(current) => {
            current.flush_whitespace(nodes);
            current.id
        }
        None => DOCUMENT,
    };
    push_node(nodes, parent, kind);
}

/// Add an element for a start (or empty) tag and push its namespace scope.
/// The caller pops the scope when the element closes.
fn open_element(
    nodes: &mut Vec<Node>,
    root: &mut Option<NodeId>,
    open: &mut [OpenElement],
    scopes: &mut Vec<Scope>,
    reader: &Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<NodeId> {
    let name = reader.decoder().decode(start.name().as_ref())?.into_owned();

    let mut attributes = Vec::new();
    let mut declarations = Scope::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = reader.decoder().decode(attr.key.as_ref())?.into_owned();
        let value = attr.decode_and_unescape_value(reader)?.into_owned();
        if key == "xmlns" {
            declarations.push((None, value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declarations.push((Some(prefix.to_string()), value.clone()));
        }
        attributes.push((key, value));
    }
    scopes.push(declarations);

    let prefix = name.split_once(':').map(|(prefix, _)| prefix);
    let namespace = resolve_namespace(scopes, prefix);
    let element = XmlElement {
        name,
        namespace,
        attributes,
    };

    let parent = match open.last_mut() {
        Some(current) => {
            current.add_element();
            current.id
        }
        None if root.is_some() => {
            return Err(KmlError::Parse(format!(
                "second root element <{}>",
                element.name
            )));
        }
        None => DOCUMENT,
    };
    let id = push_node(nodes, parent, NodeKind::Element(element));
    if parent == DOCUMENT {
        *root = Some(id);
    }
    Ok(id)
}

/// Innermost declaration for `prefix` wins; `xmlns=""` undeclares the default
fn resolve_namespace(scopes: &[Scope], prefix: Option<&str>) -> Option<String> {
    scopes
        .iter()
        .rev()
        .flat_map(|scope| scope.iter())
        .find(|(declared, _)| declared.as_deref() == prefix)
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty())
}
