//! XML Document - Arena-based DOM representation
//!
//! Every node lives in one `Vec` owned by the [`Document`] and is addressed by
//! a copyable [`NodeId`]. Detaching a node only unlinks it from its parent, so
//! ids collected before a removal pass stay valid while the removals run.
//!
//! Parsing goes through `quick_xml::NsReader` so element and attribute
//! namespaces are resolved once, at load time. Serialization writes the tree
//! back with `quick_xml::Writer`, keeping attribute order, namespace
//! declarations and whitespace text as they were read.

use nxml_common::{NxmlError, Result};
use quick_xml::escape::{escape, partial_escape};
use quick_xml::events::attributes::Attribute as XmlAttribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::{NsReader, Writer};
use std::borrow::Cow;
use std::io::Write;

/// Compact node identifier (index into the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An attribute in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: String,
    value: String,
    namespace: Option<String>,
}

impl Attribute {
    /// Qualified name as written in the document
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without its prefix
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Namespace URI of a prefixed attribute
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `xmlns` and `xmlns:*` declarations are kept for serialization only
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

/// Element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<Attribute>,
}

impl Element {
    /// Qualified name as written in the document
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Resolved namespace URI
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// All attributes, namespace declarations included
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Look up an attribute by its qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }
}

/// Type of XML node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Declaration {
    version: String,
    encoding: Option<String>,
    standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("utf-8".to_string()),
            standalone: None,
        }
    }
}

impl Declaration {
    fn from_event(decl: &BytesDecl<'_>) -> Result<Self> {
        let version = utf8(decl.version()?)?;
        let encoding = decl.encoding().transpose()?.map(utf8).transpose()?;
        let standalone = decl.standalone().transpose()?.map(utf8).transpose()?;

        Ok(Self {
            version,
            encoding,
            standalone,
        })
    }
}

/// An XML document stored in arena format
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    declaration: Option<Declaration>,
}

impl Document {
    /// Parse a whole document held in memory
    pub fn parse(input: &str) -> Result<Self> {
        let mut document = Document {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            declaration: None,
        };

        let mut reader = NsReader::from_str(input);
        let mut open = vec![document.root()];

        loop {
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = namespace_uri(resolved);
            let parent = open.last().copied().unwrap_or(NodeId(0));

            match event {
                Event::Decl(decl) => document.declaration = Some(Declaration::from_event(&decl)?),
                Event::Start(start) => {
                    let element = read_element(&reader, &start, namespace)?;
                    let id = document.append(parent, NodeKind::Element(element));
                    open.push(id);
                },
                Event::Empty(start) => {
                    let element = read_element(&reader, &start, namespace)?;
                    document.append(parent, NodeKind::Element(element));
                },
                Event::End(_) => {
                    open.pop();
                },
                Event::Text(text) => {
                    let text = text.unescape()?;
                    // Whitespace between prolog nodes is regenerated on write
                    if open.len() > 1 || !text.trim().is_empty() {
                        document.append(parent, NodeKind::Text(text.into_owned()));
                    }
                },
                Event::CData(data) => {
                    document.append(parent, NodeKind::CData(utf8(data.into_inner())?));
                },
                Event::Comment(comment) => {
                    document.append(parent, NodeKind::Comment(utf8(comment.into_inner())?));
                },
                Event::PI(pi) => {
                    let content = std::str::from_utf8(&pi).map_err(NxmlError::xml)?.to_string();
                    document.append(parent, NodeKind::ProcessingInstruction(content));
                },
                Event::DocType(doctype) => {
                    document.append(parent, NodeKind::DocType(utf8(doctype.into_inner())?));
                },
                Event::Eof => break,
            }
        }

        if open.len() > 1 {
            return Err(NxmlError::xml("unexpected end of document, an element was left open"));
        }
        if document.root_element().is_none() {
            return Err(NxmlError::xml("the document has no root element"));
        }

        Ok(document)
    }

    /// The document node, parent of the root element
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Attribute value by qualified name
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    /// Overwrite an attribute, appending it when absent
    ///
    /// Returns `false` when `id` is not an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let NodeKind::Element(element) = &mut self.nodes[id.0].kind else {
            return false;
        };

        match element.attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value.to_string(),
            None => element.attributes.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
                namespace: None,
            }),
        }
        true
    }

    /// Concatenated text of the node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Text(text)
            | NodeKind::CData(text)
            | NodeKind::Comment(text)
            | NodeKind::ProcessingInstruction(text) => text.clone(),
            NodeKind::DocType(_) => String::new(),
            NodeKind::Document | NodeKind::Element(_) => self
                .descendants(id)
                .into_iter()
                .filter_map(|child| match self.kind(child) {
                    NodeKind::Text(text) | NodeKind::CData(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }

    /// Descendants in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut pending: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(next) = pending.pop() {
            result.push(next);
            pending.extend(self.children(next).iter().rev().copied());
        }

        result
    }

    #[cfg(test)]
    fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current == self.root()
    }

    /// Unlink a node (and its subtree) from its parent
    ///
    /// Returns `false` when the node was already detached.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id.0].parent.take() else {
            return false;
        };
        self.nodes[parent.0].children.retain(|&child| child != id);
        true
    }

    /// Serialize the document
    pub fn write_to<W: Write>(&self, sink: W) -> Result<()> {
        let mut writer = Writer::new(sink);
        let declaration = self.declaration.clone().unwrap_or_default();

        writer.write_event(Event::Decl(BytesDecl::new(
            &declaration.version,
            declaration.encoding.as_deref(),
            declaration.standalone.as_deref(),
        )))?;

        for &child in self.children(self.root()) {
            writer.get_mut().write_all(b"\n")?;
            self.write_node(&mut writer, child)?;
        }
        writer.get_mut().write_all(b"\n")?;

        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(NxmlError::xml)
    }

    fn write_node<W: Write>(&self, writer: &mut Writer<W>, id: NodeId) -> Result<()> {
        match self.kind(id) {
            NodeKind::Document => {
                for &child in self.children(id) {
                    self.write_node(writer, child)?;
                }
            },
            NodeKind::Element(element) => {
                let mut start = BytesStart::new(element.name.as_str());
                for attr in &element.attributes {
                    start.push_attribute(XmlAttribute {
                        key: QName(attr.name.as_bytes()),
                        value: Cow::Owned(escape_attribute(&attr.value).into_bytes()),
                    });
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
            },
            NodeKind::Text(text) => {
                writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
            },
            NodeKind::CData(data) => {
                writer.write_event(Event::CData(BytesCData::new(data.as_str())))?;
            },
            NodeKind::Comment(comment) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
            },
            NodeKind::ProcessingInstruction(content) => {
                writer.write_event(Event::PI(BytesPI::new(content.as_str())))?;
            },
            NodeKind::DocType(doctype) => {
                writer.write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))?;
            },
        }
        Ok(())
    }

    fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }
}

fn read_element(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> Result<Element> {
    let name = utf8(start.name().as_ref())?;
    let mut attributes = Vec::new();

    for attr in start.attributes() {
        let attr = attr?;
        let (resolved, _) = reader.resolve_attribute(attr.key);
        attributes.push(Attribute {
            name: utf8(attr.key.as_ref())?,
            value: attr.unescape_value()?.into_owned(),
            namespace: namespace_uri(resolved),
        });
    }

    Ok(Element {
        name,
        namespace,
        attributes,
    })
}

fn namespace_uri(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

/// Escape an attribute value so that whitespace survives normalization
///
/// Conforming readers replace literal tabs and line breaks in attribute
/// values with spaces, so those are written as character references.
fn escape_attribute(value: &str) -> String {
    let escaped = escape(value);
    let mut result = String::with_capacity(escaped.len());
    for c in escaped.chars() {
        match c {
            '\n' => result.push_str("&#10;"),
            '\r' => result.push_str("&#13;"),
            '\t' => result.push_str("&#9;"),
            c => result.push(c),
        }
    }
    result
}

fn utf8<'a>(bytes: impl Into<Cow<'a, [u8]>>) -> Result<String> {
    match bytes.into() {
        Cow::Borrowed(bytes) => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(NxmlError::xml),
        Cow::Owned(bytes) => String::from_utf8(bytes).map_err(NxmlError::xml),
    }
}

fn local_part(name: &str) -> &str {
    name.split_once(':').map_or(name, |(_, local)| local)
}
