//! Path-Query Engine
//!
//! Evaluates a subset of XPath 1.0 over a [`Document`]. The engine carries the
//! namespace bindings used by Native XML exports (`pkp` and `xlink`), so every
//! expression can address elements with prefixed names regardless of how the
//! document itself declares them.
//!
//! A malformed expression, an unknown prefix or a scalar expression used where
//! nodes are required is a programming error: it surfaces as
//! [`NxmlError::InvalidPath`] and the commands halt on it.
//!
//! # Example
//!
//! ```
//! use nxml_transform::document::Document;
//! use nxml_transform::query::PathQuery;
//!
//! let doc = Document::parse(
//!     r#"<articles xmlns="http://pkp.sfu.ca"><article><id type="doi">10.1/x</id></article></articles>"#,
//! )?;
//! let query = PathQuery::new();
//!
//! assert_eq!(query.select(&doc, "//pkp:article", None)?.len(), 1);
//! assert_eq!(query.select_text(&doc, "//pkp:id[@type = 'doi']", None)?, "10.1/x");
//! # Ok::<(), nxml_common::NxmlError>(())
//! ```

mod eval;
mod lexer;
mod parser;

use crate::document::{Attribute, Document, NodeId};
use eval::Evaluator;
use nxml_common::{NxmlError, Result};
use std::collections::HashMap;

/// Namespace of the Native XML elements
pub const PKP_NAMESPACE: &str = "http://pkp.sfu.ca";

/// XLink namespace
pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// A node selected by an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    /// Element, text, comment or document node
    Node(NodeId),
    /// Attribute `index` of `element`
    Attribute { element: NodeId, index: usize },
}

impl NodeRef {
    /// The tree node, `None` for attributes
    pub fn node(self) -> Option<NodeId> {
        match self {
            NodeRef::Node(id) => Some(id),
            NodeRef::Attribute { .. } => None,
        }
    }

    pub fn attribute(self, document: &Document) -> Option<&Attribute> {
        match self {
            NodeRef::Attribute { element, index } => document
                .element(element)
                .and_then(|element| element.attributes().get(index)),
            NodeRef::Node(_) => None,
        }
    }

    /// XPath string-value
    pub fn string_value(self, document: &Document) -> String {
        match self {
            NodeRef::Node(id) => document.text_content(id),
            NodeRef::Attribute { .. } => self
                .attribute(document)
                .map(|attr| attr.value().to_string())
                .unwrap_or_default(),
        }
    }
}

impl From<NodeId> for NodeRef {
    fn from(id: NodeId) -> Self {
        NodeRef::Node(id)
    }
}

/// Ordered, duplicate-free result of a node selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet(Vec<NodeRef>);

impl NodeSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<NodeRef> {
        self.0.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.0.iter().copied()
    }

    /// Tree nodes of the selection, attributes skipped
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().filter_map(|node| node.node())
    }

    /// String-values in selection order
    pub fn strings(&self, document: &Document) -> Vec<String> {
        self.iter().map(|node| node.string_value(document)).collect()
    }
}

impl IntoIterator for NodeSet {
    type Item = NodeRef;
    type IntoIter = std::vec::IntoIter<NodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Result of evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nodes(Vec<NodeRef>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl Value {
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Nodes(nodes) => !nodes.is_empty(),
            Value::String(text) => !text.is_empty(),
            Value::Number(number) => *number != 0.0 && !number.is_nan(),
            Value::Boolean(flag) => *flag,
        }
    }

    pub fn to_number(&self, document: &Document) -> f64 {
        match self {
            Value::Number(number) => *number,
            Value::Boolean(flag) => f64::from(u8::from(*flag)),
            _ => eval::to_number(&self.to_string_value(document)),
        }
    }

    pub fn to_string_value(&self, document: &Document) -> String {
        match self {
            Value::Nodes(nodes) => nodes
                .first()
                .map(|node| node.string_value(document))
                .unwrap_or_default(),
            Value::String(text) => text.clone(),
            Value::Number(number) if number.is_nan() => "NaN".to_string(),
            Value::Number(number) if number.fract() == 0.0 && number.is_finite() => {
                format!("{}", *number as i64)
            },
            Value::Number(number) => number.to_string(),
            Value::Boolean(flag) => flag.to_string(),
        }
    }
}

/// Path-query engine with fixed namespace bindings
#[derive(Debug, Clone)]
pub struct PathQuery {
    namespaces: HashMap<String, String>,
}

impl Default for PathQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl PathQuery {
    /// Engine bound to the `pkp` and `xlink` prefixes
    pub fn new() -> Self {
        Self {
            namespaces: HashMap::new(),
        }
        .with_namespace("xlink", XLINK_NAMESPACE)
        .with_namespace("pkp", PKP_NAMESPACE)
    }

    /// Register an additional prefix binding
    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    /// Evaluate any expression; `context` defaults to the document node
    pub fn evaluate(
        &self,
        document: &Document,
        expression: &str,
        context: Option<NodeId>,
    ) -> Result<Value> {
        let expr =
            parser::parse(expression).map_err(|reason| NxmlError::invalid_path(expression, reason))?;
        let evaluator = Evaluator {
            document,
            namespaces: &self.namespaces,
        };
        let context = NodeRef::Node(context.unwrap_or_else(|| document.root()));

        evaluator
            .eval(&expr, context)
            .map_err(|reason| NxmlError::invalid_path(expression, reason))
    }

    /// Select the nodes matching `expression`
    pub fn select(
        &self,
        document: &Document,
        expression: &str,
        context: Option<NodeId>,
    ) -> Result<NodeSet> {
        match self.evaluate(document, expression, context)? {
            Value::Nodes(nodes) => Ok(NodeSet(nodes)),
            other => Err(NxmlError::invalid_path(
                expression,
                format!("expected a node-set, the expression yields {:?}", other),
            )),
        }
    }

    /// First match, if any
    pub fn select_first(
        &self,
        document: &Document,
        expression: &str,
        context: Option<NodeId>,
    ) -> Result<Option<NodeRef>> {
        Ok(self.select(document, expression, context)?.first())
    }

    /// String value of the first match, tag-stripped and trimmed
    pub fn select_text(
        &self,
        document: &Document,
        expression: &str,
        context: Option<NodeId>,
    ) -> Result<String> {
        let value = self.evaluate(document, &format!("string({})", expression), context)?;
        Ok(strip_tags(value.to_string_value(document).trim())
            .trim()
            .to_string())
    }
}

/// Remove anything that looks like markup (`<...>`)
pub fn strip_tags(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;

    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => result.push(c),
            _ => {},
        }
    }

    result
}
