//! Expression evaluation against a [`Document`]

use super::parser::{Axis, CompareOp, Expr, Function, LocationPath, NodeTest, Step};
use super::{NodeRef, Value};
use crate::document::{Document, NodeKind};
use std::collections::{HashMap, HashSet};

pub(super) struct Evaluator<'a> {
    pub document: &'a Document,
    pub namespaces: &'a HashMap<String, String>,
}

impl Evaluator<'_> {
    pub fn eval(&self, expr: &Expr, context: NodeRef) -> Result<Value, String> {
        match expr {
            Expr::Path(path) => self.eval_path(path, context).map(Value::Nodes),
            Expr::Literal(value) => Ok(Value::String(value.clone())),
            Expr::Number(value) => Ok(Value::Number(*value)),
            Expr::Function(function, args) => self.eval_function(*function, args, context),
            Expr::Compare(left, op, right) => {
                let left = self.eval(left, context)?;
                let right = self.eval(right, context)?;
                Ok(Value::Boolean(self.compare(&left, *op, &right)))
            },
            Expr::And(left, right) => Ok(Value::Boolean(
                self.eval(left, context)?.to_boolean() && self.eval(right, context)?.to_boolean(),
            )),
            Expr::Or(left, right) => Ok(Value::Boolean(
                self.eval(left, context)?.to_boolean() || self.eval(right, context)?.to_boolean(),
            )),
        }
    }

    fn eval_path(&self, path: &LocationPath, context: NodeRef) -> Result<Vec<NodeRef>, String> {
        let start = if path.absolute {
            NodeRef::Node(self.document.root())
        } else {
            context
        };

        let mut current = vec![start];
        for step in &path.steps {
            let mut next = Vec::new();
            let mut seen = HashSet::new();

            for &node in &current {
                let candidates = self.axis(node, step.axis);
                let mut matched = Vec::new();
                for candidate in candidates {
                    if self.matches(candidate, step)? {
                        matched.push(candidate);
                    }
                }

                for predicate in &step.predicates {
                    matched = self.filter(matched, predicate)?;
                }

                next.extend(matched.into_iter().filter(|node| seen.insert(*node)));
            }

            current = next;
        }

        Ok(current)
    }

    fn filter(&self, nodes: Vec<NodeRef>, predicate: &Expr) -> Result<Vec<NodeRef>, String> {
        let mut kept = Vec::with_capacity(nodes.len());
        for (index, node) in nodes.into_iter().enumerate() {
            let keep = match self.eval(predicate, node)? {
                Value::Number(position) => (index + 1) as f64 == position,
                value => value.to_boolean(),
            };
            if keep {
                kept.push(node);
            }
        }
        Ok(kept)
    }

    fn axis(&self, node: NodeRef, axis: Axis) -> Vec<NodeRef> {
        let doc = self.document;
        match (node, axis) {
            (_, Axis::SelfNode) => vec![node],
            (NodeRef::Node(id), Axis::Child) => {
                doc.children(id).iter().map(|&child| NodeRef::Node(child)).collect()
            },
            (NodeRef::Node(id), Axis::Attribute) => doc
                .element(id)
                .map(|element| {
                    element
                        .attributes()
                        .iter()
                        .enumerate()
                        .filter(|(_, attr)| !attr.is_namespace_declaration())
                        .map(|(index, _)| NodeRef::Attribute { element: id, index })
                        .collect()
                })
                .unwrap_or_default(),
            (NodeRef::Node(id), Axis::Parent) => {
                doc.parent(id).map(NodeRef::Node).into_iter().collect()
            },
            (NodeRef::Node(id), Axis::DescendantOrSelf) => std::iter::once(node)
                .chain(doc.descendants(id).into_iter().map(NodeRef::Node))
                .collect(),
            (NodeRef::Attribute { element, .. }, Axis::Parent) => vec![NodeRef::Node(element)],
            (NodeRef::Attribute { .. }, Axis::DescendantOrSelf) => vec![node],
            (NodeRef::Attribute { .. }, Axis::Child | Axis::Attribute) => Vec::new(),
        }
    }

    fn matches(&self, node: NodeRef, step: &Step) -> Result<bool, String> {
        let doc = self.document;
        match (&step.test, node) {
            (NodeTest::Node, _) => Ok(true),
            (NodeTest::Text, NodeRef::Node(id)) => {
                Ok(matches!(doc.kind(id), NodeKind::Text(_) | NodeKind::CData(_)))
            },
            (NodeTest::Text, NodeRef::Attribute { .. }) => Ok(false),
            (NodeTest::Name { prefix, local }, node) => {
                let expected = match prefix {
                    Some(prefix) => Some(
                        self.namespaces
                            .get(prefix)
                            .map(String::as_str)
                            .ok_or_else(|| format!("undeclared namespace prefix '{}'", prefix))?,
                    ),
                    None => None,
                };

                let (namespace, local_name) = match node {
                    NodeRef::Node(id) => match doc.element(id) {
                        Some(element) if step.axis != Axis::Attribute => {
                            (element.namespace(), element.local_name())
                        },
                        _ => return Ok(false),
                    },
                    NodeRef::Attribute { .. } => match node.attribute(doc) {
                        Some(attr) => (attr.namespace(), attr.local_name()),
                        None => return Ok(false),
                    },
                };

                Ok(namespace == expected && local.as_deref().is_none_or(|l| l == local_name))
            },
        }
    }

    fn eval_function(
        &self,
        function: Function,
        args: &[Expr],
        context: NodeRef,
    ) -> Result<Value, String> {
        let single_arg = |name: &str| -> Result<Option<Value>, String> {
            match args {
                [] => Ok(None),
                [arg] => self.eval(arg, context).map(Some),
                _ => Err(format!("{}() takes at most one argument", name)),
            }
        };

        match function {
            Function::String => {
                let value = single_arg("string")?;
                Ok(Value::String(match value {
                    Some(value) => value.to_string_value(self.document),
                    None => context.string_value(self.document),
                }))
            },
            Function::NormalizeSpace => {
                let value = single_arg("normalize-space")?;
                let text = match value {
                    Some(value) => value.to_string_value(self.document),
                    None => context.string_value(self.document),
                };
                Ok(Value::String(text.split_whitespace().collect::<Vec<_>>().join(" ")))
            },
            Function::Count => match single_arg("count")? {
                Some(Value::Nodes(nodes)) => Ok(Value::Number(nodes.len() as f64)),
                _ => Err("count() expects a node-set argument".to_string()),
            },
            Function::Not => match single_arg("not")? {
                Some(value) => Ok(Value::Boolean(!value.to_boolean())),
                None => Err("not() expects one argument".to_string()),
            },
        }
    }

    /// XPath 1.0 equality with node-set existential semantics
    fn compare(&self, left: &Value, op: CompareOp, right: &Value) -> bool {
        let doc = self.document;
        match (left, right) {
            (Value::Nodes(left), Value::Nodes(right)) => left.iter().any(|a| {
                let a = a.string_value(doc);
                right.iter().any(|b| op.strings(&a, &b.string_value(doc)))
            }),
            (Value::Nodes(nodes), other) | (other, Value::Nodes(nodes)) => match other {
                Value::Boolean(flag) => op.booleans(!nodes.is_empty(), *flag),
                Value::Number(number) => nodes
                    .iter()
                    .any(|node| op.numbers(to_number(&node.string_value(doc)), *number)),
                _ => {
                    let text = other.to_string_value(doc);
                    nodes.iter().any(|node| op.strings(&node.string_value(doc), &text))
                },
            },
            (Value::Boolean(_), _) | (_, Value::Boolean(_)) => {
                op.booleans(left.to_boolean(), right.to_boolean())
            },
            (Value::Number(_), _) | (_, Value::Number(_)) => {
                op.numbers(left.to_number(doc), right.to_number(doc))
            },
            _ => op.strings(&left.to_string_value(doc), &right.to_string_value(doc)),
        }
    }
}

impl CompareOp {
    fn strings(self, a: &str, b: &str) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::NotEq => a != b,
        }
    }

    fn numbers(self, a: f64, b: f64) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::NotEq => a != b,
        }
    }

    fn booleans(self, a: bool, b: bool) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::NotEq => a != b,
        }
    }
}

pub(super) fn to_number(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}
