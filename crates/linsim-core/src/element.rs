//! Element declarations: one connection-bearing netlist line.

use std::fmt;
use std::str::FromStr;

use crate::declaration::{join_line, Declaration, Params};
use crate::error::{Error, Result};
use crate::node::Node;

/// Number of positional fields taken as nodes when a type does not say otherwise.
pub const DEFAULT_NUM_NODES: usize = 2;

/// A parsed element line such as `R100 N1 0 100k`.
///
/// The first `k` positional fields after the name are nodes, the rest form
/// the value. Subcircuit instances (`x1 1 2 3 4 amp`) keep every positional
/// field but the last as nodes and carry the name of the block they
/// instantiate in [`Element::block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    prefix: String,
    nodes: Vec<Node>,
    value: String,
    params: Params,
    block: Option<String>,
}

impl Element {
    /// Create an element from discrete parts.
    pub fn new<N: Into<Node>>(
        name: impl AsRef<str>,
        nodes: impl IntoIterator<Item = N>,
        value: impl AsRef<str>,
    ) -> Self {
        let name = name.as_ref().trim().to_lowercase();
        Self {
            prefix: prefix_of(&name),
            name,
            nodes: nodes.into_iter().map(Into::into).collect(),
            value: value.as_ref().trim().to_lowercase(),
            params: Params::new(),
            block: None,
        }
    }

    /// Create an instance of the block named `block`.
    pub fn instance<N: Into<Node>>(
        name: impl AsRef<str>,
        nodes: impl IntoIterator<Item = N>,
        block: impl AsRef<str>,
    ) -> Self {
        let mut element = Self::new(name, nodes, "");
        element.block = Some(block.as_ref().trim().to_lowercase());
        element
    }

    /// Builder-style parameter assignment.
    pub fn with_param(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.params.set(key, value);
        self
    }

    /// Parse a declaration with the default node count.
    pub fn parse(definition: &str) -> Result<Self> {
        Self::parse_with_nodes(definition, DEFAULT_NUM_NODES)
    }

    /// Parse a declaration whose first `num_nodes` positional fields are nodes.
    pub fn parse_with_nodes(definition: &str, num_nodes: usize) -> Result<Self> {
        let decl = Declaration::tokenize(definition)?;
        check_name(&decl.head)?;
        if decl.fields.len() < num_nodes {
            return Err(Error::Parse(format!(
                "{} needs {} nodes but has {} fields",
                decl.head,
                num_nodes,
                decl.fields.len()
            )));
        }

        let mut fields = decl.fields;
        let value = fields.split_off(num_nodes).join(" ");
        Ok(Self {
            prefix: prefix_of(&decl.head),
            name: decl.head,
            nodes: fields.into_iter().map(Node::from).collect(),
            value,
            params: decl.params,
            block: None,
        })
    }

    /// Parse a subcircuit instance: `<name> <node>... <block> [key=value ...]`.
    pub fn parse_instance(definition: &str) -> Result<Self> {
        let decl = Declaration::tokenize(definition)?;
        check_name(&decl.head)?;
        let mut fields = decl.fields;
        let block = fields
            .pop()
            .ok_or_else(|| Error::Parse(format!("{} does not name a block", decl.head)))?;

        Ok(Self {
            prefix: prefix_of(&decl.head),
            name: decl.head,
            nodes: fields.into_iter().map(Node::from).collect(),
            value: String::new(),
            params: decl.params,
            block: Some(block),
        })
    }

    /// Get the element name (lower-case).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Leading non-digit characters of the name.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Nodes this element connects, in declaration order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Positional fields after the nodes, joined by single spaces.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Look up a `key=value` parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    /// Set a parameter; a blank value deletes it.
    pub fn set_param(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Option<String> {
        self.params.set(key, value)
    }

    /// Name of the instantiated block, for subcircuit instances.
    pub fn block(&self) -> Option<&str> {
        self.block.as_deref()
    }

    pub fn is_instance(&self) -> bool {
        self.block.is_some()
    }

    /// Check whether the element connects some node to itself.
    pub fn is_degenerate(&self) -> bool {
        self.nodes
            .iter()
            .enumerate()
            .any(|(i, node)| self.nodes[i + 1..].contains(node))
    }

    /// Replace every occurrence of `from` with `to`. Returns true if any changed.
    pub(crate) fn replace_node(&mut self, from: &Node, to: &Node) -> bool {
        let mut changed = false;
        for node in self.nodes.iter_mut() {
            if *node == *from {
                *node = to.clone();
                changed = true;
            }
        }
        changed
    }

    /// Copy of this element under a new name with every node passed through `map`.
    pub(crate) fn relabeled(&self, name: &str, map: impl Fn(&Node) -> Node) -> Self {
        let name = name.to_lowercase();
        Self {
            prefix: prefix_of(&name),
            name,
            nodes: self.nodes.iter().map(map).collect(),
            value: self.value.clone(),
            params: self.params.clone(),
            block: self.block.clone(),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params.to_string();
        let line = join_line(
            std::iter::once(self.name.as_str())
                .chain(self.nodes.iter().map(Node::name))
                .chain(std::iter::once(self.value.as_str()))
                .chain(self.block.as_deref())
                .chain(std::iter::once(params.as_str())),
        );
        f.write_str(&line)
    }
}

impl FromStr for Element {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Leading non-digit characters of a name.
pub(crate) fn prefix_of(name: &str) -> String {
    name.chars().take_while(|c| !c.is_ascii_digit()).collect()
}

fn check_name(name: &str) -> Result<()> {
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => Ok(()),
        _ => Err(Error::Parse(format!("invalid element name '{name}'"))),
    }
}
