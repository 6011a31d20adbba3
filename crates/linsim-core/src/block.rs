//! Blocks: named subcircuits with a node graph and nested definitions.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;

use crate::directive::{ENDS, SUBCKT};
use crate::element::Element;
use crate::error::{Error, Result};
use crate::node::{Node, GROUND_ALIASES};

/// Options controlling [`Block::flatten_with`].
///
/// Every node of an expanded block that is not bound to a port gets a fresh
/// `<instance>_<k>_` name, except the nodes in `global_nodes`. Those keep
/// their name at every level, so a `0` or `gnd` inside a subcircuit is the
/// same node as the host's ground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Maximum nesting depth of instances before expansion is abandoned.
    pub max_depth: usize,
    /// Nodes shared by every level of the hierarchy; never renamed.
    pub global_nodes: Vec<Node>,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            global_nodes: GROUND_ALIASES.iter().copied().map(Node::from).collect(),
        }
    }
}

impl FlattenOptions {
    fn is_global(&self, node: &Node) -> bool {
        self.global_nodes.contains(node)
    }
}

/// A named subcircuit.
///
/// `graph` maps every node to the names of the elements incident on it; a
/// node with no incident element is not kept. `elements` preserves
/// declaration order for serialization. Nested definitions in `blocks` are
/// visible to instances in this block and in every block nested below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    name: String,
    ports: Vec<Node>,
    graph: HashMap<Node, HashSet<String>>,
    elements: IndexMap<String, Element>,
    blocks: IndexMap<String, Block>,
}

impl Block {
    /// Create an empty block.
    pub fn new<N: Into<Node>>(name: impl AsRef<str>, ports: impl IntoIterator<Item = N>) -> Self {
        Self {
            name: name.as_ref().trim().to_lowercase(),
            ports: ports.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Formal port nodes, in order.
    pub fn ports(&self) -> &[Node] {
        &self.ports
    }

    pub fn graph(&self) -> &HashMap<Node, HashSet<String>> {
        &self.graph
    }

    pub fn elements(&self) -> &IndexMap<String, Element> {
        &self.elements
    }

    pub fn blocks(&self) -> &IndexMap<String, Block> {
        &self.blocks
    }

    /// Look up an element by name.
    pub fn element(&self, name: &str) -> Option<&Element> {
        self.elements.get(&name.to_lowercase())
    }

    /// Names of the elements incident on `node`.
    pub fn incident(&self, node: &str) -> Option<&HashSet<String>> {
        self.graph.get(node.to_lowercase().as_str())
    }

    pub fn contains_node(&self, node: &str) -> bool {
        self.incident(node).is_some()
    }

    /// Number of nodes with at least one incident element.
    pub fn num_nodes(&self) -> usize {
        self.graph.len()
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    /// Look up a nested definition by name.
    pub fn resolve(&self, name: &str) -> Option<&Block> {
        self.blocks.get(&name.to_lowercase())
    }

    /// Add an element, indexing it under each of its nodes.
    ///
    /// Fails without mutation if the name is already taken.
    pub fn add(&mut self, element: Element) -> Result<()> {
        if self.elements.contains_key(element.name()) {
            return Err(Error::DuplicateName(format!(
                "element {} already exists in block {}",
                element.name(),
                self.name
            )));
        }

        for node in element.nodes() {
            self.graph
                .entry(node.clone())
                .or_default()
                .insert(element.name().to_string());
        }
        self.elements.insert(element.name().to_string(), element);
        Ok(())
    }

    /// Remove an element by name, pruning nodes left without elements.
    pub fn remove(&mut self, name: &str) -> Option<Element> {
        let element = self.elements.shift_remove(&name.to_lowercase())?;
        for node in element.nodes() {
            if let Some(incident) = self.graph.get_mut(node) {
                incident.remove(element.name());
                if incident.is_empty() {
                    self.graph.remove(node);
                }
            }
        }
        Some(element)
    }

    /// Register a nested definition under its name.
    pub fn add_block(&mut self, block: Block) -> Result<()> {
        if self.blocks.contains_key(&block.name) {
            return Err(Error::DuplicateName(format!(
                "block {} already defined in {}",
                block.name, self.name
            )));
        }
        log::trace!("block {}: defined nested block {}", self.name, block.name);
        self.blocks.insert(block.name.clone(), block);
        Ok(())
    }

    /// Remove a nested definition and every instance of it in this block.
    pub fn remove_block(&mut self, name: &str) -> Option<Block> {
        let block = self.blocks.shift_remove(&name.to_lowercase())?;
        let instances: Vec<String> = self
            .elements
            .values()
            .filter(|element| element.block() == Some(block.name.as_str()))
            .map(|element| element.name().to_string())
            .collect();
        for instance in instances {
            self.remove(&instance);
        }
        Some(block)
    }

    /// Build an instance of this block wired to `nodes`.
    pub fn instance<N: Into<Node>>(
        &self,
        name: impl AsRef<str>,
        nodes: impl IntoIterator<Item = N>,
    ) -> Result<Element> {
        let instance = Element::instance(name, nodes, &self.name);
        self.check_arity(&instance)?;
        Ok(instance)
    }

    fn check_arity(&self, instance: &Element) -> Result<()> {
        if instance.nodes().len() == self.ports.len() {
            Ok(())
        } else {
            Err(Error::PortMismatch {
                instance: instance.name().to_string(),
                block: self.name.clone(),
                expected: self.ports.len(),
                found: instance.nodes().len(),
            })
        }
    }

    /// Merge node `merged` into node `keep`.
    ///
    /// Elements that end up connecting a node to itself are removed. Both
    /// nodes must be present in the graph.
    pub fn short(&mut self, keep: impl Into<Node>, merged: impl Into<Node>) -> Result<()> {
        let keep = keep.into();
        let merged = merged.into();
        for node in [&keep, &merged] {
            if !self.graph.contains_key(node) {
                return Err(Error::UnknownReference(format!(
                    "node {node} is not in block {}",
                    self.name
                )));
            }
        }
        if keep == merged {
            return Ok(());
        }

        let incident = self.graph.remove(&merged).unwrap_or_default();
        for name in &incident {
            if let Some(element) = self.elements.get_mut(name) {
                element.replace_node(&merged, &keep);
            }
        }
        self.graph
            .entry(keep.clone())
            .or_default()
            .extend(incident.iter().cloned());
        for port in self.ports.iter_mut().filter(|port| **port == merged) {
            *port = keep.clone();
        }

        let degenerate: Vec<String> = incident
            .into_iter()
            .filter(|name| self.elements.get(name).is_some_and(Element::is_degenerate))
            .collect();
        for name in &degenerate {
            self.remove(name);
        }

        log::trace!(
            "block {}: shorted {merged} into {keep}, dropped {} elements",
            self.name,
            degenerate.len()
        );
        Ok(())
    }

    /// Check that every instance, here and in nested definitions, refers to a
    /// reachable block with a matching port count.
    pub fn validate(&self) -> Result<()> {
        self.validate_in(&[])
    }

    fn validate_in<'a>(&'a self, scopes: &[&'a Block]) -> Result<()> {
        let mut chain = scopes.to_vec();
        chain.push(self);

        for element in self.elements.values() {
            if let Some(block_name) = element.block() {
                let (definition, _) = lookup(&chain, block_name, element)?;
                definition.check_arity(element)?;
            }
        }
        for nested in self.blocks.values() {
            nested.validate_in(&chain)?;
        }
        Ok(())
    }

    /// Expand every instance with the default options.
    pub fn flatten(&mut self) -> Result<()> {
        self.flatten_with(&FlattenOptions::default())
    }

    /// Expand every instance recursively until no hierarchy remains.
    ///
    /// On success `blocks` is empty and each instance has been replaced, in
    /// place, by renamed copies of the elements of the block it referenced.
    /// On failure the block is left untouched.
    pub fn flatten_with(&mut self, options: &FlattenOptions) -> Result<()> {
        let expanded = {
            let mut active = Vec::new();
            self.expand(&[], &mut active, 0, options)?
        };

        let mut flat = Block::new(&self.name, self.ports.clone());
        for element in expanded {
            flat.add(element)?;
        }
        log::debug!(
            "flattened block {}: {} elements, {} nodes",
            self.name,
            flat.num_elements(),
            flat.num_nodes()
        );
        *self = flat;
        Ok(())
    }

    /// Elements of this block with every instance expanded, named within
    /// this block's namespace.
    fn expand<'a>(
        &'a self,
        scopes: &[&'a Block],
        active: &mut Vec<&'a Block>,
        depth: usize,
        options: &FlattenOptions,
    ) -> Result<Vec<Element>> {
        if depth > options.max_depth {
            return Err(Error::DepthExceeded(options.max_depth));
        }

        let mut chain = scopes.to_vec();
        chain.push(self);

        // every element and node name emitted so far, plus this block's own
        let mut used: HashSet<String> = self
            .elements
            .keys()
            .cloned()
            .chain(self.graph.keys().map(|node| node.name().to_string()))
            .collect();

        let mut out = Vec::with_capacity(self.elements.len());
        for element in self.elements.values() {
            let Some(block_name) = element.block() else {
                out.push(element.clone());
                continue;
            };

            let (definition, visible) = lookup(&chain, block_name, element)?;
            definition.check_arity(element)?;
            if active.iter().any(|open| std::ptr::eq(*open, definition)) {
                return Err(Error::CyclicHierarchy(definition.name.clone()));
            }

            active.push(definition);
            let inner = definition.expand(&chain[..visible], active, depth + 1, options)?;
            active.pop();

            let bindings: HashMap<&Node, &Node> =
                definition.ports.iter().zip(element.nodes()).collect();
            let internal = |node: &Node| !bindings.contains_key(node) && !options.is_global(node);
            let prefix = fresh_prefix(element.name(), depth + 1, &inner, &used, internal);
            log::trace!(
                "block {}: expanding {} ({}) as {prefix}",
                self.name,
                element.name(),
                definition.name
            );

            let rename = |node: &Node| -> Node {
                match bindings.get(node) {
                    Some(actual) => (*actual).clone(),
                    None if options.is_global(node) => node.clone(),
                    None => Node::new(format!("{prefix}_{node}")),
                }
            };
            for copy in &inner {
                let copy = copy.relabeled(&format!("{prefix}_{}", copy.name()), &rename);
                used.insert(copy.name().to_string());
                used.extend(copy.nodes().iter().map(|node| node.name().to_string()));
                out.push(copy);
            }
        }
        Ok(out)
    }

    /// Nested definitions followed by this block's own element lines.
    pub fn definition(&self) -> String {
        self.blocks
            .values()
            .map(ToString::to_string)
            .chain(self.elements.values().map(ToString::to_string))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Resolve `name` through a lexical scope chain, innermost first.
///
/// Returns the definition and the length of the chain prefix visible from it.
fn lookup<'a>(chain: &[&'a Block], name: &str, instance: &Element) -> Result<(&'a Block, usize)> {
    chain
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, scope)| scope.blocks.get(name).map(|block| (block, i + 1)))
        .ok_or_else(|| {
            Error::UnknownReference(format!(
                "{} instantiates undefined block {name}",
                instance.name()
            ))
        })
}

/// `<instance>_<k>` for the first `k >= depth` under which no renamed copy
/// in `inner`, and none of its `internal` nodes, lands on a name in `used`.
fn fresh_prefix(
    instance: &str,
    depth: usize,
    inner: &[Element],
    used: &HashSet<String>,
    internal: impl Fn(&Node) -> bool,
) -> String {
    let clashes = |prefix: &str| {
        inner.iter().any(|copy| {
            used.contains(&format!("{prefix}_{}", copy.name()))
                || copy
                    .nodes()
                    .iter()
                    .filter(|node| internal(*node))
                    .any(|node| used.contains(&format!("{prefix}_{node}")))
        })
    };

    (depth..)
        .map(|k| format!("{instance}_{k}"))
        .find(|prefix| !clashes(prefix))
        .unwrap_or_else(|| format!("{instance}_{depth}"))
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{SUBCKT} {}", self.name)?;
        for port in &self.ports {
            write!(f, " {port}")?;
        }
        let definition = self.definition();
        if !definition.is_empty() {
            write!(f, "\n{definition}")?;
        }
        write!(f, "\n.{ENDS} {}", self.name)
    }
}
