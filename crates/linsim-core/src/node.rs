//! Node representation for circuit graphs.

use std::borrow::Borrow;
use std::fmt;

/// Names that refer to the global ground node.
pub const GROUND_ALIASES: [&str; 2] = ["0", "gnd"];

/// A named connection point.
///
/// The name is trimmed and lower-cased on construction, so `Node::new("N1")`
/// and `Node::new("n1")` are the same node. Hashing and equality are those of
/// the normalized name, which lets graph maps keyed by `Node` be queried with
/// a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Node(String);

impl Node {
    /// Create a node from any identifier.
    pub fn new(name: impl AsRef<str>) -> Self {
        Node(name.as_ref().trim().to_lowercase())
    }

    /// Get the normalized node name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Check if this is the ground node.
    pub fn is_ground(&self) -> bool {
        GROUND_ALIASES.contains(&self.0.as_str())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Node {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Node {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Node {
    fn from(name: &str) -> Self {
        Node::new(name)
    }
}

impl From<String> for Node {
    fn from(name: String) -> Self {
        Node::new(name)
    }
}

impl From<&String> for Node {
    fn from(name: &String) -> Self {
        Node::new(name)
    }
}

impl From<&Node> for Node {
    fn from(node: &Node) -> Self {
        node.clone()
    }
}

impl From<u32> for Node {
    fn from(id: u32) -> Self {
        Node(id.to_string())
    }
}

impl From<usize> for Node {
    fn from(id: usize) -> Self {
        Node(id.to_string())
    }
}

impl PartialEq<str> for Node {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Node {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<Node> for str {
    fn eq(&self, other: &Node) -> bool {
        self == other.0
    }
}

impl PartialEq<Node> for &str {
    fn eq(&self, other: &Node) -> bool {
        *self == other.0
    }
}
