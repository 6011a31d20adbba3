//! Prefix-keyed dispatch from declaration lines to element constructors.
//!
//! Element kinds form a tree: each [`ElementType`] names its parent by
//! prefix. An [`ElementMux`] enrolls every descendant of a root type and
//! picks, for a declaration such as `bcb1 n1 n2 n3`, the type whose prefix is
//! the longest registered prefix of the name's leading letters (`bc` over
//! `b`), falling back to the root.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::element::Element;
use crate::error::{Error, Result};

/// Builds an element from a declaration line.
pub type Constructor = fn(&str) -> Result<Element>;

/// Descriptor of one element kind.
#[derive(Clone, Copy)]
pub struct ElementType {
    /// Name prefix selecting this type.
    pub prefix: &'static str,
    /// Prefix of the parent type; `None` for a root.
    pub parent: Option<&'static str>,
    /// Constructor used for lines dispatched to this type.
    pub construct: Constructor,
}

impl ElementType {
    /// Generic two-node element, the root of the builtin hierarchy.
    pub const ELEMENT: ElementType = ElementType::new("", None, Element::parse);

    /// Subcircuit instance (`x<name> <node>... <block>`).
    pub const INSTANCE: ElementType = ElementType::new("x", Some(""), Element::parse_instance);

    pub const fn new(
        prefix: &'static str,
        parent: Option<&'static str>,
        construct: Constructor,
    ) -> Self {
        Self {
            prefix,
            parent,
            construct,
        }
    }

    /// Two-node child of the generic root.
    const fn two_node(prefix: &'static str) -> Self {
        Self::new(prefix, Some(""), Element::parse)
    }

    /// Parse a declaration with this type's constructor.
    pub fn parse(&self, declaration: &str) -> Result<Element> {
        (self.construct)(declaration)
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementType")
            .field("prefix", &self.prefix)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// Element kinds known out of the box.
pub const BUILTIN_TYPES: &[ElementType] = &[
    ElementType::two_node("r"),
    ElementType::two_node("c"),
    ElementType::two_node("l"),
    ElementType::two_node("v"),
    ElementType::two_node("i"),
    ElementType::two_node("d"),
    ElementType::two_node("e"),
    ElementType::two_node("f"),
    ElementType::two_node("g"),
    ElementType::two_node("h"),
    ElementType::two_node("s"),
    ElementType::two_node("k"),
    ElementType::INSTANCE,
];

/// Registry selecting an [`ElementType`] for each declaration line.
#[derive(Debug, Clone)]
pub struct ElementMux {
    root: ElementType,
    types: BTreeMap<String, ElementType>,
}

impl ElementMux {
    /// Enroll every transitive descendant of `root` found in `family`.
    ///
    /// Types whose prefix is listed in `leave` are enrolled under their own
    /// prefix, but their descendants are not.
    pub fn new(root: ElementType, family: &[ElementType], leave: &[&str]) -> Result<Self> {
        let mut mux = Self {
            root,
            types: BTreeMap::new(),
        };

        let mut pending = VecDeque::from([root.prefix]);
        while let Some(parent) = pending.pop_front() {
            for ty in family
                .iter()
                .filter(|ty| ty.parent == Some(parent) && ty.prefix != root.prefix)
            {
                mux.add(ty.prefix, *ty)?;
                if !leave.contains(&ty.prefix) {
                    pending.push_back(ty.prefix);
                }
            }
        }

        log::trace!(
            "element mux over '{}' enrolled {} prefixes",
            root.prefix,
            mux.types.len()
        );
        Ok(mux)
    }

    /// Type used when no registered prefix matches.
    pub fn root(&self) -> &ElementType {
        &self.root
    }

    /// Registered prefixes in lexical order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Look up the type registered under an exact prefix.
    pub fn get(&self, prefix: &str) -> Option<&ElementType> {
        self.types.get(prefix)
    }

    /// Select the type for a declaration by longest prefix match.
    pub fn mux(&self, declaration: &str) -> &ElementType {
        let run: String = declaration
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        (1..=run.len())
            .rev()
            .find_map(|len| self.types.get(&run[..len]))
            .unwrap_or(&self.root)
    }

    /// Dispatch a declaration and construct its element.
    pub fn parse(&self, declaration: &str) -> Result<Element> {
        self.mux(declaration).parse(declaration)
    }

    /// Register `ty` under `prefix`.
    pub fn add(&mut self, prefix: &str, ty: ElementType) -> Result<()> {
        let prefix = prefix.trim().to_ascii_lowercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::Configuration(format!(
                "element prefix must be alphabetic, got '{prefix}'"
            )));
        }
        if self.types.contains_key(&prefix) {
            return Err(Error::Configuration(format!(
                "element prefix '{prefix}' is already registered"
            )));
        }
        self.types.insert(prefix, ty);
        Ok(())
    }

    /// Unregister a prefix, returning its type.
    pub fn remove(&mut self, prefix: &str) -> Option<ElementType> {
        self.types.remove(&prefix.trim().to_ascii_lowercase())
    }
}

impl Default for ElementMux {
    fn default() -> Self {
        Self {
            root: ElementType::ELEMENT,
            types: BUILTIN_TYPES
                .iter()
                .map(|ty| (ty.prefix.to_string(), *ty))
                .collect(),
        }
    }
}
