//! Dot directives (`.tran`, `.ic`, `.model`, `.end`, ...).

use std::fmt;
use std::str::FromStr;

use crate::declaration::{join_line, Declaration, Params};
use crate::error::{Error, Result};

/// Directive kind opening a subcircuit definition.
pub const SUBCKT: &str = "subckt";
/// Directive kind closing a subcircuit definition.
pub const ENDS: &str = "ends";
/// Initial-condition directive kind.
pub const IC: &str = "ic";
/// End-of-netlist directive kind.
pub const END: &str = "end";

/// A non-structural netlist directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    kind: String,
    args: Vec<String>,
    params: Params,
}

impl Directive {
    /// Create a directive from its kind and positional arguments.
    pub fn new<S: AsRef<str>>(kind: impl AsRef<str>, args: impl IntoIterator<Item = S>) -> Self {
        Self {
            kind: kind.as_ref().trim().trim_start_matches('.').to_lowercase(),
            args: args
                .into_iter()
                .map(|arg| arg.as_ref().trim().to_lowercase())
                .filter(|arg| !arg.is_empty())
                .collect(),
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.params.set(key, value);
        self
    }

    /// Parse a line of the form `.kind arg... [key=value ...]`.
    pub fn parse(definition: &str) -> Result<Self> {
        let decl = Declaration::tokenize(definition)?;
        let kind = decl
            .head
            .strip_prefix('.')
            .ok_or_else(|| Error::Parse(format!("directive must start with '.': {}", decl.head)))?;
        if kind.is_empty() || !kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::Parse(format!("invalid directive kind '{}'", decl.head)));
        }

        Ok(Self {
            kind: kind.to_string(),
            args: decl.fields,
            params: decl.params,
        })
    }

    /// Token following the dot (`tran` for `.tran`).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    pub fn set_param(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Option<String> {
        self.params.set(key, value)
    }

    /// Subcircuit boundaries are consumed by the block parser, never stored.
    pub fn is_structural(&self) -> bool {
        is_structural_kind(&self.kind)
    }
}

/// Check whether a directive kind delimits a subcircuit definition.
pub fn is_structural_kind(kind: &str) -> bool {
    kind.eq_ignore_ascii_case(SUBCKT) || kind.eq_ignore_ascii_case(ENDS)
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head = format!(".{}", self.kind);
        let params = self.params.to_string();
        let line = join_line(
            std::iter::once(head.as_str())
                .chain(self.args.iter().map(String::as_str))
                .chain(std::iter::once(params.as_str())),
        );
        f.write_str(&line)
    }
}

impl FromStr for Directive {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
