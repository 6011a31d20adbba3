//! Netlist: a root block plus its directives.

use std::fmt;

use indexmap::IndexMap;

use crate::block::{Block, FlattenOptions};
use crate::directive::{Directive, END, IC};
use crate::error::{Error, Result};
use crate::node::Node;

/// Prefix of the comment line that opens every serialized netlist.
pub const HEADER: &str = "* Netlist: ";

/// A complete circuit description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netlist {
    name: String,
    block: Block,
    directives: IndexMap<String, Vec<Directive>>,
}

impl Netlist {
    /// Create an empty netlist whose root block shares its name.
    pub fn new(name: impl AsRef<str>) -> Self {
        let block = Block::new(name.as_ref(), Vec::<Node>::new());
        Self::with_block(name, block)
    }

    /// Wrap an existing root block.
    pub fn with_block(name: impl AsRef<str>, block: Block) -> Self {
        Self {
            name: name.as_ref().trim().to_lowercase(),
            block,
            directives: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root block.
    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn block_mut(&mut self) -> &mut Block {
        &mut self.block
    }

    /// Directives grouped by kind, in file order.
    pub fn directives(&self) -> &IndexMap<String, Vec<Directive>> {
        &self.directives
    }

    /// Directives of one kind, in file order.
    pub fn directive(&self, kind: &str) -> &[Directive] {
        self.directives
            .get(&kind.trim_start_matches('.').to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Record a directive. Subcircuit boundaries belong to blocks, not here.
    pub fn add_directive(&mut self, directive: Directive) -> Result<()> {
        if directive.is_structural() {
            return Err(Error::Parse(format!(
                "{directive} delimits a block and cannot be stored as a directive"
            )));
        }
        self.directives
            .entry(directive.kind().to_string())
            .or_default()
            .push(directive);
        Ok(())
    }

    /// Initial conditions from every `.ic` directive, e.g. `v(n1) -> 10`.
    pub fn initial_conditions(&self) -> IndexMap<String, String> {
        self.directive(IC)
            .iter()
            .flat_map(|ic| ic.params().iter())
            .map(|(quantity, value)| (quantity.to_string(), value.to_string()))
            .collect()
    }

    /// Flatten the root block with the default options.
    pub fn flatten(&mut self) -> Result<()> {
        self.block.flatten()
    }

    pub fn flatten_with(&mut self, options: &FlattenOptions) -> Result<()> {
        self.block.flatten_with(options)
    }

    /// Netlist text without initial conditions, which travel separately.
    pub fn definition(&self) -> String {
        self.lines(false).join("\n")
    }

    fn lines(&self, with_ic: bool) -> Vec<String> {
        let mut lines = vec![format!("{HEADER}{}", self.name)];
        lines.extend(
            self.directives
                .iter()
                .filter(|(kind, _)| kind.as_str() != IC && kind.as_str() != END)
                .flat_map(|(_, group)| group.iter().map(ToString::to_string)),
        );

        let definition = self.block.definition();
        if !definition.is_empty() {
            lines.push(definition);
        }

        if with_ic {
            lines.extend(self.directive(IC).iter().map(ToString::to_string));
        }
        lines.extend(self.directive(END).iter().map(ToString::to_string));
        lines
    }
}

impl fmt::Display for Netlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines(true).join("\n"))
    }
}
