//! # linsim
//!
//! Hierarchical circuit descriptions in Rust.
//!
//! linsim provides:
//! - SPICE-style netlist parsing with `.subckt` hierarchies
//! - Editable blocks: add, remove and short nodes
//! - Flattening of nested subcircuit instances
//! - A prefix registry for custom element types
//! - Mixed-radix state index codecs
//!
//! ## Quick Start
//!
//! ```rust
//! use linsim::prelude::*;
//!
//! let text = "\
//! .subckt stage in out
//! R1 in out 1k
//! C1 out 0 1u
//! .ends stage
//! X1 n1 n2 stage
//! X2 n2 n3 stage
//! .ic V(n1)=10
//! .end
//! ";
//!
//! let mut netlist = parse("ladder", text).unwrap();
//! netlist.flatten().unwrap();
//! assert_eq!(netlist.block().num_elements(), 4);
//! assert!(netlist.block().element("x2_1_c1").is_some());
//! ```

// Re-export member crates
pub use linsim_core as core;
pub use linsim_parser as parser;

// ============================================================================
// Convenient re-exports from linsim_core
// ============================================================================

pub use linsim_core::{
    // Hierarchy
    Block,
    Directive,
    Element,
    // Registry
    ElementMux,
    ElementType,
    // Simulation boundary
    Engine,
    // Errors
    Error as CoreError,
    FlattenOptions,
    // Index codec
    MixedRadix,
    Netlist,
    Node,
    Numeral,
    Params,
    Radix,
    SimulationInput,
    StepConfig,
    BUILTIN_TYPES,
    convert_basis,
};

// ============================================================================
// Convenient re-exports from linsim_parser
// ============================================================================

pub use linsim_parser::{
    // Errors
    Error as ParseError,
    // Parse functions
    parse,
    parse_block,
    parse_file,
    parse_lines,
    parse_with,
};

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module containing commonly used types and traits.
///
/// ```rust
/// use linsim::prelude::*;
/// ```
pub mod prelude {
    // Model
    pub use crate::{Block, Directive, Element, FlattenOptions, Netlist, Node};

    // Parser
    pub use crate::{parse, parse_file, parse_with};

    // Registry
    pub use crate::{ElementMux, ElementType};

    // Simulation boundary
    pub use crate::{Engine, SimulationInput, StepConfig};

    // Index codec
    pub use crate::{MixedRadix, convert_basis};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_circuit() {
        let netlist = "V1 1 0 5\nR1 1 0 1k\n.end\n";
        let result = parse("test", netlist);
        assert!(result.is_ok());
    }

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let mut block = Block::new("top", Vec::<Node>::new());
        block.add(Element::new("r1", ["a", "0"], "1k")).unwrap();
        assert!(block.contains_node("0"));

        let radix = MixedRadix::new([4, 3, 2]).unwrap();
        assert_eq!(radix.decode(12).unwrap(), vec![2, 0, 0]);
    }

    #[test]
    fn test_error_conversion() {
        let err: ParseError = CoreError::Domain("bad".into()).into();
        assert!(matches!(err, ParseError::Core(_)));
    }
}
