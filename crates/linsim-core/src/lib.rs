//! Core netlist representation for linsim.
//!
//! This crate provides the data model for hierarchical circuit descriptions:
//! nodes, element and directive declarations, subcircuit blocks with their
//! connectivity graph, and whole netlists. Blocks can be edited, shorted and
//! flattened into a single level before being handed to a simulator through
//! the [`engine`] boundary types.

mod declaration;

pub mod block;
pub mod directive;
pub mod element;
pub mod engine;
pub mod error;
pub mod netlist;
pub mod node;
pub mod radix;
pub mod registry;

pub use block::{Block, FlattenOptions};
pub use declaration::Params;
pub use directive::Directive;
pub use element::Element;
pub use engine::{Engine, SimulationInput, StepConfig};
pub use error::{Error, Result};
pub use netlist::Netlist;
pub use node::Node;
pub use radix::{convert_basis, MixedRadix, Numeral, Radix};
pub use registry::{ElementMux, ElementType, BUILTIN_TYPES};
