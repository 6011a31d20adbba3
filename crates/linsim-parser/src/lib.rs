//! Netlist text parser for linsim.
//!
//! This crate reads SPICE-style netlist text into a [`linsim_core::Netlist`]:
//! element lines and `.subckt` regions build the root block, every other
//! dot line becomes a directive.
//!
//! # Example
//!
//! ```
//! use linsim_parser::parse;
//!
//! let netlist = parse("divider", r#"
//! * Voltage divider
//! V1 1 0 10
//! R1 1 2 1k
//! R2 2 0 1k
//! .end
//! "#).unwrap();
//!
//! assert_eq!(netlist.block().num_elements(), 3);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{Error, Result};
pub use parser::{parse, parse_block, parse_file, parse_lines, parse_with};
