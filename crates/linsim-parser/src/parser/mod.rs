//! Netlist parser.

use std::fs;
use std::path::Path;

use linsim_core::directive::{ENDS, SUBCKT};
use linsim_core::{Block, Directive, Element, ElementMux, Netlist, Node};

use crate::error::{Error, Result};
use crate::lexer::{Lexer, Line};

mod subcircuit;

/// Parse netlist text with the builtin element types.
pub fn parse(name: &str, input: &str) -> Result<Netlist> {
    parse_with(name, input, &ElementMux::default())
}

/// Parse netlist text, dispatching element lines through `mux`.
pub fn parse_with(name: &str, input: &str, mux: &ElementMux) -> Result<Netlist> {
    let lines = Lexer::new(input).tokenize()?;
    Parser::new(&lines, mux).parse_netlist(name)
}

/// Parse a netlist given as separate physical lines.
pub fn parse_lines<S: AsRef<str>>(
    name: &str,
    lines: impl IntoIterator<Item = S>,
    mux: &ElementMux,
) -> Result<Netlist> {
    let input = lines
        .into_iter()
        .map(|line| line.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    parse_with(name, &input, mux)
}

/// Read and parse a netlist file with the builtin element types.
pub fn parse_file(name: &str, path: impl AsRef<Path>) -> Result<Netlist> {
    let input = fs::read_to_string(path.as_ref())?;
    log::debug!("read netlist '{}' from {}", name, path.as_ref().display());
    parse(name, &input)
}

/// Parse the body of a single block: elements and nested `.subckt`
/// definitions, no directives.
///
/// The result is not validated, since its instances may refer to blocks
/// defined in whatever block it is later added to.
pub fn parse_block<N: Into<Node>>(
    name: &str,
    ports: impl IntoIterator<Item = N>,
    input: &str,
    mux: &ElementMux,
) -> Result<Block> {
    let lines = Lexer::new(input).tokenize()?;
    let mut parser = Parser::new(&lines, mux);
    let mut block = Block::new(name, ports);
    parser.parse_scope(&mut block, None, None)?;
    Ok(block)
}

/// Parser state.
pub(crate) struct Parser<'a> {
    lines: &'a [Line],
    pos: usize,
    mux: &'a ElementMux,
}

impl<'a> Parser<'a> {
    fn new(lines: &'a [Line], mux: &'a ElementMux) -> Self {
        Self { lines, pos: 0, mux }
    }

    fn parse_netlist(mut self, name: &str) -> Result<Netlist> {
        let mut netlist = Netlist::new(name);
        let mut directives = Vec::new();
        self.parse_scope(netlist.block_mut(), None, Some(&mut directives))?;

        for (line, directive) in directives {
            netlist
                .add_directive(directive)
                .map_err(|source| Error::Invalid { line, source })?;
        }
        netlist.block().validate()?;

        log::debug!(
            "parsed netlist '{}': {} elements, {} blocks, {} directive kinds",
            netlist.name(),
            netlist.block().num_elements(),
            netlist.block().blocks().len(),
            netlist.directives().len()
        );
        Ok(netlist)
    }

    /// Read lines into `block` until its `.ends` or the end of input.
    ///
    /// `opened_at` is the line of the `.subckt` that opened the block, `None`
    /// for an outermost scope. Directives, including those inside nested
    /// definitions, are collected into `directives` where given and rejected
    /// otherwise. Nested definitions are added before elements so instances
    /// may name blocks defined further down.
    pub(crate) fn parse_scope(
        &mut self,
        block: &mut Block,
        opened_at: Option<usize>,
        mut directives: Option<&mut Vec<(usize, Directive)>>,
    ) -> Result<()> {
        let mut nested: Vec<(usize, Block)> = Vec::new();
        let mut elements: Vec<(usize, Element)> = Vec::new();
        let mut closed = false;

        while let Some(line) = self.next_line() {
            if !line.is_directive() {
                let element = self.mux.parse(&line.text).map_err(|source| Error::Invalid {
                    line: line.number,
                    source,
                })?;
                elements.push((line.number, element));
                continue;
            }

            let directive = Directive::parse(&line.text).map_err(|source| Error::Invalid {
                line: line.number,
                source,
            })?;
            match directive.kind() {
                SUBCKT => {
                    let definition =
                        self.parse_subcircuit(&directive, line.number, directives.as_deref_mut())?;
                    nested.push((line.number, definition));
                }
                ENDS => {
                    self.close_scope(block, opened_at, &directive, line.number)?;
                    closed = true;
                    break;
                }
                _ => match directives.as_deref_mut() {
                    Some(collected) => collected.push((line.number, directive)),
                    None => {
                        return Err(Error::ParseError {
                            line: line.number,
                            message: format!(
                                "directive .{} is not allowed in block {}",
                                directive.kind(),
                                block.name()
                            ),
                        })
                    }
                },
            }
        }

        if let (Some(line), false) = (opened_at, closed) {
            return Err(Error::ParseError {
                line,
                message: format!(".subckt {} has no matching .ends", block.name()),
            });
        }

        for (line, definition) in nested {
            block
                .add_block(definition)
                .map_err(|source| Error::Invalid { line, source })?;
        }
        for (line, element) in elements {
            block
                .add(element)
                .map_err(|source| Error::Invalid { line, source })?;
        }
        Ok(())
    }

    fn next_line(&mut self) -> Option<&'a Line> {
        let line = self.lines.get(self.pos)?;
        self.pos += 1;
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linsim_core::registry::ElementType;

    #[test]
    fn test_parse_simple_circuit() {
        let netlist = parse(
            "divider",
            "* Voltage divider\nV1 1 0 10\nR1 1 2 1k\nR2 2 0 1k\n.end\n",
        )
        .unwrap();

        assert_eq!(netlist.name(), "divider");
        assert_eq!(netlist.block().num_elements(), 3);
        assert_eq!(netlist.block().num_nodes(), 3);
        assert_eq!(netlist.directive("end").len(), 1);
    }

    #[test]
    fn test_parse_directives() {
        let netlist = parse(
            "test",
            "R1 n1 0 1k\n.tran 0s 10s\n.ic V(n1)=10\n.model sw switch von=6\n",
        )
        .unwrap();

        assert_eq!(netlist.directive("tran")[0].args(), ["0s", "10s"]);
        assert_eq!(
            netlist.initial_conditions().get("v(n1)").map(String::as_str),
            Some("10")
        );
        assert_eq!(netlist.directive("model")[0].param("von"), Some("6"));
    }

    #[test]
    fn test_parse_with_continuation_and_comments() {
        let netlist = parse("t", "R1 1\n+ 0 1k ; load\n* comment\n").unwrap();
        let r1 = netlist.block().element("r1").unwrap();
        assert_eq!(r1.value(), "1k");
    }

    #[test]
    fn test_parse_subcircuit() {
        let input = "\
X1 in out amp
.subckt amp a b
R1 a mid 1k
R2 mid b 1k
.ends amp
";
        let netlist = parse("t", input).unwrap();
        let amp = netlist.block().resolve("amp").unwrap();
        assert_eq!(amp.ports(), ["a", "b"]);
        assert_eq!(amp.num_elements(), 2);
        assert_eq!(netlist.block().element("x1").unwrap().block(), Some("amp"));
    }

    fn three_node(line: &str) -> linsim_core::Result<Element> {
        Element::parse_with_nodes(line, 3)
    }

    #[test]
    fn test_parse_with_custom_mux() {
        let root = ElementType::new("", None, three_node);
        let mux = ElementMux::new(root, &[], &[]).unwrap();
        let netlist = parse_with("t", "q1 c b e npn\n", &mux).unwrap();
        assert_eq!(netlist.block().element("q1").unwrap().nodes().len(), 3);
    }

    #[test]
    fn test_parse_lines() {
        let lines = ["*Test Circuit", "C1 n1 0 1e-6", ".ic V(n1)=10", ".end"];
        let netlist = parse_lines("test", lines, &ElementMux::default()).unwrap();
        assert_eq!(netlist.block().num_elements(), 1);
        assert_eq!(netlist.initial_conditions().len(), 1);
    }

    #[test]
    fn test_parse_block() {
        let block = parse_block(
            "filter",
            ["in", "out"],
            "R1 in out 1k\nC1 out 0 1u\nX1 out 0 elsewhere\n",
            &ElementMux::default(),
        )
        .unwrap();
        assert_eq!(block.name(), "filter");
        assert_eq!(block.num_elements(), 3);

        let err = parse_block("filter", ["in"], ".tran 1 2\n", &ElementMux::default()).unwrap_err();
        assert_eq!(err.line(), Some(1));

        let nested = ".subckt rc a\n.model d1 d\nR1 a 0 1k\n.ends rc\n";
        let err = parse_block("filter", ["in"], nested, &ElementMux::default()).unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_parse_errors_carry_lines() {
        let err = parse("t", "R1 1 0 1k\nR1 2 0 1k\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Invalid {
                line: 2,
                source: linsim_core::Error::DuplicateName(_)
            }
        ));

        let err = parse("t", "R1 1 0 1k\nbogus\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_parse_unknown_block() {
        let err = parse("t", "X1 1 2 nothing\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Core(linsim_core::Error::UnknownReference(_))
        ));
    }
}
