//! Subcircuit definitions (.SUBCKT/.ENDS).

use linsim_core::{Block, Directive};

use crate::error::{Error, Result};

use super::Parser;

impl<'a> Parser<'a> {
    /// Parse `.subckt name port...` and the body up to its `.ends`.
    ///
    /// Directives in the body go to `directives`, as at the top level.
    pub(super) fn parse_subcircuit(
        &mut self,
        header: &Directive,
        line: usize,
        directives: Option<&mut Vec<(usize, Directive)>>,
    ) -> Result<Block> {
        let (name, ports) = header.args().split_first().ok_or_else(|| Error::ParseError {
            line,
            message: ".subckt requires a name".to_string(),
        })?;
        if !header.params().is_empty() {
            return Err(Error::ParseError {
                line,
                message: format!(".subckt {name} does not take parameters"),
            });
        }

        let mut block = Block::new(name, ports);
        self.parse_scope(&mut block, Some(line), directives)?;

        log::trace!(
            "line {line}: defined block {} with {} ports and {} elements",
            block.name(),
            block.ports().len(),
            block.num_elements()
        );
        Ok(block)
    }

    /// Check an `.ends` against the block it closes.
    pub(super) fn close_scope(
        &self,
        block: &Block,
        opened_at: Option<usize>,
        ends: &Directive,
        line: usize,
    ) -> Result<()> {
        if opened_at.is_none() {
            return Err(Error::ParseError {
                line,
                message: ".ends without a matching .subckt".to_string(),
            });
        }
        match ends.args() {
            [] => Ok(()),
            [name] if name == block.name() => Ok(()),
            [name] => Err(Error::ParseError {
                line,
                message: format!(".ends {name} closes .subckt {}", block.name()),
            }),
            _ => Err(Error::ParseError {
                line,
                message: format!(".ends takes at most one name, got {}", ends.args().len()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn test_nested_subcircuits() {
        let input = "\
.subckt outer a b
.subckt inner p q
R1 p q 1k
.ends inner
X1 a mid inner
X2 mid b inner
.ends outer
X1 1 0 outer
";
        let netlist = parse("nest", input).unwrap();
        let outer = netlist.block().resolve("outer").unwrap();
        assert_eq!(outer.num_elements(), 2);
        assert!(outer.resolve("inner").is_some());
        assert!(netlist.block().resolve("inner").is_none());
    }

    #[test]
    fn test_ends_without_name() {
        let netlist = parse("t", ".subckt amp a b\nR1 a b 1k\n.ends\n").unwrap();
        assert!(netlist.block().resolve("amp").is_some());
    }

    #[test]
    fn test_unterminated_subckt() {
        let err = parse("t", "R0 1 0 1\n.subckt amp a b\nR1 a b 1k\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("no matching .ends"));
    }

    #[test]
    fn test_stray_ends() {
        let err = parse("t", "R1 1 0 1k\n.ends amp\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_mismatched_ends() {
        let err = parse("t", ".subckt amp a b\nR1 a b 1k\n.ends filter\n").unwrap_err();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_directive_inside_subckt() {
        let input = "\
.model top d
.subckt amp a b
.model sw switch von=6
.subckt inner p
.tran 1 2
R1 p 0 1k
.ends inner
R1 a b 1k
X1 b inner
.ends amp
X1 1 2 amp
.end
";
        let netlist = parse("t", input).unwrap();
        let amp = netlist.block().resolve("amp").unwrap();
        assert_eq!(amp.num_elements(), 2);
        assert!(amp.resolve("inner").is_some());

        let models = netlist.directive("model");
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].args(), ["top", "d"]);
        assert_eq!(models[1].param("von"), Some("6"));
        assert_eq!(netlist.directive("tran")[0].args(), ["1", "2"]);
        assert!(!amp.to_string().contains(".model"));
    }

    #[test]
    fn test_subckt_without_name() {
        assert!(parse("t", ".subckt\n.ends\n").is_err());
    }

    #[test]
    fn test_duplicate_definition() {
        let input = ".subckt amp a\n.ends amp\n.subckt amp a\n.ends amp\n";
        let err = parse("t", input).unwrap_err();
        assert_eq!(err.line(), Some(3));
    }
}
