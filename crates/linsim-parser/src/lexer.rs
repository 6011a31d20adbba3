//! Netlist lexer: raw text to logical lines.

use crate::error::{Error, Result};

/// One logical line with continuations folded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based number of the physical line the logical line starts on.
    pub number: usize,
    pub text: String,
}

impl Line {
    /// Check whether this is a dot directive.
    pub fn is_directive(&self) -> bool {
        self.text.starts_with('.')
    }
}

/// Lexer for netlist text.
pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Split the input into logical lines.
    ///
    /// Lines starting with `*` are comments, `;` starts an inline comment and
    /// a line starting with `+` continues the previous logical line. Blank
    /// lines are dropped.
    pub fn tokenize(self) -> Result<Vec<Line>> {
        let mut lines: Vec<Line> = Vec::new();

        for (index, raw) in self.input.lines().enumerate() {
            let number = index + 1;
            let text = match raw.find(';') {
                Some(comment) => &raw[..comment],
                None => raw,
            };
            let text = text.trim();
            if text.is_empty() || text.starts_with('*') {
                continue;
            }

            if let Some(rest) = text.strip_prefix('+') {
                let previous = lines.last_mut().ok_or_else(|| Error::ParseError {
                    line: number,
                    message: "continuation line with nothing to continue".to_string(),
                })?;
                let rest = rest.trim();
                if !rest.is_empty() {
                    previous.text.push(' ');
                    previous.text.push_str(rest);
                }
                continue;
            }

            lines.push(Line {
                number,
                text: text.to_string(),
            });
        }

        Ok(lines)
    }
}
