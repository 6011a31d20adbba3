//! Error types for linsim-parser.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// A line was read but the model rejected it.
    #[error("line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: linsim_core::Error,
    },

    #[error(transparent)]
    Core(#[from] linsim_core::Error),

    #[error("failed to read netlist: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Source line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::ParseError { line, .. } | Error::Invalid { line, .. } => Some(*line),
            Error::Core(_) | Error::Io(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
