//! Error types for linsim-core.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("duplicate name: {0}")]
    DuplicateName(String),

    #[error("unknown reference: {0}")]
    UnknownReference(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("domain error: {0}")]
    Domain(String),

    #[error("block {block} expects {expected} ports but {instance} provides {found}")]
    PortMismatch {
        instance: String,
        block: String,
        expected: usize,
        found: usize,
    },

    #[error("cyclic block hierarchy through {0}")]
    CyclicHierarchy(String),

    #[error("block hierarchy nested deeper than {0} levels")]
    DepthExceeded(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
