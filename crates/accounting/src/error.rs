//! Chart engine errors.

use thiserror::Error;

use crate::node::NodeId;

/// Result type of the chart engine.
pub type ChartResult<T> = Result<T, ChartError>;

/// Errors raised while building or querying an account tree.
///
/// `MalformedTree` is structural and aborts the whole report. `InvalidRow` is a
/// data-quality issue: the builder collects it and keeps going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// A grouping node has no code and no child to derive one from.
    #[error("malformed tree: grouping node '{name}' (row {row}) has no code and no children")]
    MalformedTree { name: String, row: usize },

    /// A source record could not be turned into a row.
    #[error("invalid row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    /// Opening balances are settable once per build.
    #[error("opening balance already set for account '{code}'")]
    OpeningBalanceAlreadySet { code: String },

    /// Code-assignment settings that cannot produce a non-empty code.
    #[error("invalid code assigner settings: {0}")]
    InvalidAssigner(String),

    /// A node id that does not belong to this tree.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

impl ChartError {
    pub fn invalid_row(row: usize, reason: impl Into<String>) -> Self {
        Self::InvalidRow {
            row,
            reason: reason.into(),
        }
    }

    /// Structural errors abort the build; everything else is recoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MalformedTree { .. } | Self::InvalidAssigner(_) | Self::UnknownNode(_)
        )
    }
}
