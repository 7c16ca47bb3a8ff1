//! Synthetic codes for grouping rows that arrive without one.
//!
//! This is an explicit in-place pass over the tree: it runs once, right after
//! building, and is the only place node codes change.

use crate::error::{ChartError, ChartResult};
use crate::node::{AccountTree, NodeId};

/// Marker symbols indexed by tree level (level 0 = top-level accounts).
pub const DEFAULT_MARKERS: [&str; 8] = ["Z", "Y", "X", "W", "V", "U", "T", "S"];

/// Characters kept from the source child's code.
pub const DEFAULT_PREFIX_LEN: usize = 4;

/// Post-order code assignment.
///
/// A node without a code takes its **first** child's (already assigned) code,
/// keeps the first `prefix_len` characters and appends the marker of its own
/// level. Siblings are never consulted, so the result depends only on tree
/// shape, the first-child chain and the marker list. Levels beyond the marker
/// list reuse the last marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAssigner {
    markers: Vec<String>,
    prefix_len: usize,
}

impl Default for CodeAssigner {
    fn default() -> Self {
        Self {
            markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
            prefix_len: DEFAULT_PREFIX_LEN,
        }
    }
}

impl CodeAssigner {
    /// Fails with [`ChartError::InvalidAssigner`] when the settings could
    /// synthesize an empty code: no markers, an empty marker, or a zero prefix.
    pub fn new(markers: Vec<String>, prefix_len: usize) -> ChartResult<Self> {
        if markers.is_empty() {
            return Err(ChartError::InvalidAssigner("marker list is empty".to_string()));
        }
        if markers.iter().any(|m| m.is_empty()) {
            return Err(ChartError::InvalidAssigner("markers must not be empty strings".to_string()));
        }
        if prefix_len == 0 {
            return Err(ChartError::InvalidAssigner("prefix length must be at least 1".to_string()));
        }
        Ok(Self {
            markers,
            prefix_len,
        })
    }

    pub fn marker(&self, level: usize) -> &str {
        self.markers
            .get(level)
            .or_else(|| self.markers.last())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Gives every account under the root a non-empty code.
    ///
    /// Fails with [`ChartError::MalformedTree`] on a code-less node without
    /// children. The root container itself keeps its empty code.
    pub fn assign(&self, tree: &mut AccountTree) -> ChartResult<()> {
        let top = tree.children(tree.root()).to_vec();
        for child in top {
            self.assign_node(tree, child, 0)?;
        }
        Ok(())
    }

    /// Returns the node's final code so the caller can derive its own from it.
    fn assign_node(&self, tree: &mut AccountTree, id: NodeId, level: usize) -> ChartResult<String> {
        let children = tree.children(id).to_vec();
        let mut first_code = None;
        for child in children {
            let code = self.assign_node(tree, child, level + 1)?;
            first_code.get_or_insert(code);
        }

        let node = tree.node(id);
        if !node.code().is_empty() {
            return Ok(node.code().to_string());
        }

        let Some(source) = first_code else {
            tracing::warn!(row = node.row(), name = node.name(), "grouping row without code or children");
            return Err(ChartError::MalformedTree {
                name: node.name().to_string(),
                row: node.row(),
            });
        };

        let mut code: String = source.chars().take(self.prefix_len).collect();
        code.push_str(self.marker(level));
        tracing::debug!(row = node.row(), name = node.name(), code = %code, "synthesized account code");

        tree.node_mut(id)?.set_code(code.clone());
        Ok(code)
    }
}
