//! Builds an [`AccountTree`] from indentation-encoded rows.

use crate::error::ChartError;
use crate::node::{AccountTree, NodeId};
use crate::row::{Row, RowLayout};

/// Result of building from raw records: the tree plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    pub tree: AccountTree,
    pub skipped: Vec<ChartError>,
}

/// Recursive-descent tree builder over a single forward cursor.
///
/// Siblings share a depth; a row at a deeper depth becomes a child of the row
/// before it; a shallower row hands control back to the ancestor frame whose
/// depth it exceeds. A jump of several levels simply nests one level deeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeBuilder {
    header_rows: usize,
    layout: RowLayout,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self {
            header_rows: 1,
            layout: RowLayout::default(),
        }
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leading rows to skip (1 by default: the header).
    pub fn header_rows(mut self, n: usize) -> Self {
        self.header_rows = n;
        self
    }

    pub fn layout(mut self, layout: RowLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Builds the tree from typed rows. Never fails; no rows past the header
    /// gives a root without children.
    pub fn build(&self, rows: &[Row]) -> AccountTree {
        let indexed: Vec<(usize, &Row)> = rows
            .iter()
            .enumerate()
            .skip(self.header_rows)
            .collect();
        let tree = self.assemble(&indexed);
        tracing::debug!(rows = indexed.len(), nodes = tree.len(), "account tree built");
        tree
    }

    /// Parses raw records with the configured layout, skipping (and reporting)
    /// the ones that cannot be parsed, then builds the tree.
    pub fn build_records<S: AsRef<str>>(&self, records: &[Vec<S>]) -> BuildOutcome {
        let mut rows = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();

        for (index, record) in records.iter().enumerate().skip(self.header_rows) {
            match self.layout.parse(index, record) {
                Ok(row) => rows.push((index, row)),
                Err(err) => {
                    tracing::warn!(row = index, error = %err, "skipping unparseable chart row");
                    skipped.push(err);
                }
            }
        }

        let indexed: Vec<(usize, &Row)> = rows.iter().map(|(i, r)| (*i, r)).collect();
        let tree = self.assemble(&indexed);
        tracing::debug!(
            rows = indexed.len(),
            skipped = skipped.len(),
            nodes = tree.len(),
            "account tree built"
        );
        BuildOutcome { tree, skipped }
    }

    fn assemble(&self, rows: &[(usize, &Row)]) -> AccountTree {
        let mut tree = AccountTree::new();
        let mut cursor = Cursor { rows, pos: 0 };
        let root = tree.root();
        descend(&mut tree, &mut cursor, root, None);
        tree
    }
}

struct Cursor<'a> {
    rows: &'a [(usize, &'a Row)],
    pos: usize,
}

impl Cursor<'_> {
    fn peek_depth(&self) -> Option<usize> {
        self.rows.get(self.pos).map(|(_, row)| row.depth())
    }
}

/// `parent_depth == None` is the root sentinel (shallower than any row).
fn descend(
    tree: &mut AccountTree,
    cursor: &mut Cursor<'_>,
    parent: NodeId,
    parent_depth: Option<usize>,
) {
    while let Some(depth) = cursor.peek_depth() {
        if parent_depth.is_some_and(|p| depth <= p) {
            return;
        }
        let (index, row) = cursor.rows[cursor.pos];
        cursor.pos += 1;
        let child = tree.push_child(parent, index, row);
        descend(tree, cursor, child, Some(depth));
    }
}
