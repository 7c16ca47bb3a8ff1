//! Account tree: an arena of [`AccountNode`]s addressed by [`NodeId`].
//!
//! `children` are the owning edges (every node lives in the arena exactly once
//! and is listed in exactly one parent's `children`). `parent` is a plain back
//! index used for upward lookups only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerbook_core::ValueObject;

use crate::error::{ChartError, ChartResult};
use crate::row::Row;

/// Index of a node inside its [`AccountTree`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One transactional row attached to an account (immutable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Transaction date, epoch seconds on the wire.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,
    /// true = debit, false = credit.
    #[serde(rename = "debit")]
    pub is_debit: bool,
    pub amount: Decimal,
    pub description: String,
    pub voucher_ref: String,
}

impl ValueObject for LineItem {}

impl LineItem {
    pub fn debit_amount(&self) -> Decimal {
        if self.is_debit { self.amount } else { Decimal::ZERO }
    }

    pub fn credit_amount(&self) -> Decimal {
        if self.is_debit { Decimal::ZERO } else { self.amount }
    }
}

/// A chart-of-accounts node.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountNode {
    code: String,
    name: String,
    note: String,
    indent: usize,
    row: usize,
    initial_debit: Decimal,
    initial_credit: Decimal,
    opening_set: bool,
    entries: Vec<LineItem>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl AccountNode {
    fn root() -> Self {
        Self::from_row(None, 0, &Row::default())
    }

    fn from_row(parent: Option<NodeId>, row_index: usize, row: &Row) -> Self {
        Self {
            code: row.code.trim().to_string(),
            name: row.name.trim().to_string(),
            note: row.note.clone(),
            indent: row.depth(),
            row: row_index,
            initial_debit: Decimal::ZERO,
            initial_credit: Decimal::ZERO,
            opening_set: false,
            entries: Vec::new(),
            parent,
            children: Vec::new(),
        }
    }

    /// Account code; empty on grouping rows until codes are assigned.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// Leading-whitespace count of the source row.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Index of the source row (0 for the root).
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn initial_debit(&self) -> Decimal {
        self.initial_debit
    }

    pub fn initial_credit(&self) -> Decimal {
        self.initial_credit
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[LineItem] {
        &self.entries
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn set_code(&mut self, code: String) {
        self.code = code;
    }
}

/// Rooted account tree, built fresh per request and discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountTree {
    nodes: Vec<AccountNode>,
}

impl Default for AccountTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountTree {
    /// A tree holding only the (code-less, name-less) root container.
    pub fn new() -> Self {
        Self {
            nodes: vec![AccountNode::root()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root has no accounts under it.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn get(&self, id: NodeId) -> Option<&AccountNode> {
        self.nodes.get(id.0)
    }

    /// Node by id.
    ///
    /// # Panics
    ///
    /// If `id` was not produced by this tree.
    pub fn node(&self, id: NodeId) -> &AccountNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> ChartResult<&mut AccountNode> {
        self.nodes.get_mut(id.0).ok_or(ChartError::UnknownNode(id))
    }

    /// Appends a node built from `row` as the last child of `parent`.
    pub(crate) fn push_child(&mut self, parent: NodeId, row_index: usize, row: &Row) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(AccountNode::from_row(Some(parent), row_index, row));
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_leaf()
    }

    /// Parent, grandparent, ... up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        core::iter::successors(self.parent(id), move |n| self.parent(*n))
    }

    /// Tree level: 0 for the root's children, +1 per generation. The root is 0 too.
    pub fn level(&self, id: NodeId) -> usize {
        self.ancestors(id).count().saturating_sub(1)
    }

    /// `id` followed by all of its descendants, pre-order, children in source order.
    pub fn subtree(&self, id: NodeId) -> Subtree<'_> {
        Subtree {
            tree: self,
            stack: vec![id],
        }
    }

    /// Descendants of `id` (pre-order), excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.subtree(id).skip(1)
    }

    /// All nodes with their ids, root first, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &AccountNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// First account (pre-order) carrying `code`.
    pub fn find_by_code(&self, code: &str) -> Option<NodeId> {
        if code.is_empty() {
            return None;
        }
        self.descendants(self.root())
            .find(|id| self.node(*id).code == code)
    }

    /// Code → node lookup table; on duplicate codes the first account in
    /// pre-order wins, as with [`Self::find_by_code`].
    pub fn code_index(&self) -> HashMap<&str, NodeId> {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for id in self.descendants(self.root()) {
            let code = self.node(id).code.as_str();
            if !code.is_empty() {
                index.entry(code).or_insert(id);
            }
        }
        index
    }

    /// Names from the top-level account down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut names: Vec<&str> = core::iter::once(id)
            .chain(self.ancestors(id))
            .filter(|n| *n != self.root())
            .map(|n| self.node(n).name())
            .collect();
        names.reverse();
        names
    }

    /// Sets the opening balance this node contributes on its own.
    ///
    /// Allowed once per node per build.
    pub fn set_opening_balance(
        &mut self,
        id: NodeId,
        debit: Decimal,
        credit: Decimal,
    ) -> ChartResult<()> {
        let node = self.node_mut(id)?;
        if node.opening_set {
            return Err(ChartError::OpeningBalanceAlreadySet {
                code: node.code.clone(),
            });
        }
        node.initial_debit = debit;
        node.initial_credit = credit;
        node.opening_set = true;
        Ok(())
    }

    /// Appends `item` to the node's entries.
    pub fn attach(&mut self, id: NodeId, item: LineItem) -> ChartResult<()> {
        self.node_mut(id)?.entries.push(item);
        Ok(())
    }
}

/// Pre-order walk, see [`AccountTree::subtree`].
#[derive(Debug, Clone)]
pub struct Subtree<'a> {
    tree: &'a AccountTree,
    stack: Vec<NodeId>,
}

impl Iterator for Subtree<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        if let Some(node) = self.tree.get(id) {
            self.stack.extend(node.children.iter().rev().copied());
        }
        Some(id)
    }
}
