//! Ledger rows with a running balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::BalanceAggregator;
use crate::node::{AccountTree, LineItem, NodeId};
use crate::side::{ChartMetadata, NaturalSide};

/// One chronological ledger line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,
    pub voucher_ref: String,
    pub description: String,
    pub account_code: String,
    pub account_name: String,
    pub debit: Decimal,
    pub credit: Decimal,
    /// Balance after this row. Each row moves it under the natural side of
    /// the account it was posted to, so the last row matches
    /// [`BalanceAggregator::balance`] of the projected account.
    pub balance: Decimal,
}

/// Projects account ledgers from the tree.
#[derive(Debug, Clone, Copy)]
pub struct LedgerProjector<'a> {
    aggregator: BalanceAggregator<'a>,
}

impl<'a> LedgerProjector<'a> {
    pub fn new(tree: &'a AccountTree, chart: &'a ChartMetadata) -> Self {
        Self {
            aggregator: BalanceAggregator::new(tree, chart),
        }
    }

    /// Ledger of `id`: entries of the node and of its whole subtree, ordered
    /// by date with ties kept in insertion order (pre-order across accounts,
    /// attach order within one). The running balance starts at the subtree's
    /// opening balance and every row is signed by its own account's side.
    ///
    /// Each call starts from scratch; the returned iterator keeps no state
    /// that outlives it.
    pub fn project(&self, id: NodeId) -> Ledger<'a> {
        let aggregator = self.aggregator;
        let tree = aggregator.tree();
        let mut entries: Vec<Posting<'a>> = tree
            .subtree(id)
            .flat_map(move |n| {
                let side = aggregator.side(n);
                tree.node(n).entries().iter().map(move |e| (n, side, e))
            })
            .collect();
        // Stable: equal dates keep their collection order.
        entries.sort_by_key(|(_, _, e)| e.date);

        Ledger {
            tree,
            balance: aggregator.opening_balance(id),
            entries: entries.into_iter(),
        }
    }
}

/// An entry with the account it sits on and that account's side.
type Posting<'a> = (NodeId, NaturalSide, &'a LineItem);

/// Iterator returned by [`LedgerProjector::project`].
#[derive(Debug)]
pub struct Ledger<'a> {
    tree: &'a AccountTree,
    balance: Decimal,
    entries: std::vec::IntoIter<Posting<'a>>,
}

impl Ledger<'_> {
    /// Balance before the next row (the opening balance if nothing was read yet).
    pub fn balance(&self) -> Decimal {
        self.balance
    }
}

impl Iterator for Ledger<'_> {
    type Item = LedgerRow;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, side, entry) = self.entries.next()?;
        let account = self.tree.node(node);
        let (debit, credit) = (entry.debit_amount(), entry.credit_amount());
        self.balance += side.signed(debit, credit);

        Some(LedgerRow {
            date: entry.date,
            voucher_ref: entry.voucher_ref.clone(),
            description: entry.description.clone(),
            account_code: account.code().to_string(),
            account_name: account.name().to_string(),
            debit,
            credit,
            balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for Ledger<'_> {}
