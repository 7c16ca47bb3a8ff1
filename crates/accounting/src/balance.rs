//! Debit/credit summaries and natural-side balances over the account tree.
//!
//! Everything here is derived on demand from the tree and its attached
//! entries; nothing is written back. The aggregator holds a shared borrow of
//! the tree, so entries cannot change while a computation is in progress.

use core::ops::{Add, AddAssign};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerbook_core::ValueObject;

use crate::node::{AccountTree, NodeId};
use crate::side::{ChartMetadata, NaturalSide};

/// Elementwise debit/credit totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub debit: Decimal,
    pub credit: Decimal,
}

impl ValueObject for Summary {}

impl Summary {
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self { debit, credit }
    }

    /// Debit minus credit.
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }
}

impl Add for Summary {
    type Output = Summary;

    fn add(self, rhs: Summary) -> Summary {
        Summary {
            debit: self.debit + rhs.debit,
            credit: self.credit + rhs.credit,
        }
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, rhs: Summary) {
        self.debit += rhs.debit;
        self.credit += rhs.credit;
    }
}

impl core::iter::Sum for Summary {
    fn sum<I: Iterator<Item = Summary>>(iter: I) -> Summary {
        iter.fold(Summary::default(), Add::add)
    }
}

/// Computed figures of one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTotals {
    pub summary: Summary,
    pub balance: Decimal,
}

/// Figures for every node of a tree, indexed by [`NodeId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
    by_node: Vec<NodeTotals>,
}

impl Totals {
    pub fn get(&self, id: NodeId) -> Option<&NodeTotals> {
        self.by_node.get(id.index())
    }

    pub fn summary(&self, id: NodeId) -> Summary {
        self.get(id).map(|t| t.summary).unwrap_or_default()
    }

    pub fn balance(&self, id: NodeId) -> Decimal {
        self.get(id).map(|t| t.balance).unwrap_or_default()
    }
}

/// Recursive summary/balance computation.
///
/// * `summary(n)` = own entries + Σ `summary(child)`.
/// * `balance(n)` = side(n)·(initial debit − initial credit)
///   + side(n)·(own entries) + Σ `balance(child)`, each child under its own side.
///
/// Own entries only: child entries reach the parent through the child balances.
#[derive(Debug, Clone, Copy)]
pub struct BalanceAggregator<'a> {
    tree: &'a AccountTree,
    chart: &'a ChartMetadata,
}

impl<'a> BalanceAggregator<'a> {
    pub fn new(tree: &'a AccountTree, chart: &'a ChartMetadata) -> Self {
        Self { tree, chart }
    }

    pub fn tree(&self) -> &'a AccountTree {
        self.tree
    }

    /// Natural side of a node, resolved through the chart metadata.
    pub fn side(&self, id: NodeId) -> NaturalSide {
        self.chart.side_for(self.tree, id)
    }

    /// Debit/credit of the node's own entries.
    pub fn own_summary(&self, id: NodeId) -> Summary {
        self.tree
            .node(id)
            .entries()
            .iter()
            .map(|e| Summary::new(e.debit_amount(), e.credit_amount()))
            .sum()
    }

    pub fn summary(&self, id: NodeId) -> Summary {
        self.own_summary(id)
            + self
                .tree
                .children(id)
                .iter()
                .map(|c| self.summary(*c))
                .sum::<Summary>()
    }

    pub fn balance(&self, id: NodeId) -> Decimal {
        let side = self.side(id);
        let node = self.tree.node(id);
        let entries = self.own_summary(id);
        let own = side.signed(node.initial_debit(), node.initial_credit())
            + side.signed(entries.debit, entries.credit);
        own + self
            .tree
            .children(id)
            .iter()
            .map(|c| self.balance(*c))
            .sum::<Decimal>()
    }

    /// Opening balances of the node and its subtree, each account under its
    /// own side, the same way [`Self::balance`] rolls children up.
    pub fn opening_balance(&self, id: NodeId) -> Decimal {
        self.tree
            .subtree(id)
            .map(|n| {
                let node = self.tree.node(n);
                self.side(n).signed(node.initial_debit(), node.initial_credit())
            })
            .sum()
    }

    /// Summary and balance of every node in a single post-order pass.
    pub fn aggregate_all(&self) -> Totals {
        let mut by_node = vec![NodeTotals::default(); self.tree.len()];
        let mut sides = vec![self.chart.default_side; self.tree.len()];

        // Pre-order fixes each node's side from its parent's, so a node's
        // rules are looked up once instead of walking the ancestor chain.
        let order: Vec<NodeId> = self.tree.subtree(self.tree.root()).collect();
        for &id in &order {
            let inherited = self
                .tree
                .parent(id)
                .map(|p| sides[p.index()])
                .unwrap_or(self.chart.default_side);
            sides[id.index()] = self
                .chart
                .kind_of(self.tree.node(id).code())
                .map(|k| k.natural_side())
                .unwrap_or(inherited);
        }

        for &id in order.iter().rev() {
            let node = self.tree.node(id);
            let side = sides[id.index()];
            let own = self.own_summary(id);
            let mut totals = NodeTotals {
                summary: own,
                balance: side.signed(node.initial_debit(), node.initial_credit())
                    + side.signed(own.debit, own.credit),
            };
            for child in node.children() {
                let c = by_node[child.index()];
                totals.summary += c.summary;
                totals.balance += c.balance;
            }
            by_node[id.index()] = totals;
        }

        Totals { by_node }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::LineItem;
    use crate::row::Row;
    use crate::side::AccountKind;
    use crate::tree::TreeBuilder;
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn item(is_debit: bool, amount: Decimal) -> LineItem {
        LineItem {
            date: DateTime::<Utc>::UNIX_EPOCH,
            is_debit,
            amount,
            description: "entry".to_string(),
            voucher_ref: "V1".to_string(),
        }
    }

    fn chart() -> ChartMetadata {
        ChartMetadata::default()
            .with_rule("1", AccountKind::Asset)
            .with_rule("2", AccountKind::Liability)
            .with_rule("4", AccountKind::Revenue)
    }

    fn sample() -> AccountTree {
        let rows = vec![
            Row::new("Label", "Code", "Name", ""),
            Row::new("Assets", "1000", "Assets", ""),
            Row::new("  Cash", "1100", "Cash", ""),
            Row::new("  Inventory", "1200", "Inventory", ""),
            Row::new("Liabilities", "2000", "Liabilities", ""),
            Row::new("  Loans", "2100", "Loans", ""),
        ];
        TreeBuilder::new().build(&rows)
    }

    fn id(tree: &AccountTree, code: &str) -> NodeId {
        tree.find_by_code(code).unwrap()
    }

    #[test]
    fn leaf_balance_adds_opening_and_entries() {
        let mut tree = sample();
        let cash = id(&tree, "1100");
        tree.set_opening_balance(cash, dec!(500), dec!(0)).unwrap();
        tree.attach(cash, item(true, dec!(200))).unwrap();

        let chart = chart();
        let agg = BalanceAggregator::new(&tree, &chart);
        assert_eq!(agg.balance(cash), dec!(700));
        assert_eq!(agg.summary(cash), Summary::new(dec!(200), dec!(0)));
    }

    #[test]
    fn interior_balance_sums_children() {
        let mut tree = sample();
        let cash = id(&tree, "1100");
        let inventory = id(&tree, "1200");
        tree.set_opening_balance(cash, dec!(500), dec!(0)).unwrap();
        tree.attach(cash, item(true, dec!(200))).unwrap();
        tree.set_opening_balance(inventory, dec!(300), dec!(0)).unwrap();

        let chart = chart();
        let agg = BalanceAggregator::new(&tree, &chart);
        assert_eq!(agg.balance(id(&tree, "1000")), dec!(1000));
        assert_eq!(agg.opening_balance(id(&tree, "1000")), dec!(800));
    }

    #[test]
    fn credit_normal_accounts_grow_with_credits() {
        let mut tree = sample();
        let loans = id(&tree, "2100");
        tree.set_opening_balance(loans, dec!(0), dec!(1000)).unwrap();
        tree.attach(loans, item(false, dec!(250))).unwrap();
        tree.attach(loans, item(true, dec!(50))).unwrap();

        let chart = chart();
        let agg = BalanceAggregator::new(&tree, &chart);
        assert_eq!(agg.side(loans), NaturalSide::Credit);
        assert_eq!(agg.balance(loans), dec!(1200));
        assert_eq!(agg.balance(id(&tree, "2000")), dec!(1200));
    }

    #[test]
    fn unresolved_nodes_inherit_then_default() {
        let tree = sample();
        let chart = ChartMetadata::new(NaturalSide::Credit).with_rule("1000", AccountKind::Asset);
        let agg = BalanceAggregator::new(&tree, &chart);
        assert_eq!(agg.side(id(&tree, "1100")), NaturalSide::Debit);
        assert_eq!(agg.side(id(&tree, "2100")), NaturalSide::Credit);
    }

    #[test]
    fn interior_entries_count_once() {
        let mut tree = sample();
        let assets = id(&tree, "1000");
        let cash = id(&tree, "1100");
        tree.attach(assets, item(true, dec!(10))).unwrap();
        tree.attach(cash, item(true, dec!(5))).unwrap();

        let chart = chart();
        let agg = BalanceAggregator::new(&tree, &chart);
        assert_eq!(agg.summary(assets), Summary::new(dec!(15), dec!(0)));
        assert_eq!(agg.balance(assets), dec!(15));
    }

    #[test]
    fn aggregate_all_matches_recursive_queries() {
        let mut tree = sample();
        let cash = id(&tree, "1100");
        let loans = id(&tree, "2100");
        tree.set_opening_balance(cash, dec!(100), dec!(0)).unwrap();
        tree.attach(cash, item(true, dec!(40))).unwrap();
        tree.attach(loans, item(false, dec!(40))).unwrap();

        let chart = chart();
        let agg = BalanceAggregator::new(&tree, &chart);
        let totals = agg.aggregate_all();
        for (node, _) in tree.iter() {
            assert_eq!(totals.summary(node), agg.summary(node));
            assert_eq!(totals.balance(node), agg.balance(node));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Summaries are exactly additive over the subtree partition, and
        /// recomputing on an unchanged tree gives the same figures.
        #[test]
        fn rollup_is_additive_and_idempotent(
            depths in prop::collection::vec(0usize..4, 1..25),
            postings in prop::collection::vec((0usize..25, any::<bool>(), 1i64..100_000), 0..60)
        ) {
            let mut rows = vec![Row::new("Label", "Code", "Name", "")];
            for (i, d) in depths.iter().enumerate() {
                rows.push(Row::new(format!("{}n", " ".repeat(*d)), format!("{}{i:03}", 1 + i % 4), "n", ""));
            }
            let mut tree = TreeBuilder::new().build(&rows);
            let ids: Vec<NodeId> = tree.descendants(tree.root()).collect();
            for (slot, is_debit, cents) in postings {
                let target = ids[slot % ids.len()];
                tree.attach(target, item(is_debit, Decimal::new(cents, 2))).unwrap();
            }

            let chart = chart();
            let agg = BalanceAggregator::new(&tree, &chart);
            for (node, _) in tree.iter() {
                let expected = agg.own_summary(node)
                    + tree.children(node).iter().map(|c| agg.summary(*c)).sum::<Summary>();
                prop_assert_eq!(agg.summary(node), expected);
                prop_assert_eq!(agg.balance(node), agg.balance(node));
            }
            prop_assert_eq!(agg.aggregate_all(), agg.aggregate_all());

            // Every posting lands in exactly one summary under the root.
            let root = agg.summary(tree.root());
            let all: Summary = tree
                .iter()
                .map(|(n, _)| agg.own_summary(n))
                .sum();
            prop_assert_eq!(root, all);
        }
    }
}
