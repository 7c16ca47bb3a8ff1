//! Trial balance over the posting accounts of a tree.

use rust_decimal::Decimal;
use serde::Serialize;

use ledgerbook_accounting::{AccountTree, Totals};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalanceLine {
    pub code: String,
    pub name: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialBalance {
    pub lines: Vec<TrialBalanceLine>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub balanced: bool,
}

impl TrialBalance {
    /// One line per account carrying figures of its own (pre-order): every
    /// leaf, plus any grouping account with an opening balance or entries
    /// posted straight to it. Each line shows the account's own debit-positive
    /// net (opening + own entries) in the debit or the credit column.
    pub fn from_totals(tree: &AccountTree, totals: &Totals) -> Self {
        let mut lines = Vec::new();
        let (mut total_debit, mut total_credit) = (Decimal::ZERO, Decimal::ZERO);

        for id in tree.descendants(tree.root()) {
            let node = tree.node(id);
            let has_own = !node.entries().is_empty()
                || !node.initial_debit().is_zero()
                || !node.initial_credit().is_zero();
            if !tree.is_leaf(id) && !has_own {
                continue;
            }

            // Subtree summary minus the children's subtree summaries.
            let entries_net = totals.summary(id).net()
                - tree
                    .children(id)
                    .iter()
                    .map(|c| totals.summary(*c).net())
                    .sum::<Decimal>();
            let net = node.initial_debit() - node.initial_credit() + entries_net;
            let (debit, credit) = if net.is_sign_negative() {
                (Decimal::ZERO, -net)
            } else {
                (net, Decimal::ZERO)
            };
            total_debit += debit;
            total_credit += credit;
            lines.push(TrialBalanceLine {
                code: node.code().to_string(),
                name: node.name().to_string(),
                debit,
                credit,
            });
        }

        Self {
            lines,
            total_debit,
            total_credit,
            balanced: total_debit == total_credit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerbook_accounting::{BalanceAggregator, ChartMetadata, LineItem, Row, TreeBuilder};
    use rust_decimal_macros::dec;

    fn entry(is_debit: bool, amount: Decimal) -> LineItem {
        serde_json::from_value(serde_json::json!({
            "date": 0,
            "debit": is_debit,
            "amount": amount,
            "description": "x",
            "voucher_ref": "V1",
        }))
        .unwrap()
    }

    #[test]
    fn leaves_land_in_their_net_column() {
        let rows = vec![
            Row::new("Label", "Code", "Name", ""),
            Row::new("Assets", "1000", "Assets", ""),
            Row::new("  Cash", "1100", "Cash", ""),
            Row::new("Revenue", "4000", "Revenue", ""),
        ];
        let mut tree = TreeBuilder::new().build(&rows);
        let cash = tree.find_by_code("1100").unwrap();
        let revenue = tree.find_by_code("4000").unwrap();
        tree.attach(cash, entry(true, dec!(250))).unwrap();
        tree.attach(revenue, entry(false, dec!(250))).unwrap();

        let chart = ChartMetadata::default();
        let totals = BalanceAggregator::new(&tree, &chart).aggregate_all();
        let tb = TrialBalance::from_totals(&tree, &totals);

        assert_eq!(tb.lines.len(), 2);
        assert_eq!(tb.lines[0].debit, dec!(250));
        assert_eq!(tb.lines[1].credit, dec!(250));
        assert!(tb.balanced);
    }

    #[test]
    fn grouping_accounts_with_own_figures_get_a_line() {
        let rows = vec![
            Row::new("Label", "Code", "Name", ""),
            Row::new("Assets", "1000", "Assets", ""),
            Row::new("  Cash", "1100", "Cash", ""),
            Row::new("Revenue", "4000", "Revenue", ""),
        ];
        let mut tree = TreeBuilder::new().build(&rows);
        let assets = tree.find_by_code("1000").unwrap();
        let cash = tree.find_by_code("1100").unwrap();
        let revenue = tree.find_by_code("4000").unwrap();
        tree.attach(assets, entry(true, dec!(250))).unwrap();
        tree.attach(revenue, entry(false, dec!(250))).unwrap();
        tree.attach(cash, entry(true, dec!(40))).unwrap();
        tree.attach(revenue, entry(false, dec!(40))).unwrap();

        let chart = ChartMetadata::default();
        let totals = BalanceAggregator::new(&tree, &chart).aggregate_all();
        let tb = TrialBalance::from_totals(&tree, &totals);

        let codes: Vec<_> = tb.lines.iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["1000", "1100", "4000"]);
        assert_eq!(tb.lines[0].debit, dec!(250));
        assert_eq!(tb.lines[1].debit, dec!(40));
        assert_eq!(tb.lines[2].credit, dec!(290));
        assert_eq!(tb.total_debit, dec!(290));
        assert!(tb.balanced);
    }
}
