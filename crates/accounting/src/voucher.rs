//! Vouchers, the double-entry completeness check and posting onto the tree.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ledgerbook_core::Entity;

use crate::node::{AccountTree, LineItem, NodeId};

/// One side of a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoucherLine {
    /// Account code; `None` while the line is still unassigned.
    #[serde(default)]
    pub account: Option<String>,
    pub amount: Decimal,
    /// true = debit, false = credit.
    #[serde(rename = "debit")]
    pub is_debit: bool,
    #[serde(default)]
    pub description: String,
}

/// A journal voucher as fetched from the voucher repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub reference: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,
    pub lines: Vec<VoucherLine>,
}

impl Entity for Voucher {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.reference
    }
}

/// Why a voucher is not complete. Lines are numbered from 0.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum VoucherIssue {
    #[error("voucher has no lines")]
    Empty,

    #[error("line {line} has no account")]
    UnresolvedAccount { line: usize },

    #[error("line {line} references unknown account '{code}'")]
    UnknownAccount { line: usize, code: String },

    #[error("line {line} has a zero amount")]
    ZeroAmount { line: usize },

    #[error("line {line} has no description")]
    MissingDescription { line: usize },

    #[error("debits ({debit}) do not equal credits ({credit})")]
    Unbalanced { debit: Decimal, credit: Decimal },
}

/// A voucher left out of aggregation until it is corrected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbalancedVoucherWarning {
    pub voucher_ref: String,
    pub issue: VoucherIssue,
}

/// Double-entry completeness gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleEntryValidator;

impl DoubleEntryValidator {
    /// True when every line has an account, a non-zero amount and a
    /// description, and debits equal credits exactly. An empty set is not
    /// complete.
    pub fn is_balanced(lines: &[VoucherLine]) -> bool {
        Self::check(lines).is_ok()
    }

    /// Like [`Self::is_balanced`], reporting the first problem found.
    pub fn check(lines: &[VoucherLine]) -> Result<(), VoucherIssue> {
        if lines.is_empty() {
            return Err(VoucherIssue::Empty);
        }

        let mut debit = Decimal::ZERO;
        let mut credit = Decimal::ZERO;

        for (line, l) in lines.iter().enumerate() {
            if l.account.as_deref().is_none_or(|a| a.trim().is_empty()) {
                return Err(VoucherIssue::UnresolvedAccount { line });
            }
            if l.amount.is_zero() {
                return Err(VoucherIssue::ZeroAmount { line });
            }
            if l.description.trim().is_empty() {
                return Err(VoucherIssue::MissingDescription { line });
            }
            if l.is_debit {
                debit += l.amount;
            } else {
                credit += l.amount;
            }
        }

        if debit != credit {
            return Err(VoucherIssue::Unbalanced { debit, credit });
        }
        Ok(())
    }
}

/// Outcome of [`post_vouchers`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingReport {
    /// References of the vouchers whose lines were attached.
    pub posted: Vec<String>,
    /// Vouchers excluded from aggregation.
    pub pending: Vec<UnbalancedVoucherWarning>,
}

impl PostingReport {
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// Attaches the lines of every complete voucher to the accounts they name.
///
/// Incomplete vouchers, and vouchers naming a code that is not in the tree,
/// are skipped as a whole and listed in the report; the others still post.
pub fn post_vouchers(tree: &mut AccountTree, vouchers: &[Voucher]) -> PostingReport {
    // Resolve everything against one code index first; attaching needs the
    // tree mutably, so the index is dropped before the second pass.
    let resolved: Vec<Result<Vec<NodeId>, VoucherIssue>> = {
        let index = tree.code_index();
        vouchers.iter().map(|v| resolve(&index, v)).collect()
    };

    let mut report = PostingReport::default();
    for (voucher, outcome) in vouchers.iter().zip(resolved) {
        match outcome {
            Ok(targets) => {
                for (node, line) in targets.into_iter().zip(&voucher.lines) {
                    let item = LineItem {
                        date: voucher.date,
                        is_debit: line.is_debit,
                        amount: line.amount,
                        description: line.description.clone(),
                        voucher_ref: voucher.reference.clone(),
                    };
                    // Ids come from the code index of this same tree.
                    if let Err(err) = tree.attach(node, item) {
                        tracing::error!(voucher = %voucher.reference, error = %err, "attach failed");
                    }
                }
                report.posted.push(voucher.reference.clone());
            }
            Err(issue) => {
                tracing::warn!(
                    voucher = %voucher.reference,
                    issue = %issue,
                    "voucher excluded from aggregation"
                );
                report.pending.push(UnbalancedVoucherWarning {
                    voucher_ref: voucher.reference.clone(),
                    issue,
                });
            }
        }
    }

    tracing::debug!(
        posted = report.posted.len(),
        pending = report.pending.len(),
        "vouchers posted"
    );
    report
}

fn resolve(index: &HashMap<&str, NodeId>, voucher: &Voucher) -> Result<Vec<NodeId>, VoucherIssue> {
    DoubleEntryValidator::check(&voucher.lines)?;
    voucher
        .lines
        .iter()
        .enumerate()
        .map(|(line, l)| {
            let code = l.account.as_deref().unwrap_or_default().trim();
            index
                .get(code)
                .copied()
                .ok_or_else(|| VoucherIssue::UnknownAccount {
                    line,
                    code: code.to_string(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::CodeAssigner;
    use crate::row::Row;
    use crate::tree::TreeBuilder;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn line(account: &str, amount: Decimal, is_debit: bool) -> VoucherLine {
        VoucherLine {
            account: Some(account.to_string()),
            amount,
            is_debit,
            description: "sale".to_string(),
        }
    }

    fn voucher(reference: &str, lines: Vec<VoucherLine>) -> Voucher {
        Voucher {
            reference: reference.to_string(),
            date: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            lines,
        }
    }

    fn tree() -> AccountTree {
        let rows = vec![
            Row::new("Label", "Code", "Name", ""),
            Row::new("Assets", "1000", "Assets", ""),
            Row::new("  Cash", "1100", "Cash", ""),
            Row::new("Revenue", "4000", "Revenue", ""),
        ];
        let mut tree = TreeBuilder::new().build(&rows);
        CodeAssigner::default().assign(&mut tree).unwrap();
        tree
    }

    #[test]
    fn balanced_lines_pass() {
        let lines = vec![line("1100", dec!(100), true), line("4000", dec!(100), false)];
        assert!(DoubleEntryValidator::is_balanced(&lines));
    }

    #[test]
    fn unbalanced_lines_fail() {
        let lines = vec![line("1100", dec!(100), true), line("4000", dec!(90), false)];
        assert!(!DoubleEntryValidator::is_balanced(&lines));
        assert_eq!(
            DoubleEntryValidator::check(&lines),
            Err(VoucherIssue::Unbalanced {
                debit: dec!(100),
                credit: dec!(90)
            })
        );
    }

    #[test]
    fn decimal_equality_is_exact() {
        let lines = vec![
            line("1100", dec!(0.1), true),
            line("1100", dec!(0.2), true),
            line("4000", dec!(0.3), false),
        ];
        assert!(DoubleEntryValidator::is_balanced(&lines));
    }

    #[test]
    fn incomplete_lines_are_reported() {
        assert_eq!(DoubleEntryValidator::check(&[]), Err(VoucherIssue::Empty));

        let mut lines = vec![line("1100", dec!(5), true), line("4000", dec!(5), false)];
        lines[1].account = None;
        assert_eq!(
            DoubleEntryValidator::check(&lines),
            Err(VoucherIssue::UnresolvedAccount { line: 1 })
        );

        let mut lines = vec![line("1100", dec!(0), true), line("4000", dec!(0), false)];
        assert_eq!(
            DoubleEntryValidator::check(&lines),
            Err(VoucherIssue::ZeroAmount { line: 0 })
        );

        lines = vec![line("1100", dec!(5), true), line("4000", dec!(5), false)];
        lines[0].description = "  ".to_string();
        assert_eq!(
            DoubleEntryValidator::check(&lines),
            Err(VoucherIssue::MissingDescription { line: 0 })
        );
    }

    #[test]
    fn posting_attaches_complete_vouchers_and_reports_the_rest() {
        let mut tree = tree();
        let vouchers = vec![
            voucher("V1", vec![line("1100", dec!(100), true), line("4000", dec!(100), false)]),
            voucher("V2", vec![line("1100", dec!(100), true), line("4000", dec!(90), false)]),
            voucher("V3", vec![line("1100", dec!(10), true), line("9999", dec!(10), false)]),
        ];

        let report = post_vouchers(&mut tree, &vouchers);
        assert_eq!(report.posted, vec!["V1".to_string()]);
        assert_eq!(report.pending_count(), 2);
        assert_eq!(report.pending[0].voucher_ref, "V2");
        assert_eq!(
            report.pending[1].issue,
            VoucherIssue::UnknownAccount {
                line: 1,
                code: "9999".to_string()
            }
        );

        let cash = tree.find_by_code("1100").unwrap();
        assert_eq!(tree.node(cash).entries().len(), 1);
        assert_eq!(tree.node(cash).entries()[0].voucher_ref, "V1");
        assert_eq!(tree.node(cash).entries()[0].date.timestamp(), 1_700_000_000);
    }

    #[test]
    fn lines_can_target_synthetic_grouping_codes() {
        let rows = vec![
            Row::new("Label", "Code", "Name", ""),
            Row::new("Assets", "", "Assets", ""),
            Row::new("  Cash", "1100", "Cash", ""),
            Row::new("Revenue", "4000", "Revenue", ""),
        ];
        let mut tree = TreeBuilder::new().build(&rows);
        CodeAssigner::default().assign(&mut tree).unwrap();

        let vouchers = vec![voucher(
            "V1",
            vec![line("1100Z", dec!(250), true), line("4000", dec!(250), false)],
        )];
        let report = post_vouchers(&mut tree, &vouchers);
        assert_eq!(report.posted, vec!["V1".to_string()]);

        let assets = tree.find_by_code("1100Z").unwrap();
        assert!(!tree.is_leaf(assets));
        assert_eq!(tree.node(assets).entries().len(), 1);
        let cash = tree.find_by_code("1100").unwrap();
        assert!(tree.node(cash).entries().is_empty());
    }

    #[test]
    fn warnings_serialize_with_a_reason_tag() {
        let warning = UnbalancedVoucherWarning {
            voucher_ref: "V9".to_string(),
            issue: VoucherIssue::ZeroAmount { line: 2 },
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["issue"]["reason"], "zero_amount");
        assert_eq!(json["issue"]["line"], 2);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Split a total into debit lines and a single credit: balanced.
        /// Nudge one amount by a cent: unbalanced.
        #[test]
        fn gate_flips_when_one_amount_moves(
            cents in prop::collection::vec(1i64..1_000_000i64, 1..10),
            which in 0usize..10
        ) {
            let mut lines: Vec<VoucherLine> = cents
                .iter()
                .map(|c| line("1100", Decimal::new(*c, 2), true))
                .collect();
            let total: Decimal = lines.iter().map(|l| l.amount).sum();
            lines.push(line("4000", total, false));
            prop_assert!(DoubleEntryValidator::is_balanced(&lines));

            let idx = which % lines.len();
            lines[idx].amount += dec!(0.01);
            prop_assert!(!DoubleEntryValidator::is_balanced(&lines));
        }
    }
}
