//! The statement pipeline: rows → tree → codes → openings → vouchers →
//! figures, with data-quality problems collected on the side.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use ledgerbook_accounting::{
    AccountTree, BalanceAggregator, ChartError, ChartMetadata, JsonProjector, LedgerProjector,
    LedgerRow, UnbalancedVoucherWarning, Voucher, post_vouchers,
};
use ledgerbook_core::{BookId, DomainError, TenantId};

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::store::BookStore;
use crate::trial_balance::TrialBalance;

/// Opening balance of one account, by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningBalance {
    pub code: String,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
}

/// Everything one statement is computed from, as fetched by the repositories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookInput {
    /// Raw chart records, header first.
    pub records: Vec<Vec<String>>,
    pub chart: ChartMetadata,
    pub openings: Vec<OpeningBalance>,
    pub vouchers: Vec<Voucher>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedOpening {
    pub code: String,
    pub reason: String,
}

/// Items left out of the figures, so callers can show "N incomplete vouchers".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Excluded {
    pub skipped_rows: Vec<SkippedRow>,
    pub pending_vouchers: Vec<UnbalancedVoucherWarning>,
    pub unmatched_openings: Vec<UnmatchedOpening>,
}

impl Excluded {
    pub fn is_empty(&self) -> bool {
        self.skipped_rows.is_empty()
            && self.pending_vouchers.is_empty()
            && self.unmatched_openings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub tree: Value,
    pub trial_balance: TrialBalance,
    pub excluded: Excluded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerReport {
    pub code: String,
    pub opening_balance: Decimal,
    pub rows: Vec<LedgerRow>,
    pub excluded: Excluded,
}

struct Prepared {
    tree: AccountTree,
    excluded: Excluded,
}

/// Runs the engine for one request. Holds configuration only; every call
/// builds and drops its own tree.
#[derive(Debug, Clone, Default)]
pub struct StatementService {
    config: ReportConfig,
}

impl StatementService {
    pub fn new(config: ReportConfig) -> Result<Self, ReportError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Nested account tree with figures, trial balance and exclusions.
    pub fn run(&self, input: &BookInput) -> Result<Statement, ReportError> {
        let Prepared { tree, excluded } = self.prepare(input)?;
        let totals = BalanceAggregator::new(&tree, &input.chart).aggregate_all();

        let statement = Statement {
            tree: JsonProjector::new(&tree, &totals)
                .fields(&self.config.fields)
                .project(tree.root()),
            trial_balance: TrialBalance::from_totals(&tree, &totals),
            excluded,
        };

        tracing::info!(
            accounts = tree.len() - 1,
            skipped_rows = statement.excluded.skipped_rows.len(),
            pending_vouchers = statement.excluded.pending_vouchers.len(),
            balanced = statement.trial_balance.balanced,
            "statement computed"
        );
        Ok(statement)
    }

    /// Ledger of the account with `code` (its whole subtree for a group).
    pub fn ledger(&self, input: &BookInput, code: &str) -> Result<LedgerReport, ReportError> {
        let Prepared { tree, excluded } = self.prepare(input)?;
        let id = tree
            .find_by_code(code)
            .ok_or_else(|| DomainError::not_found(format!("account {code}")))?;

        let ledger = LedgerProjector::new(&tree, &input.chart).project(id);
        let opening_balance = ledger.balance();
        let rows: Vec<LedgerRow> = ledger.collect();

        tracing::info!(code, rows = rows.len(), "ledger computed");
        Ok(LedgerReport {
            code: code.to_string(),
            opening_balance,
            rows,
            excluded,
        })
    }

    /// [`Self::run`] on a book held by `store`.
    pub fn run_book<S: BookStore>(
        &self,
        store: &S,
        tenant_id: TenantId,
        book_id: BookId,
    ) -> Result<Statement, ReportError> {
        let input = store.lookup(tenant_id, book_id)?;
        let _span = tracing::info_span!("statement", %tenant_id, %book_id).entered();
        self.run(&input)
    }

    fn prepare(&self, input: &BookInput) -> Result<Prepared, ReportError> {
        let outcome = self.config.tree_builder().build_records(&input.records);
        let mut tree = outcome.tree;

        // Fatal: the report cannot be produced with unresolvable codes.
        self.config.code_assigner()?.assign(&mut tree)?;

        let unmatched_openings = apply_openings(&mut tree, &input.openings);
        let posting = post_vouchers(&mut tree, &input.vouchers);

        let skipped_rows = outcome
            .skipped
            .into_iter()
            .map(|err| match err {
                ChartError::InvalidRow { row, reason } => SkippedRow { row, reason },
                other => SkippedRow {
                    row: 0,
                    reason: other.to_string(),
                },
            })
            .collect();

        Ok(Prepared {
            tree,
            excluded: Excluded {
                skipped_rows,
                pending_vouchers: posting.pending,
                unmatched_openings,
            },
        })
    }
}

fn apply_openings(tree: &mut AccountTree, openings: &[OpeningBalance]) -> Vec<UnmatchedOpening> {
    let mut unmatched = Vec::new();
    for opening in openings {
        let result = match tree.find_by_code(&opening.code) {
            Some(id) => tree
                .set_opening_balance(id, opening.debit, opening.credit)
                .map_err(|e| e.to_string()),
            None => Err("unknown account".to_string()),
        };
        if let Err(reason) = result {
            tracing::warn!(code = %opening.code, %reason, "opening balance ignored");
            unmatched.push(UnmatchedOpening {
                code: opening.code.clone(),
                reason,
            });
        }
    }
    unmatched
}
