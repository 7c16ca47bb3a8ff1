//! Account kinds, natural balance sides and the chart metadata that maps
//! account codes to them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerbook_core::ValueObject;

use crate::node::{AccountTree, NodeId};

/// High-level account kind (determines normal balance side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

impl AccountKind {
    pub fn natural_side(self) -> NaturalSide {
        match self {
            AccountKind::Asset | AccountKind::Expense => NaturalSide::Debit,
            AccountKind::Liability | AccountKind::Equity | AccountKind::Revenue => {
                NaturalSide::Credit
            }
        }
    }
}

/// Which side of the ledger increases an account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NaturalSide {
    #[default]
    Debit,
    Credit,
}

impl ValueObject for NaturalSide {}

impl NaturalSide {
    /// Net of a debit/credit pair, positive when it grows the account.
    pub fn signed(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            NaturalSide::Debit => debit - credit,
            NaturalSide::Credit => credit - debit,
        }
    }
}

/// One chart-of-accounts mapping: every code starting with `prefix` is of `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindRule {
    pub prefix: String,
    pub kind: AccountKind,
}

/// External chart-of-accounts metadata consumed by the aggregator.
///
/// Resolution order for a node: the longest rule prefix matching its code, then
/// the nearest ancestor that resolves, then `default_side`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartMetadata {
    pub rules: Vec<KindRule>,
    pub default_side: NaturalSide,
}

impl ChartMetadata {
    pub fn new(default_side: NaturalSide) -> Self {
        Self {
            rules: Vec::new(),
            default_side,
        }
    }

    pub fn with_rule(mut self, prefix: impl Into<String>, kind: AccountKind) -> Self {
        self.rules.push(KindRule {
            prefix: prefix.into(),
            kind,
        });
        self
    }

    /// Kind of an account code, by longest matching prefix.
    pub fn kind_of(&self, code: &str) -> Option<AccountKind> {
        if code.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .filter(|r| !r.prefix.is_empty() && code.starts_with(r.prefix.as_str()))
            .max_by_key(|r| r.prefix.len())
            .map(|r| r.kind)
    }

    /// Natural side of a node in `tree`.
    pub fn side_for(&self, tree: &AccountTree, id: NodeId) -> NaturalSide {
        core::iter::once(id)
            .chain(tree.ancestors(id))
            .find_map(|n| self.kind_of(tree.node(n).code()))
            .map(AccountKind::natural_side)
            .unwrap_or(self.default_side)
    }
}
