//! Chart-of-accounts engine.
//!
//! Turns flat, indentation-encoded account rows into an account tree, fills in
//! codes for grouping rows, posts voucher lines onto it and derives balances,
//! summaries and ledgers from the result.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. A tree is
//! built per request, queried, and dropped.

pub mod balance;
pub mod codes;
pub mod error;
pub mod ledger;
pub mod node;
pub mod projection;
pub mod row;
pub mod side;
pub mod tree;
pub mod voucher;

pub use balance::{BalanceAggregator, NodeTotals, Summary, Totals};
pub use codes::CodeAssigner;
pub use error::{ChartError, ChartResult};
pub use ledger::{Ledger, LedgerProjector, LedgerRow};
pub use node::{AccountNode, AccountTree, LineItem, NodeId};
pub use projection::{JsonProjector, NodeField};
pub use row::{Row, RowLayout, indent_depth};
pub use side::{AccountKind, ChartMetadata, KindRule, NaturalSide};
pub use tree::{BuildOutcome, TreeBuilder};
pub use voucher::{
    DoubleEntryValidator, PostingReport, UnbalancedVoucherWarning, Voucher, VoucherIssue,
    VoucherLine, post_vouchers,
};
