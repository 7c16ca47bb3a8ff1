//! Report host for the chart engine: configuration, book storage and the
//! statement pipeline that report generators and the CLI call into.

pub mod config;
pub mod error;
pub mod statement;
pub mod store;
pub mod trial_balance;

pub use config::ReportConfig;
pub use error::ReportError;
pub use statement::{
    BookInput, Excluded, LedgerReport, OpeningBalance, SkippedRow, Statement, StatementService,
    UnmatchedOpening,
};
pub use store::{BookStore, InMemoryBookStore};
pub use trial_balance::{TrialBalance, TrialBalanceLine};
