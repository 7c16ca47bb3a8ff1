use thiserror::Error;

use ledgerbook_accounting::ChartError;
use ledgerbook_core::DomainError;

/// Failures that stop a report. Data-quality problems never end up here; they
/// are listed in the statement's `excluded` section instead.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("failed to load config {path}: {message}")]
    Config { path: String, message: String },

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}
