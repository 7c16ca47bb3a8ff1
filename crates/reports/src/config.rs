//! Report configuration: JSON file, then environment overrides.

use std::path::Path;

use serde::Deserialize;

use ledgerbook_accounting::codes::{DEFAULT_MARKERS, DEFAULT_PREFIX_LEN};
use ledgerbook_accounting::{ChartResult, CodeAssigner, NodeField, RowLayout, TreeBuilder};
use ledgerbook_core::{DomainError, DomainResult};

use crate::error::ReportError;

pub const ENV_HEADER_ROWS: &str = "LEDGERBOOK_HEADER_ROWS";
pub const ENV_MARKERS: &str = "LEDGERBOOK_MARKERS";
pub const ENV_CODE_PREFIX_LEN: &str = "LEDGERBOOK_CODE_PREFIX_LEN";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Leading chart rows that are headers.
    pub header_rows: usize,
    /// Synthetic-code markers by tree level.
    pub markers: Vec<String>,
    /// Characters kept from the first child's code.
    pub code_prefix_len: usize,
    pub layout: RowLayout,
    /// Node attributes written into the statement tree.
    pub fields: Vec<NodeField>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            header_rows: 1,
            markers: DEFAULT_MARKERS.iter().map(|m| m.to_string()).collect(),
            code_prefix_len: DEFAULT_PREFIX_LEN,
            layout: RowLayout::default(),
            fields: NodeField::ALL.to_vec(),
        }
    }
}

impl ReportConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref();
        let config_error = |message: String| ReportError::Config {
            path: path.display().to_string(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| config_error(e.to_string()))
    }

    /// Overrides from the process environment.
    pub fn apply_env(self) -> DomainResult<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overrides from an arbitrary lookup (the environment in production).
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        if let Some(v) = lookup(ENV_HEADER_ROWS) {
            self.header_rows = parse_usize(ENV_HEADER_ROWS, &v)?;
        }
        if let Some(v) = lookup(ENV_MARKERS) {
            self.markers = v
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(v) = lookup(ENV_CODE_PREFIX_LEN) {
            self.code_prefix_len = parse_usize(ENV_CODE_PREFIX_LEN, &v)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.markers.is_empty() {
            return Err(DomainError::validation("markers must not be empty"));
        }
        if self.code_prefix_len == 0 {
            return Err(DomainError::validation("code_prefix_len must be at least 1"));
        }
        self.code_assigner()
            .map(drop)
            .map_err(|e| DomainError::validation(e.to_string()))
    }

    pub fn tree_builder(&self) -> TreeBuilder {
        TreeBuilder::new()
            .header_rows(self.header_rows)
            .layout(self.layout)
    }

    pub fn code_assigner(&self) -> ChartResult<CodeAssigner> {
        CodeAssigner::new(self.markers.clone(), self.code_prefix_len)
    }
}

fn parse_usize(key: &str, value: &str) -> DomainResult<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| DomainError::validation(format!("{key}={value}: {e}")))
}
