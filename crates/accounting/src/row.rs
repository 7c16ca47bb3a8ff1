//! Flat chart rows as supplied by the account repository.

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// One chart-of-accounts row. The leading whitespace of `indent_label`
/// encodes the row's depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub indent_label: String,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub note: String,
}

impl Row {
    pub fn new(
        indent_label: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            indent_label: indent_label.into(),
            code: code.into(),
            name: name.into(),
            note: note.into(),
        }
    }

    /// Number of leading whitespace characters of the label.
    pub fn depth(&self) -> usize {
        indent_depth(&self.indent_label)
    }
}

/// Counts leading whitespace per character, not per byte: a full-width
/// ideographic space (U+3000) counts as one, like an ASCII space or a tab.
pub fn indent_depth(label: &str) -> usize {
    label.chars().take_while(|c| c.is_whitespace()).count()
}

/// Fixed column positions of a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowLayout {
    pub label: usize,
    pub code: usize,
    pub name: usize,
    pub note: usize,
}

impl Default for RowLayout {
    fn default() -> Self {
        Self {
            label: 0,
            code: 1,
            name: 2,
            note: 3,
        }
    }
}

impl RowLayout {
    /// Extracts a [`Row`] from the record at position `index`.
    ///
    /// Label, code and name columns must exist (the code cell may be empty);
    /// a missing note column reads as an empty note. A blank label is rejected.
    pub fn parse<S: AsRef<str>>(&self, index: usize, record: &[S]) -> ChartResult<Row> {
        let cell = |col: usize, what: &str| {
            record
                .get(col)
                .map(|s| s.as_ref().to_string())
                .ok_or_else(|| ChartError::invalid_row(index, format!("missing {what} column {col}")))
        };

        let indent_label = cell(self.label, "label")?;
        if indent_label.trim().is_empty() {
            return Err(ChartError::invalid_row(index, "blank label"));
        }
        let code = cell(self.code, "code")?;
        let name = cell(self.name, "name")?;
        let note = record
            .get(self.note)
            .map(|s| s.as_ref().to_string())
            .unwrap_or_default();

        Ok(Row {
            indent_label,
            code,
            name,
            note,
        })
    }
}
