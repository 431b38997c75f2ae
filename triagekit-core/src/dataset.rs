use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TriageError;

pub const DEFAULT_TAB: &str = "Games Test Plan";

/// A 2-D grid of cells. Row 0 is the header; every other row is a record
/// aligned to the header's column positions. Rows may be ragged.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TabularDataset {
    rows: Vec<Vec<String>>,
}

impl TabularDataset {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn from_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Every row after the header.
    pub fn records(&self) -> &[Vec<String>] {
        let start = self.rows.len().min(1);
        &self.rows[start..]
    }

    pub fn records_mut(&mut self) -> &mut [Vec<String>] {
        let start = self.rows.len().min(1);
        &mut self.rows[start..]
    }

    pub fn record_count(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first header cell named exactly `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header()?.iter().position(|cell| cell == name)
    }

    /// Cell of the `record`-th data row under the column named `column`.
    pub fn cell(&self, record: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.records()
            .get(record)?
            .get(index)
            .map(String::as_str)
    }

    /// Resolves the role columns once so later passes work on fixed indices.
    pub fn resolve(&self, roles: &ColumnRoles) -> Result<ResolvedColumns, TriageError> {
        let lookup = |name: &str| self.column_index(name);
        match (
            lookup(roles.row_key.as_str()),
            lookup(roles.result.as_str()),
            lookup(roles.reference_id.as_str()),
        ) {
            (Some(row_key), Some(result), Some(reference_id)) => Ok(ResolvedColumns {
                row_key,
                result,
                reference_id,
            }),
            (row_key, result, reference_id) => {
                let columns = [
                    (row_key, &roles.row_key),
                    (result, &roles.result),
                    (reference_id, &roles.reference_id),
                ]
                .into_iter()
                .filter(|(index, _)| index.is_none())
                .map(|(_, name)| name.clone())
                .collect();
                Err(TriageError::MissingColumns { columns })
            }
        }
    }

    /// Tab-separated cells, newline-separated rows, cell text untouched.
    pub fn to_delimited(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Header names of the columns the classification cycle depends on.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ColumnRoles {
    pub row_key: String,
    pub result: String,
    pub reference_id: String,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            row_key: "TC No".to_string(),
            result: "Result".to_string(),
            reference_id: "Bug Id".to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub row_key: usize,
    pub result: usize,
    pub reference_id: usize,
}

impl ResolvedColumns {
    pub fn width(&self) -> usize {
        self.row_key.max(self.result).max(self.reference_id) + 1
    }
}

/// Identifies one tab of one spreadsheet.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub spreadsheet_id: String,
    pub tab: String,
}

impl TableRef {
    /// Accepts either a bare spreadsheet id or a full `.../d/<id>/edit` URL.
    pub fn new(spreadsheet: impl AsRef<str>, tab: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id_from(spreadsheet.as_ref()),
            tab: tab.into(),
        }
    }

    pub fn with_default_tab(spreadsheet: impl AsRef<str>) -> Self {
        Self::new(spreadsheet, DEFAULT_TAB)
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.spreadsheet_id, self.tab)
    }
}

fn spreadsheet_id_from(value: &str) -> String {
    let value = value.trim();
    match value.split_once("/d/") {
        Some((_, rest)) => rest
            .split(|c: char| matches!(c, '/' | '?' | '#'))
            .next()
            .unwrap_or(rest)
            .to_string(),
        None => value.to_string(),
    }
}

#[async_trait::async_trait]
pub trait TableStore: Send + Sync + 'static {
    /// Reads the full extent of the table.
    async fn read(&self, table: &TableRef) -> Result<TabularDataset, TriageError>;

    /// Overwrites the table with `dataset` in a single operation.
    async fn write(&self, table: &TableRef, dataset: &TabularDataset) -> Result<(), TriageError>;
}
