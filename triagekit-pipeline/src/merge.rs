use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use triagekit_core::{ColumnRoles, ResolvedColumns, TableRef, TableStore, TabularDataset, TriageError};

use crate::classify::ClassificationOutcome;

/// Literal written to the result column of every failing row.
pub const FAIL_RESULT: &str = "Fail";

const LIST_DELIMITER: char = ',';

/// How a reference id is written into the reference-id column.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReferenceFormat {
    pub prefix: String,
    pub separator: String,
}

impl Default for ReferenceFormat {
    fn default() -> Self {
        Self {
            prefix: "b/".to_string(),
            separator: ", ".to_string(),
        }
    }
}

impl ReferenceFormat {
    /// `200` becomes `b/200`; an id that already carries the prefix is kept.
    pub fn wrap(&self, reference_id: &str) -> String {
        let id = reference_id.trim();
        if id.starts_with(&self.prefix) {
            id.to_string()
        } else {
            format!("{}{}", self.prefix, id)
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MergeStatus {
    Updated,
    NoChanges,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MergeResult {
    pub status: MergeStatus,
    /// Rows matched this run, whether or not they already said "Fail".
    pub rows_updated: usize,
    pub newly_annotated: Vec<String>,
    pub already_annotated: Vec<String>,
    /// Predicted keys with no row in the table.
    pub unmatched_keys: Vec<String>,
}

impl MergeResult {
    fn no_changes(unmatched_keys: Vec<String>) -> Self {
        Self {
            status: MergeStatus::NoChanges,
            rows_updated: 0,
            newly_annotated: Vec::new(),
            already_annotated: Vec::new(),
            unmatched_keys,
        }
    }
}

/// Marks every record whose key is in `outcome` as failing and appends
/// `reference` to its reference-id list unless already present.
///
/// `reference` is written as given, so wrap it first. Records that do not
/// match are left exactly as they were.
pub fn apply_merge(
    dataset: &mut TabularDataset,
    columns: &ResolvedColumns,
    outcome: &ClassificationOutcome,
    reference: &str,
    separator: &str,
) -> MergeResult {
    let mut result = MergeResult::no_changes(Vec::new());
    let mut matched_keys = Vec::new();

    for row in dataset.records_mut() {
        let Some(key) = row.get(columns.row_key) else {
            continue;
        };
        if !outcome.contains(key) {
            continue;
        }
        let key = key.clone();

        if row.len() < columns.width() {
            row.resize(columns.width(), String::new());
        }
        row[columns.result] = FAIL_RESULT.to_string();

        let mut references: Vec<String> = row[columns.reference_id]
            .split(LIST_DELIMITER)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        if references.iter().any(|id| id == reference) {
            result.already_annotated.push(key.clone());
        } else {
            references.push(reference.to_string());
            result.newly_annotated.push(key.clone());
        }
        row[columns.reference_id] = references.join(separator);

        result.rows_updated += 1;
        matched_keys.push(key);
    }

    result.unmatched_keys = outcome
        .keys()
        .filter(|key| !matched_keys.iter().any(|matched| matched == key))
        .map(str::to_string)
        .collect();
    if result.rows_updated > 0 {
        result.status = MergeStatus::Updated;
    }
    result
}

/// Applies a classification outcome to the stored table.
pub struct MergeEngine {
    store: Arc<dyn TableStore>,
    roles: ColumnRoles,
    format: ReferenceFormat,
}

impl MergeEngine {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            store,
            roles: ColumnRoles::default(),
            format: ReferenceFormat::default(),
        }
    }

    pub fn with_roles(mut self, roles: ColumnRoles) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_format(mut self, format: ReferenceFormat) -> Self {
        self.format = format;
        self
    }

    /// Re-reads `table`, merges, and writes the whole table back once.
    /// Nothing is written when no row matched.
    pub async fn merge(
        &self,
        table: &TableRef,
        outcome: &ClassificationOutcome,
        reference_id: &str,
    ) -> Result<MergeResult, TriageError> {
        if outcome.is_empty() {
            return Ok(MergeResult::no_changes(Vec::new()));
        }

        let span = tracing::info_span!("merge", table = %table, reference_id = %reference_id);
        async {
            let mut dataset = self.store.read(table).await?;
            let columns = dataset.resolve(&self.roles)?;
            let reference = self.format.wrap(reference_id);
            let result = apply_merge(
                &mut dataset,
                &columns,
                outcome,
                &reference,
                &self.format.separator,
            );

            if !result.unmatched_keys.is_empty() {
                tracing::warn!(
                    keys = ?result.unmatched_keys,
                    "classifier returned keys not present in the table"
                );
            }
            if result.status == MergeStatus::Updated {
                self.store.write(table, &dataset).await?;
            }
            tracing::info!(
                rows_updated = result.rows_updated,
                newly_annotated = result.newly_annotated.len(),
                "merge finished"
            );
            Ok::<_, TriageError>(result)
        }
        .instrument(span)
        .await
    }
}
