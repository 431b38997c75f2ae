use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::RwLock;
use triagekit_core::{TableRef, TableStore, TabularDataset, TriageError};

/// Tables held in process memory. Counts writes so callers can assert on
/// skipped no-op writes.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: RwLock<HashMap<TableRef, TabularDataset>>,
    writes: AtomicUsize,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: TableRef, dataset: TabularDataset) -> Self {
        let mut tables = HashMap::new();
        tables.insert(table, dataset);
        Self {
            tables: RwLock::new(tables),
            writes: AtomicUsize::new(0),
        }
    }

    /// Replaces a table without counting it as a pipeline write.
    pub async fn insert(&self, table: TableRef, dataset: TabularDataset) {
        self.tables.write().await.insert(table, dataset);
    }

    pub async fn snapshot(&self, table: &TableRef) -> Option<TabularDataset> {
        self.tables.read().await.get(table).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TableStore for MemoryTableStore {
    async fn read(&self, table: &TableRef) -> Result<TabularDataset, TriageError> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .ok_or_else(|| TriageError::Dataset {
                table: table.to_string(),
                reason: "table not found".to_string(),
            })
    }

    async fn write(&self, table: &TableRef, dataset: &TabularDataset) -> Result<(), TriageError> {
        self.tables
            .write()
            .await
            .insert(table.clone(), dataset.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
