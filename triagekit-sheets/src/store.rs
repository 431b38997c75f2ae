use tracing::Instrument;
use triagekit_core::{TableRef, TableStore, TabularDataset, TriageError};

use crate::client::{tab_origin, tab_range, SheetsHttpClient};
use crate::SheetsStoreBuilder;

/// One spreadsheet tab as a [`TableStore`].
///
/// Writes overwrite the full extent starting at `A1`. There is no revision
/// check between a read and the following write, so a concurrent edit made
/// in between is lost.
#[derive(Clone)]
pub struct SheetsTableStore {
    client: SheetsHttpClient,
}

impl SheetsTableStore {
    pub(crate) fn new(client: SheetsHttpClient) -> Self {
        Self { client }
    }

    pub fn builder() -> SheetsStoreBuilder {
        SheetsStoreBuilder::new()
    }
}

#[async_trait::async_trait]
impl TableStore for SheetsTableStore {
    async fn read(&self, table: &TableRef) -> Result<TabularDataset, TriageError> {
        let span = tracing::info_span!("sheets_read", table = %table);
        async {
            let rows = self
                .client
                .get_values(&table.spreadsheet_id, &tab_range(&table.tab))
                .await
                .map_err(|err| err.for_table(table))?;
            tracing::info!(rows = rows.len(), "fetched table");
            Ok::<_, TriageError>(TabularDataset::new(rows))
        }
        .instrument(span)
        .await
    }

    async fn write(&self, table: &TableRef, dataset: &TabularDataset) -> Result<(), TriageError> {
        let span = tracing::info_span!("sheets_write", table = %table, rows = dataset.rows().len());
        async {
            self.client
                .put_values(&table.spreadsheet_id, &tab_origin(&table.tab), dataset.rows())
                .await
                .map_err(|err| err.for_table(table))?;
            tracing::info!("table written");
            Ok::<_, TriageError>(())
        }
        .instrument(span)
        .await
    }
}
