//! Collection enumeration with sampled column discovery.
//!
//! The catalog answers "what collections exist, and what columns do they
//! carry" by listing the dataset directory and sampling each collection's
//! first stored record, reporting its field names minus the reserved ones.
//! Sampling reflects stored reality rather than the registry: a freshly
//! provisioned collection holds only its placeholder and therefore reports
//! no columns until real data arrives.

use serde::Serialize;
use snafu::prelude::*;
use tracing::warn;

use crate::{
    record::{Record, is_reserved_field},
    store::{
        DocStore,
        error::{EngineResult, StorageSnafu, validate_name},
    },
    storage,
};

/// One catalog entry: a collection and its sampled columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionInfo {
    /// Collection name.
    pub name: String,
    /// Field names of the first stored record, reserved fields excluded, in
    /// stored order. Empty when the collection holds no sampled columns.
    pub columns: Vec<String>,
}

impl DocStore {
    /// List the collections of `dataset` with their sampled columns.
    ///
    /// A dataset that does not exist yet lists as empty. Collections are
    /// returned in name order.
    pub async fn list_collections(&self, dataset: &str) -> EngineResult<Vec<CollectionInfo>> {
        validate_name(dataset)?;

        let names = storage::list_collection_names(self.store_root(), dataset)
            .await
            .context(StorageSnafu)?;

        let mut infos = Vec::with_capacity(names.len());
        for name in names {
            let columns = self.sample_columns(dataset, &name).await?;
            infos.push(CollectionInfo { name, columns });
        }
        Ok(infos)
    }

    /// Field names of the collection's first record, reserved fields
    /// excluded. Empty for empty, missing, or unreadable samples.
    async fn sample_columns(&self, dataset: &str, collection: &str) -> EngineResult<Vec<String>> {
        let Some(line) = storage::read_first_line(self.store_root(), dataset, collection)
            .await
            .context(StorageSnafu)?
        else {
            return Ok(Vec::new());
        };

        let record: Record = match serde_json::from_str(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!(dataset, collection, error = %e, "unreadable first record; reporting no columns");
                return Ok(Vec::new());
            }
        };

        Ok(record
            .keys()
            .filter(|k| !is_reserved_field(k))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{
        ProvisionMode,
        test_util::{sensor_workbook, zero_offset_store},
    };
    use serde_json::json;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[tokio::test]
    async fn missing_dataset_lists_empty() -> TestResult {
        let tmp = TempDir::new()?;
        let store = zero_offset_store(&tmp);
        assert!(store.list_collections("nothing-here").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn fresh_collection_reports_no_columns() -> TestResult {
        let tmp = TempDir::new()?;
        let store = zero_offset_store(&tmp);
        store
            .provision("db", &sensor_workbook(), ProvisionMode::CreateOrReuse)
            .await?;

        let infos = store.list_collections("db").await?;
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "Sensor");
        assert!(
            infos[0].columns.is_empty(),
            "placeholder-only collections sample to no columns"
        );
        Ok(())
    }

    #[tokio::test]
    async fn sampled_columns_exclude_reserved_fields() -> TestResult {
        let tmp = TempDir::new()?;
        let store = zero_offset_store(&tmp);
        store
            .provision("db", &sensor_workbook(), ProvisionMode::CreateOrReuse)
            .await?;

        // Replace the placeholder so the first stored record is a real one.
        storage::drop_collection_file(store.store_root(), "db", "Sensor").await?;
        storage::create_collection_file(
            store.store_root(),
            "db",
            "Sensor",
            r#"{"_id":"abc","SID":1,"hexString":"ff","InsertedDateTime":"2024-06-01T00:00:00.000Z"}"#,
        )
        .await?;

        let fields: Record = [
            ("SID".to_string(), json!(2)),
            ("hexString".to_string(), json!("0a")),
        ]
        .into_iter()
        .collect();
        store.append("db", "Sensor", fields).await?;

        let infos = store.list_collections("db").await?;
        assert_eq!(infos[0].columns, vec!["SID", "hexString"]);
        Ok(())
    }

    #[tokio::test]
    async fn collections_list_in_name_order() -> TestResult {
        let tmp = TempDir::new()?;
        let store = zero_offset_store(&tmp);

        let mut wb = sensor_workbook();
        let mut second = wb.sheets[0].clone();
        second.name = "Actuator".to_string();
        wb.sheets.push(second);

        store.provision("db", &wb, ProvisionMode::CreateOrReuse).await?;
        let names: Vec<_> = store
            .list_collections("db")
            .await?
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Actuator", "Sensor"]);
        Ok(())
    }
}
