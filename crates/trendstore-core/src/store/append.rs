//! Single-record ingestion with schema validation.
//!
//! Appends are strict: the target collection must have been provisioned
//! (ingestion never creates collections implicitly), every supplied field
//! must belong to the schema and conform to its storage type, and reserved
//! fields are the store's alone. Missing columns fall back to the schema
//! default; a missing column without a default fails the append.
//!
//! A stored record always lays out as `_id` first, then the user columns in
//! schema order, then `InsertedDateTime` last.

use serde_json::Value;
use snafu::prelude::*;
use tracing::debug;

use crate::{
    record::{FIELD_ID, FIELD_INSERTED_AT, Record, format_timestamp, is_reserved_field,
        new_record_id},
    schema::value_conforms,
    store::{
        DocStore,
        error::{
            EncodeSnafu, EngineResult, MissingFieldSnafu, ReservedFieldSnafu, StorageSnafu,
            UnknownCollectionSnafu, UnknownFieldSnafu, WrongTypeSnafu, validate_name,
        },
    },
    storage,
};

impl DocStore {
    /// Append one record to a provisioned collection.
    ///
    /// `fields` maps user-column names to values. Returns the record exactly
    /// as stored, reserved fields included.
    pub async fn append(
        &self,
        dataset: &str,
        collection: &str,
        fields: Record,
    ) -> EngineResult<Record> {
        validate_name(dataset)?;
        validate_name(collection)?;

        let schema = self
            .registry()
            .get(dataset, collection)
            .context(UnknownCollectionSnafu {
                dataset,
                collection,
            })?;

        for (name, value) in &fields {
            if is_reserved_field(name) {
                return Err(ReservedFieldSnafu { field: name }.build().into());
            }
            let column = schema
                .user_column(name)
                .context(UnknownFieldSnafu { field: name })?;
            ensure!(
                value_conforms(column.storage_type, value),
                WrongTypeSnafu {
                    field: name,
                    expected: column.storage_type,
                }
            );
        }

        let mut record = Record::new();
        record.insert(FIELD_ID.to_string(), Value::String(new_record_id()));

        for column in schema.user_columns() {
            let value = match fields.get(&column.name) {
                Some(value) => value.clone(),
                None => match &column.default {
                    Some(default) => default.clone(),
                    None => {
                        return Err(MissingFieldSnafu {
                            field: &column.name,
                        }
                        .build()
                        .into());
                    }
                },
            };
            record.insert(column.name.clone(), value);
        }

        record.insert(
            FIELD_INSERTED_AT.to_string(),
            Value::String(format_timestamp(self.stamp_now())),
        );

        let line = serde_json::to_string(&record).context(EncodeSnafu)?;
        storage::append_line(self.store_root(), dataset, collection, &line)
            .await
            .context(StorageSnafu)?;

        debug!(dataset, collection, "record appended");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineConfig,
        record::inserted_at,
        store::{
            ProvisionMode,
            test_util::{sensor_workbook, zero_offset_store},
        },
    };
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn fields(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    async fn provisioned_store(tmp: &TempDir) -> DocStore {
        let store = zero_offset_store(tmp);
        store
            .provision("db", &sensor_workbook(), ProvisionMode::CreateOrReuse)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn append_stores_reserved_fields_first_and_last() -> TestResult {
        let tmp = TempDir::new()?;
        let store = provisioned_store(&tmp).await;

        let stored = store
            .append(
                "db",
                "Sensor",
                fields(&[("SID", json!(7)), ("hexString", json!("0a1b"))]),
            )
            .await?;

        let keys: Vec<_> = stored.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["_id", "SID", "hexString", "InsertedDateTime"]);
        assert_eq!(stored["SID"], json!(7));

        let lines = storage::read_all_lines(store.store_root(), "db", "Sensor").await?;
        assert_eq!(lines.len(), 2, "placeholder plus appended record");
        let on_disk: Record = serde_json::from_str(lines.last().unwrap())?;
        assert_eq!(on_disk, stored);
        Ok(())
    }

    #[tokio::test]
    async fn append_to_unprovisioned_collection_is_rejected() -> TestResult {
        let tmp = TempDir::new()?;
        let store = provisioned_store(&tmp).await;

        let err = store
            .append("db", "Nope", fields(&[("SID", json!(1))]))
            .await
            .expect_err("expected unknown collection");
        assert!(err.is_validation());
        assert!(err.to_string().contains("unknown collection"));
        Ok(())
    }

    #[tokio::test]
    async fn reserved_unknown_and_mistyped_fields_are_rejected() -> TestResult {
        let tmp = TempDir::new()?;
        let store = provisioned_store(&tmp).await;

        let reserved = store
            .append("db", "Sensor", fields(&[("_id", json!("x"))]))
            .await
            .expect_err("reserved field");
        assert!(reserved.to_string().contains("reserved"));

        let unknown = store
            .append("db", "Sensor", fields(&[("bogus", json!(1))]))
            .await
            .expect_err("unknown field");
        assert!(unknown.to_string().contains("not defined"));

        let mistyped = store
            .append("db", "Sensor", fields(&[("SID", json!("seven"))]))
            .await
            .expect_err("wrong type");
        assert!(mistyped.to_string().contains("does not conform"));
        Ok(())
    }

    #[tokio::test]
    async fn missing_column_without_default_fails_with_default_fills_in() -> TestResult {
        let tmp = TempDir::new()?;
        let store = zero_offset_store(&tmp);

        let mut wb = sensor_workbook();
        wb.sheets[0].rows[1].default_value = Some("(none)".to_string());
        store.provision("db", &wb, ProvisionMode::CreateOrReuse).await?;

        // SID has no default: omitting it fails.
        let err = store
            .append("db", "Sensor", Record::new())
            .await
            .expect_err("missing required field");
        assert!(err.to_string().contains("missing required field 'SID'"));

        // hexString has a default: omitting it fills in.
        let stored = store
            .append("db", "Sensor", fields(&[("SID", json!(1))]))
            .await?;
        assert_eq!(stored["hexString"], json!("(none)"));
        Ok(())
    }

    #[tokio::test]
    async fn inserted_time_honors_the_configured_offset() -> TestResult {
        let tmp = TempDir::new()?;
        let store = DocStore::open(tmp.path(), EngineConfig::default());
        store
            .provision("db", &sensor_workbook(), ProvisionMode::CreateOrReuse)
            .await?;

        let before = Utc::now();
        let stored = store
            .append(
                "db",
                "Sensor",
                fields(&[("SID", json!(1)), ("hexString", json!("ff"))]),
            )
            .await?;
        let stamped = inserted_at(&stored).expect("stamped timestamp");

        let shift = stamped - before;
        assert!(shift >= Duration::hours(5) - Duration::seconds(5));
        assert!(shift <= Duration::hours(5) + Duration::seconds(5));
        Ok(())
    }
}
