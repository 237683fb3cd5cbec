//! Time-windowed, column-projected reads.
//!
//! A query scans one collection in insertion order, keeps the records whose
//! `InsertedDateTime` falls inside the window (both bounds inclusive), and
//! projects each survivor down to the requested columns. `InsertedDateTime`
//! rides along in every row whether or not it was requested; `_id` never
//! leaves the store. Requested columns a record does not carry are simply
//! absent from that row, never nulled in.
//!
//! Stored lines that fail to parse, or records without a well-formed
//! timestamp, are skipped with a warning rather than failing the read: one
//! corrupt line must not take the whole collection offline.

use chrono::{DateTime, Utc};
use snafu::prelude::*;
use tracing::warn;

use crate::{
    record::{FIELD_INSERTED_AT, Record, inserted_at, is_reserved_field, parse_timestamp},
    store::{
        DocStore,
        error::{BadTimestampSnafu, EngineResult, StorageSnafu, UnknownCollectionSnafu,
            validate_name},
    },
    storage,
};

/// One projected query result row.
pub type Row = Record;

/// An inclusive time window over `InsertedDateTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Inclusive upper bound; `None` leaves the window open-ended.
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Parse caller-supplied bounds.
    ///
    /// Accepts every form [`parse_timestamp`] does; an unparsable bound is a
    /// validation failure naming the offending input.
    pub fn parse(start: &str, end: Option<&str>) -> EngineResult<TimeWindow> {
        let start = parse_timestamp(start).context(BadTimestampSnafu { input: start })?;
        let end = match end {
            Some(raw) => Some(parse_timestamp(raw).context(BadTimestampSnafu { input: raw })?),
            None => None,
        };
        Ok(TimeWindow { start, end })
    }

    /// Whether `at` falls inside the window. Both bounds are inclusive.
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && self.end.map_or(true, |end| at <= end)
    }
}

impl DocStore {
    /// Query a collection for the records inside `window`, projected to
    /// `columns` plus `InsertedDateTime`.
    ///
    /// The collection must exist — provisioned by this process or already
    /// present on disk. Rows come back in insertion order.
    pub async fn query(
        &self,
        dataset: &str,
        collection: &str,
        columns: &[String],
        window: TimeWindow,
    ) -> EngineResult<Vec<Row>> {
        validate_name(dataset)?;
        validate_name(collection)?;

        let known = self.registry().contains(dataset, collection)
            || storage::collection_exists(self.store_root(), dataset, collection)
                .await
                .context(StorageSnafu)?;
        ensure!(
            known,
            UnknownCollectionSnafu {
                dataset,
                collection,
            }
        );

        let lines = storage::read_all_lines(self.store_root(), dataset, collection)
            .await
            .context(StorageSnafu)?;

        let mut rows = Vec::new();
        for (index, line) in lines.iter().enumerate() {
            let record: Record = match serde_json::from_str(line) {
                Ok(record) => record,
                Err(e) => {
                    warn!(dataset, collection, line = index, error = %e, "skipping unreadable record");
                    continue;
                }
            };

            let Some(at) = inserted_at(&record) else {
                warn!(dataset, collection, line = index, "skipping record without a usable timestamp");
                continue;
            };

            if window.contains(at) {
                rows.push(project(&record, columns));
            }
        }

        Ok(rows)
    }
}

/// Project a record down to the requested columns plus `InsertedDateTime`.
///
/// Reserved names in the request are ignored; the timestamp always lands
/// last, once.
fn project(record: &Record, columns: &[String]) -> Row {
    let mut row = Row::new();
    for column in columns {
        if is_reserved_field(column) {
            continue;
        }
        if let Some(value) = record.get(column) {
            row.insert(column.clone(), value.clone());
        }
    }
    if let Some(at) = record.get(FIELD_INSERTED_AT) {
        row.insert(FIELD_INSERTED_AT.to_string(), at.clone());
    }
    row
}
