//! The document-store engine facade.
//!
//! [`DocStore`] ties the pieces together: a [`StoreRoot`] for physical
//! layout, the process-owned [`SchemaRegistry`], and the deployment
//! configuration. Each operation lives in its own submodule:
//!
//! - [`provision`] — schema-driven collection lifecycle (create/reset).
//! - [`append`] — single-record ingestion with schema validation.
//! - [`query`] — time-windowed, column-projected reads.
//! - [`catalog`] — collection enumeration with sampled column discovery.
//!
//! Concurrency model: the engine is request-driven and holds no mutable
//! state beyond the registry (locked only across map access). Every store
//! operation awaits `tokio::fs`, so callers can keep many requests in
//! flight. `ResetAll` provisioning is destructive and must not run
//! concurrently with `append`/`query` against the same dataset; serializing
//! it (for example, in a maintenance window) is the operator's
//! responsibility — the engine adds no internal locking for that case.

mod append;
mod catalog;
mod error;
mod provision;
mod query;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{config::EngineConfig, registry::SchemaRegistry, storage::StoreRoot};

pub use catalog::CollectionInfo;
pub use error::{EngineError, EngineResult, ValidationError};
pub use provision::{DropFailure, ProvisionMode, ProvisionReport, SheetOutcome, SheetStatus};
pub use query::{Row, TimeWindow};

/// A handle to one document store rooted at a local directory.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct DocStore {
    root: StoreRoot,
    registry: SchemaRegistry,
    config: EngineConfig,
}

impl DocStore {
    /// Open a store over `root` with the given configuration.
    ///
    /// Nothing is touched on disk until the first operation; datasets come
    /// into existence implicitly on first use.
    pub fn open(root: impl Into<PathBuf>, config: EngineConfig) -> Self {
        DocStore {
            root: StoreRoot::local(root),
            registry: SchemaRegistry::new(),
            config,
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The schema registry (populated by provisioning only).
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub(crate) fn store_root(&self) -> &StoreRoot {
        &self.root
    }

    /// The timestamp a record written right now would carry: wall-clock UTC
    /// plus the configured deployment-wide offset.
    pub fn stamp_now(&self) -> DateTime<Utc> {
        Utc::now() + self.config.inserted_time_offset
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    //! Shared fixtures for the store operation tests.

    use tempfile::TempDir;

    use crate::{
        config::EngineConfig,
        schema::{Sheet, SheetRow, Workbook},
        store::DocStore,
    };

    /// Store with a zero inserted-time offset, rooted in `tmp`.
    pub fn zero_offset_store(tmp: &TempDir) -> DocStore {
        DocStore::open(tmp.path(), EngineConfig::zero_offset())
    }

    pub fn row(name: &str, token: &str, default: Option<&str>) -> SheetRow {
        SheetRow {
            column_name: name.to_string(),
            type_token: token.to_string(),
            default_value: default.map(str::to_string),
        }
    }

    /// A workbook with one `Sensor` sheet: `SID int32`, `hexString string`.
    pub fn sensor_workbook() -> Workbook {
        Workbook {
            sheets: vec![Sheet {
                name: "Sensor".to_string(),
                rows: vec![row("SID", "int32", None), row("hexString", "string", None)],
            }],
            skipped: Vec::new(),
        }
    }
}
