//! The process-owned schema registry.
//!
//! The original system registered live models ad hoc inside the store
//! driver, which amounted to global mutable state keyed by collection name.
//! Here the mapping is explicit and has an explicit lifecycle: the
//! provisioner populates it when collections are created (or reused), and
//! ingestion/query consult it for validation. It is never re-derived from
//! stored data and never persisted.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use crate::schema::SchemaDescription;

/// Map from `(dataset, collection)` to the provisioned schema.
///
/// Lock discipline: the inner lock is held only across map access and never
/// across an await point.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    inner: RwLock<HashMap<(String, String), SchemaDescription>>,
}

impl SchemaRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the schema of a provisioned collection, replacing any earlier
    /// registration.
    pub fn register(&self, dataset: &str, collection: &str, schema: SchemaDescription) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((dataset.to_string(), collection.to_string()), schema);
    }

    /// Look up the schema of a collection, if this process provisioned it.
    pub fn get(&self, dataset: &str, collection: &str) -> Option<SchemaDescription> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(dataset.to_string(), collection.to_string()))
            .cloned()
    }

    /// Whether a collection is registered.
    pub fn contains(&self, dataset: &str, collection: &str) -> bool {
        self.get(dataset, collection).is_some()
    }

    /// Drop every registration under a dataset (used by `ResetAll`).
    pub fn forget_dataset(&self, dataset: &str) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(d, _), _| d != dataset);
    }
}
