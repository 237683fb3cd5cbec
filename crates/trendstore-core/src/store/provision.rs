//! Collection provisioning: schema-driven lifecycle of collections.
//!
//! Provisioning processes a workbook's sheets independently: a rejected or
//! failed sheet never aborts the rest, and the returned
//! [`ProvisionReport`] enumerates every per-sheet outcome alongside the
//! column-level warnings the schema builder produced.
//!
//! Under [`ProvisionMode::ResetAll`] every existing collection in the
//! dataset is destroyed first. Drops are not atomic across the dataset:
//! a failed drop is recorded as a [`DropFailure`] and the reset continues,
//! so partial resets are possible and are surfaced distinctly rather than
//! masked as success.

use serde::Serialize;
use tracing::{info, warn};

use crate::{
    record::placeholder_record,
    schema::{SchemaDescription, SchemaWarning, Workbook},
    store::{
        DocStore,
        error::{EncodeSnafu, EngineResult, StorageSnafu, validate_name},
    },
    storage,
};
use snafu::prelude::*;

/// How provisioning treats collections that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionMode {
    /// Leave existing collections untouched; create only genuinely new ones.
    CreateOrReuse,
    /// Destroy every existing collection in the dataset, then recreate from
    /// the workbook. Irreversible; must not run concurrently with appends or
    /// queries against the same dataset.
    ResetAll,
}

/// Outcome of one sheet of the workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status")]
pub enum SheetStatus {
    /// A new collection was created (with its placeholder record).
    Created,
    /// The collection already existed and was left untouched.
    Reused,
    /// The sheet was skipped before schema building (missing headers).
    Skipped {
        /// Why the sheet was skipped.
        reason: String,
    },
    /// The sheet's schema was rejected (no valid columns).
    Rejected {
        /// Why the schema was rejected.
        reason: String,
    },
    /// Storage failed while creating the collection.
    Failed {
        /// Human-readable failure description.
        error: String,
    },
}

/// Per-sheet provisioning outcome plus the builder's column warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetOutcome {
    /// Collection (sheet) name.
    pub collection: String,
    /// What happened to this sheet.
    #[serde(flatten)]
    pub status: SheetStatus,
    /// Column-level warnings from schema building.
    pub warnings: Vec<SchemaWarning>,
}

/// A collection drop that failed during `ResetAll`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropFailure {
    /// Collection whose drop failed.
    pub collection: String,
    /// Human-readable failure description.
    pub error: String,
}

/// Aggregate result of provisioning one dataset from a workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionReport {
    /// Dataset that was provisioned.
    pub dataset: String,
    /// Per-sheet outcomes, in workbook order.
    pub outcomes: Vec<SheetOutcome>,
    /// Destructive-operation failures during `ResetAll` (empty otherwise).
    pub drop_failures: Vec<DropFailure>,
}

impl ProvisionReport {
    /// True when nothing storage-level went wrong.
    ///
    /// Rejected and skipped sheets are per-item outcomes, not failures of
    /// the provisioning call; only `Failed` outcomes and drop failures make
    /// the report unsuccessful.
    pub fn success(&self) -> bool {
        self.drop_failures.is_empty()
            && !self
                .outcomes
                .iter()
                .any(|o| matches!(o.status, SheetStatus::Failed { .. }))
    }

    /// Number of collections created by this call.
    pub fn created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == SheetStatus::Created)
            .count()
    }
}

impl DocStore {
    /// Provision all collections of `dataset` from a schema workbook.
    ///
    /// Processes sheets independently and never aborts the batch for a
    /// single sheet's rejection or failure. Registers every built schema in
    /// the schema registry — including for reused collections, so a fresh
    /// process can validate appends against collections provisioned earlier.
    pub async fn provision(
        &self,
        dataset: &str,
        workbook: &Workbook,
        mode: ProvisionMode,
    ) -> EngineResult<ProvisionReport> {
        validate_name(dataset)?;

        storage::ensure_dataset_dir(self.store_root(), dataset)
            .await
            .context(StorageSnafu)?;

        let mut report = ProvisionReport {
            dataset: dataset.to_string(),
            outcomes: Vec::new(),
            drop_failures: Vec::new(),
        };

        if mode == ProvisionMode::ResetAll {
            self.reset_dataset(dataset, &mut report).await?;
        }

        for skipped in &workbook.skipped {
            report.outcomes.push(SheetOutcome {
                collection: skipped.sheet.clone(),
                status: SheetStatus::Skipped {
                    reason: skipped.reason.to_string(),
                },
                warnings: Vec::new(),
            });
        }

        for sheet in &workbook.sheets {
            let outcome = self.provision_sheet(dataset, sheet, mode).await;
            report.outcomes.push(outcome);
        }

        info!(
            dataset,
            created = report.created(),
            sheets = report.outcomes.len(),
            "provisioning finished"
        );
        Ok(report)
    }

    /// Destroy every collection in the dataset, collecting per-collection
    /// drop failures instead of aborting.
    async fn reset_dataset(&self, dataset: &str, report: &mut ProvisionReport) -> EngineResult<()> {
        let existing = storage::list_collection_names(self.store_root(), dataset)
            .await
            .context(StorageSnafu)?;

        for collection in existing {
            match storage::drop_collection_file(self.store_root(), dataset, &collection).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => {
                    warn!(dataset, collection = %collection, error = %e, "collection drop failed");
                    report.drop_failures.push(DropFailure {
                        collection,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.registry().forget_dataset(dataset);
        Ok(())
    }

    async fn provision_sheet(
        &self,
        dataset: &str,
        sheet: &crate::schema::Sheet,
        mode: ProvisionMode,
    ) -> SheetOutcome {
        if validate_name(&sheet.name).is_err() {
            return SheetOutcome {
                collection: sheet.name.clone(),
                status: SheetStatus::Failed {
                    error: format!("invalid collection name '{}'", sheet.name),
                },
                warnings: Vec::new(),
            };
        }

        let (schema, warnings) = match SchemaDescription::build(sheet) {
            Ok(built) => built,
            Err(rejection) => {
                return SheetOutcome {
                    collection: sheet.name.clone(),
                    status: SheetStatus::Rejected {
                        reason: rejection.to_string(),
                    },
                    warnings: Vec::new(),
                };
            }
        };

        let status = self.create_collection(dataset, &sheet.name, &schema, mode).await;
        SheetOutcome {
            collection: sheet.name.clone(),
            status,
            warnings,
        }
    }

    /// Create the physical collection (or reuse it) and register its schema.
    async fn create_collection(
        &self,
        dataset: &str,
        collection: &str,
        schema: &SchemaDescription,
        mode: ProvisionMode,
    ) -> SheetStatus {
        let placeholder = placeholder_record(self.stamp_now());
        let line = match serde_json::to_string(&placeholder).context(EncodeSnafu) {
            Ok(line) => line,
            Err(e) => {
                return SheetStatus::Failed {
                    error: e.to_string(),
                };
            }
        };

        let result =
            storage::create_collection_file(self.store_root(), dataset, collection, &line).await;

        match result {
            Ok(()) => {
                self.registry().register(dataset, collection, schema.clone());
                info!(dataset, collection, "collection created");
                SheetStatus::Created
            }
            Err(e) if e.is_already_exists() && mode == ProvisionMode::CreateOrReuse => {
                self.registry().register(dataset, collection, schema.clone());
                SheetStatus::Reused
            }
            Err(e) => {
                warn!(dataset, collection, error = %e, "collection creation failed");
                SheetStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
