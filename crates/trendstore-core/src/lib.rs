//! Core engine for a schema-provisioned document store.
//!
//! This crate provides the foundational pieces for `trendstore`:
//!
//! - A closed [`schema::StorageType`] mapping over the textual type tokens
//!   found in schema workbooks, plus default-literal parsing (`schema` module).
//! - A schema builder that turns sheets of column definitions into validated
//!   per-collection [`schema::SchemaDescription`]s, skipping bad columns and
//!   rejecting sheets with no usable columns.
//! - A provisioner that creates (or resets) typed collections inside dataset
//!   namespaces, backed by a local-filesystem document store (`store` and
//!   `storage` modules).
//! - An ingestion path that validates single records against the provisioned
//!   schema and stamps the reserved `InsertedDateTime` field.
//! - A query engine serving time-windowed, column-projected reads with
//!   inclusive/open-ended bounds, and a catalog that samples stored records
//!   to report observed columns.
//!
//! Higher-level integrations (a CLI, or an HTTP dispatch layer) are expected
//! to depend on this crate rather than re-implementing provisioning or query
//! construction.
#![deny(missing_docs)]
pub mod api;
pub mod config;
pub mod record;
pub mod registry;
pub mod schema;
pub mod storage;
pub mod store;

pub use config::EngineConfig;
pub use store::{DocStore, EngineError, EngineResult};
