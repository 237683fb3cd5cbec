//! Filesystem layout and document-store I/O.
//!
//! This module centralizes all filesystem- and path-related logic for
//! `trendstore-core`. It maps a store root directory to:
//!
//! - Dataset namespaces (`<root>/<dataset>/`), created implicitly on first
//!   use.
//! - Collection files (`<root>/<dataset>/<collection>.ndjson`), one JSON
//!   document per line in insertion order.
//!
//! Goals:
//!
//! - Keep path conventions in one place so higher layers never concatenate
//!   strings themselves.
//! - Provide the small set of primitives the engine needs: create-new with
//!   already-exists semantics (the provisioner's idempotency guard),
//!   append-one-line (the single atomic write of an ingest), first-line
//!   sampling (catalog), full reads (query), listing and dropping
//!   (catalog / reset).
//!
//! All operations go through `tokio::fs` so callers' scheduler threads are
//! never blocked on disk I/O. The module does not impose any backend beyond
//! the local filesystem, but the `StoreRoot` indirection keeps the door open
//! for other backends without rewriting the engine.

mod error;
mod layout;
mod operations;

pub use error::{BackendError, StorageError, StorageResult};
pub use layout::{StoreRoot, is_valid_name};
pub use operations::{
    append_line, collection_exists, create_collection_file, drop_collection_file,
    ensure_dataset_dir, list_collection_names, read_all_lines, read_first_line,
};
