//! Schema definitions: type mapping, schema building, and the workbook
//! definition source.
//!
//! The flow is one-directional:
//!
//! 1. [`workbook`] loads a multi-sheet definition source (a directory of CSV
//!    sheets; sheet name = collection name) into plain row data.
//! 2. [`builder`] turns each sheet's rows into a validated
//!    [`SchemaDescription`], resolving type tokens through the closed
//!    [`StorageType`] mapping, skipping unusable columns with warnings, and
//!    rejecting sheets that end up with no valid columns.
//!
//! The provisioner consumes the result; nothing in this module touches
//! storage.

pub mod builder;
pub mod types;
pub mod workbook;

pub use builder::{ColumnSpec, SchemaDescription, SchemaRejection, SchemaWarning, WarningReason};
pub use types::{DefaultParseError, StorageType, parse_default, value_conforms};
pub use workbook::{Sheet, SheetRow, Workbook, WorkbookError, load_workbook};
