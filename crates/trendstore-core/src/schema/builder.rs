//! Schema building: sheet rows into a validated [`SchemaDescription`].
//!
//! Partial success is deliberate and column-grained: a row with an
//! unresolvable type, a bad default literal, a reserved name, or an empty
//! name is skipped with a warning while the remaining rows keep processing.
//! Only a sheet whose *entire* column set evaporates is rejected — and a
//! rejected sheet never provisions a collection.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use snafu::prelude::*;
use tracing::warn;

use crate::{
    record::{FIELD_INSERTED_AT, is_reserved_field},
    schema::{
        types::{StorageType, parse_default},
        workbook::Sheet,
    },
};

/// One typed column of a collection schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSpec {
    /// Column name, unique within the schema.
    pub name: String,
    /// Resolved storage type.
    pub storage_type: StorageType,
    /// Parsed default value, if the sheet declared one.
    pub default: Option<Value>,
}

/// Validated, ordered schema of one collection.
///
/// Invariants:
/// - At least one user column (a schema with zero valid columns is rejected
///   at build time and never reaches the provisioner).
/// - Exactly one reserved `InsertedDateTime` column, Temporal, always last,
///   never user-defined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescription {
    columns: Vec<ColumnSpec>,
}

/// Why a whole sheet was rejected.
#[derive(Debug, Snafu)]
pub enum SchemaRejection {
    /// Every row of the sheet was skipped; there is nothing to provision.
    #[snafu(display("sheet '{sheet}' has no valid columns"))]
    NoValidColumns {
        /// Name of the rejected sheet.
        sheet: String,
    },
}

/// Why a single column (or sheet) was skipped during schema building.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WarningReason {
    /// The type token did not resolve to any [`StorageType`].
    UnresolvedType {
        /// The unrecognized token.
        token: String,
    },
    /// The default literal could not be parsed for the resolved type.
    InvalidDefault {
        /// The offending literal.
        literal: String,
        /// Human-readable parse failure.
        error: String,
    },
    /// The column name collides with a reserved field.
    ReservedName,
    /// The column name is empty.
    EmptyName,
    /// The sheet is missing the `ColumnName` or `Type` header and was
    /// skipped wholesale.
    MissingHeaders {
        /// Which header(s) were missing.
        missing: String,
    },
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningReason::UnresolvedType { token } => write!(f, "unresolved type token '{token}'"),
            WarningReason::InvalidDefault { literal, error } => {
                write!(f, "invalid default '{literal}': {error}")
            }
            WarningReason::ReservedName => f.write_str("column name is reserved"),
            WarningReason::EmptyName => f.write_str("column name is empty"),
            WarningReason::MissingHeaders { missing } => {
                write!(f, "sheet is missing required header(s): {missing}")
            }
        }
    }
}

/// A non-fatal defect surfaced to the caller (and the log) during schema
/// building or workbook loading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaWarning {
    /// Sheet the warning belongs to.
    pub sheet: String,
    /// Column the warning belongs to, when column-scoped.
    pub column: Option<String>,
    /// What went wrong.
    pub reason: WarningReason,
}

impl SchemaDescription {
    /// Build a schema from one sheet of column-definition rows.
    ///
    /// Duplicate column names resolve last-write-wins (the later row's type
    /// and default replace the earlier one's, in the earlier position),
    /// matching the ingestion semantics of an ordered mapping keyed by name.
    pub fn build(sheet: &Sheet) -> Result<(SchemaDescription, Vec<SchemaWarning>), SchemaRejection> {
        let mut columns: Vec<ColumnSpec> = Vec::new();
        let mut warnings = Vec::new();

        let mut skip = |column: Option<&str>, reason: WarningReason| {
            warn!(sheet = %sheet.name, column = ?column, %reason, "skipping schema column");
            warnings.push(SchemaWarning {
                sheet: sheet.name.clone(),
                column: column.map(str::to_string),
                reason,
            });
        };

        for row in &sheet.rows {
            let name = row.column_name.trim();
            if name.is_empty() {
                skip(None, WarningReason::EmptyName);
                continue;
            }
            if is_reserved_field(name) {
                skip(Some(name), WarningReason::ReservedName);
                continue;
            }

            let Some(storage_type) = StorageType::resolve(&row.type_token) else {
                skip(
                    Some(name),
                    WarningReason::UnresolvedType {
                        token: row.type_token.trim().to_string(),
                    },
                );
                continue;
            };

            let default = match parse_default(storage_type, row.default_value.as_deref()) {
                Ok(default) => default,
                Err(e) => {
                    skip(
                        Some(name),
                        WarningReason::InvalidDefault {
                            literal: row.default_value.clone().unwrap_or_default(),
                            error: e.to_string(),
                        },
                    );
                    continue;
                }
            };

            let spec = ColumnSpec {
                name: name.to_string(),
                storage_type,
                default,
            };
            match columns.iter_mut().find(|c| c.name == spec.name) {
                Some(existing) => *existing = spec,
                None => columns.push(spec),
            }
        }

        if columns.is_empty() {
            return NoValidColumnsSnafu {
                sheet: sheet.name.clone(),
            }
            .fail();
        }

        columns.push(ColumnSpec {
            name: FIELD_INSERTED_AT.to_string(),
            storage_type: StorageType::Temporal,
            default: None,
        });

        Ok((SchemaDescription { columns }, warnings))
    }

    /// All columns in order, reserved `InsertedDateTime` last.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// The user-defined columns, excluding the reserved timestamp.
    pub fn user_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.name != FIELD_INSERTED_AT)
    }

    /// Look up a user-defined column by name.
    pub fn user_column(&self, name: &str) -> Option<&ColumnSpec> {
        self.user_columns().find(|c| c.name == name)
    }
}
