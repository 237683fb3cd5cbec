//! The multi-sheet schema definition source.
//!
//! A workbook is a directory of CSV files; each file is one sheet and the
//! file stem is the collection name. Every data row defines one column:
//!
//! ```csv
//! ColumnName,Type,DefaultValue
//! SID,int32,
//! hexString,string,
//! Flag,bit,1
//! ```
//!
//! `ColumnName` and `Type` headers are required; a sheet missing either is
//! skipped wholesale with a warning (the load itself still succeeds).
//! `DefaultValue` is optional, and empty cells read as "no default".
//! Header matching is case-insensitive.

use std::{io, path::Path};

use snafu::prelude::*;
use tracing::warn;

use crate::schema::builder::{SchemaWarning, WarningReason};

/// One row of a sheet: a single column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// Value of the `ColumnName` cell (may be empty; the builder warns).
    pub column_name: String,
    /// Value of the `Type` cell.
    pub type_token: String,
    /// Value of the `DefaultValue` cell, `None` when absent or empty.
    pub default_value: Option<String>,
}

/// One sheet of the workbook.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Sheet name; doubles as the collection name.
    pub name: String,
    /// Column-definition rows in file order.
    pub rows: Vec<SheetRow>,
}

/// A loaded multi-sheet schema definition source.
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Usable sheets, sorted by name for deterministic provisioning order.
    pub sheets: Vec<Sheet>,
    /// Sheet-level warnings (missing required headers).
    pub skipped: Vec<SchemaWarning>,
}

/// Errors loading a workbook directory.
#[derive(Debug, Snafu)]
pub enum WorkbookError {
    /// The workbook path is not a readable directory.
    #[snafu(display("workbook path is not a readable directory: {path}"))]
    ReadDir {
        /// The offending path.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A sheet file could not be parsed as CSV.
    #[snafu(display("failed to parse sheet {path}: {source}"))]
    ReadSheet {
        /// Path of the unreadable sheet.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },
}

/// Position of the recognized headers within a sheet.
struct HeaderIndices {
    column_name: usize,
    type_token: usize,
    default_value: Option<usize>,
}

fn find_headers(headers: &csv::StringRecord) -> Result<HeaderIndices, String> {
    let position = |wanted: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(wanted))
    };

    let column_name = position("ColumnName");
    let type_token = position("Type");
    let default_value = position("DefaultValue");

    match (column_name, type_token) {
        (Some(column_name), Some(type_token)) => Ok(HeaderIndices {
            column_name,
            type_token,
            default_value,
        }),
        (None, Some(_)) => Err("ColumnName".to_string()),
        (Some(_), None) => Err("Type".to_string()),
        (None, None) => Err("ColumnName, Type".to_string()),
    }
}

/// Load a workbook from a directory of `*.csv` sheets.
///
/// Non-CSV entries are ignored. Sheets are returned sorted by name. A sheet
/// without the required headers lands in [`Workbook::skipped`] instead of
/// failing the load; unreadable CSV is a hard error.
pub fn load_workbook(dir: &Path) -> Result<Workbook, WorkbookError> {
    let entries = std::fs::read_dir(dir).context(ReadDirSnafu {
        path: dir.display().to_string(),
    })?;

    let mut sheets = Vec::new();
    let mut skipped = Vec::new();

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file() && p.extension().and_then(|e| e.to_str()) == Some("csv")
        })
        .collect();
    paths.sort();

    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
            continue;
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&path)
            .context(ReadSheetSnafu {
                path: path.display().to_string(),
            })?;

        let headers = reader.headers().context(ReadSheetSnafu {
            path: path.display().to_string(),
        })?;

        let indices = match find_headers(headers) {
            Ok(indices) => indices,
            Err(missing) => {
                warn!(sheet = %name, %missing, "skipping sheet without required headers");
                skipped.push(SchemaWarning {
                    sheet: name,
                    column: None,
                    reason: WarningReason::MissingHeaders { missing },
                });
                continue;
            }
        };

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.context(ReadSheetSnafu {
                path: path.display().to_string(),
            })?;

            let cell = |idx: usize| record.get(idx).unwrap_or("").to_string();
            let default_value = indices
                .default_value
                .map(cell)
                .filter(|v| !v.is_empty());

            rows.push(SheetRow {
                column_name: cell(indices.column_name),
                type_token: cell(indices.type_token),
                default_value,
            });
        }

        sheets.push(Sheet { name, rows });
    }

    sheets.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Workbook { sheets, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn write_sheet(dir: &Path, name: &str, contents: &str) -> TestResult {
        std::fs::write(dir.join(format!("{name}.csv")), contents)?;
        Ok(())
    }

    #[test]
    fn loads_sheets_sorted_with_rows_in_file_order() -> TestResult {
        let tmp = TempDir::new()?;
        write_sheet(tmp.path(), "Zeta", "ColumnName,Type\nz1,int32\n")?;
        write_sheet(
            tmp.path(),
            "Sensor",
            "ColumnName,Type,DefaultValue\nSID,int32,\nhexString,string,\n",
        )?;

        let wb = load_workbook(tmp.path())?;
        assert_eq!(wb.sheets.len(), 2);
        assert_eq!(wb.sheets[0].name, "Sensor");
        assert_eq!(wb.sheets[1].name, "Zeta");

        let rows = &wb.sheets[0].rows;
        assert_eq!(rows[0].column_name, "SID");
        assert_eq!(rows[0].type_token, "int32");
        assert_eq!(rows[0].default_value, None);
        assert_eq!(rows[1].column_name, "hexString");
        Ok(())
    }

    #[test]
    fn headers_match_case_insensitively_and_defaults_are_optional() -> TestResult {
        let tmp = TempDir::new()?;
        write_sheet(tmp.path(), "Flags", "columnname,TYPE,defaultvalue\nFlag,bit,1\n")?;

        let wb = load_workbook(tmp.path())?;
        assert_eq!(wb.sheets[0].rows[0].default_value.as_deref(), Some("1"));
        Ok(())
    }

    #[test]
    fn sheet_without_type_header_is_skipped_wholesale() -> TestResult {
        let tmp = TempDir::new()?;
        write_sheet(tmp.path(), "Broken", "ColumnName,Kind\nSID,int32\n")?;
        write_sheet(tmp.path(), "Good", "ColumnName,Type\nSID,int32\n")?;

        let wb = load_workbook(tmp.path())?;
        assert_eq!(wb.sheets.len(), 1);
        assert_eq!(wb.sheets[0].name, "Good");
        assert_eq!(wb.skipped.len(), 1);
        assert_eq!(wb.skipped[0].sheet, "Broken");
        assert!(matches!(
            wb.skipped[0].reason,
            WarningReason::MissingHeaders { .. }
        ));
        Ok(())
    }

    #[test]
    fn non_csv_entries_are_ignored() -> TestResult {
        let tmp = TempDir::new()?;
        write_sheet(tmp.path(), "Only", "ColumnName,Type\nx,int32\n")?;
        std::fs::write(tmp.path().join("README.txt"), "not a sheet")?;

        let wb = load_workbook(tmp.path())?;
        assert_eq!(wb.sheets.len(), 1);
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        let err = load_workbook(Path::new("/definitely/not/here"));
        assert!(matches!(err, Err(WorkbookError::ReadDir { .. })));
    }
}
