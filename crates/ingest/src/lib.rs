//! `trimatch-ingest`: feed loading and column-alias resolution.
//!
//! Turns CSV/XLSX files into [`RawRecord`] tables for the engine. This is
//! where loosely-typed input becomes typed: headers are resolved against
//! alias lists, unknown columns are dropped, and feeds missing an amount
//! or date column are rejected before matching starts.

pub mod columns;
pub mod csv;
pub mod xlsx;

use std::fs::File;
use std::path::{Path, PathBuf};

use thiserror::Error;
use trimatch_core::{RawRecord, Source};

pub use columns::{resolve_columns, validate_required, ColumnMap};
pub use csv::read_csv;
pub use xlsx::{read_xlsx_bytes, read_xlsx_path};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("Excel error: {0}")]
    Xlsx(#[from] calamine::Error),
    #[error("{field} column not found. Expected one of: {aliases}")]
    MissingColumn {
        field: &'static str,
        aliases: &'static str,
    },
    #[error("file is empty or has no data rows; upload a valid CSV or Excel file")]
    EmptyTable,
    #[error("workbook has no worksheets")]
    NoWorksheet,
    #[error("no file for the {role} feed found; name files with bank/ledger/gateway")]
    MissingFeed { role: Source },
}

fn is_excel(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("xlsx") | Some("xls")
    )
}

/// Loads one feed from disk, dispatching on the file extension.
pub fn load_feed(path: &Path) -> Result<Vec<RawRecord>, IngestError> {
    if is_excel(path) {
        read_xlsx_path(path)
    } else {
        read_csv(File::open(path)?)
    }
}

/// Loads one feed from an uploaded buffer, dispatching on the uploaded
/// filename's extension.
pub fn load_feed_bytes(filename: &str, bytes: &[u8]) -> Result<Vec<RawRecord>, IngestError> {
    if is_excel(Path::new(filename)) {
        read_xlsx_bytes(bytes)
    } else {
        read_csv(bytes)
    }
}

/// Which feed a file belongs to, judged by its name.
pub fn detect_role(filename: &str) -> Option<Source> {
    let name = filename.to_lowercase();
    if name.contains("bank") {
        Some(Source::Bank)
    } else if name.contains("ledger") {
        Some(Source::Ledger)
    } else if name.contains("gateway") {
        Some(Source::Gateway)
    } else {
        None
    }
}

/// The three feeds of one reconciliation run, fully loaded.
#[derive(Debug, Clone)]
pub struct FeedSet {
    pub bank: Vec<RawRecord>,
    pub ledger: Vec<RawRecord>,
    pub gateway: Vec<RawRecord>,
}

/// Scans a folder for the three role files and loads them. Files whose
/// role cannot be detected are skipped with a warning; a missing role is
/// a hard error.
pub fn load_folder(dir: &Path) -> Result<FeedSet, IngestError> {
    let mut bank: Option<(PathBuf, Vec<RawRecord>)> = None;
    let mut ledger: Option<(PathBuf, Vec<RawRecord>)> = None;
    let mut gateway: Option<(PathBuf, Vec<RawRecord>)> = None;

    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            matches!(
                p.extension().and_then(|e| e.to_str()),
                Some("csv") | Some("xlsx") | Some("xls")
            )
        })
        .collect();
    entries.sort();

    for path in entries {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let slot = match detect_role(&name) {
            Some(Source::Bank) => &mut bank,
            Some(Source::Ledger) => &mut ledger,
            Some(Source::Gateway) => &mut gateway,
            None => {
                tracing::warn!(file = %name, "cannot detect feed role from filename, skipping");
                continue;
            }
        };
        if slot.is_some() {
            tracing::warn!(file = %name, "role already assigned, skipping duplicate file");
            continue;
        }
        let records = load_feed(&path)?;
        tracing::info!(file = %name, rows = records.len(), "feed loaded");
        *slot = Some((path, records));
    }

    let take = |slot: Option<(PathBuf, Vec<RawRecord>)>, role: Source| {
        slot.map(|(_, records)| records)
            .ok_or(IngestError::MissingFeed { role })
    };

    Ok(FeedSet {
        bank: take(bank, Source::Bank)?,
        ledger: take(ledger, Source::Ledger)?,
        gateway: take(gateway, Source::Gateway)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_detection_by_filename() {
        assert_eq!(detect_role("Bank_Jan.csv"), Some(Source::Bank));
        assert_eq!(detect_role("general-ledger.xlsx"), Some(Source::Ledger));
        assert_eq!(detect_role("GATEWAY_export.csv"), Some(Source::Gateway));
        assert_eq!(detect_role("statement.csv"), None);
    }

    #[test]
    fn load_folder_requires_all_three_roles() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bank.csv"),
            "date,amount,reference\n05/01/2024,1.00,A\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("ledger.csv"),
            "date,amount,reference\n05/01/2024,1.00,A\n",
        )
        .unwrap();

        let err = load_folder(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingFeed {
                role: Source::Gateway
            }
        ));
    }

    #[test]
    fn load_folder_loads_all_three() {
        let dir = tempfile::tempdir().unwrap();
        for role in ["bank", "ledger", "gateway"] {
            std::fs::write(
                dir.path().join(format!("{role}.csv")),
                "date,amount,reference\n05/01/2024,1.00,A\n",
            )
            .unwrap();
        }
        let feeds = load_folder(dir.path()).unwrap();
        assert_eq!(feeds.bank.len(), 1);
        assert_eq!(feeds.ledger.len(), 1);
        assert_eq!(feeds.gateway.len(), 1);
    }

    #[test]
    fn load_feed_bytes_dispatches_on_extension() {
        let records =
            load_feed_bytes("bank.csv", b"date,amount,reference\n05/01/2024,1.00,A\n").unwrap();
        assert_eq!(records.len(), 1);
    }
}
