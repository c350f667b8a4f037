use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader};
use trimatch_core::RawRecord;

use crate::columns::{resolve_columns, validate_required, ColumnMap};
use crate::IngestError;

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format!("{f}"),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        // Excel serial dates come back as the ISO date the engine's
        // day-first chain also accepts.
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.date().to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

fn field(row: &[Data], col: Option<usize>) -> Option<String> {
    col.and_then(|c| row.get(c))
        .map(cell_text)
        .filter(|s| !s.is_empty())
}

fn to_raw(row: &[Data], map: &ColumnMap) -> RawRecord {
    RawRecord {
        date: field(row, map.date),
        amount: field(row, map.amount),
        reference: field(row, map.reference),
        currency: field(row, map.currency),
    }
}

fn read_range(range: &Range<Data>) -> Result<Vec<RawRecord>, IngestError> {
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or(IngestError::EmptyTable)?
        .iter()
        .map(cell_text)
        .collect();
    let map = resolve_columns(&headers);
    validate_required(&map)?;

    let records: Vec<RawRecord> = rows
        .filter(|row| row.iter().any(|c| !cell_text(c).is_empty()))
        .map(|row| to_raw(row, &map))
        .collect();

    if records.is_empty() {
        return Err(IngestError::EmptyTable);
    }
    Ok(records)
}

/// Reads the first worksheet of an Excel workbook on disk.
pub fn read_xlsx_path(path: &Path) -> Result<Vec<RawRecord>, IngestError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoWorksheet)??;
    read_range(&range)
}

/// Reads the first worksheet of an Excel workbook held in memory, as
/// produced by an HTTP upload.
pub fn read_xlsx_bytes(bytes: &[u8]) -> Result<Vec<RawRecord>, IngestError> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestError::NoWorksheet)??;
    read_range(&range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                sheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn reads_feed_from_workbook_bytes() {
        let bytes = workbook_bytes(&[
            &["date", "amount", "reference"],
            &["05/01/2024", "100.00", "INV1001"],
            &["06/01/2024", "4.99", "STRIPE FEE"],
        ]);
        let records = read_xlsx_bytes(&bytes).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].reference.as_deref(), Some("INV1001"));
        assert_eq!(records[1].amount.as_deref(), Some("4.99"));
    }

    #[test]
    fn missing_date_column_rejects_workbook() {
        let bytes = workbook_bytes(&[&["amount", "reference"], &["1.00", "A"]]);
        let err = read_xlsx_bytes(&bytes).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { field: "date", .. }));
    }

    #[test]
    fn header_only_workbook_is_empty_table() {
        let bytes = workbook_bytes(&[&["date", "amount", "reference"]]);
        let err = read_xlsx_bytes(&bytes).unwrap_err();
        assert!(matches!(err, IngestError::EmptyTable));
    }

    #[test]
    fn round_trips_through_a_temp_file() {
        let bytes = workbook_bytes(&[
            &["date", "amount", "reference"],
            &["05/01/2024", "50.00", "ABC"],
        ]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.xlsx");
        std::fs::write(&path, &bytes).unwrap();
        let records = read_xlsx_path(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].amount.as_deref(), Some("50.00"));
    }
}
