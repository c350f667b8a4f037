use std::io::Read;

use trimatch_core::RawRecord;

use crate::columns::{resolve_columns, validate_required, ColumnMap};
use crate::IngestError;

fn field(record: &csv::StringRecord, col: Option<usize>) -> Option<String> {
    col.and_then(|c| record.get(c))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn to_raw(record: &csv::StringRecord, map: &ColumnMap) -> RawRecord {
    RawRecord {
        date: field(record, map.date),
        amount: field(record, map.amount),
        reference: field(record, map.reference),
        currency: field(record, map.currency),
    }
}

/// Reads one CSV feed into raw records: resolves header aliases, rejects
/// feeds missing the amount or date column, drops unknown columns.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRecord>, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let map = resolve_columns(&headers);
    validate_required(&map)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        records.push(to_raw(&record, &map));
    }

    if records.is_empty() {
        return Err(IngestError::EmptyTable);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_feed_parses() {
        let data = b"date,amount,reference\n05/01/2024,100.00,INV1001\n06/01/2024,4.99,STRIPE FEE\n";
        let records = read_csv(data.as_ref()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date.as_deref(), Some("05/01/2024"));
        assert_eq!(records[0].amount.as_deref(), Some("100.00"));
        assert_eq!(records[1].reference.as_deref(), Some("STRIPE FEE"));
        assert_eq!(records[0].currency, None);
    }

    #[test]
    fn aliased_headers_parse() {
        let data = b"posted_date,value,txn_id,ccy\n05/01/2024,100.00,INV1,USD\n";
        let records = read_csv(data.as_ref()).unwrap();
        assert_eq!(records[0].reference.as_deref(), Some("INV1"));
        assert_eq!(records[0].currency.as_deref(), Some("USD"));
    }

    #[test]
    fn unknown_columns_are_dropped_silently() {
        let data = b"date,amount,reference,internal_notes\n05/01/2024,1.00,A,secret\n";
        let records = read_csv(data.as_ref()).unwrap();
        assert_eq!(records.len(), 1);
        // The record type has nowhere to carry the extra column.
        assert_eq!(records[0].reference.as_deref(), Some("A"));
    }

    #[test]
    fn missing_amount_column_rejects_feed() {
        let data = b"date,reference\n05/01/2024,INV1\n";
        let err = read_csv(data.as_ref()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { field: "amount", .. }));
    }

    #[test]
    fn header_only_feed_is_empty_table() {
        let data = b"date,amount,reference\n";
        let err = read_csv(data.as_ref()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyTable));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let data = b"date,amount,reference\n05/01/2024,1.00,A\n,,\n";
        let records = read_csv(data.as_ref()).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn empty_cells_become_none() {
        let data = b"date,amount,reference\n,1.00,\n";
        let records = read_csv(data.as_ref()).unwrap();
        assert_eq!(records[0].date, None);
        assert_eq!(records[0].reference, None);
        assert_eq!(records[0].amount.as_deref(), Some("1.00"));
    }
}
