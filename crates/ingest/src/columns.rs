use crate::IngestError;

/// Header aliases, matched by substring against the lower-cased header.
/// Checked in this order; the first canonical field whose alias matches
/// claims the column.
pub const REFERENCE_ALIASES: &[&str] = &[
    "reference",
    "ref",
    "txn_id",
    "transaction id",
    "transaction_id",
    "id",
];
pub const AMOUNT_ALIASES: &[&str] = &["amount", "amt", "value", "total", "paid"];
pub const DATE_ALIASES: &[&str] = &["date", "txn_date", "transaction_date", "posted_date"];
pub const CURRENCY_ALIASES: &[&str] = &["currency", "ccy"];

/// Canonical column positions after alias resolution. Columns that match
/// nothing are dropped here and never reach the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: Option<usize>,
    pub amount: Option<usize>,
    pub reference: Option<usize>,
    pub currency: Option<usize>,
}

fn matches_any(header: &str, aliases: &[&str]) -> bool {
    aliases.iter().any(|a| header.contains(a))
}

pub fn resolve_columns(headers: &[String]) -> ColumnMap {
    let mut map = ColumnMap::default();
    for (idx, raw) in headers.iter().enumerate() {
        let header = raw.trim().to_lowercase();
        if map.reference.is_none() && matches_any(&header, REFERENCE_ALIASES) {
            map.reference = Some(idx);
        } else if map.amount.is_none() && matches_any(&header, AMOUNT_ALIASES) {
            map.amount = Some(idx);
        } else if map.date.is_none() && matches_any(&header, DATE_ALIASES) {
            map.date = Some(idx);
        } else if map.currency.is_none() && matches_any(&header, CURRENCY_ALIASES) {
            map.currency = Some(idx);
        }
    }
    map
}

/// Missing amount or date columns make matching impossible, so they are
/// a feed-level hard error naming the acceptable aliases.
pub fn validate_required(map: &ColumnMap) -> Result<(), IngestError> {
    if map.amount.is_none() {
        return Err(IngestError::MissingColumn {
            field: "amount",
            aliases: "amount, amt, value, total, paid",
        });
    }
    if map.date.is_none() {
        return Err(IngestError::MissingColumn {
            field: "date",
            aliases: "date, txn_date, transaction_date, posted_date",
        });
    }
    Ok(())
}
