use chrono::NaiveDate;
use trimatch_core::Transaction;

/// Sentinel for rows whose date failed to parse; keeps the key total.
const NULL_DATE: &str = "none";

fn date_token(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string())
        .unwrap_or_else(|| NULL_DATE.to_string())
}

/// `{amount_minor}_{ref_norm}_{date}`: identical normalized reference,
/// identical base-currency minor amount, and identical date land in the
/// same group. Grouping on this key is a sort/hash pass instead of an
/// O(n²) comparison; pairwise work is reserved for the fuzzy pass.
pub fn make_key(tx: &Transaction) -> String {
    format!("{}_{}_{}", tx.amount_minor, tx.ref_norm, date_token(tx.date))
}

pub fn build_keys(txs: &mut [Transaction]) {
    for tx in txs.iter_mut() {
        tx.match_key = make_key(tx);
    }
}
