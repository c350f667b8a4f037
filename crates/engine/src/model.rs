use chrono::NaiveDate;
use serde::Serialize;

use trimatch_core::{Classification, Status, Transaction};

/// One output row: the canonical transaction joined with its group's
/// verdict and the group's representative date.
#[derive(Debug, Clone, Serialize)]
pub struct ReconRow {
    #[serde(flatten)]
    pub transaction: Transaction,
    #[serde(flatten)]
    pub classification: Classification,
    /// First non-null date among the group's members, bank feed first.
    pub group_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconSummary {
    pub total: usize,
    pub matched: usize,
    pub partially_matched: usize,
    pub unmatched: usize,
    pub match_rate_pct: f64,
}

impl ReconSummary {
    pub fn from_rows(rows: &[ReconRow]) -> Self {
        let total = rows.len();
        let count = |status: Status| {
            rows.iter()
                .filter(|r| r.classification.status == status)
                .count()
        };
        let matched = count(Status::Matched);
        let match_rate_pct = if total > 0 {
            (matched as f64 / total as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            total,
            matched,
            partially_matched: count(Status::PartiallyMatched),
            unmatched: count(Status::Unmatched),
            match_rate_pct,
        }
    }
}

/// Partitioned result of one reconciliation run. `all` preserves the
/// original input order (bank rows, then ledger, then gateway); the
/// status views are order-preserving subsets of it.
#[derive(Debug, Clone, Serialize)]
pub struct ReconOutput {
    pub all: Vec<ReconRow>,
    pub matched: Vec<ReconRow>,
    pub partial: Vec<ReconRow>,
    pub unmatched: Vec<ReconRow>,
    pub summary: ReconSummary,
}
