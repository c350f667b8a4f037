use std::collections::HashMap;

use trimatch_core::{RawRecord, ReconConfig, Source, Status, Transaction};

use crate::classify::{classify_group, group_date};
use crate::fuzzy::{RefClusterer, RootAnchoredClusterer};
use crate::key::build_keys;
use crate::model::{ReconOutput, ReconRow, ReconSummary};
use crate::normalize::normalize_feed;

/// The engine's single entry point: a pure function of the three input
/// tables. No I/O, no shared state; calling it twice with identical
/// inputs yields identical outputs.
pub fn reconcile(
    bank: &[RawRecord],
    ledger: &[RawRecord],
    gateway: &[RawRecord],
    cfg: &ReconConfig,
) -> ReconOutput {
    reconcile_with(bank, ledger, gateway, cfg, &RootAnchoredClusterer)
}

/// Same as [`reconcile`] but with an explicit clustering strategy, for
/// callers substituting a stricter transitive-closure implementation.
pub fn reconcile_with(
    bank: &[RawRecord],
    ledger: &[RawRecord],
    gateway: &[RawRecord],
    cfg: &ReconConfig,
    clusterer: &dyn RefClusterer,
) -> ReconOutput {
    let mut txs: Vec<Transaction> = Vec::with_capacity(bank.len() + ledger.len() + gateway.len());
    txs.extend(normalize_feed(bank, Source::Bank, cfg));
    txs.extend(normalize_feed(ledger, Source::Ledger, cfg));
    txs.extend(normalize_feed(gateway, Source::Gateway, cfg));

    build_keys(&mut txs);
    clusterer.augment_keys(&mut txs, cfg.fuzzy_threshold);

    // Group membership in first-seen key order; iteration over the
    // ordered Vec keeps classification deterministic.
    let mut key_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, tx) in txs.iter().enumerate() {
        groups
            .entry(tx.match_key.clone())
            .or_insert_with(|| {
                key_order.push(tx.match_key.clone());
                Vec::new()
            })
            .push(idx);
    }

    let mut verdicts = HashMap::with_capacity(key_order.len());
    for key in &key_order {
        let members = &groups[key];
        let classification = classify_group(members, &txs, cfg);
        let date = group_date(members, &txs);
        verdicts.insert(key.clone(), (classification, date));
    }

    // Join the verdict back onto every row, preserving input order.
    let all: Vec<ReconRow> = txs
        .into_iter()
        .map(|tx| {
            let (classification, date) = verdicts[&tx.match_key].clone();
            ReconRow {
                transaction: tx,
                classification,
                group_date: date,
            }
        })
        .collect();

    let by_status = |status: Status| -> Vec<ReconRow> {
        all.iter()
            .filter(|r| r.classification.status == status)
            .cloned()
            .collect()
    };

    let summary = ReconSummary::from_rows(&all);
    tracing::debug!(
        total = summary.total,
        matched = summary.matched,
        partially_matched = summary.partially_matched,
        unmatched = summary.unmatched,
        "reconciliation complete"
    );

    ReconOutput {
        matched: by_status(Status::Matched),
        partial: by_status(Status::PartiallyMatched),
        unmatched: by_status(Status::Unmatched),
        summary,
        all,
    }
}
