use std::collections::HashSet;

use chrono::NaiveDate;
use trimatch_core::{
    currency_symbol, Classification, MatchType, Money, ReconConfig, Resolution, Source, Status,
    Transaction,
};

/// Decide the verdict for one group of transactions sharing a match key.
///
/// `members` indexes into `txs`, which is the full transaction set; the
/// timing refinement for single-source groups scans it for same-amount
/// counterparts. Classification is total: every group reaches exactly one
/// terminal outcome, so there is no error path.
pub fn classify_group(members: &[usize], txs: &[Transaction], cfg: &ReconConfig) -> Classification {
    let sources: HashSet<Source> = members.iter().map(|&m| txs[m].source).collect();
    let group_is_fuzzy = members.iter().any(|&m| txs[m].fuzzy_key);

    match sources.len() {
        3 => {
            let match_type = if group_is_fuzzy {
                MatchType::FuzzyReference
            } else {
                MatchType::ExactReference
            };
            verdict(Status::Matched, Some(match_type), Resolution::Cleared, None, cfg)
        }
        2 => {
            let minors: Vec<i64> = members.iter().map(|&m| txs[m].amount_minor).collect();
            let spread = minors.iter().max().unwrap_or(&0) - minors.iter().min().unwrap_or(&0);
            if spread > 0 {
                verdict(
                    Status::PartiallyMatched,
                    Some(MatchType::ReferenceMatchWithVariance),
                    Resolution::Cleared,
                    Some(Money::from_minor(spread)),
                    cfg,
                )
            } else {
                let status = if cfg.two_source_equal_is_matched {
                    Status::Matched
                } else {
                    Status::PartiallyMatched
                };
                verdict(status, Some(MatchType::ExactReference), Resolution::Cleared, None, cfg)
            }
        }
        _ => classify_single_source(members, txs, cfg),
    }
}

fn classify_single_source(
    members: &[usize],
    txs: &[Transaction],
    cfg: &ReconConfig,
) -> Classification {
    let is_small_gateway_fee = members.iter().any(|&m| {
        let tx = &txs[m];
        tx.amount_minor <= cfg.fee_ceiling_minor
            && cfg.known_gateways.iter().any(|g| tx.ref_norm.contains(g.as_str()))
    });

    if is_small_gateway_fee {
        let amount = txs[members[0]].amount_base;
        return verdict(
            Status::Matched,
            Some(MatchType::GatewayFee),
            Resolution::ClearedWithDifference,
            Some(amount),
            cfg,
        );
    }

    let resolution = if has_timing_counterpart(members, txs, cfg) {
        Resolution::ExceptionTiming
    } else {
        Resolution::ExceptionUnknown
    };
    verdict(Status::Unmatched, None, resolution, None, cfg)
}

/// A same-amount transaction in another source whose date is further away
/// than the tolerance signals a probable timing mismatch rather than a
/// true discrepancy.
fn has_timing_counterpart(members: &[usize], txs: &[Transaction], cfg: &ReconConfig) -> bool {
    let member_set: HashSet<usize> = members.iter().copied().collect();
    members.iter().any(|&m| {
        let tx = &txs[m];
        let Some(own_date) = tx.date else {
            return false;
        };
        txs.iter().enumerate().any(|(idx, other)| {
            if member_set.contains(&idx) || other.source == tx.source {
                return false;
            }
            if other.amount_minor != tx.amount_minor {
                return false;
            }
            match other.date {
                Some(d) => (d - own_date).num_days().abs() > cfg.date_tolerance_days,
                None => false,
            }
        })
    })
}

fn verdict(
    status: Status,
    match_type: Option<MatchType>,
    resolution: Resolution,
    variance: Option<Money>,
    cfg: &ReconConfig,
) -> Classification {
    let reason = reason_text(status, resolution, match_type, variance, &cfg.base_currency);
    Classification {
        status,
        match_type,
        resolution,
        variance,
        reason,
    }
}

/// One fixed template per (status, resolution, match_type, variance)
/// combination; derived deterministically so identical inputs always
/// yield identical text.
fn reason_text(
    status: Status,
    resolution: Resolution,
    match_type: Option<MatchType>,
    variance: Option<Money>,
    base_currency: &str,
) -> String {
    let sym = currency_symbol(base_currency);
    match (status, resolution, match_type) {
        (_, Resolution::ClearedWithDifference, Some(MatchType::GatewayFee)) => {
            let v = variance.unwrap_or_else(Money::zero);
            format!("Likely processing fee - {sym}{v} detected")
        }
        (_, _, Some(MatchType::ReferenceMatchWithVariance)) => {
            let v = variance.unwrap_or_else(Money::zero);
            format!("Two sources agree on reference - variance of {sym}{v} recorded")
        }
        (Status::Matched, _, Some(MatchType::FuzzyReference)) => {
            "Similar reference detected - cleared automatically".to_string()
        }
        (Status::Matched, _, _) => "Exact reference match - cleared automatically".to_string(),
        (Status::PartiallyMatched, _, _) => {
            "Present in two of three sources - awaiting third source".to_string()
        }
        (Status::Unmatched, Resolution::ExceptionTiming, _) => {
            "Amount counterpart found outside date tolerance - probable timing difference"
                .to_string()
        }
        (Status::Unmatched, _, _) => "Unmatched transaction - manual review required".to_string(),
    }
}

/// The group's representative date: first non-null member date in source
/// order Bank, Ledger, Gateway; original input order breaks ties.
pub fn group_date(members: &[usize], txs: &[Transaction]) -> Option<NaiveDate> {
    Source::ALL.iter().find_map(|&source| {
        members
            .iter()
            .filter(|&&m| txs[m].source == source)
            .find_map(|&m| txs[m].date)
    })
}
