use std::collections::{BTreeMap, HashMap, HashSet};

use strsim::normalized_levenshtein;
use trimatch_core::{Source, Transaction};

/// Seam for the reference-clustering strategy. The shipped implementation
/// is root-anchored and one-directional; a transitive union-find variant
/// can be swapped in here without touching the classifier.
pub trait RefClusterer {
    /// Rewrites `match_key`/`fuzzy_key` in place for transactions that
    /// belong to a fuzzy cluster.
    fn augment_keys(&self, txs: &mut [Transaction], threshold: f64);
}

/// Catches near-duplicate references (typos, truncation, extra tokens)
/// that the exact key misses.
///
/// Candidates are restricted to transactions sharing `amount_minor`;
/// partitions are visited in ascending amount order with members in
/// original input order, which keeps cluster ids deterministic. Within a
/// partition the first still-unassigned transaction roots a new cluster
/// and every later unassigned transaction whose similarity against the
/// root meets the threshold is folded in. Similarity is measured against
/// the root only, not pairwise, so clustering is not transitive.
pub struct RootAnchoredClusterer;

impl RefClusterer for RootAnchoredClusterer {
    fn augment_keys(&self, txs: &mut [Transaction], threshold: f64) {
        // Keys already covered by all three sources are settled; their
        // members sit out the fuzzy pass.
        let mut sources_by_key: HashMap<String, HashSet<Source>> = HashMap::new();
        for tx in txs.iter() {
            sources_by_key
                .entry(tx.match_key.clone())
                .or_default()
                .insert(tx.source);
        }
        let settled: HashSet<&String> = sources_by_key
            .iter()
            .filter(|(_, sources)| sources.len() == Source::ALL.len())
            .map(|(key, _)| key)
            .collect();

        let mut partitions: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, tx) in txs.iter().enumerate() {
            if settled.contains(&tx.match_key) {
                continue;
            }
            partitions.entry(tx.amount_minor).or_default().push(idx);
        }
        drop(settled);
        drop(sources_by_key);

        let mut cluster_id = 0usize;
        for (minor, idxs) in &partitions {
            let mut assigned = vec![false; idxs.len()];
            for i in 0..idxs.len() {
                if assigned[i] {
                    continue;
                }
                assigned[i] = true;
                let root_ref = txs[idxs[i]].ref_norm.clone();
                let mut members = vec![idxs[i]];

                for j in (i + 1)..idxs.len() {
                    if assigned[j] {
                        continue;
                    }
                    if normalized_levenshtein(&root_ref, &txs[idxs[j]].ref_norm) >= threshold {
                        assigned[j] = true;
                        members.push(idxs[j]);
                    }
                }

                if members.len() < 2 {
                    continue;
                }
                // A cluster whose members already share one exact key is
                // already grouped; only multi-key clusters get unified.
                let distinct_keys: HashSet<&str> =
                    members.iter().map(|&m| txs[m].match_key.as_str()).collect();
                if distinct_keys.len() < 2 {
                    continue;
                }
                drop(distinct_keys);

                cluster_id += 1;
                let synthetic = format!("fz{cluster_id}_{minor}");
                for &m in &members {
                    txs[m].match_key = synthetic.clone();
                    txs[m].fuzzy_key = true;
                }
            }
        }

        tracing::debug!(clusters = cluster_id, "fuzzy reference clustering complete");
    }
}
