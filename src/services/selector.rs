//! Denylist-aware label selection
//!
//! Scans a ranked result from rank 0 and keeps the first labels not on the
//! denylist. The scan is bounded: exhausting the whole ranking is an error,
//! never an out-of-range read.

use crate::error::{Error, Result};
use crate::types::{RankedResult, ScoredLabel};
use std::collections::HashSet;

/// Best single non-denylisted label with its score
pub fn select_best(ranked: &RankedResult, denylist: &HashSet<String>) -> Result<ScoredLabel> {
    ranked
        .iter()
        .find(|scored| !denylist.contains(&scored.label))
        .cloned()
        .ok_or_else(|| {
            Error::Exhausted(format!(
                "all {} ranked labels are denylisted",
                ranked.len()
            ))
        })
}

/// First `n` non-denylisted labels, best first, scores discarded
pub fn select_top(
    ranked: &RankedResult,
    denylist: &HashSet<String>,
    n: usize,
) -> Result<Vec<String>> {
    let selected: Vec<String> = ranked
        .iter()
        .filter(|scored| !denylist.contains(&scored.label))
        .take(n)
        .map(|scored| scored.label.clone())
        .collect();

    if selected.len() < n {
        return Err(Error::Exhausted(format!(
            "only {} of {} requested labels survive the denylist",
            selected.len(),
            n
        )));
    }
    Ok(selected)
}

/// Best-one selection applied per chunk, order-preserved
pub fn select_best_batch(
    batch: &[RankedResult],
    denylist: &HashSet<String>,
) -> Result<Vec<ScoredLabel>> {
    batch
        .iter()
        .map(|ranked| select_best(ranked, denylist))
        .collect()
}

/// Best-N selection applied per chunk, order-preserved
pub fn select_top_batch(
    batch: &[RankedResult],
    denylist: &HashSet<String>,
    n: usize,
) -> Result<Vec<Vec<String>>> {
    batch
        .iter()
        .map(|ranked| select_top(ranked, denylist, n))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(pairs: &[(&str, f32)]) -> RankedResult {
        pairs
            .iter()
            .map(|(label, score)| ScoredLabel::new(*label, *score))
            .collect()
    }

    fn deny(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_best_skips_denylisted() {
        let r = ranked(&[("cat", 0.9), ("dog", 0.05), ("bird", 0.05)]);
        let best = select_best(&r, &deny(&["cat"])).unwrap();
        assert_eq!(best, ScoredLabel::new("dog", 0.05));
    }

    #[test]
    fn test_best_with_empty_denylist() {
        let r = ranked(&[("cat", 0.9), ("dog", 0.05)]);
        let best = select_best(&r, &HashSet::new()).unwrap();
        assert_eq!(best.label, "cat");
    }

    #[test]
    fn test_full_denylist_is_exhausted() {
        let r = ranked(&[("cat", 0.9), ("dog", 0.05)]);
        let denylist = deny(&["cat", "dog"]);
        assert!(matches!(
            select_best(&r, &denylist),
            Err(Error::Exhausted(_))
        ));
        assert!(matches!(
            select_top(&r, &denylist, 1),
            Err(Error::Exhausted(_))
        ));
    }

    #[test]
    fn test_top_n_collects_in_rank_order() {
        let r = ranked(&[("cat", 0.9), ("dog", 0.4), ("bird", 0.3), ("owl", 0.1)]);
        let top = select_top(&r, &deny(&["dog"]), 3).unwrap();
        assert_eq!(top, ["cat", "bird", "owl"]);
    }

    #[test]
    fn test_top_n_short_is_exhausted() {
        let r = ranked(&[("cat", 0.9), ("dog", 0.4)]);
        assert!(matches!(
            select_top(&r, &deny(&["dog"]), 2),
            Err(Error::Exhausted(_))
        ));
    }

    #[test]
    fn test_batch_order_preserved() {
        let batch = vec![
            ranked(&[("cat", 0.9), ("dog", 0.1)]),
            ranked(&[("dog", 0.8), ("cat", 0.2)]),
        ];
        let bests = select_best_batch(&batch, &deny(&["cat"])).unwrap();
        assert_eq!(bests[0].label, "dog");
        assert_eq!(bests[1].label, "dog");
        assert_eq!(bests[0].score, 0.1);
    }
}
