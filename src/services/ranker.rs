//! Tagging score ranking
//!
//! Pairs a tagger's raw score vector with the label vocabulary and sorts by
//! descending score. The sort is stable, so tied scores keep their original
//! vocabulary order. Output is always full length; callers take the prefix
//! they need.

use crate::error::{Error, Result};
use crate::types::{RankedResult, ScoredLabel};
use tracing::debug;

/// Rank one score vector against the vocabulary
pub fn rank(scores: &[f32], vocabulary: &[String]) -> Result<RankedResult> {
    if scores.len() != vocabulary.len() {
        return Err(Error::ShapeMismatch {
            expected: vocabulary.len(),
            actual: scores.len(),
        });
    }

    let mut ranked: Vec<ScoredLabel> = vocabulary
        .iter()
        .zip(scores.iter())
        .map(|(label, &score)| ScoredLabel::new(label.clone(), score))
        .collect();

    // Stable sort; total_cmp gives a total order even for NaN scores.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    if let Some(top) = ranked.first() {
        debug!(label = %top.label, score = top.score, "Top label");
    }
    Ok(ranked)
}

/// Rank a batch of score vectors, one per chunk, preserving input order
pub fn rank_batch(score_rows: &[Vec<f32>], vocabulary: &[String]) -> Result<Vec<RankedResult>> {
    score_rows
        .iter()
        .map(|scores| rank(scores, vocabulary))
        .collect()
}
