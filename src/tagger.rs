//! Inference seam for the external audio-tagging model
//!
//! The pipeline never embeds a model. Library users implement [`Tagger`] over
//! whatever runtime hosts the network; the CLI replays scores the model has
//! already produced out of process ([`PrecomputedTagger`]).

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use tracing::debug;

/// External tagging model interface
///
/// `tag` accepts one mono chunk and returns a score vector whose length
/// matches `vocabulary()`. Chunks are presented strictly in input order.
pub trait Tagger {
    /// Fixed, ordered label vocabulary of the model
    fn vocabulary(&self) -> &[String];

    /// Score one chunk; one score per vocabulary label
    fn tag(&mut self, samples: &[f32], sample_rate: u32) -> Result<Vec<f32>>;
}

/// On-disk score table produced by running the model externally
#[derive(Debug, Deserialize)]
struct ScoreDocument {
    vocabulary: Vec<String>,
    scores: Vec<Vec<f32>>,
}

/// Replays a JSON score table, one row per chunk, in order
///
/// Document shape: `{"vocabulary": ["cat", ...], "scores": [[0.9, ...], ...]}`.
pub struct PrecomputedTagger {
    vocabulary: Vec<String>,
    rows: VecDeque<Vec<f32>>,
}

impl PrecomputedTagger {
    /// Load a score table from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            Error::Resource(format!("cannot open score table {}: {}", path.display(), e))
        })?;
        let doc: ScoreDocument = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| Error::DataFormat(format!("score table {}: {}", path.display(), e)))?;
        Self::from_parts(doc.vocabulary, doc.scores)
    }

    /// Build from in-memory vocabulary and score rows
    pub fn from_parts(vocabulary: Vec<String>, rows: Vec<Vec<f32>>) -> Result<Self> {
        if vocabulary.is_empty() {
            return Err(Error::DataFormat(
                "score table has an empty vocabulary".to_string(),
            ));
        }
        // Row length drift is caught at load so a bad table fails fast.
        for row in &rows {
            if row.len() != vocabulary.len() {
                return Err(Error::ShapeMismatch {
                    expected: vocabulary.len(),
                    actual: row.len(),
                });
            }
        }
        debug!(
            labels = vocabulary.len(),
            rows = rows.len(),
            "Score table loaded"
        );
        Ok(Self {
            vocabulary,
            rows: rows.into(),
        })
    }

    /// Number of unconsumed score rows
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Tagger for PrecomputedTagger {
    fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    fn tag(&mut self, _samples: &[f32], _sample_rate: u32) -> Result<Vec<f32>> {
        self.rows.pop_front().ok_or_else(|| {
            Error::DataFormat("score table has fewer rows than audio chunks".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<String> {
        vec!["cat".to_string(), "dog".to_string(), "bird".to_string()]
    }

    #[test]
    fn test_rows_replayed_in_order() {
        let mut tagger = PrecomputedTagger::from_parts(
            vocab(),
            vec![vec![0.9, 0.05, 0.05], vec![0.1, 0.2, 0.7]],
        )
        .unwrap();

        assert_eq!(tagger.remaining(), 2);
        assert_eq!(tagger.tag(&[], 16000).unwrap(), vec![0.9, 0.05, 0.05]);
        assert_eq!(tagger.tag(&[], 16000).unwrap(), vec![0.1, 0.2, 0.7]);
        assert_eq!(tagger.remaining(), 0);
    }

    #[test]
    fn test_exhausted_rows_is_data_format_error() {
        let mut tagger = PrecomputedTagger::from_parts(vocab(), vec![]).unwrap();
        assert!(matches!(
            tagger.tag(&[], 16000),
            Err(Error::DataFormat(_))
        ));
    }

    #[test]
    fn test_row_length_drift_rejected_at_load() {
        let result = PrecomputedTagger::from_parts(vocab(), vec![vec![0.9, 0.05]]);
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        std::fs::write(
            &path,
            r#"{"vocabulary": ["cat", "dog"], "scores": [[0.3, 0.7]]}"#,
        )
        .unwrap();

        let mut tagger = PrecomputedTagger::from_path(&path).unwrap();
        assert_eq!(tagger.vocabulary(), ["cat", "dog"]);
        assert_eq!(tagger.tag(&[], 8000).unwrap(), vec![0.3, 0.7]);
    }
}
