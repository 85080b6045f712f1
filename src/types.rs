//! Core data types shared across pipeline stages

/// Time-bounded slice of the source audio, in seconds relative to the
/// reference instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInterval {
    /// Start time in seconds
    pub offset: f64,
    /// Length in seconds (always >= 0)
    pub duration: f64,
}

impl TimeInterval {
    pub fn new(offset: f64, duration: f64) -> Self {
        Self { offset, duration }
    }

    /// End time in seconds
    pub fn end(&self) -> f64 {
        self.offset + self.duration
    }
}

/// Decoded mono audio for one interval
///
/// Produced once by the chunk extractor and consumed exactly once by the
/// tagger; immutable in between.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Mono f32 samples
    pub samples: Vec<f32>,
    /// Sample rate of `samples`
    pub sample_rate: u32,
}

impl AudioChunk {
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// One label paired with its tagger score
///
/// Scores carry no [0,1] contract; ranking orders arbitrary floats.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLabel {
    pub label: String,
    pub score: f32,
}

impl ScoredLabel {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Full-length ranking for one chunk, non-increasing by score
pub type RankedResult = Vec<ScoredLabel>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_end() {
        let iv = TimeInterval::new(2.5, 1.5);
        assert_eq!(iv.end(), 4.0);
    }

    #[test]
    fn test_chunk_duration() {
        let chunk = AudioChunk {
            samples: vec![0.0; 8000],
            sample_rate: 16000,
        };
        assert_eq!(chunk.duration_seconds(), 0.5);
    }
}
