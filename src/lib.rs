//! soundmoji — emoji visualizations for audio-summary tagging results
//!
//! Slices an audio file into timestamped chunks from CSV metadata, runs each
//! chunk through an external audio-tagging model (the [`tagger::Tagger`]
//! seam), ranks and filters label scores against a denylist, maps winning
//! labels to emoji bitmaps, and renders a bar chart or GIF animation.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod services;
pub mod tagger;
pub mod types;

pub use crate::config::{Config, RenderMode};
pub use crate::error::{Error, Result};
pub use crate::pipeline::run_pipeline;
pub use crate::tagger::{PrecomputedTagger, Tagger};
pub use crate::types::{AudioChunk, RankedResult, ScoredLabel, TimeInterval};
