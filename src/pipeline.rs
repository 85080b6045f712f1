//! End-to-end pipeline orchestration
//!
//! Wires the stages in order: chunk extraction, external tagging, ranking,
//! denylist selection, asset resolution, rendering. Strictly synchronous and
//! batch; any stage error propagates and no output file is written.

use crate::config::{Config, RenderMode};
use crate::error::{Error, Result};
use crate::render::{animation, chart};
use crate::services::assets::EmojiLibrary;
use crate::services::chunk_extractor::ChunkExtractor;
use crate::services::{ranker, selector};
use crate::tagger::Tagger;
use chrono::NaiveDateTime;
use image::RgbaImage;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Run the full pipeline and return the path of the written output
pub fn run_pipeline(
    config: &Config,
    audio: &Path,
    metadata: &Path,
    tagger: &mut dyn Tagger,
    reference: Option<NaiveDateTime>,
) -> Result<PathBuf> {
    // Phase 1: chunk extraction
    let mut extractor = ChunkExtractor::new();
    if let Some(rate) = config.audio.sample_rate {
        extractor = extractor.with_sample_rate(rate);
    }
    let (chunks, intervals) = extractor.extract(audio, metadata, reference)?;
    if chunks.is_empty() {
        return Err(Error::DataFormat(format!(
            "metadata {} yielded no chunks",
            metadata.display()
        )));
    }
    info!(chunks = chunks.len(), "Extraction complete");

    // Phase 2: inference and ranking, strictly in chunk order
    let mut score_rows = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        score_rows.push(tagger.tag(&chunk.samples, chunk.sample_rate)?);
    }
    let ranked = ranker::rank_batch(&score_rows, tagger.vocabulary())?;
    info!(chunks = ranked.len(), "Tagging and ranking complete");

    // Phase 3: selection, asset resolution, rendering
    let denylist: HashSet<String> = config.selection.denylist.iter().cloned().collect();
    let library = EmojiLibrary::load(&config.assets)?;
    let output = config.render.output.clone();
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match config.render.mode {
        RenderMode::Chart => {
            let bests = selector::select_best_batch(&ranked, &denylist)?;
            for best in &bests {
                debug!(label = %best.label, score = best.score, "Selected");
            }
            let images = resolve_all(&library, bests.iter().map(|b| b.label.as_str()))?;
            chart::render_chart(&intervals, &bests, &images, &config.render, &output)?;
        }
        RenderMode::Slideshow => {
            let bests = selector::select_best_batch(&ranked, &denylist)?;
            let images = resolve_all(&library, bests.iter().map(|b| b.label.as_str()))?;
            animation::render_slideshow(&images, &config.render, &output)?;
        }
        RenderMode::Radial => {
            let bests = selector::select_best_batch(&ranked, &denylist)?;
            let images = resolve_all(&library, bests.iter().map(|b| b.label.as_str()))?;
            animation::render_radial(&images, &config.render, &output)?;
        }
        RenderMode::Diagonal => {
            let groups =
                selector::select_top_batch(&ranked, &denylist, config.render.diagonal_labels)?;
            let mut image_groups = Vec::with_capacity(groups.len());
            for group in &groups {
                image_groups.push(resolve_all(&library, group.iter().map(String::as_str))?);
            }
            animation::render_diagonal(&image_groups, &config.render, &output)?;
        }
    }

    info!("Pipeline complete: {}", output.display());
    Ok(output)
}

fn resolve_all<'a>(
    library: &EmojiLibrary,
    labels: impl Iterator<Item = &'a str>,
) -> Result<Vec<RgbaImage>> {
    labels.map(|label| library.resolve(label)).collect()
}
