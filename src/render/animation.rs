//! Emoji GIF animations
//!
//! Three fixed-interval layouts over a blank canvas: a centered slideshow,
//! a cumulative circular arrangement, and a diagonal cascade with shrinking
//! rank sizes. Frames are composed fully in memory and the encoded GIF is
//! written in a single pass, so a failed render leaves no partial file.

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, Rgba, RgbaImage};
use std::path::Path;
use tracing::info;

/// Per-rank shrink factor in diagonal mode
const DIAGONAL_SCALE_STEP: f64 = 0.3;
/// Smallest allowed diagonal scale factor
const DIAGONAL_SCALE_FLOOR: f64 = 0.1;

/// One emoji per frame, centered, at most half the canvas per dimension
pub fn render_slideshow(images: &[RgbaImage], config: &RenderConfig, output: &Path) -> Result<()> {
    let (width, height) = (config.frame_width, config.frame_height);
    let mut frames = Vec::with_capacity(images.len());

    for emoji in images {
        let mut canvas = blank_canvas(width, height);
        let scaled = fit_within(emoji, width / 2, height / 2);
        let x = (i64::from(width) - i64::from(scaled.width())) / 2;
        let y = (i64::from(height) - i64::from(scaled.height())) / 2;
        image::imageops::overlay(&mut canvas, &scaled, x, y);
        frames.push(canvas);
    }

    encode_gif(frames, config.frame_delay_ms, output)?;
    info!(
        frames = images.len(),
        "Slideshow written to {}",
        output.display()
    );
    Ok(())
}

/// Emojis accumulating around a circle, one new emoji per frame
///
/// Emoji i sits at angle `2π·i/count − π/2`, so the sequence starts at the
/// top of the circle. Frame i shows emojis 0..=i.
pub fn render_radial(images: &[RgbaImage], config: &RenderConfig, output: &Path) -> Result<()> {
    let (width, height) = (config.frame_width, config.frame_height);
    let radius = f64::from(config.circle_radius);
    let count = images.len();

    let mut canvas = blank_canvas(width, height);
    let mut frames = Vec::with_capacity(count);

    for (i, emoji) in images.iter().enumerate() {
        let angle = 2.0 * std::f64::consts::PI * i as f64 / count as f64
            - std::f64::consts::FRAC_PI_2;
        let scaled = fit_within(emoji, width / 6, height / 6);

        let x = f64::from(width) / 2.0 + radius * angle.cos() - f64::from(scaled.width()) / 2.0;
        let y = f64::from(height) / 2.0 + radius * angle.sin() - f64::from(scaled.height()) / 2.0;

        image::imageops::overlay(&mut canvas, &scaled, x.round() as i64, y.round() as i64);
        frames.push(canvas.clone());
    }

    encode_gif(frames, config.frame_delay_ms, output)?;
    info!(frames = count, "Radial GIF written to {}", output.display());
    Ok(())
}

/// Up to N emojis per frame cascading along the main diagonal
///
/// Rank r shrinks by `1 − 0.3·r` and anchors its bottom-right corner at
/// `((r+1)·w/4, (r+1)·h/4)`.
pub fn render_diagonal(
    groups: &[Vec<RgbaImage>],
    config: &RenderConfig,
    output: &Path,
) -> Result<()> {
    let (width, height) = (config.frame_width, config.frame_height);
    let base_size = f64::from(width / 5);
    let mut frames = Vec::with_capacity(groups.len());

    for group in groups {
        let mut canvas = blank_canvas(width, height);
        for (rank, emoji) in group.iter().enumerate() {
            let factor =
                (1.0 - DIAGONAL_SCALE_STEP * rank as f64).max(DIAGONAL_SCALE_FLOOR);
            let size = ((base_size * factor).round() as u32).max(1);
            let scaled = fit_within(emoji, size, size);

            let corner_x = (rank as i64 + 1) * i64::from(width / 4);
            let corner_y = (rank as i64 + 1) * i64::from(height / 4);
            image::imageops::overlay(
                &mut canvas,
                &scaled,
                corner_x - i64::from(scaled.width()),
                corner_y - i64::from(scaled.height()),
            );
        }
        frames.push(canvas);
    }

    encode_gif(frames, config.frame_delay_ms, output)?;
    info!(
        frames = groups.len(),
        "Diagonal GIF written to {}",
        output.display()
    );
    Ok(())
}

fn blank_canvas(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
}

/// Downscale to fit within a bounding box, preserving aspect ratio
///
/// Never enlarges: an emoji already inside the box is returned as-is.
fn fit_within(emoji: &RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (max_width, max_height) = (max_width.max(1), max_height.max(1));
    if emoji.width() <= max_width && emoji.height() <= max_height {
        return emoji.clone();
    }
    DynamicImage::ImageRgba8(emoji.clone())
        .thumbnail(max_width, max_height)
        .to_rgba8()
}

/// Encode frames into an infinitely looping GIF, buffered then written once
fn encode_gif(frames: Vec<RgbaImage>, delay_ms: u32, output: &Path) -> Result<()> {
    if frames.is_empty() {
        return Err(Error::DataFormat("no frames to animate".to_string()));
    }

    let mut buffer = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buffer);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| Error::Render(format!("GIF repeat: {}", e)))?;
        for frame in frames {
            let frame = Frame::from_parts(frame, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1));
            encoder
                .encode_frame(frame)
                .map_err(|e| Error::Render(format!("GIF frame: {}", e)))?;
        }
    }

    std::fs::write(output, buffer)?;
    Ok(())
}
