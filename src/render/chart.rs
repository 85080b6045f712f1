//! Annotated bar chart rendering
//!
//! One bar per chunk: x spans the chunk's time interval, y its winning
//! score, filled from the viridis colormap at `i / chunk_count`. The
//! resolved emoji is overlaid centered in the bar, sized as a fixed fraction
//! of each axis range so it stays constant in data units regardless of
//! canvas size.
//!
//! Bars are drawn through plotters into an RGB buffer; emojis are then
//! alpha-composited in pixel space with `image`, and the finished canvas is
//! written as one PNG.

use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::types::{ScoredLabel, TimeInterval};
use image::imageops::FilterType;
use image::RgbaImage;
use plotters::prelude::*;
use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};
use std::io::Cursor;
use std::ops::Range;
use std::path::Path;
use tracing::info;

/// Padding added around the data on the x axis, in seconds
const X_PADDING: f64 = 1.0;
/// Headroom added above the best score on the y axis
const Y_HEADROOM: f64 = 0.1;
/// The emoji's bottom edge sits this many emoji-heights below the bar top
const EMOJI_INSET_FACTOR: f64 = 1.1;

/// Pixel placement for one emoji overlay
struct Placement {
    x: i64,
    y: i64,
    width: u32,
    height: u32,
}

/// Render the bar chart to a PNG file
///
/// `intervals`, `bests`, and `images` are index-aligned, one entry per chunk.
pub fn render_chart(
    intervals: &[TimeInterval],
    bests: &[ScoredLabel],
    images: &[RgbaImage],
    config: &RenderConfig,
    output: &Path,
) -> Result<()> {
    if intervals.is_empty() {
        return Err(Error::DataFormat("no chunks to chart".to_string()));
    }
    if intervals.len() != bests.len() || intervals.len() != images.len() {
        return Err(Error::DataFormat(format!(
            "misaligned chart inputs: {} intervals, {} labels, {} images",
            intervals.len(),
            bests.len(),
            images.len()
        )));
    }

    let x_range = x_bounds(intervals);
    let y_range = y_bounds(bests);

    let (width, height) = (config.chart_width, config.chart_height);
    let mut buffer = vec![0u8; (width * height * 3) as usize];
    let mut placements: Vec<Placement> = Vec::with_capacity(intervals.len());

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(30)
            .y_label_area_size(40)
            .build_cartesian_2d(x_range.clone(), y_range.clone())
            .map_err(render_err)?;

        // Axis lines only; tick labels would need a font stack.
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![
                    (x_range.start, y_range.end),
                    (x_range.start, 0.0),
                    (x_range.end, 0.0),
                ],
                BLACK.stroke_width(1),
            )))
            .map_err(render_err)?;

        // Reverse order so earlier chunks paint on top of overlapping later ones.
        for i in (0..intervals.len()).rev() {
            let interval = &intervals[i];
            let score = bests[i].score as f64;
            let color = ViridisRGB.get_color(i as f64 / intervals.len() as f64);

            let corners = [(interval.offset, 0.0), (interval.end(), score)];
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    corners,
                    color.mix(0.5).filled(),
                )))
                .map_err(render_err)?;
            chart
                .draw_series(std::iter::once(Rectangle::new(
                    corners,
                    BLACK.stroke_width(1),
                )))
                .map_err(render_err)?;
        }

        let (px_range, py_range) = chart.plotting_area().get_pixel_range();
        for i in 0..intervals.len() {
            placements.push(emoji_placement(
                &intervals[i],
                bests[i].score as f64,
                config.emoji_fraction,
                &x_range,
                &y_range,
                &px_range,
                &py_range,
            ));
        }

        root.present().map_err(render_err)?;
    }

    let rgb = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| Error::Render("chart buffer size mismatch".to_string()))?;
    let mut canvas = image::DynamicImage::ImageRgb8(rgb).to_rgba8();

    for (placement, emoji) in placements.iter().zip(images.iter()) {
        if placement.width == 0 || placement.height == 0 {
            continue;
        }
        let resized = image::imageops::resize(
            emoji,
            placement.width,
            placement.height,
            FilterType::Triangle,
        );
        image::imageops::overlay(&mut canvas, &resized, placement.x, placement.y);
    }

    let mut cursor = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(canvas)
        .write_to(&mut cursor, image::ImageFormat::Png)?;
    std::fs::write(output, cursor.into_inner())?;

    info!(
        bars = intervals.len(),
        "Chart written to {}",
        output.display()
    );
    Ok(())
}

/// X axis bounds: one second of padding on each side of the data
fn x_bounds(intervals: &[TimeInterval]) -> Range<f64> {
    let max_end = intervals.iter().map(TimeInterval::end).fold(f64::MIN, f64::max);
    -X_PADDING..max_end + X_PADDING
}

/// Y axis bounds: zero up to the best score plus headroom
fn y_bounds(bests: &[ScoredLabel]) -> Range<f64> {
    let max_score = bests.iter().map(|s| s.score as f64).fold(f64::MIN, f64::max);
    0.0..max_score + Y_HEADROOM
}

/// Compute the pixel rectangle for one emoji overlay
///
/// The emoji is a fixed fraction of each axis range, centered horizontally
/// in its bar, with its top edge a tenth of its height below the bar top.
fn emoji_placement(
    interval: &TimeInterval,
    score: f64,
    fraction: f64,
    x_range: &Range<f64>,
    y_range: &Range<f64>,
    px_range: &Range<i32>,
    py_range: &Range<i32>,
) -> Placement {
    let emoji_w = fraction * (x_range.end - x_range.start);
    let emoji_h = fraction * (y_range.end - y_range.start);

    let left = interval.offset + interval.duration / 2.0 - emoji_w / 2.0;
    let top = score - (EMOJI_INSET_FACTOR - 1.0) * emoji_h;
    let bottom = score - EMOJI_INSET_FACTOR * emoji_h;

    let px_left = map_x(left, x_range, px_range);
    let px_right = map_x(left + emoji_w, x_range, px_range);
    let py_top = map_y(top, y_range, py_range);
    let py_bottom = map_y(bottom, y_range, py_range);

    Placement {
        x: i64::from(px_left),
        y: i64::from(py_top),
        width: (px_right - px_left).max(0) as u32,
        height: (py_bottom - py_top).max(0) as u32,
    }
}

/// Map a data x value into the plot area's pixel range
fn map_x(value: f64, range: &Range<f64>, px: &Range<i32>) -> i32 {
    let t = (value - range.start) / (range.end - range.start);
    px.start + (f64::from(px.end - px.start) * t).round() as i32
}

/// Map a data y value into the plot area's pixel range (pixel y grows down)
fn map_y(value: f64, range: &Range<f64>, px: &Range<i32>) -> i32 {
    let t = (value - range.start) / (range.end - range.start);
    px.end - (f64::from(px.end - px.start) * t).round() as i32
}

fn render_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Render(e.to_string())
}
