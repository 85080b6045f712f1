//! Audio chunk extraction from interval metadata
//!
//! Reads a metadata CSV with `summary_start`/`summary_end` timestamp columns,
//! decodes the audio file once to mono f32 via symphonia, then slices one
//! chunk per interior metadata row. The first and last rows are boundary
//! rows and are deliberately skipped, so `R` rows yield `R - 2` chunks.
//!
//! Offsets are computed against an explicit reference instant rather than
//! wall-clock time, so extraction is deterministic. When no reference is
//! supplied, the first row's start timestamp truncated to whole seconds is
//! used.

use crate::error::{Error, Result};
use crate::types::{AudioChunk, TimeInterval};
use chrono::{NaiveDateTime, Timelike};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

/// Metadata column holding interval start timestamps
const START_COLUMN: &str = "summary_start";
/// Metadata column holding interval end timestamps
const END_COLUMN: &str = "summary_end";

/// Chunk extraction service
pub struct ChunkExtractor {
    /// Resample chunks to this rate; None keeps the native rate
    desired_sample_rate: Option<u32>,
}

impl ChunkExtractor {
    pub fn new() -> Self {
        Self {
            desired_sample_rate: None,
        }
    }

    /// Request resampling of every chunk to `rate`
    pub fn with_sample_rate(mut self, rate: u32) -> Self {
        self.desired_sample_rate = Some(rate);
        self
    }

    /// Extract one chunk per interior metadata row
    ///
    /// Returns index-aligned chunk and interval sequences of length
    /// `row_count - 2` (empty when the metadata holds fewer than 3 rows).
    pub fn extract(
        &self,
        audio_path: &Path,
        metadata_path: &Path,
        reference: Option<NaiveDateTime>,
    ) -> Result<(Vec<AudioChunk>, Vec<TimeInterval>)> {
        let intervals = read_intervals(metadata_path, reference)?;
        if intervals.is_empty() {
            info!(
                "Metadata {} has no interior rows, nothing to extract",
                metadata_path.display()
            );
            return Ok((Vec::new(), Vec::new()));
        }

        let (samples, native_rate) = decode_mono(audio_path)?;
        debug!(
            frames = samples.len(),
            rate = native_rate,
            "Decoded {}",
            audio_path.display()
        );

        let mut chunks = Vec::with_capacity(intervals.len());
        for interval in &intervals {
            let slice = slice_samples(&samples, native_rate, interval, audio_path)?;
            let chunk = match self.desired_sample_rate {
                Some(rate) if rate != native_rate => AudioChunk {
                    samples: resample_mono(&slice, native_rate, rate)?,
                    sample_rate: rate,
                },
                _ => AudioChunk {
                    samples: slice,
                    sample_rate: native_rate,
                },
            };
            chunks.push(chunk);
        }

        info!(
            chunks = chunks.len(),
            "Extracted chunks from {}",
            audio_path.display()
        );
        Ok((chunks, intervals))
    }
}

impl Default for ChunkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a metadata timestamp
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]`, and
/// `YYYY-MM-DD HH:MM:SS[.fff]`, first match wins.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let text = text.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(text) {
        return Ok(ts.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(ts);
        }
    }
    Err(Error::DataFormat(format!(
        "unparseable timestamp: {:?}",
        text
    )))
}

/// Read interior intervals from the metadata CSV
///
/// All rows are parsed and validated; the first and last are then dropped.
pub fn read_intervals(
    metadata_path: &Path,
    reference: Option<NaiveDateTime>,
) -> Result<Vec<TimeInterval>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(metadata_path)
        .map_err(|e| {
            Error::Resource(format!(
                "cannot open metadata {}: {}",
                metadata_path.display(),
                e
            ))
        })?;

    let headers = reader.headers()?.clone();
    let start_idx = column_index(&headers, START_COLUMN)?;
    let end_idx = column_index(&headers, END_COLUMN)?;

    let mut rows: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let start = parse_timestamp(field(&record, start_idx, START_COLUMN)?)?;
        let end = parse_timestamp(field(&record, end_idx, END_COLUMN)?)?;
        if end < start {
            return Err(Error::DataFormat(format!(
                "interval end {} precedes start {}",
                end, start
            )));
        }
        rows.push((start, end));
    }

    if rows.len() < 3 {
        return Ok(Vec::new());
    }

    // Default reference: first row's start, truncated to whole seconds.
    let reference = match reference {
        Some(r) => r,
        None => rows[0].0.with_nanosecond(0).unwrap_or(rows[0].0),
    };

    let intervals = rows[1..rows.len() - 1]
        .iter()
        .map(|(start, end)| {
            let offset = signed_seconds(*start - reference);
            let duration = signed_seconds(*end - *start);
            TimeInterval::new(offset, duration)
        })
        .collect();

    Ok(intervals)
}

fn signed_seconds(delta: chrono::Duration) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| Error::DataFormat(format!("metadata is missing column {:?}", name)))
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize, name: &str) -> Result<&'a str> {
    record
        .get(idx)
        .ok_or_else(|| Error::DataFormat(format!("metadata row is missing column {:?}", name)))
}

/// Slice one interval out of the decoded sample buffer
fn slice_samples(
    samples: &[f32],
    sample_rate: u32,
    interval: &TimeInterval,
    audio_path: &Path,
) -> Result<Vec<f32>> {
    if interval.offset < 0.0 {
        return Err(Error::Resource(format!(
            "interval offset {:.3}s precedes the start of {}",
            interval.offset,
            audio_path.display()
        )));
    }

    let start = (interval.offset * sample_rate as f64).round() as usize;
    let count = (interval.duration * sample_rate as f64).round() as usize;
    let end = start + count;
    if end > samples.len() {
        return Err(Error::Resource(format!(
            "interval [{:.3}s, {:.3}s) extends past the end of {} ({:.3}s)",
            interval.offset,
            interval.end(),
            audio_path.display(),
            samples.len() as f64 / sample_rate as f64
        )));
    }

    Ok(samples[start..end].to_vec())
}

/// Decode an audio file to mono f32 at its native rate
///
/// Multi-channel audio is downmixed by averaging channels per frame.
pub fn decode_mono(audio_path: &Path) -> Result<(Vec<f32>, u32)> {
    let file = std::fs::File::open(audio_path)
        .map_err(|e| Error::Resource(format!("cannot open {}: {}", audio_path.display(), e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = audio_path.extension() {
        hint.with_extension(ext.to_str().unwrap_or(""));
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| {
            Error::Resource(format!(
                "unsupported audio format {}: {}",
                audio_path.display(),
                e
            ))
        })?;

    let mut format = probed.format;
    let track = format.default_track().ok_or_else(|| {
        Error::Resource(format!("no audio track in {}", audio_path.display()))
    })?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| {
            Error::Resource(format!(
                "unsupported codec in {}: {}",
                audio_path.display(),
                e
            ))
        })?;

    let mut mono: Vec<f32> = Vec::new();
    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break; // EOF
            }
            Err(e) => {
                return Err(Error::Resource(format!(
                    "error reading {}: {}",
                    audio_path.display(),
                    e
                )));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet).map_err(|e| {
            Error::Resource(format!("decode failure in {}: {}", audio_path.display(), e))
        })?;

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 {
            return Err(Error::Resource(format!(
                "zero-channel audio in {}",
                audio_path.display()
            )));
        }
        sample_rate = spec.rate;

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        for frame in buffer.samples().chunks_exact(channels) {
            mono.push(frame.iter().sum::<f32>() / channels as f32);
        }
    }

    if sample_rate == 0 {
        return Err(Error::Resource(format!(
            "unknown sample rate in {}",
            audio_path.display()
        )));
    }

    Ok((mono, sample_rate))
}

/// Resample a mono buffer in a single pass
///
/// Sized to the input, so the whole chunk goes through one `process` call.
fn resample_mono(samples: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if samples.is_empty() || input_rate == output_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = FastFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        1.0,
        PolynomialDegree::Septic,
        samples.len(),
        1,
    )
    .map_err(|e| Error::Decode(format!("failed to create resampler: {}", e)))?;

    let planar_output = resampler
        .process(&[samples.to_vec()], None)
        .map_err(|e| Error::Decode(format!("resampling failed: {}", e)))?;

    Ok(planar_output.into_iter().next().unwrap_or_default())
}
