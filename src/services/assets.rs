//! Emoji asset resolution
//!
//! Labels map to composite asset identifiers (`MARKER-subid[-subid...]`);
//! each sub-identifier keys into an emoji CSV whose image column stores a
//! data-URL payload: a fixed 21-character `data:image/png;base64` scheme
//! prefix, a `,` separator, then base64 PNG bytes. The prefix length is a
//! property of the asset file format and must be stripped exactly.
//!
//! The store, mapping, and default asset are loaded once and shared
//! read-only; resolution is a pure function of (label, store).

use crate::config::AssetsConfig;
use crate::error::{Error, Result};
use base64::{engine::general_purpose, Engine as _};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Length of the non-image preamble in every stored payload
pub const PAYLOAD_PREAMBLE_LEN: usize = 21;

/// Column holding asset identifiers (`U+XXXX` scheme)
const IDENTIFIER_COLUMN: &str = "unicode";

/// Loaded emoji assets: raw store, label mapping, and the default fallback
pub struct EmojiLibrary {
    /// identifier -> raw encoded payload
    store: HashMap<String, String>,
    /// label -> composite identifier
    mapping: HashMap<String, String>,
    /// Decoded fallback for labels absent from the mapping
    default_asset: RgbaImage,
}

impl EmojiLibrary {
    /// Load the asset store and label mapping from disk
    ///
    /// The default asset is decoded eagerly; a store that cannot produce it
    /// fails the load rather than the first render.
    pub fn load(config: &AssetsConfig) -> Result<Self> {
        let store = read_store(&config.emoji_csv, &config.image_column)?;
        let mapping = read_mapping(&config.mapping)?;
        info!(
            assets = store.len(),
            labels = mapping.len(),
            "Emoji library loaded from {}",
            config.emoji_csv.display()
        );
        Self::from_parts(store, mapping, &config.default_emoji)
    }

    /// Build from in-memory tables
    pub fn from_parts(
        store: HashMap<String, String>,
        mapping: HashMap<String, String>,
        default_identifier: &str,
    ) -> Result<Self> {
        let default_asset = decode_asset(&store, default_identifier)?;
        Ok(Self {
            store,
            mapping,
            default_asset,
        })
    }

    /// The decoded fallback asset
    pub fn default_asset(&self) -> &RgbaImage {
        &self.default_asset
    }

    /// Resolve a label to one decoded (possibly composite) bitmap
    ///
    /// A label absent from the mapping yields a copy of the default asset;
    /// a mapped sub-identifier absent from the store is an error.
    pub fn resolve(&self, label: &str) -> Result<RgbaImage> {
        let composite = match self.mapping.get(label) {
            Some(composite) => composite,
            None => return Ok(self.default_asset.clone()),
        };

        // Leading segment is the marker, the rest are sub-identifiers.
        let sub_identifiers: Vec<&str> = composite.split('-').skip(1).collect();
        if sub_identifiers.is_empty() {
            return Err(Error::DataFormat(format!(
                "composite identifier {:?} for label {:?} has no sub-identifiers",
                composite, label
            )));
        }

        let mut parts = Vec::with_capacity(sub_identifiers.len());
        for identifier in sub_identifiers {
            parts.push(decode_asset(&self.store, identifier)?);
        }
        Ok(concat_horizontal(&parts))
    }
}

/// Decode one identifier's payload into a bitmap
fn decode_asset(store: &HashMap<String, String>, identifier: &str) -> Result<RgbaImage> {
    let payload = store
        .get(identifier)
        .ok_or_else(|| Error::AssetNotFound(identifier.to_string()))?;

    let encoded = payload.get(PAYLOAD_PREAMBLE_LEN..).ok_or_else(|| {
        Error::Decode(format!(
            "payload for {} is shorter than its {}-byte preamble",
            identifier, PAYLOAD_PREAMBLE_LEN
        ))
    })?;
    // The data-URL separator comma sits right after the scheme prefix.
    let encoded = encoded.trim_start_matches(',');

    let bytes = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| Error::Decode(format!("asset {}: {}", identifier, e)))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| Error::Decode(format!("asset {}: {}", identifier, e)))?;
    Ok(image.to_rgba8())
}

/// Concatenate bitmaps left to right on a canvas as tall as the tallest
fn concat_horizontal(parts: &[RgbaImage]) -> RgbaImage {
    if parts.len() == 1 {
        return parts[0].clone();
    }

    let width: u32 = parts.iter().map(|p| p.width()).sum();
    let height: u32 = parts.iter().map(|p| p.height()).max().unwrap_or(0);
    let mut canvas = RgbaImage::new(width, height);

    let mut x = 0i64;
    for part in parts {
        image::imageops::overlay(&mut canvas, part, x, 0);
        x += i64::from(part.width());
    }
    canvas
}

/// Read the emoji CSV into an identifier -> payload map
fn read_store(path: &Path, image_column: &str) -> Result<HashMap<String, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| Error::Resource(format!("cannot open asset file {}: {}", path.display(), e)))?;

    let headers = reader.headers()?.clone();
    let id_idx = headers
        .iter()
        .position(|h| h.trim() == IDENTIFIER_COLUMN)
        .ok_or_else(|| {
            Error::DataFormat(format!(
                "asset file {} is missing column {:?}",
                path.display(),
                IDENTIFIER_COLUMN
            ))
        })?;
    let image_idx = headers
        .iter()
        .position(|h| h.trim() == image_column)
        .ok_or_else(|| {
            Error::DataFormat(format!(
                "asset file {} is missing image column {:?}",
                path.display(),
                image_column
            ))
        })?;

    let mut store = HashMap::new();
    for record in reader.records() {
        let record = record?;
        let identifier = record.get(id_idx).unwrap_or("").trim();
        let payload = record.get(image_idx).unwrap_or("");
        if !identifier.is_empty() && !payload.is_empty() {
            store.insert(identifier.to_string(), payload.to_string());
        }
    }
    Ok(store)
}

/// Read the label -> composite identifier mapping from a TOML table
fn read_mapping(path: &Path) -> Result<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        Error::Resource(format!("cannot read mapping {}: {}", path.display(), e))
    })?;
    toml::from_str(&text)
        .map_err(|e| Error::DataFormat(format!("mapping {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::io::Cursor;

    /// Encode a solid-color bitmap the way the asset file stores it
    fn payload(width: u32, height: u32, rgba: [u8; 4]) -> String {
        let img = RgbaImage::from_pixel(width, height, Rgba(rgba));
        let mut cursor = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut cursor, image::ImageFormat::Png)
            .unwrap();
        let encoded = general_purpose::STANDARD.encode(cursor.into_inner());
        format!("data:image/png;base64,{}", encoded)
    }

    fn library() -> EmojiLibrary {
        let mut store = HashMap::new();
        store.insert("U+274C".to_string(), payload(4, 4, [255, 0, 0, 255]));
        store.insert("U+1F436".to_string(), payload(3, 2, [0, 255, 0, 255]));
        store.insert("U+1F415".to_string(), payload(2, 5, [0, 0, 255, 255]));

        let mut mapping = HashMap::new();
        mapping.insert("Dog".to_string(), "E-U+1F436".to_string());
        mapping.insert("Dogs".to_string(), "E-U+1F436-U+1F415".to_string());
        mapping.insert("Ghost".to_string(), "E-U+1F47B".to_string());
        mapping.insert("Broken".to_string(), "E".to_string());

        EmojiLibrary::from_parts(store, mapping, "U+274C").unwrap()
    }

    #[test]
    fn test_preamble_is_21_chars() {
        assert_eq!("data:image/png;base64".len(), PAYLOAD_PREAMBLE_LEN);
    }

    #[test]
    fn test_resolve_single_identifier() {
        let lib = library();
        let img = lib.resolve("Dog").unwrap();
        assert_eq!((img.width(), img.height()), (3, 2));
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn test_resolve_is_pure() {
        let lib = library();
        let a = lib.resolve("Dog").unwrap();
        let b = lib.resolve("Dog").unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_unmapped_label_falls_back_to_default() {
        let lib = library();
        let img = lib.resolve("Thunderstorm").unwrap();
        assert_eq!(img.as_raw(), lib.default_asset().as_raw());
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_composite_concatenates_left_to_right() {
        let lib = library();
        let img = lib.resolve("Dogs").unwrap();
        // 3+2 wide, as tall as the tallest sub-image
        assert_eq!((img.width(), img.height()), (5, 5));
        // Left part (green) occupies x in [0,3), right part (blue) [3,5)
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 255, 0, 255]));
        assert_eq!(img.get_pixel(4, 0), &Rgba([0, 0, 255, 255]));
        // Below the shorter left image the canvas stays transparent
        assert_eq!(img.get_pixel(0, 4), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_missing_sub_identifier_is_asset_not_found() {
        let lib = library();
        assert!(matches!(
            lib.resolve("Ghost"),
            Err(Error::AssetNotFound(id)) if id == "U+1F47B"
        ));
    }

    #[test]
    fn test_marker_only_composite_is_data_format_error() {
        let lib = library();
        assert!(matches!(lib.resolve("Broken"), Err(Error::DataFormat(_))));
    }

    #[test]
    fn test_garbage_payload_is_decode_error() {
        let mut store = HashMap::new();
        store.insert(
            "U+274C".to_string(),
            "data:image/png;base64,!!!not-base64!!!".to_string(),
        );
        let result = EmojiLibrary::from_parts(store, HashMap::new(), "U+274C");
        assert!(matches!(result, Err(Error::Decode(_))));
    }

    #[test]
    fn test_missing_default_fails_load() {
        let result = EmojiLibrary::from_parts(HashMap::new(), HashMap::new(), "U+274C");
        assert!(matches!(result, Err(Error::AssetNotFound(_))));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("emoji.csv");
        let mapping_path = dir.path().join("mapping.toml");

        // Payloads embed a comma (data-URL separator), so the CSV field is quoted
        std::fs::write(
            &csv_path,
            format!(
                "name,unicode,Apple\ncross mark,U+274C,\"{}\"\ndog face,U+1F436,\"{}\"\n",
                payload(4, 4, [255, 0, 0, 255]),
                payload(3, 2, [0, 255, 0, 255]),
            ),
        )
        .unwrap();
        std::fs::write(&mapping_path, "\"Dog\" = \"E-U+1F436\"\n").unwrap();

        let config = AssetsConfig {
            emoji_csv: csv_path,
            image_column: "Apple".to_string(),
            default_emoji: "U+274C".to_string(),
            mapping: mapping_path,
        };

        let lib = EmojiLibrary::load(&config).unwrap();
        assert_eq!(lib.resolve("Dog").unwrap().width(), 3);
        assert_eq!(lib.resolve("Unknown").unwrap().width(), 4);
    }
}
