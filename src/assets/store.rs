//! Image source resolution and decoding.
//!
//! Layer and background sources are opaque string handles: either an
//! embedded `data:` URI or a path relative to the assets root. Remote URLs
//! are the fetching collaborator's responsibility and are rejected here, so
//! an export can never stall on the network. A failed resolution is fatal to
//! the operation that asked for it; a silently skipped source would corrupt
//! the composite.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use base64::Engine as _;

use crate::foundation::error::{AdmixError, AdmixResult};

/// Decoded raster in row-major premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Native aspect ratio (width / height).
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> AdmixResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| AdmixError::asset(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Reject absolute paths and parent traversal in assets-relative sources and
/// normalize separators to `/`.
fn normalize_rel_path(source: &str) -> AdmixResult<String> {
    let cleaned = source.replace('\\', "/");
    if cleaned.starts_with('/') {
        return Err(AdmixError::asset("image paths must be relative"));
    }

    let mut segments = Vec::new();
    for seg in cleaned.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                return Err(AdmixError::asset("image paths must not contain '..'"));
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(AdmixError::asset("image path must name a file"));
    }
    Ok(segments.join("/"))
}

fn decode_data_uri(source: &str) -> AdmixResult<Vec<u8>> {
    let body = source
        .strip_prefix("data:")
        .ok_or_else(|| AdmixError::asset("not a data URI"))?;
    let (_media_type, payload) = body
        .split_once(";base64,")
        .ok_or_else(|| AdmixError::asset("data URI must be base64-encoded"))?;
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| AdmixError::asset(format!("invalid base64 payload: {e}")))
}

/// Resolves and caches image sources for one render.
///
/// Resolution order never affects drawing: the rasterizer asks for sources
/// while walking layers in z order, and repeated handles hit the cache.
#[derive(Debug)]
pub struct AssetStore {
    assets_root: PathBuf,
    cache: HashMap<String, PreparedImage>,
}

impl AssetStore {
    pub fn new(assets_root: impl Into<PathBuf>) -> Self {
        Self {
            assets_root: assets_root.into(),
            cache: HashMap::new(),
        }
    }

    /// Resolve a source handle to decoded pixels.
    ///
    /// `data:` URIs decode in place; anything with a URL scheme is rejected
    /// (the engine does not fetch); everything else reads relative to the
    /// assets root.
    pub fn resolve(&mut self, source: &str) -> AdmixResult<PreparedImage> {
        if let Some(hit) = self.cache.get(source) {
            return Ok(hit.clone());
        }

        let bytes = if source.starts_with("data:") {
            decode_data_uri(source)?
        } else if source.contains("://") {
            return Err(AdmixError::asset(format!(
                "remote source '{source}' must be resolved by the caller before compositing"
            )));
        } else {
            let rel = normalize_rel_path(source)?;
            let path = self.assets_root.join(Path::new(&rel));
            std::fs::read(&path).map_err(|e| {
                AdmixError::asset(format!("failed to read image '{}': {e}", path.display()))
            })?
        };

        let prepared = decode_image(&bytes)?;
        self.cache.insert(source.to_string(), prepared.clone());
        Ok(prepared)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use base64::Engine as _;

    use super::*;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn decode_image_premultiplies() {
        let prepared = decode_image(&png_bytes(1, 1, [100, 50, 200, 128])).unwrap();
        assert_eq!((prepared.width, prepared.height), (1, 1));
        assert_eq!(
            prepared.rgba8_premul.as_slice(),
            &[
                ((100u16 * 128 + 127) / 255) as u8,
                ((50u16 * 128 + 127) / 255) as u8,
                ((200u16 * 128 + 127) / 255) as u8,
                128u8
            ]
        );
    }

    #[test]
    fn resolve_decodes_data_uri_and_caches() {
        let payload = base64::engine::general_purpose::STANDARD.encode(png_bytes(2, 3, [255, 0, 0, 255]));
        let uri = format!("data:image/png;base64,{payload}");
        let mut store = AssetStore::new(".");
        let a = store.resolve(&uri).unwrap();
        assert_eq!((a.width, a.height), (2, 3));
        let b = store.resolve(&uri).unwrap();
        assert!(Arc::ptr_eq(&a.rgba8_premul, &b.rgba8_premul));
    }

    #[test]
    fn resolve_rejects_remote_and_traversal() {
        let mut store = AssetStore::new(".");
        assert!(store.resolve("https://cdn.example/skin.png").is_err());
        assert!(store.resolve("../outside.png").is_err());
        assert!(store.resolve("/etc/passwd").is_err());
    }

    #[test]
    fn resolve_reports_missing_file() {
        let mut store = AssetStore::new("/nonexistent-root");
        match store.resolve("missing.png") {
            Err(AdmixError::Asset(msg)) => assert!(msg.contains("missing.png")),
            other => panic!("expected asset error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_data_uri_is_an_asset_error() {
        let mut store = AssetStore::new(".");
        assert!(store.resolve("data:image/png;base64,@@@").is_err());
        assert!(store.resolve("data:image/png,rawbytes").is_err());
    }

    #[test]
    fn aspect_is_width_over_height() {
        let prepared = decode_image(&png_bytes(4, 2, [0, 0, 0, 255])).unwrap();
        assert_eq!(prepared.aspect(), 2.0);
    }
}
