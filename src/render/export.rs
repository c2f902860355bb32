//! Terminal artifact: lossless PNG bytes for download.

use std::io::Cursor;

use crate::assets::store::AssetStore;
use crate::foundation::error::{AdmixError, AdmixResult};
use crate::model::campaign::Campaign;
use crate::render::raster::{FrameRgba, Rasterizer};

/// Convert a premultiplied frame back to straight alpha. PNG stores straight
/// RGBA, so this is the inverse of the decode-time premultiply.
pub fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in 0..3 {
            let v = (u16::from(px[c]) * 255 + a / 2) / a;
            px[c] = v.min(255) as u8;
        }
    }
}

/// Encode a rendered frame as PNG bytes.
pub fn encode_png(frame: &FrameRgba) -> AdmixResult<Vec<u8>> {
    let mut data = frame.data.clone();
    unpremultiply_rgba8_in_place(&mut data);

    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| AdmixError::raster("frame buffer does not match its dimensions"))?;
    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| AdmixError::raster(format!("png encode failed: {e}")))?;
    Ok(out)
}

/// Render a campaign and encode the result, the one-shot export entry point.
/// Either returns complete PNG bytes or fails without partial output.
pub fn export_png(
    rasterizer: &mut Rasterizer,
    campaign: &Campaign,
    assets: &mut AssetStore,
) -> AdmixResult<Vec<u8>> {
    let frame = rasterizer.render(campaign, assets)?;
    encode_png(&frame)
}
