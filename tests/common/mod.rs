//! Shared fixture helpers for integration tests.
#![allow(dead_code)] // not every test crate uses every helper

use base64::Engine as _;
use std::io::Cursor;

use admix::{Campaign, CampaignStatus, FrameRgba, Layer};

/// Encode a solid-color RGBA image as PNG bytes.
pub fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Wrap PNG bytes as an embedded `data:` source.
pub fn data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

/// Campaign around the given background source and layers.
pub fn campaign(background: impl Into<String>, layers: Vec<Layer>) -> Campaign {
    Campaign {
        id: "test-campaign".to_string(),
        created_at: 1_700_000_000_000,
        prompt: "test".to_string(),
        background: background.into(),
        layers,
        status: CampaignStatus::Draft,
    }
}

/// Route render tracing through the test harness when diagnosing failures.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Premultiplied RGBA of one output pixel.
pub fn pixel(frame: &FrameRgba, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}
