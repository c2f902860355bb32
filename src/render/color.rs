//! CSS color strings, as authored snapshots carry them.
//!
//! Styles arrive with colors like `#ffffff`, `#22c55e` or
//! `rgba(255,255,255,0.1)`; this parses the forms that actually occur
//! (3/6/8-digit hex, `rgb()`, `rgba()`) into straight-alpha RGBA8.

use crate::foundation::error::{AdmixError, AdmixResult};

/// Parse a CSS color string into straight-alpha `[r, g, b, a]`.
pub fn parse_css_color(s: &str) -> AdmixResult<[u8; 4]> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| bad_color(s));
    }
    if let Some(body) = strip_func(s, "rgba") {
        return parse_rgb_body(body, true).ok_or_else(|| bad_color(s));
    }
    if let Some(body) = strip_func(s, "rgb") {
        return parse_rgb_body(body, false).ok_or_else(|| bad_color(s));
    }
    Err(bad_color(s))
}

fn bad_color(s: &str) -> AdmixError {
    AdmixError::validation(format!(
        "unsupported color '{s}' (expected #hex, rgb() or rgba())"
    ))
}

fn strip_func<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?.trim().strip_prefix('(')?.strip_suffix(')')
}

fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    let byte = |pair: &str| u8::from_str_radix(pair, 16).ok();
    let nibble = |ch: &str| {
        let v = u8::from_str_radix(ch, 16).ok()?;
        Some(v * 17)
    };

    match hex.len() {
        3 => Some([
            nibble(&hex[0..1])?,
            nibble(&hex[1..2])?,
            nibble(&hex[2..3])?,
            255,
        ]),
        6 => Some([byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?, 255]),
        8 => Some([
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        ]),
        _ => None,
    }
}

fn parse_rgb_body(body: &str, with_alpha: bool) -> Option<[u8; 4]> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let channel = |p: &str| -> Option<u8> {
        let v: f64 = p.parse().ok()?;
        if !(0.0..=255.0).contains(&v) {
            return None;
        }
        Some(v.round() as u8)
    };

    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if with_alpha {
        let v: f64 = parts[3].parse().ok()?;
        if !v.is_finite() {
            return None;
        }
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    };
    Some([r, g, b, a])
}
