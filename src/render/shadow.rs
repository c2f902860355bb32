//! Drop-shadow synthesis.
//!
//! A layer's shadow is derived from the pixels it rendered: the content
//! alpha, tinted with the shadow color, blurred with a separable gaussian in
//! Q16 fixed point. The offset is applied later, when the shadow is
//! composited under the content.

use crate::foundation::error::{AdmixError, AdmixResult};
use crate::render::composite::mul_div255;
use crate::render::config::ShadowSpec;

/// Build the premultiplied shadow buffer for already-rendered layer content.
///
/// `content` is the layer's premultiplied RGBA8 surface; the result is a
/// same-sized buffer holding only the blurred tint.
pub fn shadow_for_content(
    content: &[u8],
    width: u32,
    height: u32,
    spec: &ShadowSpec,
) -> AdmixResult<Vec<u8>> {
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if content.len() != expected {
        return Err(AdmixError::raster("shadow content buffer size mismatch"));
    }

    let mut tinted = vec![0u8; expected];
    let shadow_alpha = ((spec.alpha.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16;
    for (src, dst) in content.chunks_exact(4).zip(tinted.chunks_exact_mut(4)) {
        let a = mul_div255(u16::from(src[3]), shadow_alpha);
        if a == 0 {
            continue;
        }
        let a16 = u16::from(a);
        dst[0] = mul_div255(u16::from(spec.rgb[0]), a16);
        dst[1] = mul_div255(u16::from(spec.rgb[1]), a16);
        dst[2] = mul_div255(u16::from(spec.rgb[2]), a16);
        dst[3] = a;
    }

    let radius = spec.blur.max(0.0).round() as u32;
    if radius == 0 {
        return Ok(tinted);
    }
    let sigma = (spec.blur / 2.0) as f32;
    let kernel = gaussian_kernel_q16(radius, sigma)?;

    let mut blurred = vec![0u8; expected];
    let mut scratch = vec![0u8; expected];
    blur_rgba8_premul_q16(&tinted, &mut blurred, &mut scratch, width, height, &kernel);
    Ok(blurred)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> AdmixResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(AdmixError::raster("blur sigma must be finite and > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    // Quantize so the kernel sums to exactly 1.0 in Q16, keeping flat areas
    // flat through the blur.
    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        let new_mid = (i64::from(weights[mid]) + delta).clamp(0, 65536);
        weights[mid] = new_mid as u32;
    }

    Ok(weights)
}

fn blur_rgba8_premul_q16(
    src: &[u8],
    dst: &mut [u8],
    tmp: &mut [u8],
    width: u32,
    height: u32,
    kernel_q16: &[u32],
) {
    if kernel_q16.len() == 1 {
        dst.copy_from_slice(src);
        return;
    }

    blur_pass_q16(src, tmp, width, height, kernel_q16, true);
    blur_pass_q16(tmp, dst, width, height, kernel_q16, false);
}

fn blur_pass_q16(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32], horizontal: bool) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i32 - radius;
                let idx = if horizontal {
                    let sx = (x + d).clamp(0, w - 1);
                    ((y * w + sx) as usize) * 4
                } else {
                    let sy = (y + d).clamp(0, h - 1);
                    ((sy * w + x) as usize) * 4
                };
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    v.min(255) as u8
}
