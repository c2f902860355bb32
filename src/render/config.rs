use kurbo::Vec2;

use crate::foundation::core::CanvasSize;

/// Output edge the pixel constants below are authored against. Rendering at
/// any other size rescales them proportionally.
pub const REFERENCE_OUTPUT_SIZE: f64 = 1024.0;

/// Drop-shadow parameters, in reference-output pixels.
///
/// `blur` follows the canvas convention and is rendered as a gaussian with
/// sigma = blur / 2; offsets apply in output space, after the layer
/// transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSpec {
    pub blur: f64,
    pub offset: Vec2,
    /// Straight (non-premultiplied) shadow tint.
    pub rgb: [u8; 3],
    pub alpha: f64,
}

impl ShadowSpec {
    fn scaled(self, factor: f64) -> Self {
        Self {
            blur: self.blur * factor,
            offset: self.offset * factor,
            ..self
        }
    }
}

/// Every absolute-pixel constant the preview and the exporter share.
///
/// Editing happens against a resolution-independent view while export runs at
/// a fixed square; the two stay visually identical because each pixel
/// quantity here is defined against a documented reference resolution and
/// rescaled exactly once, by the accessors below. Keeping them in one struct
/// is what stops the live view and the exporter from drifting apart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    /// Export resolution (square).
    pub output: CanvasSize,
    /// Notional edit-canvas width that text `font_size` values were authored
    /// against.
    pub text_reference_size: f64,
    /// Width an unscaled image layer occupies at the reference output.
    pub image_reference_width: f64,
    /// Multiple of the scaled font size used as line advance.
    pub line_height_factor: f64,
    /// Shadow behind image/sticker layers, when enabled.
    pub image_shadow: ShadowSpec,
    /// Shadow behind text layers with the style flag set.
    pub text_shadow: ShadowSpec,
    /// Whether image/sticker layers cast a shadow at all.
    pub image_shadow_enabled: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output: CanvasSize { size: 1024 },
            text_reference_size: 600.0,
            image_reference_width: 300.0,
            line_height_factor: 1.2,
            image_shadow: ShadowSpec {
                blur: 15.0,
                offset: Vec2::ZERO,
                rgb: [0, 0, 0],
                alpha: 0.5,
            },
            text_shadow: ShadowSpec {
                blur: 4.0,
                offset: Vec2::new(2.0, 2.0),
                rgb: [0, 0, 0],
                alpha: 0.9,
            },
            image_shadow_enabled: true,
        }
    }
}

impl RenderConfig {
    /// Config for an output edge other than the default 1024.
    pub fn with_output(output: CanvasSize) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }

    /// Output edge in pixels.
    pub fn output_px(&self) -> f64 {
        self.output.as_f64()
    }

    /// Scale factor from reference-output pixels to actual output pixels.
    pub fn px_scale(&self) -> f64 {
        self.output_px() / REFERENCE_OUTPUT_SIZE
    }

    /// Scale factor applied to stored `font_size` values.
    pub fn text_scale(&self) -> f64 {
        self.output_px() / self.text_reference_size
    }

    /// Map a percent coordinate onto the output surface.
    pub fn percent_to_px(&self, pct: f64) -> f64 {
        pct / 100.0 * self.output_px()
    }

    /// Unscaled image-layer width on the output surface.
    pub fn image_width_px(&self) -> f64 {
        self.image_reference_width * self.px_scale()
    }

    /// Image shadow with blur/offset mapped to the output resolution.
    pub fn image_shadow_px(&self) -> ShadowSpec {
        self.image_shadow.scaled(self.px_scale())
    }

    /// Text shadow with blur/offset mapped to the output resolution.
    pub fn text_shadow_px(&self) -> ShadowSpec {
        self.text_shadow.scaled(self.px_scale())
    }
}
