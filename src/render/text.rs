//! Font registration and text shaping for the rasterizer.
//!
//! Weight selection picks among registered font binaries rather than driving
//! variable-font axes: the library maps (family, weight) to exact font bytes
//! and resolves a requested weight to the nearest registered one within the
//! family. Shaping goes through Parley, one layout per authored line;
//! wrapping never happens, line breaks in the model are explicit.

use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{AdmixError, AdmixResult};
use crate::model::layer::TextAlign;

/// RGBA8 brush color carried through Parley layout (straight alpha).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Parse a CSS font-weight string ("400", "700", "bold", ...).
pub fn parse_font_weight(s: &str) -> AdmixResult<u16> {
    let s = s.trim();
    match s {
        "normal" => return Ok(400),
        "bold" => return Ok(700),
        _ => {}
    }
    let n: u16 = s
        .parse()
        .map_err(|_| AdmixError::validation(format!("unsupported font weight '{s}'")))?;
    if !(1..=1000).contains(&n) {
        return Err(AdmixError::validation(format!(
            "font weight {n} outside 1..=1000"
        )));
    }
    Ok(n)
}

#[derive(Clone, Debug)]
struct FontEntry {
    family: String,
    weight: u16,
    bytes: Arc<Vec<u8>>,
}

/// Registered font binaries, keyed by family name and weight.
///
/// Registration order matters only for [`Self::first_family`], which is what
/// seeds the default style of newly added text layers.
#[derive(Clone, Debug, Default)]
pub struct FontLibrary {
    entries: Vec<FontEntry>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn register(&mut self, family: impl Into<String>, weight: u16, bytes: Vec<u8>) {
        self.entries.push(FontEntry {
            family: family.into(),
            weight,
            bytes: Arc::new(bytes),
        });
    }

    pub fn load_file(
        &mut self,
        family: impl Into<String>,
        weight: u16,
        path: impl AsRef<Path>,
    ) -> AdmixResult<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            AdmixError::asset(format!("failed to read font '{}': {e}", path.display()))
        })?;
        self.register(family, weight, bytes);
        Ok(())
    }

    /// First registered family name, the seed for default text styles.
    pub fn first_family(&self) -> Option<&str> {
        self.entries.first().map(|e| e.family.as_str())
    }

    /// Font bytes for the family, at the registered weight closest to the
    /// requested one. An unknown family is an asset error: a text layer that
    /// cannot resolve its font must fail the export rather than render in
    /// some substitute face.
    pub(crate) fn resolve(&self, family: &str, weight: u16) -> AdmixResult<Arc<Vec<u8>>> {
        self.entries
            .iter()
            .filter(|e| e.family.eq_ignore_ascii_case(family))
            .min_by_key(|e| (i32::from(e.weight) - i32::from(weight)).abs())
            .map(|e| e.bytes.clone())
            .ok_or_else(|| AdmixError::asset(format!("font family '{family}' is not registered")))
    }
}

/// Stateful helper for building Parley layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape one authored line with the given font bytes and size.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> AdmixResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(AdmixError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            AdmixError::asset("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| AdmixError::asset("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Vertical center of line `i` within a text block of `line_count` lines,
/// relative to the layer anchor. The block is centered on the anchor and
/// each line is centered within its advance slot.
pub(crate) fn line_center_y(i: usize, line_count: usize, line_height: f64) -> f64 {
    let total = line_count as f64 * line_height;
    (i as f64) * line_height - total / 2.0 + line_height / 2.0
}

/// Horizontal start of a shaped line of `width`, relative to the anchor.
pub(crate) fn align_dx(align: TextAlign, width: f64) -> f64 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => -width / 2.0,
        TextAlign::Right => -width,
    }
}
