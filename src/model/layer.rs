use crate::foundation::error::{AdmixError, AdmixResult};

/// Kind discriminant for a layer's content.
///
/// `Image` and `Sticker` render identically; the distinction is semantic and
/// only matters to the embedding UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Text,
    Image,
    Sticker,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Sticker => "sticker",
        }
    }
}

/// Horizontal alignment of text within a layer, relative to the anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Styling for a text layer.
///
/// `font_size` is expressed in reference-canvas pixels (see
/// [`RenderConfig`](crate::render::config::RenderConfig) for the scaling
/// rule); `color` is a CSS color string as produced by the authoring UI.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    pub font_weight: String,
    pub font_size: f64,
    pub color: String,
    pub text_align: TextAlign,
    pub shadow: bool,
}

impl TextStyle {
    /// Style seeded onto a freshly added text layer.
    pub fn seed(font_family: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
            font_weight: "700".to_string(),
            font_size: 32.0,
            color: color.into(),
            text_align: TextAlign::Center,
            shadow: true,
        }
    }
}

/// Content of a layer: exactly one of text or an image source, enforced by
/// the type rather than by convention.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerContent {
    Text { text: String, style: TextStyle },
    Image { src: String },
    Sticker { src: String },
}

impl LayerContent {
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Text { .. } => LayerKind::Text,
            Self::Image { .. } => LayerKind::Image,
            Self::Sticker { .. } => LayerKind::Sticker,
        }
    }

    /// Image source handle for image/sticker content.
    pub fn src(&self) -> Option<&str> {
        match self {
            Self::Text { .. } => None,
            Self::Image { src } | Self::Sticker { src } => Some(src),
        }
    }

    /// Text and style for text content.
    pub fn text(&self) -> Option<(&str, &TextStyle)> {
        match self {
            Self::Text { text, style } => Some((text, style)),
            _ => None,
        }
    }
}

/// One positionable visual element in the composite.
///
/// `x`/`y` are the layer's center point in percent of the canvas edge, which
/// keeps the model independent of any concrete canvas resolution. `rotation`
/// is clockwise degrees about the center; `scale` is a uniform multiplier
/// applied after rotation. `z_index` values matter only for relative order;
/// ties resolve by insertion order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    #[serde(flatten)]
    pub content: LayerContent,
    pub visible: bool,
    pub locked: bool,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub z_index: i32,
    pub opacity: f64,
}

impl Layer {
    /// Check that transform fields are usable by the rasterizer.
    ///
    /// Any finite scale is accepted here (zero or negative values render as
    /// an invisible or mirrored layer rather than failing the export); only
    /// non-finite numbers are rejected.
    pub fn validate(&self) -> AdmixResult<()> {
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("rotation", self.rotation),
            ("scale", self.scale),
            ("opacity", self.opacity),
        ] {
            if !v.is_finite() {
                return Err(AdmixError::validation(format!(
                    "layer '{}' has non-finite {name}",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Generate an id for a new layer, prefixed with its kind the way authored
/// snapshots name them.
pub fn new_layer_id(kind: LayerKind) -> String {
    format!("{}-{}", kind.as_str(), uuid::Uuid::new_v4())
}

/// Partial update for a text layer's style.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylePatch {
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub font_size: Option<f64>,
    pub color: Option<String>,
    pub text_align: Option<TextAlign>,
    pub shadow: Option<bool>,
}

/// Partial update merged into an existing layer.
///
/// Content fields apply only to the matching variant: `text`/`style` require
/// a text layer and `src` an image/sticker layer; a mismatch is a validation
/// error and leaves the layer untouched.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerPatch {
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub scale: Option<f64>,
    pub z_index: Option<i32>,
    pub opacity: Option<f64>,
    pub text: Option<String>,
    pub src: Option<String>,
    pub style: Option<StylePatch>,
}

impl LayerPatch {
    /// Position-only patch, the drag controller's update.
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Validate the patch against a target layer without mutating it.
    ///
    /// Updates are atomic: callers check first, then apply, so a rejected
    /// patch never leaves a half-written layer behind.
    pub fn check(&self, layer: &Layer) -> AdmixResult<()> {
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("rotation", self.rotation),
            ("opacity", self.opacity),
        ] {
            if let Some(v) = v
                && !v.is_finite()
            {
                return Err(AdmixError::validation(format!("{name} must be finite")));
            }
        }
        if let Some(s) = self.scale
            && !(s.is_finite() && s > 0.0)
        {
            return Err(AdmixError::validation("scale must be finite and > 0"));
        }
        if let Some(sz) = self.style.as_ref().and_then(|s| s.font_size)
            && !(sz.is_finite() && sz > 0.0)
        {
            return Err(AdmixError::validation("fontSize must be finite and > 0"));
        }

        let is_text = matches!(layer.content, LayerContent::Text { .. });
        if (self.text.is_some() || self.style.is_some()) && !is_text {
            return Err(AdmixError::validation(
                "text/style update targets a non-text layer",
            ));
        }
        if self.src.is_some() && is_text {
            return Err(AdmixError::validation("src update targets a text layer"));
        }
        Ok(())
    }

    /// Merge the patch into `layer`. Callers must have run [`Self::check`].
    pub(crate) fn apply(self, layer: &mut Layer) {
        if let Some(v) = self.visible {
            layer.visible = v;
        }
        if let Some(v) = self.locked {
            layer.locked = v;
        }
        if let Some(v) = self.x {
            layer.x = v;
        }
        if let Some(v) = self.y {
            layer.y = v;
        }
        if let Some(v) = self.rotation {
            layer.rotation = v;
        }
        if let Some(v) = self.scale {
            layer.scale = v;
        }
        if let Some(v) = self.z_index {
            layer.z_index = v;
        }
        if let Some(v) = self.opacity {
            layer.opacity = v;
        }
        match &mut layer.content {
            LayerContent::Text { text, style } => {
                if let Some(t) = self.text {
                    *text = t;
                }
                if let Some(p) = self.style {
                    if let Some(v) = p.font_family {
                        style.font_family = v;
                    }
                    if let Some(v) = p.font_weight {
                        style.font_weight = v;
                    }
                    if let Some(v) = p.font_size {
                        style.font_size = v;
                    }
                    if let Some(v) = p.color {
                        style.color = v;
                    }
                    if let Some(v) = p.text_align {
                        style.text_align = v;
                    }
                    if let Some(v) = p.shadow {
                        style.shadow = v;
                    }
                }
            }
            LayerContent::Image { src } | LayerContent::Sticker { src } => {
                if let Some(s) = self.src {
                    *src = s;
                }
            }
        }
    }
}
