use crate::model::layer::{Layer, LayerContent, TextAlign, TextStyle};

/// Editorial status tag carried on the snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Final,
}

/// Serializable snapshot of one canvas: background reference, prompt text and
/// the layer stack. Persistence and generation collaborators exchange this
/// shape; the engine only guarantees that it round-trips losslessly.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub created_at: i64,
    pub prompt: String,
    /// Background image source handle (embedded data or assets-relative path).
    pub background: String,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub status: CampaignStatus,
}

impl Campaign {
    /// Fresh campaign around a generated background, with the initial stack
    /// the generation pipeline seeds: a centered sticker layer for the
    /// reference image when one was resolved, otherwise a default title.
    pub fn seeded(
        id: impl Into<String>,
        created_at: i64,
        prompt: impl Into<String>,
        background: impl Into<String>,
        reference: Option<String>,
        title_style: TextStyle,
    ) -> Self {
        let first = match reference {
            Some(src) => Layer {
                id: "reference-main".to_string(),
                content: LayerContent::Sticker { src },
                visible: true,
                locked: false,
                x: 50.0,
                y: 50.0,
                rotation: 0.0,
                scale: 0.8,
                z_index: 1,
                opacity: 1.0,
            },
            None => Layer {
                id: "title-main".to_string(),
                content: LayerContent::Text {
                    text: "AD CREATIVE".to_string(),
                    style: title_style,
                },
                visible: true,
                locked: false,
                x: 50.0,
                y: 85.0,
                rotation: 0.0,
                scale: 1.0,
                z_index: 1,
                opacity: 1.0,
            },
        };
        let layers = vec![first];

        Self {
            id: id.into(),
            created_at,
            prompt: prompt.into(),
            background: background.into(),
            layers,
            status: CampaignStatus::Draft,
        }
    }

    /// Load a legacy snapshot that predates the unified layer model.
    pub fn from_legacy(
        id: impl Into<String>,
        created_at: i64,
        prompt: impl Into<String>,
        background: impl Into<String>,
        overlays: &[TextOverlay],
    ) -> Self {
        Self {
            id: id.into(),
            created_at,
            prompt: prompt.into(),
            background: background.into(),
            layers: convert_legacy_overlays(overlays, &[]),
            status: CampaignStatus::Draft,
        }
    }
}

/// Legacy overlay shape: a flat list of text-only items with no unified
/// z-ordering, visibility or opacity.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextOverlay {
    pub id: String,
    pub text: String,
    pub font_size: f64,
    pub color: String,
    pub x: f64,
    pub y: f64,
    pub font_family: String,
    pub font_weight: String,
    pub text_align: TextAlign,
    #[serde(default)]
    pub rotation: Option<f64>,
}

/// Convert legacy text overlays into layers.
///
/// Each overlay becomes a visible, unlocked text layer at opacity 1 and scale
/// 1, with z indexes strictly increasing in original order and offset above
/// any layer already in `existing`. The legacy shape carries no shadow flag,
/// so converted styles come through with the shadow off.
pub fn convert_legacy_overlays(overlays: &[TextOverlay], existing: &[Layer]) -> Vec<Layer> {
    let base_z = existing.iter().map(|l| l.z_index).max().unwrap_or(0) + 1;

    overlays
        .iter()
        .enumerate()
        .map(|(i, o)| Layer {
            id: if o.id.is_empty() {
                format!("legacy-{i}")
            } else {
                o.id.clone()
            },
            content: LayerContent::Text {
                text: o.text.clone(),
                style: TextStyle {
                    font_family: o.font_family.clone(),
                    font_weight: o.font_weight.clone(),
                    font_size: o.font_size,
                    color: o.color.clone(),
                    text_align: o.text_align,
                    shadow: false,
                },
            },
            visible: true,
            locked: false,
            x: o.x,
            y: o.y,
            rotation: o.rotation.unwrap_or(0.0),
            scale: 1.0,
            z_index: base_z + i as i32,
            opacity: 1.0,
        })
        .collect()
}
