use crate::foundation::error::{AdmixError, AdmixResult};
use crate::model::layer::{Layer, LayerContent, LayerKind, LayerPatch, TextStyle, new_layer_id};

/// Seed values for freshly added layers that the stack cannot know itself:
/// the first font family the embedding application has available, and the
/// active palette's text color.
#[derive(Clone, Debug)]
pub struct LayerDefaults {
    pub font_family: String,
    pub text_color: String,
}

impl Default for LayerDefaults {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            text_color: "#ffffff".to_string(),
        }
    }
}

/// Ordered collection of layers for one canvas.
///
/// Storage order is insertion order and is what breaks `z_index` ties; the
/// rendering order is always the stable sort by `z_index` ascending. All
/// mutation goes through these operations, and each one either applies fully
/// or returns an error without touching the stack. Operations addressing an
/// unknown id report a [`Stack`](AdmixError::Stack) error.
#[derive(Clone, Debug, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layers(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    pub fn into_layers(self) -> Vec<Layer> {
        self.layers
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    fn position_of(&self, id: &str) -> AdmixResult<usize> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| AdmixError::stack(format!("unknown layer id '{id}'")))
    }

    /// Highest z index currently in the stack.
    pub fn max_z(&self) -> Option<i32> {
        self.layers.iter().map(|l| l.z_index).max()
    }

    /// Layers in rendering order: `z_index` ascending, ties by insertion.
    pub fn ordered(&self) -> Vec<&Layer> {
        let mut out: Vec<&Layer> = self.layers.iter().collect();
        out.sort_by_key(|l| l.z_index);
        out
    }

    /// Ids in rendering order.
    pub fn ordered_ids(&self) -> Vec<String> {
        self.ordered().iter().map(|l| l.id.clone()).collect()
    }

    /// Append a new layer on top of the stack and return its id.
    ///
    /// Defaults: centered (50, 50), no rotation, scale 1, opacity 1, visible,
    /// unlocked, `z_index` one above the current maximum (1 for an empty
    /// stack). Text layers seed placeholder content and the default style;
    /// image and sticker layers require a source handle.
    pub fn add(
        &mut self,
        kind: LayerKind,
        src: Option<String>,
        defaults: &LayerDefaults,
    ) -> AdmixResult<String> {
        let content = match kind {
            LayerKind::Text => LayerContent::Text {
                text: "NEW TEXT".to_string(),
                style: TextStyle::seed(&defaults.font_family, &defaults.text_color),
            },
            LayerKind::Image | LayerKind::Sticker => {
                let src = src.ok_or_else(|| {
                    AdmixError::validation(format!(
                        "{} layer requires an image source",
                        kind.as_str()
                    ))
                })?;
                match kind {
                    LayerKind::Image => LayerContent::Image { src },
                    _ => LayerContent::Sticker { src },
                }
            }
        };

        let id = new_layer_id(kind);
        self.layers.push(Layer {
            id: id.clone(),
            content,
            visible: true,
            locked: false,
            x: 50.0,
            y: 50.0,
            rotation: 0.0,
            scale: 1.0,
            z_index: self.max_z().unwrap_or(0) + 1,
            opacity: 1.0,
        });
        Ok(id)
    }

    /// Merge a partial update into the layer with the given id.
    pub fn update(&mut self, id: &str, patch: LayerPatch) -> AdmixResult<()> {
        let idx = self.position_of(id)?;
        patch.check(&self.layers[idx])?;
        patch.apply(&mut self.layers[idx]);
        Ok(())
    }

    /// Remove the layer with the given id.
    pub fn delete(&mut self, id: &str) -> AdmixResult<Layer> {
        let idx = self.position_of(id)?;
        Ok(self.layers.remove(idx))
    }

    /// Replace the stack order with `ids` (bottom first) and renumber
    /// `z_index` densely from 0 upward.
    ///
    /// `ids` must be a permutation of the current id set; anything else is a
    /// stack error and leaves the stack untouched.
    pub fn reorder(&mut self, ids: &[String]) -> AdmixResult<()> {
        if ids.len() != self.layers.len() {
            return Err(AdmixError::stack(format!(
                "reorder expects {} ids, got {}",
                self.layers.len(),
                ids.len()
            )));
        }
        let mut targets = Vec::with_capacity(ids.len());
        for id in ids {
            let idx = self.position_of(id)?;
            if targets.contains(&idx) {
                return Err(AdmixError::stack(format!(
                    "reorder lists layer id '{id}' more than once"
                )));
            }
            targets.push(idx);
        }

        for (z, idx) in targets.into_iter().enumerate() {
            self.layers[idx].z_index = z as i32;
        }
        Ok(())
    }

    /// Swap the layer with its next-higher neighbor in rendering order.
    /// Moving the topmost layer is a no-op.
    pub fn move_up(&mut self, id: &str) -> AdmixResult<()> {
        self.move_by(id, 1)
    }

    /// Swap the layer with its next-lower neighbor in rendering order.
    /// Moving the bottommost layer is a no-op.
    pub fn move_down(&mut self, id: &str) -> AdmixResult<()> {
        self.move_by(id, -1)
    }

    fn move_by(&mut self, id: &str, dir: i32) -> AdmixResult<()> {
        self.position_of(id)?;
        let mut order = self.ordered_ids();
        let rank = order.iter().position(|i| i == id).unwrap_or(0);
        let neighbor = rank as i64 + i64::from(dir);
        if neighbor < 0 || neighbor as usize >= order.len() {
            return Ok(());
        }
        order.swap(rank, neighbor as usize);
        self.reorder(&order)
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> AdmixResult<()> {
        self.update(
            id,
            LayerPatch {
                visible: Some(visible),
                ..LayerPatch::default()
            },
        )
    }

    pub fn set_locked(&mut self, id: &str, locked: bool) -> AdmixResult<()> {
        self.update(
            id,
            LayerPatch {
                locked: Some(locked),
                ..LayerPatch::default()
            },
        )
    }
}
