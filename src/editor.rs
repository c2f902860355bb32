use crate::foundation::error::AdmixResult;
use crate::interact::drag::DragState;
use crate::model::layer::{Layer, LayerKind, LayerPatch};
use crate::stack::{LayerDefaults, LayerStack};

/// Explicit editing-session state: the layer stack plus the two pieces of
/// transient UI state the engine owns, the current selection and the drag
/// gesture in flight (if any). Threaded by reference through the controller
/// and rendering instead of living in ambient globals.
#[derive(Clone, Debug, Default)]
pub struct EditorState {
    pub stack: LayerStack,
    pub(crate) selected: Option<String>,
    pub(crate) drag: Option<DragState>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layers(layers: Vec<Layer>) -> Self {
        Self {
            stack: LayerStack::from_layers(layers),
            selected: None,
            drag: None,
        }
    }

    /// Currently selected layer id, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Layer id currently being dragged, if a gesture is active.
    pub fn dragging(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.layer_id.as_str())
    }

    /// Set or clear the selection. Clicking empty canvas maps to
    /// `select(None)`.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id.map(str::to_string);
    }

    /// Add a layer and select it.
    pub fn add(
        &mut self,
        kind: LayerKind,
        src: Option<String>,
        defaults: &LayerDefaults,
    ) -> AdmixResult<String> {
        let id = self.stack.add(kind, src, defaults)?;
        self.selected = Some(id.clone());
        Ok(id)
    }

    pub fn update(&mut self, id: &str, patch: LayerPatch) -> AdmixResult<()> {
        self.stack.update(id, patch)
    }

    /// Delete a layer. When it was the selected layer the selection becomes
    /// none (never another layer); an active drag of it ends as well.
    pub fn delete(&mut self, id: &str) -> AdmixResult<()> {
        self.stack.delete(id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if self.dragging() == Some(id) {
            self.drag = None;
        }
        Ok(())
    }

    pub fn reorder(&mut self, ids: &[String]) -> AdmixResult<()> {
        self.stack.reorder(ids)
    }

    pub fn move_up(&mut self, id: &str) -> AdmixResult<()> {
        self.stack.move_up(id)
    }

    pub fn move_down(&mut self, id: &str) -> AdmixResult<()> {
        self.stack.move_down(id)
    }

    /// Tear down the workspace: empty stack, no selection, no dangling drag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
