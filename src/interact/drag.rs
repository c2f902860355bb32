//! Pointer-drag gestures against the rendered canvas.
//!
//! The embedding UI owns hit testing (its elements receive the pointer-down)
//! and hands the layer id in; this module converts screen coordinates into
//! the model's percent space and keeps the grab offset stable for the whole
//! gesture so a layer never snaps its center to the pointer.

use kurbo::{Point, Vec2};

use crate::editor::EditorState;
use crate::foundation::error::{AdmixError, AdmixResult};
use crate::model::layer::LayerPatch;

/// Screen-space bounding box of the rendered canvas element, in the same
/// client coordinates the pointer events arrive in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    /// Convert a client-space pointer position into percent space.
    ///
    /// Positions outside the canvas map to values outside 0..100 and are
    /// deliberately not clamped: layers may be dragged partially or fully
    /// off-canvas.
    pub fn to_percent(&self, pointer: Point) -> Point {
        Point::new(
            (pointer.x - self.left) / self.width * 100.0,
            (pointer.y - self.top) / self.height * 100.0,
        )
    }
}

/// Transient state of one drag gesture. Created on pointer-down, dropped on
/// pointer-up; never outlives the gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
    pub(crate) layer_id: String,
    /// Grab offset: pointer position minus layer center, in percent space.
    offset: Vec2,
}

/// Pointer-down on a layer: select it and start dragging it.
///
/// The stored offset is what the pointer grabbed relative to the layer's
/// center; every subsequent move subtracts it, so the layer tracks the
/// pointer without jumping.
pub fn begin_drag(
    state: &mut EditorState,
    id: &str,
    canvas: &CanvasRect,
    pointer: Point,
) -> AdmixResult<()> {
    let layer = state
        .stack
        .get(id)
        .ok_or_else(|| AdmixError::stack(format!("unknown layer id '{id}'")))?;
    let pct = canvas.to_percent(pointer);
    let offset = Vec2::new(pct.x - layer.x, pct.y - layer.y);
    state.select(Some(id));
    state.drag = Some(DragState {
        layer_id: id.to_string(),
        offset,
    });
    Ok(())
}

/// Pointer-move: reposition the dragged layer, if a gesture is active.
pub fn drag_move(state: &mut EditorState, canvas: &CanvasRect, pointer: Point) -> AdmixResult<()> {
    let Some(drag) = state.drag.clone() else {
        return Ok(());
    };
    let pct = canvas.to_percent(pointer);
    state.stack.update(
        &drag.layer_id,
        LayerPatch::position(pct.x - drag.offset.x, pct.y - drag.offset.y),
    )
}

/// Pointer-up, captured document-wide: end the gesture unconditionally.
/// Fast pointer movement can leave the canvas before release, so this must
/// not depend on where the release lands.
pub fn end_drag(state: &mut EditorState) {
    state.drag = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::layer::LayerKind;
    use crate::stack::LayerDefaults;

    fn canvas() -> CanvasRect {
        CanvasRect {
            left: 100.0,
            top: 50.0,
            width: 600.0,
            height: 600.0,
        }
    }

    fn state_with_layer() -> (EditorState, String) {
        let mut state = EditorState::new();
        let id = state
            .add(LayerKind::Text, None, &LayerDefaults::default())
            .unwrap();
        (state, id)
    }

    #[test]
    fn to_percent_uses_canvas_bounds() {
        let c = canvas();
        let p = c.to_percent(Point::new(400.0, 350.0));
        assert_eq!((p.x, p.y), (50.0, 50.0));
        // Outside the canvas is allowed and unclamped.
        let q = c.to_percent(Point::new(40.0, 710.0));
        assert_eq!((q.x, q.y), (-10.0, 110.0));
    }

    #[test]
    fn drag_preserves_grab_offset() {
        let (mut state, id) = state_with_layer();
        let c = canvas();
        // Grab 5% right and 2% above the layer center (50, 50).
        let grab = Point::new(c.left + 0.55 * c.width, c.top + 0.48 * c.height);
        begin_drag(&mut state, &id, &c, grab).unwrap();
        assert_eq!(state.dragging(), Some(id.as_str()));
        assert_eq!(state.selected(), Some(id.as_str()));

        // Move the pointer 10% right and 5% down; the layer moves by the
        // same delta instead of snapping its center onto the pointer.
        let moved = Point::new(grab.x + 0.10 * c.width, grab.y + 0.05 * c.height);
        drag_move(&mut state, &c, moved).unwrap();
        let layer = state.stack.get(&id).unwrap();
        assert!((layer.x - 60.0).abs() < 1e-9);
        assert!((layer.y - 55.0).abs() < 1e-9);
    }

    #[test]
    fn move_without_active_drag_is_noop() {
        let (mut state, id) = state_with_layer();
        drag_move(&mut state, &canvas(), Point::new(0.0, 0.0)).unwrap();
        let layer = state.stack.get(&id).unwrap();
        assert_eq!((layer.x, layer.y), (50.0, 50.0));
    }

    #[test]
    fn end_drag_is_unconditional() {
        let (mut state, id) = state_with_layer();
        let c = canvas();
        begin_drag(&mut state, &id, &c, Point::new(400.0, 350.0)).unwrap();
        end_drag(&mut state);
        assert_eq!(state.dragging(), None);
        end_drag(&mut state); // idempotent
        assert_eq!(state.dragging(), None);
    }

    #[test]
    fn layers_can_leave_the_canvas() {
        let (mut state, id) = state_with_layer();
        let c = canvas();
        let grab = Point::new(c.left + 0.5 * c.width, c.top + 0.5 * c.height);
        begin_drag(&mut state, &id, &c, grab).unwrap();
        drag_move(&mut state, &c, Point::new(c.left - 300.0, c.top - 300.0)).unwrap();
        let layer = state.stack.get(&id).unwrap();
        assert_eq!((layer.x, layer.y), (-50.0, -50.0));
    }

    #[test]
    fn begin_drag_unknown_id_errors() {
        let (mut state, _) = state_with_layer();
        assert!(begin_drag(&mut state, "ghost", &canvas(), Point::ORIGIN).is_err());
    }
}
