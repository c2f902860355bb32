//! Admix is a layer compositing engine for ad-creative authoring.
//!
//! A campaign is a generated background plus a stack of positionable text and
//! image layers. The engine owns three things:
//!
//! - the layer model and [`LayerStack`] operations (add, partial update,
//!   delete, reorder, visibility/lock),
//! - the interactive transform controller ([`interact::drag`]) that maps
//!   pointer gestures into resolution-independent percent coordinates,
//! - the deterministic [`Rasterizer`] that flattens a snapshot into the
//!   exact pixels the interactive preview showed, and exports them as PNG.
//!
//! Everything around it (generation, catalog lookup, persistence, UI) is a
//! collaborator that supplies sources and consumes [`Campaign`] snapshots.
#![forbid(unsafe_code)]

pub mod assets;
pub mod editor;
pub mod foundation;
pub mod interact;
pub mod model;
pub mod render;
pub mod stack;

pub use crate::assets::store::{AssetStore, PreparedImage, decode_image};
pub use crate::editor::EditorState;
pub use crate::foundation::core::{Affine, CanvasSize, Point, Rect, Vec2};
pub use crate::foundation::error::{AdmixError, AdmixResult};
pub use crate::interact::drag::{CanvasRect, begin_drag, drag_move, end_drag};
pub use crate::model::campaign::{Campaign, CampaignStatus, TextOverlay, convert_legacy_overlays};
pub use crate::model::layer::{
    Layer, LayerContent, LayerKind, LayerPatch, StylePatch, TextAlign, TextStyle,
};
pub use crate::render::config::{RenderConfig, ShadowSpec};
pub use crate::render::export::{encode_png, export_png};
pub use crate::render::raster::{FrameRgba, Rasterizer, background_placement};
pub use crate::render::text::FontLibrary;
pub use crate::stack::{LayerDefaults, LayerStack};
