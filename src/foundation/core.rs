use crate::foundation::error::{AdmixError, AdmixResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Square output canvas dimensions in pixels.
///
/// The export surface is always square; the interactive view renders the same
/// aspect and scales freely because layer positions are stored in percent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    /// Edge length in pixels.
    pub size: u32,
}

impl CanvasSize {
    /// Create a validated canvas size.
    ///
    /// The CPU pipeline addresses surfaces with `u16` extents, so the edge
    /// must fit in one.
    pub fn new(size: u32) -> AdmixResult<Self> {
        if size == 0 {
            return Err(AdmixError::validation("canvas size must be > 0"));
        }
        if u16::try_from(size).is_err() {
            return Err(AdmixError::validation("canvas size exceeds u16"));
        }
        Ok(Self { size })
    }

    /// Edge length as `f64` for transform math.
    pub fn as_f64(self) -> f64 {
        f64::from(self.size)
    }

    /// Edge length as `u16` for surface allocation.
    pub fn as_u16(self) -> u16 {
        // new() guarantees the conversion holds.
        self.size as u16
    }
}
