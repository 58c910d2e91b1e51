use crate::foundation::error::{TileGridError, TileGridResult};

pub use kurbo::{Affine, Point, Rect, Size};

/// Animation clock time, in seconds.
pub type Seconds = f64;

/// Absolute 0-based frame index on a fixed-fps playback clock.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> TileGridResult<Self> {
        if den == 0 {
            return Err(TileGridError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(TileGridError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }

    /// Number of whole frames needed to cover `secs`, always at least one.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        ((secs.max(0.0) * self.as_f64()).ceil() as u64).max(1)
    }
}

/// Drawing surface dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when the surface has no drawable area.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Dimensions narrowed to what `vello_cpu` surfaces accept.
    pub fn as_u16(self) -> TileGridResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| TileGridError::validation("surface width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| TileGridError::validation("surface height exceeds u16"))?;
        Ok((w, h))
    }
}
