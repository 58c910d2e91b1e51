//! Grid configuration.
//!
//! Every struct is `#[serde(default)]`, so a JSON document only needs the fields it
//! overrides. [`GridConfig::from_json_str`] parses and validates in one step.

use std::collections::BTreeSet;

use crate::{
    anim::Keyframes,
    anim_ease::Ease,
    foundation::error::{TileGridError, TileGridResult},
};

/// Nominal tile size used to derive the row/column counts.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum BaseCellSize {
    /// Fixed size in pixels.
    Pixels(f64),
    /// Responsive size: the surface width divided by this value.
    WidthDivisor(f64),
}

impl BaseCellSize {
    /// Resolve to pixels against the live surface width.
    pub fn resolve(self, surface_width: f64) -> f64 {
        match self {
            Self::Pixels(px) => px,
            Self::WidthDivisor(n) => {
                if n > 0.0 {
                    surface_width / n
                } else {
                    0.0
                }
            }
        }
    }
}

impl Default for BaseCellSize {
    fn default() -> Self {
        Self::Pixels(86.0)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StaggerConfig {
    /// Total delay spread across the grid, in seconds. The farthest cell starts this late.
    pub amount: f64,
    /// Per-cell keyframe sequence length, in seconds.
    pub duration: f64,
    pub ease: Ease,
    pub ease_each: Ease,
    pub scale: Vec<f64>,
    pub opacity: Vec<f64>,
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            amount: 1.0,
            duration: 1.3,
            ease: Ease::OutQuart,
            ease_each: Ease::InOutQuad,
            scale: vec![1.0, 0.9, 1.0],
            opacity: vec![1.0, 0.8, 1.0],
        }
    }
}

impl StaggerConfig {
    pub fn scale_keyframes(&self) -> Keyframes {
        Keyframes::new(self.scale.clone(), self.ease_each)
    }

    pub fn opacity_keyframes(&self) -> Keyframes {
        Keyframes::new(self.opacity.clone(), self.ease_each)
    }
}

/// Largest accepted `hover.glow_radius`, in pixels.
pub const MAX_GLOW_RADIUS: u32 = 256;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub duration: f64,
    pub ease: Ease,
    pub stroke_width: f64,
    /// Gaussian glow radius in pixels; 0 disables the glow.
    pub glow_radius: u32,
    /// Straight-alpha outline colour.
    pub rgba: [u8; 4],
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            duration: 0.8,
            ease: Ease::OutExpo,
            stroke_width: 5.0,
            glow_radius: 10,
            rgba: [255, 255, 255, 255],
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlackoutConfig {
    pub indices: BTreeSet<usize>,
    /// Chance in `[0, 1]` that any other cell is blacked out, drawn from `seed`.
    pub probability: f64,
    pub seed: u64,
    /// Straight-alpha overlay colour.
    pub rgba: [u8; 4],
    /// Skip the image region of blacked-out cells and draw only the overlay.
    pub skip_image: bool,
}

impl Default for BlackoutConfig {
    fn default() -> Self {
        Self {
            indices: BTreeSet::new(),
            probability: 0.0,
            seed: 0,
            rgba: [0, 0, 0, 128],
            skip_image: false,
        }
    }
}

impl BlackoutConfig {
    pub fn is_blacked_out(&self, index: usize) -> bool {
        if self.indices.contains(&index) {
            return true;
        }
        if self.probability <= 0.0 {
            return false;
        }
        let roll = mix64(self.seed ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        // Top 53 bits as a uniform value in [0, 1).
        let unit = (roll >> 11) as f64 / (1u64 << 53) as f64;
        unit < self.probability
    }
}

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Left inset of the cover-fit region, in pixels.
    pub offset_x: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub base_cell_size: BaseCellSize,
    pub gap: f64,
    pub border_radius: f64,
    pub stagger: StaggerConfig,
    pub hover: HoverConfig,
    pub blackout: BlackoutConfig,
    pub background: BackgroundConfig,
    /// Straight-alpha colour the surface is cleared to before every redraw.
    pub clear_rgba: [u8; 4],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            base_cell_size: BaseCellSize::default(),
            gap: 2.0,
            border_radius: 6.0,
            stagger: StaggerConfig::default(),
            hover: HoverConfig::default(),
            blackout: BlackoutConfig::default(),
            background: BackgroundConfig::default(),
            clear_rgba: [18, 20, 28, 255],
        }
    }
}

impl GridConfig {
    pub fn from_json_str(json: &str) -> TileGridResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> TileGridResult<()> {
        match self.base_cell_size {
            BaseCellSize::Pixels(px) => non_negative("base_cell_size.Pixels", px, true)?,
            BaseCellSize::WidthDivisor(n) => {
                non_negative("base_cell_size.WidthDivisor", n, true)?
            }
        }
        non_negative("gap", self.gap, false)?;
        non_negative("border_radius", self.border_radius, false)?;

        non_negative("stagger.amount", self.stagger.amount, false)?;
        non_negative("stagger.duration", self.stagger.duration, false)?;
        self.stagger.scale_keyframes().validate()?;
        self.stagger.opacity_keyframes().validate()?;
        if self.stagger.scale.iter().any(|v| *v < 0.0) {
            return Err(TileGridError::validation(
                "stagger.scale keyframes must be >= 0",
            ));
        }
        if self.stagger.opacity.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(TileGridError::validation(
                "stagger.opacity keyframes must be in [0, 1]",
            ));
        }

        non_negative("hover.duration", self.hover.duration, false)?;
        non_negative("hover.stroke_width", self.hover.stroke_width, false)?;
        if self.hover.glow_radius > MAX_GLOW_RADIUS {
            return Err(TileGridError::validation(format!(
                "hover.glow_radius must be <= {MAX_GLOW_RADIUS} (got {})",
                self.hover.glow_radius
            )));
        }

        let p = self.blackout.probability;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(TileGridError::validation(
                "blackout.probability must be in [0, 1]",
            ));
        }

        non_negative("background.offset_x", self.background.offset_x, false)?;
        Ok(())
    }
}

fn non_negative(field: &str, v: f64, strictly_positive: bool) -> TileGridResult<()> {
    let ok = v.is_finite() && if strictly_positive { v > 0.0 } else { v >= 0.0 };
    if ok {
        return Ok(());
    }
    let bound = if strictly_positive { "> 0" } else { ">= 0" };
    Err(TileGridError::validation(format!(
        "{field} must be finite and {bound} (got {v})"
    )))
}
