pub mod compile;
pub mod cpu;

use crate::{background::BackgroundLayer, foundation::error::TileGridResult};

pub use compile::{CellDraw, DrawOp, FramePlan, HoverDraw, Overlay, compile_frame, render_cell};
pub use cpu::CpuBackend;

#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
            premultiplied: true,
        }
    }

    /// Premultiplied RGBA of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Un-premultiplied copy of the pixel data, ready for PNG encoding.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        if !self.premultiplied {
            return self.data.clone();
        }
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 {
                px[..3].fill(0);
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Executes a compiled [`FramePlan`]. The background layer supplies the pixels cells crop.
pub trait RenderBackend {
    fn render_plan(
        &mut self,
        plan: &FramePlan,
        background: &BackgroundLayer,
    ) -> TileGridResult<FrameRGBA>;
}
