//! Off-screen cover-fitted copy of the background image.
//!
//! Cells sample this buffer, never the source image, so every tile crops from the same
//! globally consistent fit.

use std::sync::Arc;

use crate::{
    assets::PreparedImage,
    foundation::core::{Affine, Canvas},
    foundation::error::{TileGridError, TileGridResult},
    render::cpu::{affine_to_cpu, image_premul_bytes_to_pixmap, pixmap_paint},
};

/// Scale + offset that makes an image cover a region while keeping its aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    pub scale: f64,
    pub x: f64,
    pub y: f64,
}

impl CoverFit {
    /// Fit `image_w x image_h` over a `region_w x region_h` region that starts at
    /// `offset_x`. Returns `None` when either side has no area.
    pub fn compute(
        region_w: f64,
        region_h: f64,
        image_w: f64,
        image_h: f64,
        offset_x: f64,
    ) -> Option<Self> {
        if region_w <= 0.0 || region_h <= 0.0 || image_w <= 0.0 || image_h <= 0.0 {
            return None;
        }
        let scale = (region_w / image_w).max(region_h / image_h);
        Some(Self {
            scale,
            x: (region_w - scale * image_w) * 0.5 + offset_x,
            y: (region_h - scale * image_h) * 0.5,
        })
    }

    pub fn transform(&self) -> Affine {
        Affine::translate((self.x, self.y)) * Affine::scale(self.scale)
    }
}

pub struct BackgroundLayer {
    source: vello_cpu::Image,
    source_width: u32,
    source_height: u32,
    offset_x: f64,
    canvas: Canvas,
    fit: Option<CoverFit>,
    buffer: Option<Arc<vello_cpu::Pixmap>>,
}

impl std::fmt::Debug for BackgroundLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundLayer")
            .field("source_width", &self.source_width)
            .field("source_height", &self.source_height)
            .field("offset_x", &self.offset_x)
            .field("canvas", &self.canvas)
            .field("fit", &self.fit)
            .field("has_buffer", &self.buffer.is_some())
            .finish()
    }
}

impl BackgroundLayer {
    pub fn new(image: &PreparedImage, canvas: Canvas, offset_x: f64) -> TileGridResult<Self> {
        if image.is_empty() {
            return Err(TileGridError::image_load("background image has zero area"));
        }
        let pixmap =
            image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let mut layer = Self {
            source: pixmap_paint(pixmap),
            source_width: image.width,
            source_height: image.height,
            offset_x,
            canvas: Canvas::default(),
            fit: None,
            buffer: None,
        };
        layer.resize(canvas)?;
        Ok(layer)
    }

    /// Recompute the fit for a new surface size and redraw the buffer.
    pub fn resize(&mut self, canvas: Canvas) -> TileGridResult<()> {
        let dims = if canvas.is_empty() {
            None
        } else {
            Some(canvas.as_u16()?)
        };
        self.canvas = canvas;
        let surface_w = f64::from(canvas.width);
        // An offset that leaves no region to cover falls back to the full surface.
        let offset_x = if self.offset_x < surface_w {
            self.offset_x
        } else {
            if !canvas.is_empty() {
                tracing::debug!(
                    offset_x = self.offset_x,
                    width = canvas.width,
                    "background offset exceeds surface width, ignoring it"
                );
            }
            0.0
        };
        self.fit = CoverFit::compute(
            surface_w - offset_x,
            f64::from(canvas.height),
            f64::from(self.source_width),
            f64::from(self.source_height),
            offset_x,
        );
        self.buffer = None;

        let (Some(fit), Some((w, h))) = (self.fit, dims) else {
            return Ok(());
        };

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(fit.transform()));
        ctx.set_paint(self.source.clone());
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.source_width),
            f64::from(self.source_height),
        ));
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        self.buffer = Some(Arc::new(pixmap));
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn fit(&self) -> Option<CoverFit> {
        self.fit
    }

    /// Paint that samples the buffer in surface coordinates.
    pub(crate) fn paint(&self) -> Option<vello_cpu::Image> {
        self.buffer
            .as_ref()
            .map(|pixmap| vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::clone(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            })
    }

    /// Premultiplied RGBA of one buffer pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let buffer = self.buffer.as_ref()?;
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let idx = (y as usize * self.canvas.width as usize + x as usize) * 4;
        let data = buffer.data_as_u8_slice();
        Some([data[idx], data[idx + 1], data[idx + 2], data[idx + 3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> PreparedImage {
        PreparedImage::from_straight_rgba8(w, h, rgba.repeat((w * h) as usize)).unwrap()
    }

    fn assert_px_near(got: Option<[u8; 4]>, want: [u8; 4]) {
        let got = got.expect("pixel inside buffer");
        for c in 0..4 {
            assert!(
                (i16::from(got[c]) - i16::from(want[c])).abs() <= 2,
                "got {got:?}, want {want:?}"
            );
        }
    }

    #[test]
    fn cover_fit_scales_by_larger_ratio_and_centres() {
        let fit = CoverFit::compute(1920.0, 1080.0, 1000.0, 1000.0, 0.0).unwrap();
        assert_eq!(fit.scale, 1.92);
        assert_eq!(fit.x, 0.0);
        assert!((fit.y - (1080.0 - 1920.0) * 0.5).abs() < 1e-9);

        let tall = CoverFit::compute(100.0, 400.0, 100.0, 100.0, 0.0).unwrap();
        assert_eq!(tall.scale, 4.0);
        assert_eq!(tall.x, -150.0);
        assert_eq!(tall.y, 0.0);
    }

    #[test]
    fn cover_fit_honours_offset() {
        let fit = CoverFit::compute(80.0, 100.0, 100.0, 100.0, 20.0).unwrap();
        assert_eq!(fit.scale, 1.0);
        assert_eq!(fit.x, (80.0 - 100.0) * 0.5 + 20.0);
        assert!(CoverFit::compute(0.0, 100.0, 10.0, 10.0, 0.0).is_none());
    }

    #[test]
    fn buffer_covers_whole_surface() {
        let layer = BackgroundLayer::new(&solid(4, 2, [200, 10, 10, 255]), Canvas::new(32, 32), 0.0)
            .unwrap();
        for (x, y) in [(0, 0), (31, 0), (16, 16), (0, 31), (31, 31)] {
            assert_px_near(layer.pixel(x, y), [200, 10, 10, 255]);
        }
        assert_eq!(layer.pixel(32, 0), None);
    }

    #[test]
    fn resize_to_zero_drops_buffer() {
        let mut layer =
            BackgroundLayer::new(&solid(2, 2, [0, 0, 255, 255]), Canvas::new(16, 16), 0.0).unwrap();
        assert!(layer.paint().is_some());
        layer.resize(Canvas::new(0, 0)).unwrap();
        assert!(layer.fit().is_none());
        assert!(layer.paint().is_none());
        layer.resize(Canvas::new(8, 4)).unwrap();
        assert_px_near(layer.pixel(7, 3), [0, 0, 255, 255]);
    }

    #[test]
    fn offset_shifts_the_buffer_right() {
        let red = solid(1, 1, [200, 40, 40, 255]);
        let plain = BackgroundLayer::new(&red, Canvas::new(20, 10), 0.0).unwrap();
        assert_eq!(plain.fit().unwrap().x, 0.0);
        assert_px_near(plain.pixel(5, 5), [200, 40, 40, 255]);

        let shifted = BackgroundLayer::new(&red, Canvas::new(20, 10), 10.0).unwrap();
        let fit = shifted.fit().unwrap();
        assert_eq!((fit.scale, fit.x, fit.y), (10.0, 10.0, 0.0));
        assert_px_near(shifted.pixel(5, 5), [0, 0, 0, 0]);
        assert_px_near(shifted.pixel(9, 5), [0, 0, 0, 0]);
        assert_px_near(shifted.pixel(10, 5), [200, 40, 40, 255]);
        assert_px_near(shifted.pixel(19, 5), [200, 40, 40, 255]);
    }

    #[test]
    fn offset_past_the_surface_falls_back_to_full_cover() {
        let red = solid(1, 1, [200, 40, 40, 255]);
        let mut layer = BackgroundLayer::new(&red, Canvas::new(20, 10), 30.0).unwrap();
        assert_eq!(layer.fit().unwrap().x, 0.0);
        assert!(layer.paint().is_some());
        assert_px_near(layer.pixel(2, 5), [200, 40, 40, 255]);

        // Growing past the offset applies it again.
        layer.resize(Canvas::new(40, 10)).unwrap();
        assert_eq!(layer.fit().unwrap().x, 30.0);
        assert_px_near(layer.pixel(2, 5), [0, 0, 0, 0]);
    }

    #[test]
    fn oversized_surface_is_rejected() {
        let mut layer =
            BackgroundLayer::new(&solid(1, 1, [0, 0, 0, 255]), Canvas::new(4, 4), 0.0).unwrap();
        assert!(layer.resize(Canvas::new(70_000, 4)).is_err());
    }
}
