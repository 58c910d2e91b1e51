use std::sync::Arc;

use crate::{
    background::BackgroundLayer,
    foundation::core::{Affine, Rect},
    foundation::error::{TileGridError, TileGridResult},
    render::{
        FrameRGBA, RenderBackend,
        compile::{CellDraw, DrawOp, FramePlan, HoverDraw},
    },
};

/// `vello_cpu` executor for [`FramePlan`]s.
///
/// Scene ops (clear, background, cells) go through one `RenderContext` pass. Hover
/// overlays are rasterised separately, blurred for the glow and composited on top.
#[derive(Debug, Default)]
pub struct CpuBackend {
    scratch: Option<vello_cpu::Pixmap>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn scratch_pixmap(&mut self, width: u16, height: u16) -> &mut vello_cpu::Pixmap {
        let reuse = self
            .scratch
            .as_ref()
            .is_some_and(|p| p.width() == width && p.height() == height);
        if !reuse {
            self.scratch = None;
        }
        let pixmap = self
            .scratch
            .get_or_insert_with(|| vello_cpu::Pixmap::new(width, height));
        clear_pixmap(pixmap, [0, 0, 0, 0]);
        pixmap
    }

    /// Rasterise the ring into a scratch buffer covering the hover rect plus the glow
    /// reach, blur a copy for the glow, confine the glow to the hover rect, then lay glow
    /// and ring over `target` at the hover opacity.
    fn composite_hover(
        &mut self,
        target: &mut vello_cpu::Pixmap,
        hover: &HoverDraw,
    ) -> TileGridResult<()> {
        let (tw, th) = (u32::from(target.width()), u32::from(target.height()));
        let Some(region) = PixelRegion::around(hover.rect, hover.glow_radius, tw, th) else {
            return Ok(());
        };
        let (rw, rh) = (region.width as u16, region.height as u16);

        let ring = {
            let scratch = self.scratch_pixmap(rw, rh);
            let mut ctx = vello_cpu::RenderContext::new(rw, rh);
            let to_region = Affine::translate((-f64::from(region.x), -f64::from(region.y)));
            draw_hover_ring(&mut ctx, hover, to_region);
            ctx.flush();
            ctx.render_to_pixmap(scratch);
            scratch.data_as_u8_slice().to_vec()
        };

        let mut layer = vec![0u8; ring.len()];
        if hover.glow_radius > 0 {
            let glow = crate::blur_cpu::glow_rgba8_premul(
                &ring,
                region.width,
                region.height,
                hover.glow_radius,
            )?;
            let keep = hover.rect.with_origin((
                hover.rect.x0 - f64::from(region.x),
                hover.rect.y0 - f64::from(region.y),
            ));
            layer.copy_from_slice(&glow);
            crate::composite_cpu::mask_outside_rect(&mut layer, region.width, region.height, keep)?;
        }
        crate::composite_cpu::over_in_place(&mut layer, &ring, 1.0)?;

        let data = target.data_as_u8_slice_mut();
        for row in 0..region.height {
            let src = (row * region.width * 4) as usize;
            let dst = (((region.y + row) * tw + region.x) * 4) as usize;
            let len = (region.width * 4) as usize;
            crate::composite_cpu::over_in_place(
                &mut data[dst..dst + len],
                &layer[src..src + len],
                hover.opacity,
            )?;
        }
        Ok(())
    }
}

/// Integer pixel window inside the target surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PixelRegion {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl PixelRegion {
    /// `rect` grown by `pad` pixels on every side, rounded out and clipped to the surface.
    fn around(rect: Rect, pad: u32, surface_w: u32, surface_h: u32) -> Option<Self> {
        let grown = rect.inset(f64::from(pad)).expand();
        let x0 = grown.x0.max(0.0);
        let y0 = grown.y0.max(0.0);
        let x1 = grown.x1.min(f64::from(surface_w));
        let y1 = grown.y1.min(f64::from(surface_h));
        if !(x1 > x0 && y1 > y0) {
            return None;
        }
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

impl RenderBackend for CpuBackend {
    fn render_plan(
        &mut self,
        plan: &FramePlan,
        background: &BackgroundLayer,
    ) -> TileGridResult<FrameRGBA> {
        if plan.canvas.is_empty() {
            return Ok(FrameRGBA::empty());
        }
        let (w, h) = plan.canvas.as_u16()?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let mut overlays = Vec::new();
        for op in &plan.ops {
            match op {
                DrawOp::Hover(hover) => overlays.push(*hover),
                op => draw_op(&mut ctx, op, background, w, h)?,
            }
        }
        ctx.flush();

        let mut target = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut target);

        for hover in &overlays {
            self.composite_hover(&mut target, hover)?;
        }

        Ok(FrameRGBA {
            width: plan.canvas.width,
            height: plan.canvas.height,
            data: target.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn draw_op(
    ctx: &mut vello_cpu::RenderContext,
    op: &DrawOp,
    background: &BackgroundLayer,
    w: u16,
    h: u16,
) -> TileGridResult<()> {
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    let full = vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(w), f64::from(h));

    match op {
        DrawOp::Clear { rgba: [r, g, b, a] } => {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(*r, *g, *b, *a));
            ctx.fill_rect(&full);
            Ok(())
        }
        DrawOp::Background => {
            let canvas = background.canvas();
            if (canvas.width, canvas.height) != (u32::from(w), u32::from(h)) {
                return Err(TileGridError::render(format!(
                    "background buffer is {}x{}, frame is {w}x{h}",
                    canvas.width, canvas.height
                )));
            }
            Ok(())
        }
        DrawOp::Cell(cell) => {
            draw_cell(ctx, cell, background);
            Ok(())
        }
        DrawOp::Hover(_) => Err(TileGridError::render(
            "hover overlays are composited outside the scene pass",
        )),
    }
}

fn draw_cell(ctx: &mut vello_cpu::RenderContext, cell: &CellDraw, background: &BackgroundLayer) {
    if !cell.is_visible() {
        return;
    }
    let clip = rounded_rect_path(cell.inner, cell.radius, false);
    ctx.set_transform(affine_to_cpu(cell.transform()));

    let layered = cell.opacity < 1.0;
    if layered {
        ctx.push_opacity_layer(cell.opacity);
    }

    if cell.draw_image
        && cell.inner.area() > 0.0
        && let Some(paint) = background.paint()
    {
        ctx.set_paint_transform(affine_to_cpu(cell.paint_transform()));
        ctx.set_paint(paint);
        ctx.fill_path(&clip);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    }

    if let Some(overlay) = cell.overlay
        && overlay.rect.area() > 0.0
    {
        let [r, g, b, a] = overlay.rgba;
        let rect = overlay.rect;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1));
    }

    if layered {
        ctx.pop_layer();
    }
}

/// Outline band inside `hover.rect`: the rounded rect minus a copy inset by half the stroke
/// width, wound in opposite directions so the non-zero fill leaves the middle open.
fn draw_hover_ring(ctx: &mut vello_cpu::RenderContext, hover: &HoverDraw, transform: Affine) {
    let band = (hover.stroke_width * 0.5).max(0.0);
    let mut path = rounded_rect_path(hover.rect, hover.radius, false);
    let inner = hover.rect.inset(-band);
    if inner.width() > 0.0 && inner.height() > 0.0 {
        let inner_radius = (hover.radius - band).max(0.0);
        for el in rounded_rect_path(inner, inner_radius, true).elements() {
            path.push(*el);
        }
    }
    let [r, g, b, a] = hover.rgba;
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.fill_path(&path);
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

/// Closed rounded rect with quadratic corners. `reverse` flips the winding.
pub(crate) fn rounded_rect_path(rect: Rect, radius: f64, reverse: bool) -> vello_cpu::kurbo::BezPath {
    use vello_cpu::kurbo::Point;

    let rect = rect.abs();
    let r = radius.clamp(0.0, rect.width().min(rect.height()) * 0.5);
    let (x0, y0, x1, y1) = (rect.x0, rect.y0, rect.x1, rect.y1);

    // Each corner: (line end, control point, curve end), clockwise from top-left.
    let mut corners = [
        (Point::new(x1 - r, y0), Point::new(x1, y0), Point::new(x1, y0 + r)),
        (Point::new(x1, y1 - r), Point::new(x1, y1), Point::new(x1 - r, y1)),
        (Point::new(x0 + r, y1), Point::new(x0, y1), Point::new(x0, y1 - r)),
        (Point::new(x0, y0 + r), Point::new(x0, y0), Point::new(x0 + r, y0)),
    ];
    if reverse {
        corners.reverse();
        for (line_end, _, curve_end) in &mut corners {
            std::mem::swap(line_end, curve_end);
        }
    }
    let mut path = vello_cpu::kurbo::BezPath::new();
    path.move_to(Point::new(x0 + r, y0));
    for (line_end, ctrl, curve_end) in corners {
        path.line_to(line_end);
        path.quad_to(ctrl, curve_end);
    }
    path.close_path();
    path
}

pub(crate) fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> TileGridResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| TileGridError::validation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| TileGridError::validation("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(TileGridError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

pub(crate) fn pixmap_paint(pixmap: vello_cpu::Pixmap) -> vello_cpu::Image {
    vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    }
}

pub(crate) fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap, rgba: [u8; 4]) {
    let data = pixmap.data_as_u8_slice_mut();
    for px in data.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}
