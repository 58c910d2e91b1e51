use crate::{
    cell::{Cell, CellStyle},
    config::BlackoutConfig,
    foundation::core::{Affine, Canvas, Point, Rect},
    layout::Grid,
    scene::Scene,
};

#[derive(Clone, Debug, PartialEq)]
/// Backend-agnostic draw list for a single frame.
///
/// Ops are executed strictly in order: one `Clear`, one `Background`, every cell in index
/// order, then at most one `Hover` overlay.
pub struct FramePlan {
    pub canvas: Canvas,
    pub ops: Vec<DrawOp>,
}

impl FramePlan {
    pub fn cell_ops(&self) -> impl Iterator<Item = &CellDraw> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Cell(c) => Some(c),
            _ => None,
        })
    }

    pub fn hover_op(&self) -> Option<&HoverDraw> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Hover(h) => Some(h),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Draw operation emitted by [`compile_frame`].
pub enum DrawOp {
    /// Fill the whole surface with a straight-alpha colour.
    Clear { rgba: [u8; 4] },
    /// Bind the cover-fitted background buffer the following cells crop from. The buffer
    /// itself is never drawn onto the surface, so gaps show the clear colour.
    Background,
    Cell(CellDraw),
    Hover(HoverDraw),
}

#[derive(Clone, Debug, PartialEq)]
/// One tile: a rounded crop of the background buffer, scaled about the cell centre.
pub struct CellDraw {
    pub index: usize,
    /// Region of the background buffer the tile shows (the full, un-inset cell rect).
    pub source: Rect,
    pub center: Point,
    pub scale: f64,
    pub opacity: f32,
    /// Rounded clip rect in cell-local coordinates (origin at `center`).
    pub inner: Rect,
    pub radius: f64,
    pub draw_image: bool,
    pub overlay: Option<Overlay>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Translucent fill drawn after the image, covering the whole cell including the gap band.
pub struct Overlay {
    /// Cell-local, un-inset rect.
    pub rect: Rect,
    pub rgba: [u8; 4],
}

impl CellDraw {
    /// Cell-local to surface space.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.center.to_vec2()) * Affine::scale(self.scale)
    }

    /// Background-buffer space to cell-local space: `source` is squeezed onto `inner`.
    pub fn paint_transform(&self) -> Affine {
        let sx = ratio(self.inner.width(), self.source.width());
        let sy = ratio(self.inner.height(), self.source.height());
        Affine::translate((self.inner.x0, self.inner.y0))
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate((-self.source.x0, -self.source.y0))
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
            && self.scale > 0.0
            && (self.inner.area() > 0.0 || self.overlay.is_some_and(|o| o.rect.area() > 0.0))
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Hover outline in surface coordinates.
pub struct HoverDraw {
    pub rect: Rect,
    pub radius: f64,
    pub stroke_width: f64,
    pub rgba: [u8; 4],
    pub opacity: f32,
    pub glow_radius: u32,
}

/// Turn one cell into its draw op. Pure: reads the cell and the current layout only.
pub fn render_cell(
    cell: &Cell,
    grid: &Grid,
    style: &CellStyle,
    blackout: &BlackoutConfig,
) -> CellDraw {
    let black_out = cell.black_out();
    CellDraw {
        index: cell.index(),
        source: cell.rect(grid),
        center: cell.center(grid),
        scale: cell.scale,
        opacity: cell.opacity as f32,
        inner: cell.inner_rect(grid, style),
        radius: style.border_radius,
        draw_image: !(black_out && blackout.skip_image),
        overlay: black_out.then(|| Overlay {
            rect: cell.local_rect(grid),
            rgba: blackout.rgba,
        }),
    }
}

#[tracing::instrument(skip(scene), fields(cells = scene.cells.len()))]
pub fn compile_frame(scene: &Scene) -> FramePlan {
    let mut ops = vec![DrawOp::Clear {
        rgba: scene.config.clear_rgba,
    }];
    if scene.canvas.is_empty() {
        return FramePlan {
            canvas: scene.canvas,
            ops,
        };
    }

    ops.push(DrawOp::Background);
    let style = scene.style();
    ops.extend(
        scene
            .cells
            .iter()
            .map(|cell| DrawOp::Cell(render_cell(cell, &scene.grid, &style, &scene.config.blackout))),
    );

    let hover = scene.hover.state();
    if hover.opacity > 0.0 && !scene.grid.is_empty() {
        let cfg = &scene.config.hover;
        ops.push(DrawOp::Hover(HoverDraw {
            rect: scene.hover.rect(),
            radius: scene.config.border_radius,
            stroke_width: cfg.stroke_width,
            rgba: cfg.rgba,
            opacity: hover.opacity as f32,
            glow_radius: cfg.glow_radius,
        }));
    }

    FramePlan {
        canvas: scene.canvas,
        ops,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;

    fn grid() -> Grid {
        Grid::compute(400.0, 200.0, 100.0)
    }

    #[test]
    fn cell_draw_centres_and_insets() {
        let g = grid();
        let style = CellStyle {
            gap: 2.0,
            border_radius: 6.0,
        };
        let draw = render_cell(&Cell::new(5, false), &g, &style, &BlackoutConfig::default());
        assert_eq!(draw.source, Rect::new(100.0, 100.0, 200.0, 200.0));
        assert_eq!(draw.center, Point::new(150.0, 150.0));
        assert_eq!(draw.inner, Rect::new(-48.0, -48.0, 48.0, 48.0));
        assert!(draw.draw_image);
        assert!(draw.overlay.is_none());

        // At rest the source top-left lands on the inner top-left.
        let p = draw.paint_transform() * Point::new(100.0, 100.0);
        assert!((p.x + 48.0).abs() < 1e-9 && (p.y + 48.0).abs() < 1e-9);
        let surface = draw.transform() * Point::new(-48.0, -48.0);
        assert_eq!(surface, Point::new(102.0, 102.0));
    }

    #[test]
    fn transform_scales_about_centre() {
        let g = grid();
        let mut cell = Cell::new(0, false);
        cell.set_animated(0.5, 0.8);
        let style = CellStyle::from_config(&GridConfig::default());
        let draw = render_cell(&cell, &g, &style, &BlackoutConfig::default());
        assert_eq!(draw.transform() * Point::ZERO, Point::new(50.0, 50.0));
        assert_eq!(draw.transform() * Point::new(50.0, 0.0), Point::new(75.0, 50.0));
        assert_eq!(draw.opacity, 0.8);
    }

    #[test]
    fn blackout_adds_overlay_and_may_skip_image() {
        let g = grid();
        let style = CellStyle::from_config(&GridConfig::default());
        let mut blackout = BlackoutConfig::default();
        let draw = render_cell(&Cell::new(1, true), &g, &style, &blackout);
        let overlay = draw.overlay.unwrap();
        assert_eq!(overlay.rgba, [0, 0, 0, 128]);
        assert_eq!(overlay.rect, Rect::new(-50.0, -50.0, 50.0, 50.0));
        assert!(draw.draw_image);

        blackout.skip_image = true;
        assert!(!render_cell(&Cell::new(1, true), &g, &style, &blackout).draw_image);
        assert!(render_cell(&Cell::new(2, false), &g, &style, &blackout).draw_image);
    }

    #[test]
    fn blacked_out_cell_stays_visible_when_gap_swallows_the_image() {
        let g = grid();
        let style = CellStyle {
            gap: 60.0,
            border_radius: 6.0,
        };
        let blackout = BlackoutConfig::default();
        let dark = render_cell(&Cell::new(0, true), &g, &style, &blackout);
        assert_eq!(dark.inner.area(), 0.0);
        assert!(dark.is_visible());
        assert!(!render_cell(&Cell::new(1, false), &g, &style, &blackout).is_visible());
    }

    #[test]
    fn frame_ops_follow_fixed_order() {
        let img = crate::assets::PreparedImage::from_straight_rgba8(1, 1, vec![9, 9, 9, 255]).unwrap();
        let mut scene = Scene::new(GridConfig::default(), Canvas::new(258, 172), &img).unwrap();
        let plan = compile_frame(&scene);
        assert!(matches!(plan.ops[0], DrawOp::Clear { rgba: [18, 20, 28, 255] }));
        assert!(matches!(plan.ops[1], DrawOp::Background));
        let indices: Vec<usize> = plan.cell_ops().map(|c| c.index).collect();
        assert_eq!(indices, (0..6).collect::<Vec<_>>());
        assert!(plan.hover_op().is_none());

        let grid = scene.grid;
        scene.hover.hover(4, &grid, 0.0);
        scene.tick(1.0);
        let plan = compile_frame(&scene);
        assert!(matches!(plan.ops.last(), Some(DrawOp::Hover(_))));
        assert_eq!(plan.hover_op().unwrap().rect, grid.cell_rect(4));

        scene.relayout(Canvas::new(0, 0)).unwrap();
        assert_eq!(compile_frame(&scene).ops.len(), 1);
    }
}
