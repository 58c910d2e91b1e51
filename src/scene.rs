use crate::{
    assets::PreparedImage,
    background::BackgroundLayer,
    cell::{Cell, CellStyle, build_cells},
    config::GridConfig,
    foundation::{core::Canvas, error::TileGridResult},
    hover::HoverIndicator,
    layout::Grid,
    stagger::StaggerAnimator,
};

/// Everything one frame is drawn from: layout, tiles, background buffer and the two
/// animation drivers.
#[derive(Debug)]
pub struct Scene {
    pub(crate) config: GridConfig,
    pub(crate) canvas: Canvas,
    pub(crate) grid: Grid,
    pub(crate) cells: Vec<Cell>,
    pub(crate) background: BackgroundLayer,
    pub(crate) hover: HoverIndicator,
    pub(crate) stagger: StaggerAnimator,
}

impl Scene {
    pub fn new(config: GridConfig, canvas: Canvas, image: &PreparedImage) -> TileGridResult<Self> {
        canvas.as_u16()?;
        let grid = layout_for(&config, canvas);
        let background = BackgroundLayer::new(image, canvas, config.background.offset_x)?;
        let cells = build_cells(&grid, &config.blackout);
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            rows = grid.rows,
            cols = grid.cols,
            "scene built"
        );
        Ok(Self {
            hover: HoverIndicator::new(&config.hover, &grid),
            stagger: StaggerAnimator::new(config.stagger.clone()),
            config,
            canvas,
            grid,
            cells,
            background,
        })
    }

    /// Reflow for a new surface size: grid, then background, then cells. In-flight
    /// animations refer to the old grid and are dropped.
    #[tracing::instrument(skip(self), fields(from_w = self.canvas.width, from_h = self.canvas.height))]
    pub fn relayout(&mut self, canvas: Canvas) -> TileGridResult<()> {
        canvas.as_u16()?;
        let grid = layout_for(&self.config, canvas);
        self.background.resize(canvas)?;
        self.canvas = canvas;
        self.grid = grid;
        self.cells = build_cells(&self.grid, &self.config.blackout);
        self.stagger.cancel(&mut self.cells);
        self.hover.reset_for(&self.grid);
        tracing::debug!(
            rows = grid.rows,
            cols = grid.cols,
            cells = self.cells.len(),
            "relayout"
        );
        Ok(())
    }

    /// Advance both animations to `now`. Returns `true` while either is still running.
    pub fn tick(&mut self, now: f64) -> bool {
        let hovering = self.hover.tick(now);
        let staggering = self.stagger.tick(now, &mut self.cells);
        hovering || staggering
    }

    pub fn is_animating(&self) -> bool {
        self.hover.is_active() || self.stagger.is_active()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn background(&self) -> &BackgroundLayer {
        &self.background
    }

    pub fn hover(&self) -> &HoverIndicator {
        &self.hover
    }

    pub fn stagger(&self) -> &StaggerAnimator {
        &self.stagger
    }

    pub fn style(&self) -> CellStyle {
        CellStyle::from_config(&self.config)
    }
}

fn layout_for(config: &GridConfig, canvas: Canvas) -> Grid {
    let base = config.base_cell_size.resolve(f64::from(canvas.width));
    Grid::compute(f64::from(canvas.width), f64::from(canvas.height), base).with_gap(config.gap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> PreparedImage {
        PreparedImage::from_straight_rgba8(2, 2, [90, 120, 150, 255].repeat(4)).unwrap()
    }

    #[test]
    fn builds_layout_and_cells_for_surface() {
        let scene = Scene::new(GridConfig::default(), Canvas::new(430, 180), &image()).unwrap();
        assert_eq!((scene.grid().rows, scene.grid().cols), (2, 5));
        assert_eq!(scene.cells().len(), 10);
        assert_eq!(scene.grid().gap, 2.0);
        assert!(!scene.is_animating());
    }

    #[test]
    fn relayout_rebuilds_cells_and_drops_animations() {
        let mut scene = Scene::new(GridConfig::default(), Canvas::new(430, 180), &image()).unwrap();
        let grid = scene.grid;
        scene.stagger.trigger(3, &grid, &mut scene.cells, 0.0);
        scene.hover.hover(4, &grid, 0.0);
        assert!(scene.tick(0.2));

        scene.relayout(Canvas::new(172, 86)).unwrap();
        assert_eq!(scene.cells().len(), 2);
        assert!(!scene.is_animating());
        assert!(scene.cells().iter().all(Cell::is_at_rest));
        assert_eq!(scene.hover().state().opacity, 0.0);
        assert_eq!(scene.background().canvas(), Canvas::new(172, 86));
    }

    #[test]
    fn zero_surface_is_an_empty_scene() {
        let mut scene = Scene::new(GridConfig::default(), Canvas::new(200, 200), &image()).unwrap();
        scene.relayout(Canvas::new(0, 0)).unwrap();
        assert!(scene.grid().is_empty());
        assert!(scene.cells().is_empty());
        assert!(!scene.tick(1.0));
    }

    #[test]
    fn oversized_surface_leaves_scene_untouched() {
        let mut scene = Scene::new(GridConfig::default(), Canvas::new(200, 200), &image()).unwrap();
        assert!(scene.relayout(Canvas::new(80_000, 10)).is_err());
        assert_eq!(scene.canvas(), Canvas::new(200, 200));
        assert_eq!(scene.cells().len(), 4);
    }
}
