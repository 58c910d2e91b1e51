use crate::{
    config::{BlackoutConfig, GridConfig},
    foundation::core::{Point, Rect},
    layout::Grid,
};

/// Static per-tile drawing constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellStyle {
    pub gap: f64,
    pub border_radius: f64,
}

impl CellStyle {
    pub fn from_config(cfg: &GridConfig) -> Self {
        Self {
            gap: cfg.gap,
            border_radius: cfg.border_radius,
        }
    }
}

/// One tile: an index plus its animation state.
///
/// Geometry is never stored. Every accessor takes the current [`Grid`], so a cell can
/// not disagree with the layout it is drawn against.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    index: usize,
    black_out: bool,
    pub scale: f64,
    pub opacity: f64,
}

impl Cell {
    pub const REST_SCALE: f64 = 1.0;
    pub const REST_OPACITY: f64 = 1.0;

    pub fn new(index: usize, black_out: bool) -> Self {
        Self {
            index,
            black_out,
            scale: Self::REST_SCALE,
            opacity: Self::REST_OPACITY,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn black_out(&self) -> bool {
        self.black_out
    }

    pub fn row(&self, grid: &Grid) -> usize {
        grid.row_col(self.index).0
    }

    pub fn col(&self, grid: &Grid) -> usize {
        grid.row_col(self.index).1
    }

    pub fn origin(&self, grid: &Grid) -> Point {
        grid.cell_origin(self.index)
    }

    pub fn rect(&self, grid: &Grid) -> Rect {
        grid.cell_rect(self.index)
    }

    pub fn center(&self, grid: &Grid) -> Point {
        self.rect(grid).center()
    }

    /// Image rect in cell-local coordinates (origin at the cell centre), inset by `gap`.
    ///
    /// Collapses to a zero-size rect at the centre when the gap eats the whole cell.
    pub fn inner_rect(&self, grid: &Grid, style: &CellStyle) -> Rect {
        let w = (grid.cell_width - 2.0 * style.gap).max(0.0);
        let h = (grid.cell_height - 2.0 * style.gap).max(0.0);
        Rect::new(-w * 0.5, -h * 0.5, w * 0.5, h * 0.5)
    }

    /// Full cell rect in cell-local coordinates.
    pub fn local_rect(&self, grid: &Grid) -> Rect {
        let (w, h) = (grid.cell_width, grid.cell_height);
        Rect::new(-w * 0.5, -h * 0.5, w * 0.5, h * 0.5)
    }

    pub fn set_animated(&mut self, scale: f64, opacity: f64) {
        self.scale = scale.max(0.0);
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn reset(&mut self) {
        self.scale = Self::REST_SCALE;
        self.opacity = Self::REST_OPACITY;
    }

    pub fn is_at_rest(&self) -> bool {
        self.scale == Self::REST_SCALE && self.opacity == Self::REST_OPACITY
    }
}

/// Fresh cells for every slot of `grid`, all at rest.
pub fn build_cells(grid: &Grid, blackout: &BlackoutConfig) -> Vec<Cell> {
    (0..grid.number_of_cells())
        .map(|i| Cell::new(i, blackout.is_blacked_out(i)))
        .collect()
}
