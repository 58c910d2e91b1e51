//! Grid layout: surface size + base cell size -> rows, columns and exact cell size.
//!
//! `base_cell_size` only approximates the tile size. The exact `cell_width` and
//! `cell_height` are back-computed so the cells tile the surface with no remainder.

use crate::foundation::core::{Point, Rect, Size};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    pub gap: f64,
    pub base_cell_size: f64,
}

impl Grid {
    /// Compute the layout for a surface.
    ///
    /// A degenerate surface (either dimension `<= 0`, a non-positive base size, or any
    /// non-finite input) yields an empty grid rather than an error.
    pub fn compute(surface_width: f64, surface_height: f64, base_cell_size: f64) -> Self {
        let valid = surface_width.is_finite()
            && surface_height.is_finite()
            && base_cell_size.is_finite()
            && surface_width > 0.0
            && surface_height > 0.0
            && base_cell_size > 0.0;
        if !valid {
            return Self {
                base_cell_size,
                ..Self::default()
            };
        }

        let rows = (surface_height / base_cell_size).floor() as usize;
        let cols = (surface_width / base_cell_size).floor() as usize;
        Self {
            rows,
            cols,
            cell_width: if cols > 0 {
                surface_width / cols as f64
            } else {
                0.0
            },
            cell_height: if rows > 0 {
                surface_height / rows as f64
            } else {
                0.0
            },
            gap: 0.0,
            base_cell_size,
        }
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    pub fn number_of_cells(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.number_of_cells() == 0
    }

    pub fn cell_size(&self) -> Size {
        Size::new(self.cell_width, self.cell_height)
    }

    /// Row-major `(row, col)` of `index`. Meaningless for an empty grid.
    pub fn row_col(&self, index: usize) -> (usize, usize) {
        if self.cols == 0 {
            return (0, 0);
        }
        (index / self.cols, index % self.cols)
    }

    pub fn index_of(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn cell_origin(&self, index: usize) -> Point {
        let (row, col) = self.row_col(index);
        Point::new(
            col as f64 * self.cell_width,
            row as f64 * self.cell_height,
        )
    }

    pub fn cell_rect(&self, index: usize) -> Rect {
        Rect::from_origin_size(self.cell_origin(index), self.cell_size())
    }

    /// Resolve a surface-space pixel to a cell index.
    ///
    /// Row and column are clamped independently, so positions past an edge (or
    /// fractional rounding at the border) resolve to the nearest edge cell. Returns
    /// `None` when the grid has no cells.
    pub fn index_at(&self, x: f64, y: f64) -> Option<usize> {
        if self.is_empty() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let col = axis_slot(x, self.cell_width, self.cols);
        let row = axis_slot(y, self.cell_height, self.rows);
        Some(self.index_of(row, col).min(self.number_of_cells() - 1))
    }

    /// Euclidean distance between two cells, in cell units.
    pub fn grid_distance(&self, a: usize, b: usize) -> f64 {
        let (ra, ca) = self.row_col(a);
        let (rb, cb) = self.row_col(b);
        let dr = ra as f64 - rb as f64;
        let dc = ca as f64 - cb as f64;
        (dr * dr + dc * dc).sqrt()
    }
}

fn axis_slot(pos: f64, extent: f64, count: usize) -> usize {
    if extent <= 0.0 || pos <= 0.0 {
        return 0;
    }
    ((pos / extent).floor() as usize).min(count - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_hd_layout() {
        let g = Grid::compute(1920.0, 1080.0, 86.0);
        assert_eq!(g.rows, 12);
        assert_eq!(g.cols, 22);
        assert_eq!(g.number_of_cells(), 264);
        assert!((g.cell_width - 87.272_727).abs() < 1e-5);
        assert_eq!(g.cell_height, 90.0);
    }

    #[test]
    fn degenerate_surfaces_are_empty() {
        for (w, h) in [(0.0, 0.0), (0.0, 100.0), (100.0, -1.0), (f64::NAN, 10.0)] {
            let g = Grid::compute(w, h, 86.0);
            assert_eq!((g.rows, g.cols, g.number_of_cells()), (0, 0, 0));
            assert_eq!(g.index_at(1.0, 1.0), None);
        }
        assert!(Grid::compute(100.0, 100.0, 0.0).is_empty());
    }

    #[test]
    fn narrow_surface_keeps_row_count_but_has_no_cells() {
        let g = Grid::compute(50.0, 400.0, 86.0);
        assert_eq!(g.rows, 4);
        assert_eq!(g.cols, 0);
        assert_eq!(g.cell_width, 0.0);
        assert!(g.is_empty());
    }

    #[test]
    fn click_scenario_resolves_index_23() {
        let g = Grid::compute(1920.0, 1080.0, 86.0);
        assert_eq!(g.index_at(100.0, 95.0), Some(23));
        assert_eq!(g.row_col(23), (1, 1));
    }

    #[test]
    fn out_of_range_positions_clamp_per_axis() {
        let g = Grid::compute(1920.0, 1080.0, 86.0);
        assert_eq!(g.index_at(-5.0, -5.0), Some(0));
        assert_eq!(g.index_at(1920.0, 0.0), Some(21));
        assert_eq!(g.index_at(5000.0, 5000.0), Some(263));
        assert_eq!(g.index_at(0.0, 1080.0), Some(11 * 22));
    }

    #[test]
    fn cell_geometry_is_derived_from_index() {
        let g = Grid::compute(1920.0, 1080.0, 86.0);
        let r = g.cell_rect(23);
        assert!((r.x0 - 1920.0 / 22.0).abs() < 1e-9);
        assert_eq!(r.y0, 90.0);
        assert!((r.width() - g.cell_width).abs() < 1e-9);
        let last = g.cell_rect(263);
        assert!((last.x1 - 1920.0).abs() < 1e-6);
        assert!((last.y1 - 1080.0).abs() < 1e-6);
    }

    #[test]
    fn grid_distance_is_euclidean_in_cells() {
        let g = Grid::compute(500.0, 500.0, 100.0);
        assert_eq!(g.grid_distance(0, 0), 0.0);
        assert_eq!(g.grid_distance(0, 4), 4.0);
        assert_eq!(g.grid_distance(0, g.index_of(3, 4)), 5.0);
    }
}
