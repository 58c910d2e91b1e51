use tilegrid::{BaseCellSize, Grid};

#[test]
fn rows_and_cols_follow_floor_division() {
    for (w, h, base) in [
        (1920.0, 1080.0, 86.0),
        (1280.0, 720.0, 100.0),
        (333.0, 777.0, 41.5),
        (86.0, 86.0, 86.0),
        (85.0, 1000.0, 86.0),
    ] {
        let g = Grid::compute(w, h, base);
        assert_eq!(g.rows, (h / base).floor() as usize, "{w}x{h}@{base}");
        assert_eq!(g.cols, (w / base).floor() as usize, "{w}x{h}@{base}");
        assert_eq!(g.number_of_cells(), g.rows * g.cols);
    }
}

#[test]
fn full_hd_reference_layout() {
    let g = Grid::compute(1920.0, 1080.0, 86.0);
    assert_eq!((g.rows, g.cols, g.number_of_cells()), (12, 22, 264));
    assert!((g.cell_width - 87.27).abs() < 0.01);
    assert_eq!(g.cell_height, 90.0);
    assert_eq!(g.index_at(100.0, 95.0), Some(23));
}

#[test]
fn index_to_row_col_is_a_bijection() {
    let g = Grid::compute(1000.0, 600.0, 70.0);
    let mut seen = std::collections::BTreeSet::new();
    for i in 0..g.number_of_cells() {
        let (r, c) = g.row_col(i);
        assert!(r < g.rows && c < g.cols);
        assert_eq!(g.index_of(r, c), i);
        assert!(seen.insert((r, c)));
    }
    assert_eq!(seen.len(), g.rows * g.cols);
}

#[test]
fn pixel_round_trip_matches_floor_of_cell_size() {
    let g = Grid::compute(1920.0, 1080.0, 86.0);
    let mut state = 0x1234_5678_9ABC_DEF0u64;
    for _ in 0..500 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let x = (state >> 11) as f64 / (1u64 << 53) as f64 * 1919.0;
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let y = (state >> 11) as f64 / (1u64 << 53) as f64 * 1079.0;

        let idx = g.index_at(x, y).unwrap();
        let expected = (
            ((y / g.cell_height).floor() as usize).min(g.rows - 1),
            ((x / g.cell_width).floor() as usize).min(g.cols - 1),
        );
        assert_eq!(g.row_col(idx), expected, "({x}, {y})");
    }
}

#[test]
fn out_of_range_pointer_clamps_into_grid() {
    let g = Grid::compute(1920.0, 1080.0, 86.0);
    let last = g.number_of_cells() - 1;
    assert_eq!(g.index_at(-10.0, -10.0), Some(0));
    assert_eq!(g.index_at(1920.0, 1080.0), Some(last));
    assert_eq!(g.index_at(99_999.0, 99_999.0), Some(last));
    // Past the right edge stays on the same row.
    assert_eq!(g.row_col(g.index_at(5000.0, 95.0).unwrap()), (1, 21));
}

#[test]
fn zero_surface_has_no_cells() {
    let g = Grid::compute(0.0, 0.0, 86.0);
    assert_eq!((g.rows, g.cols, g.number_of_cells()), (0, 0, 0));
    assert_eq!(g.index_at(0.0, 0.0), None);
}

#[test]
fn width_divisor_resolves_against_surface() {
    let base = BaseCellSize::WidthDivisor(20.0).resolve(1920.0);
    let g = Grid::compute(1920.0, 1080.0, base);
    assert_eq!((g.rows, g.cols), (11, 20));
    assert_eq!(BaseCellSize::Pixels(86.0).resolve(10.0), 86.0);
}
