use tilegrid::{
    Canvas, CpuBackend, EventScript, GridConfig, PreparedImage, TileGrid, TileGridError,
};

fn grid() -> TileGrid {
    let image = PreparedImage::from_straight_rgba8(2, 1, vec![200, 40, 40, 255, 40, 40, 200, 255])
        .unwrap();
    TileGrid::new(GridConfig::default(), &Canvas::new(172, 86), &image).unwrap()
}

const CLICK_SCRIPT: &str = r#"{
    "fps": {"num": 10, "den": 1},
    "duration": 3.0,
    "events": [
        {"at": 0.5, "event": {"kind": "click", "x": 130, "y": 40}},
        {"at": 9.0, "event": {"kind": "pointer_leave"}}
    ]
}"#;

#[test]
fn playback_draws_only_while_something_moves() {
    let script = EventScript::from_json_str(CLICK_SCRIPT).unwrap();
    assert_eq!(script.frame_count(), 30);

    let mut grid = grid();
    let mut seen = Vec::new();
    let drawn = script
        .play(&mut grid, &mut CpuBackend::new(), |idx, frame| {
            assert_eq!((frame.width, frame.height), (172, 86));
            seen.push(idx.0);
            Ok(())
        })
        .unwrap();

    assert_eq!(drawn as usize, seen.len());
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    // The first frame paints, then nothing until the click lands.
    assert_eq!(seen[0], 0);
    assert_eq!(seen[1], 5);
    assert!((20..=26).contains(&seen.len()), "{seen:?}");
    assert!(*seen.last().unwrap() < 29);

    assert_eq!(grid.scene().stagger().run().map(|r| r.origin()), None);
    assert!(!grid.is_animating());
    // Events past the end of playback are never dispatched.
    assert!(grid.scene().hover().state().tracked_index.is_none());
}

#[test]
fn frame_callback_errors_stop_playback() {
    let script = EventScript::from_json_str(CLICK_SCRIPT).unwrap();
    let mut grid = grid();
    let mut calls = 0;
    let err = script
        .play(&mut grid, &mut CpuBackend::new(), |_, _| {
            calls += 1;
            Err(TileGridError::render("sink closed"))
        })
        .unwrap_err();
    assert!(matches!(err, TileGridError::Render(_)));
    assert_eq!(calls, 1);
}

#[test]
fn dispatch_until_replays_the_click_origin() {
    let script = EventScript::from_json_str(CLICK_SCRIPT).unwrap();
    let mut grid = grid();
    assert_eq!(script.dispatch_until(&mut grid, 0, 0.4).unwrap(), 0);
    assert_eq!(script.dispatch_until(&mut grid, 0, 0.5).unwrap(), 1);
    assert_eq!(grid.now(), 0.5);
    let run = grid.scene().stagger().run().unwrap();
    assert_eq!(run.origin(), 1);
    assert_eq!(run.delays(), &[1.0, 0.0]);
}
