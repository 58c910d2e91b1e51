//! Pointer and surface events, and the router that turns them into animation changes.

use crate::{
    foundation::{
        core::{Canvas, Seconds},
        error::TileGridResult,
    },
    render_loop::RenderLoop,
    scene::Scene,
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    PointerEnter { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerLeave,
    Click { x: f64, y: f64 },
    Resize { width: u32, height: u32 },
}

/// Routes one event at a time against the scene, at the current clock time.
///
/// Borrowed for the duration of a dispatch; it holds no state of its own.
pub struct InputRouter<'a> {
    scene: &'a mut Scene,
    render_loop: &'a mut RenderLoop,
    now: Seconds,
}

impl<'a> InputRouter<'a> {
    pub fn new(scene: &'a mut Scene, render_loop: &'a mut RenderLoop, now: Seconds) -> Self {
        Self {
            scene,
            render_loop,
            now,
        }
    }

    pub fn on_pointer_enter(&mut self, x: f64, y: f64) {
        let Some(index) = self.scene.grid.index_at(x, y) else {
            return;
        };
        let grid = self.scene.grid;
        self.scene.hover.enter(index, &grid, self.now);
        self.render_loop.arm();
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        let Some(index) = self.scene.grid.index_at(x, y) else {
            return;
        };
        let grid = self.scene.grid;
        if self.scene.hover.hover(index, &grid, self.now) {
            self.render_loop.arm();
        }
    }

    pub fn on_pointer_leave(&mut self) {
        if self.scene.grid.is_empty() {
            return;
        }
        self.scene.hover.leave(self.now);
        self.render_loop.arm();
    }

    /// Start a stagger run from the clicked cell. Returns the origin index.
    pub fn on_click(&mut self, x: f64, y: f64) -> Option<usize> {
        let origin = self.scene.grid.index_at(x, y)?;
        let grid = self.scene.grid;
        if !self
            .scene
            .stagger
            .trigger(origin, &grid, &mut self.scene.cells, self.now)
        {
            return None;
        }
        self.render_loop.arm();
        Some(origin)
    }

    /// Reflow and schedule exactly one redraw.
    pub fn on_resize(&mut self, width: u32, height: u32) -> TileGridResult<()> {
        self.scene.relayout(Canvas::new(width, height))?;
        self.render_loop.request_redraw();
        Ok(())
    }

    pub fn dispatch(&mut self, event: InputEvent) -> TileGridResult<()> {
        match event {
            InputEvent::PointerEnter { x, y } => self.on_pointer_enter(x, y),
            InputEvent::PointerMove { x, y } => self.on_pointer_move(x, y),
            InputEvent::PointerLeave => self.on_pointer_leave(),
            InputEvent::Click { x, y } => {
                self.on_click(x, y);
            }
            InputEvent::Resize { width, height } => self.on_resize(width, height)?,
        }
        Ok(())
    }
}
