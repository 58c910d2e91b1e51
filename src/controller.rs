use crate::{
    assets::{ImageSource, PreparedImage, load_image},
    config::GridConfig,
    foundation::{
        core::{Canvas, Seconds},
        error::{TileGridError, TileGridResult},
    },
    input::{InputEvent, InputRouter},
    render::{FrameRGBA, RenderBackend, compile::compile_frame},
    render_loop::RenderLoop,
    scene::Scene,
};

/// Whatever the grid is drawn into. Only its current size matters.
pub trait HostSurface {
    fn size(&self) -> Canvas;
}

impl HostSurface for Canvas {
    fn size(&self) -> Canvas {
        *self
    }
}

/// Top-level handle: scene, redraw loop and the animation clock.
#[derive(Debug)]
pub struct TileGrid {
    scene: Scene,
    render_loop: RenderLoop,
    now: Seconds,
}

impl TileGrid {
    /// Build against an already decoded image. The first frame is scheduled immediately.
    pub fn new(
        config: GridConfig,
        host: &impl HostSurface,
        image: &PreparedImage,
    ) -> TileGridResult<Self> {
        config.validate()?;
        let scene = Scene::new(config, host.size(), image)?;
        let mut render_loop = RenderLoop::new();
        render_loop.request_redraw();
        Ok(Self {
            scene,
            render_loop,
            now: 0.0,
        })
    }

    /// Load the image, then build. No grid exists unless the image decoded.
    pub fn load(
        config: GridConfig,
        host: &impl HostSurface,
        source: &ImageSource,
    ) -> TileGridResult<Self> {
        let image = load_image(source)?;
        Self::new(config, host, &image)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn now(&self) -> Seconds {
        self.now
    }

    pub fn input(&mut self) -> InputRouter<'_> {
        InputRouter::new(&mut self.scene, &mut self.render_loop, self.now)
    }

    pub fn dispatch(&mut self, event: InputEvent) -> TileGridResult<()> {
        self.input().dispatch(event)
    }

    /// Move the clock forward. Time never runs backwards.
    pub fn advance_to(&mut self, now: Seconds) -> TileGridResult<()> {
        if !now.is_finite() || now < self.now {
            return Err(TileGridError::validation(format!(
                "clock must move forward (at {}, got {now})",
                self.now
            )));
        }
        self.now = now;
        Ok(())
    }

    pub fn advance_by(&mut self, dt: Seconds) -> TileGridResult<()> {
        self.advance_to(self.now + dt)
    }

    pub fn is_animating(&self) -> bool {
        self.scene.is_animating()
    }

    /// Advance to `now` and run one loop tick. `Ok(None)` when nothing needed drawing.
    pub fn render(
        &mut self,
        now: Seconds,
        backend: &mut dyn RenderBackend,
    ) -> TileGridResult<Option<FrameRGBA>> {
        self.advance_to(now)?;
        let Some(plan) = self.render_loop.tick(&mut self.scene, self.now) else {
            return Ok(None);
        };
        backend.render_plan(&plan, &self.scene.background).map(Some)
    }

    /// Advance to `now` and always produce a frame, whether or not the loop asked for one.
    pub fn frame_at(
        &mut self,
        now: Seconds,
        backend: &mut dyn RenderBackend,
    ) -> TileGridResult<FrameRGBA> {
        self.advance_to(now)?;
        let plan = self
            .render_loop
            .tick(&mut self.scene, self.now)
            .unwrap_or_else(|| compile_frame(&self.scene));
        backend.render_plan(&plan, &self.scene.background)
    }

    /// Draw the current state regardless of the loop.
    pub fn snapshot(&self, backend: &mut dyn RenderBackend) -> TileGridResult<FrameRGBA> {
        backend.render_plan(&compile_frame(&self.scene), &self.scene.background)
    }
}
