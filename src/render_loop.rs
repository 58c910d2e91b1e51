use crate::{
    foundation::core::Seconds,
    render::compile::{FramePlan, compile_frame},
    scene::Scene,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Disarmed,
    /// Redrawing every tick until both animations settle.
    Armed,
}

/// The single redraw callback.
///
/// Armed by input that starts an animation, disarmed by the first tick on which nothing
/// is moving any more. A one-off redraw (initial paint, resize) can be requested without
/// arming.
#[derive(Clone, Debug, Default)]
pub struct RenderLoop {
    state: LoopState,
    redraw_pending: bool,
    frames: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self) {
        if self.state == LoopState::Disarmed {
            tracing::trace!("render loop armed");
        }
        self.state = LoopState::Armed;
    }

    pub fn request_redraw(&mut self) {
        self.redraw_pending = true;
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == LoopState::Armed
    }

    pub fn wants_frame(&self) -> bool {
        self.is_armed() || self.redraw_pending
    }

    /// Frames produced so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advance the scene to `now` and, if anything asked for it, compile a frame.
    ///
    /// The frame drawn on the settling tick already shows the final values; the loop is
    /// disarmed right after it.
    pub fn tick(&mut self, scene: &mut Scene, now: Seconds) -> Option<FramePlan> {
        let animating = scene.tick(now);
        if !self.wants_frame() {
            return None;
        }
        let plan = compile_frame(scene);
        self.frames += 1;
        self.redraw_pending = false;
        if !animating && self.is_armed() {
            tracing::trace!(frames = self.frames, "render loop disarmed");
            self.state = LoopState::Disarmed;
        }
        Some(plan)
    }
}
