use crate::{
    anim::{Lerp, Tween},
    anim_ease::Ease,
    config::HoverConfig,
    foundation::core::{Point, Rect, Seconds, Size},
    layout::Grid,
};

/// Snapshot of the hover overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverState {
    /// Cell the pointer last resolved to; `None` before the first hover and after leave.
    pub tracked_index: Option<usize>,
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct HoverPose {
    origin: Point,
    opacity: f64,
}

impl Lerp for HoverPose {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            origin: <Point as Lerp>::lerp(&a.origin, &b.origin, t),
            opacity: <f64 as Lerp>::lerp(&a.opacity, &b.opacity, t).clamp(0.0, 1.0),
        }
    }
}

/// Highlight overlay that follows the hovered cell.
///
/// Holds a single tween slot: every retarget samples the in-flight tween at `now`,
/// drops it, and starts the new one from that sampled pose.
#[derive(Clone, Debug)]
pub struct HoverIndicator {
    state: HoverState,
    size: Size,
    duration: Seconds,
    ease: Ease,
    tween: Option<Tween<HoverPose>>,
}

impl HoverIndicator {
    pub fn new(cfg: &HoverConfig, grid: &Grid) -> Self {
        Self {
            state: HoverState {
                tracked_index: None,
                x: 0.0,
                y: 0.0,
                opacity: 0.0,
            },
            size: grid.cell_size(),
            duration: cfg.duration,
            ease: cfg.ease,
            tween: None,
        }
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size((self.state.x, self.state.y), self.size)
    }

    pub fn is_active(&self) -> bool {
        self.tween.is_some()
    }

    /// Pointer moved over `index`. Starts a tween only when the index changed.
    pub fn hover(&mut self, index: usize, grid: &Grid, now: Seconds) -> bool {
        if self.state.tracked_index == Some(index) {
            return false;
        }
        self.retarget(index, grid, now);
        true
    }

    /// Pointer entered the surface over `index`. Always retargets.
    pub fn enter(&mut self, index: usize, grid: &Grid, now: Seconds) {
        self.retarget(index, grid, now);
    }

    /// Pointer left the surface: fade out where the overlay currently is.
    pub fn leave(&mut self, now: Seconds) {
        self.tick(now);
        let here = Point::new(self.state.x, self.state.y);
        self.start(
            HoverPose {
                origin: here,
                opacity: 0.0,
            },
            now,
        );
        self.state.tracked_index = None;
    }

    /// Apply the in-flight tween at `now`. Returns `true` while a tween is still running.
    pub fn tick(&mut self, now: Seconds) -> bool {
        let Some(tween) = &self.tween else {
            return false;
        };
        let pose = tween.sample(now);
        let finished = tween.is_finished(now);
        self.state.x = pose.origin.x;
        self.state.y = pose.origin.y;
        self.state.opacity = pose.opacity;
        if finished {
            self.tween = None;
        }
        !finished
    }

    /// Forget everything after a reflow: hidden, at the origin, sized to the new cells.
    pub fn reset_for(&mut self, grid: &Grid) {
        self.tween = None;
        self.size = grid.cell_size();
        self.state = HoverState {
            tracked_index: None,
            x: 0.0,
            y: 0.0,
            opacity: 0.0,
        };
    }

    fn retarget(&mut self, index: usize, grid: &Grid, now: Seconds) {
        self.tick(now);
        let target = grid.cell_origin(index);
        tracing::trace!(index, x = target.x, y = target.y, "hover retarget");
        self.start(
            HoverPose {
                origin: target,
                opacity: 1.0,
            },
            now,
        );
        self.state.tracked_index = Some(index);
    }

    fn start(&mut self, to: HoverPose, now: Seconds) {
        let from = HoverPose {
            origin: Point::new(self.state.x, self.state.y),
            opacity: self.state.opacity,
        };
        self.tween = Some(Tween::new(from, to, now, self.duration, self.ease));
    }
}
