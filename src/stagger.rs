//! Distance-staggered click animation.
//!
//! Every cell plays the same keyframe sequence. Its start is delayed in proportion to
//! its grid distance from the origin cell, normalised so the farthest cell starts
//! exactly `amount` seconds after the origin, whatever the grid size.

use crate::{
    anim::Keyframes,
    anim_ease::Ease,
    cell::Cell,
    config::StaggerConfig,
    foundation::core::Seconds,
    layout::Grid,
};

/// Per-cell start delays for a run triggered at `origin`.
pub fn stagger_delays(grid: &Grid, origin: usize, amount: Seconds) -> Vec<Seconds> {
    let n = grid.number_of_cells();
    if n == 0 {
        return Vec::new();
    }
    let distances: Vec<f64> = (0..n).map(|i| grid.grid_distance(i, origin)).collect();
    let max = distances.iter().copied().fold(0.0, f64::max);
    if max <= 0.0 {
        return vec![0.0; n];
    }
    distances.into_iter().map(|d| amount * d / max).collect()
}

/// One in-flight stagger: origin, timing and the shared keyframe tracks.
#[derive(Clone, Debug, PartialEq)]
pub struct StaggerRun {
    origin: usize,
    start: Seconds,
    delays: Vec<Seconds>,
    duration: Seconds,
    ease: Ease,
    scale: Keyframes,
    opacity: Keyframes,
}

impl StaggerRun {
    pub fn new(cfg: &StaggerConfig, grid: &Grid, origin: usize, start: Seconds) -> Self {
        Self {
            origin,
            start,
            delays: stagger_delays(grid, origin, cfg.amount),
            duration: cfg.duration.max(0.0),
            ease: cfg.ease,
            scale: cfg.scale_keyframes(),
            opacity: cfg.opacity_keyframes(),
        }
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn start(&self) -> Seconds {
        self.start
    }

    pub fn delays(&self) -> &[Seconds] {
        &self.delays
    }

    /// Time from trigger until the slowest cell finishes.
    pub fn total_duration(&self) -> Seconds {
        self.delays.iter().copied().fold(0.0, f64::max) + self.duration
    }

    pub fn end(&self) -> Seconds {
        self.start + self.total_duration()
    }

    pub fn is_complete(&self, now: Seconds) -> bool {
        now >= self.end()
    }

    /// `(scale, opacity)` of cell `index` at `now`.
    pub fn sample(&self, index: usize, now: Seconds) -> (f64, f64) {
        let delay = self.delays.get(index).copied().unwrap_or(0.0);
        let local = now - self.start - delay;
        let p = if local <= 0.0 {
            0.0
        } else if self.duration <= 0.0 || local >= self.duration {
            1.0
        } else {
            self.ease.apply(local / self.duration)
        };
        (self.scale.sample(p), self.opacity.sample(p))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum StaggerState {
    #[default]
    Idle,
    Animating(StaggerRun),
}

/// `Idle -> Animating -> Idle`. A new trigger always replaces the current run.
#[derive(Clone, Debug)]
pub struct StaggerAnimator {
    cfg: StaggerConfig,
    state: StaggerState,
}

impl StaggerAnimator {
    pub fn new(cfg: StaggerConfig) -> Self {
        Self {
            cfg,
            state: StaggerState::Idle,
        }
    }

    pub fn state(&self) -> &StaggerState {
        &self.state
    }

    pub fn run(&self) -> Option<&StaggerRun> {
        match &self.state {
            StaggerState::Idle => None,
            StaggerState::Animating(run) => Some(run),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, StaggerState::Animating(_))
    }

    /// Start a run from `origin`. An active run is cancelled first and every cell is
    /// snapped back to rest before the new run's first sample.
    ///
    /// Ignored (returns `false`) when the grid is empty or `origin` is out of range.
    pub fn trigger(
        &mut self,
        origin: usize,
        grid: &Grid,
        cells: &mut [Cell],
        now: Seconds,
    ) -> bool {
        let n = grid.number_of_cells();
        if n == 0 || origin >= n || cells.len() != n {
            tracing::debug!(origin, cells = cells.len(), "stagger trigger ignored");
            return false;
        }
        self.cancel(cells);

        let run = StaggerRun::new(&self.cfg, grid, origin, now);
        tracing::debug!(
            origin,
            total_secs = run.total_duration(),
            "stagger run started"
        );
        self.state = StaggerState::Animating(run);
        self.tick(now, cells);
        true
    }

    /// Drop the active run (if any) and put every cell back at rest.
    pub fn cancel(&mut self, cells: &mut [Cell]) {
        if let StaggerState::Animating(run) = std::mem::take(&mut self.state) {
            tracing::debug!(origin = run.origin(), "stagger run cancelled");
            cells.iter_mut().for_each(Cell::reset);
        }
    }

    /// Write the run's values for `now` into `cells`. Returns `true` while animating.
    pub fn tick(&mut self, now: Seconds, cells: &mut [Cell]) -> bool {
        let StaggerState::Animating(run) = &self.state else {
            return false;
        };

        if run.is_complete(now) {
            tracing::debug!(origin = run.origin(), "stagger run settled");
            cells.iter_mut().for_each(Cell::reset);
            self.state = StaggerState::Idle;
            return false;
        }

        for cell in cells.iter_mut() {
            let (scale, opacity) = run.sample(cell.index(), now);
            cell.set_animated(scale, opacity);
        }
        true
    }
}
