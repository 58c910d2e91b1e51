//! Deterministic event playback on a fixed-fps clock.

use crate::{
    controller::TileGrid,
    foundation::{
        core::{FrameIndex, Fps, Seconds},
        error::{TileGridError, TileGridResult},
    },
    input::InputEvent,
    render::{FrameRGBA, RenderBackend},
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimedEvent {
    pub at: Seconds,
    pub event: InputEvent,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EventScript {
    pub fps: Fps,
    /// Playback length in seconds.
    pub duration: Seconds,
    #[serde(default)]
    pub events: Vec<TimedEvent>,
}

impl EventScript {
    pub fn from_json_str(json: &str) -> TileGridResult<Self> {
        let mut script: Self = serde_json::from_str(json)?;
        script.validate()?;
        script.events.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(script)
    }

    pub fn validate(&self) -> TileGridResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(TileGridError::validation(
                "script duration must be finite and >= 0",
            ));
        }
        if let Some(bad) = self
            .events
            .iter()
            .find(|e| !e.at.is_finite() || e.at < 0.0)
        {
            return Err(TileGridError::validation(format!(
                "script event time must be finite and >= 0 (got {})",
                bad.at
            )));
        }
        Ok(())
    }

    pub fn frame_count(&self) -> u64 {
        self.fps.secs_to_frames_ceil(self.duration)
    }

    /// Dispatch events up to (and including) `until`, starting at `next`. Returns the
    /// index of the first event not yet dispatched.
    pub fn dispatch_until(
        &self,
        grid: &mut TileGrid,
        next: usize,
        until: Seconds,
    ) -> TileGridResult<usize> {
        let mut i = next;
        while let Some(ev) = self.events.get(i) {
            if ev.at > until {
                break;
            }
            grid.advance_to(ev.at.max(grid.now()))?;
            grid.dispatch(ev.event)?;
            i += 1;
        }
        Ok(i)
    }

    /// Play the script frame by frame. `on_frame` sees every frame the loop draws; idle
    /// frames are skipped.
    #[tracing::instrument(skip_all, fields(frames = self.frame_count(), events = self.events.len()))]
    pub fn play(
        &self,
        grid: &mut TileGrid,
        backend: &mut dyn RenderBackend,
        mut on_frame: impl FnMut(FrameIndex, &FrameRGBA) -> TileGridResult<()>,
    ) -> TileGridResult<u64> {
        let mut next = 0;
        let mut drawn = 0u64;
        for f in 0..self.frame_count() {
            let t = self.fps.frames_to_secs(f).max(grid.now());
            next = self.dispatch_until(grid, next, t)?;
            if let Some(frame) = grid.render(t, backend)? {
                on_frame(FrameIndex(f), &frame)?;
                drawn += 1;
            }
        }
        tracing::debug!(drawn, "script finished");
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sorts_and_counts_frames() {
        let script = EventScript::from_json_str(
            r#"{
                "fps": {"num": 30, "den": 1},
                "duration": 1.0,
                "events": [
                    {"at": 0.5, "event": {"kind": "click", "x": 10, "y": 10}},
                    {"at": 0.1, "event": {"kind": "pointer_move", "x": 10, "y": 10}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(script.frame_count(), 30);
        assert_eq!(script.events[0].at, 0.1);
        assert!(matches!(script.events[1].event, InputEvent::Click { .. }));
    }

    #[test]
    fn rejects_bad_timing() {
        let bad_fps = r#"{"fps": {"num": 30, "den": 0}, "duration": 1.0}"#;
        assert!(EventScript::from_json_str(bad_fps).is_err());
        let bad_at = r#"{"fps": {"num": 30, "den": 1}, "duration": 1.0,
            "events": [{"at": -1, "event": {"kind": "pointer_leave"}}]}"#;
        assert!(EventScript::from_json_str(bad_at).is_err());
        assert!(matches!(
            EventScript::from_json_str("{").unwrap_err(),
            TileGridError::Serde(_)
        ));
    }
}
