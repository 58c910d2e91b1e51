use crate::{
    anim_ease::Ease,
    foundation::core::{Point, Seconds},
    foundation::error::{TileGridError, TileGridResult},
};

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for Point {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// A single `from -> to` transition anchored on the animation clock.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub start: Seconds,
    pub duration: Seconds,
    pub ease: Ease,
}

impl<T> Tween<T>
where
    T: Lerp + Clone,
{
    pub fn new(from: T, to: T, start: Seconds, duration: Seconds, ease: Ease) -> Self {
        Self {
            from,
            to,
            start,
            duration: duration.max(0.0),
            ease,
        }
    }

    pub fn end(&self) -> Seconds {
        self.start + self.duration
    }

    /// Linear progress in `[0, 1]`; zero-length tweens are complete immediately.
    pub fn progress(&self, now: Seconds) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: Seconds) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn sample(&self, now: Seconds) -> T {
        let p = self.progress(now);
        if p >= 1.0 {
            return self.to.clone();
        }
        T::lerp(&self.from, &self.to, self.ease.apply(p))
    }
}

/// Evenly spaced keyframe values.
///
/// The caller eases overall progress; `ease_each` shapes the motion inside
/// every segment between two neighbouring values.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframes {
    pub values: Vec<f64>,
    pub ease_each: Ease,
}

impl Keyframes {
    pub fn new(values: Vec<f64>, ease_each: Ease) -> Self {
        Self { values, ease_each }
    }

    pub fn validate(&self) -> TileGridResult<()> {
        if self.values.is_empty() {
            return Err(TileGridError::validation(
                "keyframes must have at least one value",
            ));
        }
        if self.values.iter().any(|v| !v.is_finite()) {
            return Err(TileGridError::validation("keyframe values must be finite"));
        }
        Ok(())
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Sample at eased progress `p` (clamped to `[0, 1]`).
    pub fn sample(&self, p: f64) -> f64 {
        let n = self.values.len();
        match n {
            0 => return 0.0,
            1 => return self.values[0],
            _ => {}
        }

        let segments = n - 1;
        let pos = p.clamp(0.0, 1.0) * segments as f64;
        let i = (pos.floor() as usize).min(segments - 1);
        let local = pos - i as f64;
        <f64 as Lerp>::lerp(
            &self.values[i],
            &self.values[i + 1],
            self.ease_each.apply(local),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tween_hits_endpoints() {
        let tw = Tween::new(0.0, 10.0, 1.0, 2.0, Ease::Linear);
        assert_eq!(tw.sample(0.0), 0.0);
        assert_eq!(tw.sample(1.0), 0.0);
        assert_eq!(tw.sample(2.0), 5.0);
        assert_eq!(tw.sample(3.0), 10.0);
        assert_eq!(tw.sample(99.0), 10.0);
        assert!(tw.is_finished(3.0));
        assert!(!tw.is_finished(2.9));
    }

    #[test]
    fn zero_length_tween_is_immediately_done() {
        let tw = Tween::new(Point::new(0.0, 0.0), Point::new(4.0, 8.0), 5.0, 0.0, Ease::OutExpo);
        assert!(tw.is_finished(5.0));
        assert_eq!(tw.sample(5.0), Point::new(4.0, 8.0));
    }

    #[test]
    fn keyframes_are_evenly_spaced() {
        let kf = Keyframes::new(vec![1.0, 0.9, 1.0], Ease::Linear);
        assert_eq!(kf.sample(0.0), 1.0);
        assert!((kf.sample(0.25) - 0.95).abs() < 1e-12);
        assert!((kf.sample(0.5) - 0.9).abs() < 1e-12);
        assert!((kf.sample(0.75) - 0.95).abs() < 1e-12);
        assert_eq!(kf.sample(1.0), 1.0);
    }

    #[test]
    fn keyframes_stay_within_value_range() {
        let kf = Keyframes::new(vec![1.0, 0.8, 1.0], Ease::InOutQuad);
        for i in 0..=100 {
            let v = kf.sample(i as f64 / 100.0);
            assert!((kf.min()..=kf.max()).contains(&v), "{v}");
        }
    }

    #[test]
    fn keyframes_validate_rejects_empty_and_nan() {
        assert!(Keyframes::new(vec![], Ease::Linear).validate().is_err());
        assert!(
            Keyframes::new(vec![1.0, f64::NAN], Ease::Linear)
                .validate()
                .is_err()
        );
        assert!(Keyframes::new(vec![1.0], Ease::Linear).validate().is_ok());
        assert_eq!(Keyframes::new(vec![0.5], Ease::Linear).sample(0.7), 0.5);
    }
}
