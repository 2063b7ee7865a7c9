use std::time::{Duration, Instant};

/// FPS is averaged over windows of this length.
const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Frame clock: seconds since the first frame, frame count, smoothed FPS.
#[derive(Debug, Default)]
pub struct FrameClock {
    start: Option<Instant>,
    frames: u64,
    window_start: Option<Instant>,
    window_frames: u32,
    fps: Option<f32>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame and return the elapsed seconds. The first call returns 0.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let start = *self.start.get_or_insert(now);
        self.frames += 1;

        let window_start = *self.window_start.get_or_insert(now);
        self.window_frames += 1;
        let span = now.duration_since(window_start);
        if span >= FPS_WINDOW {
            self.fps = Some(self.window_frames as f32 / span.as_secs_f32());
            self.window_start = Some(now);
            self.window_frames = 0;
        }

        now.duration_since(start).as_secs_f32()
    }

    /// Frames ticked so far, including the current one.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// `None` until the first averaging window has elapsed.
    #[inline]
    pub fn fps(&self) -> Option<f32> {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_starts_at_zero() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        assert_eq!(clock.tick_at(t0), 0.0);
        let t = clock.tick_at(t0 + Duration::from_millis(250));
        assert!((t - 0.25).abs() < 1e-6);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn fps_after_one_window() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        for i in 0..30 {
            clock.tick_at(t0 + Duration::from_millis(i * 16));
            assert!(clock.fps().is_none());
        }
        // 31st frame lands exactly on the window boundary.
        clock.tick_at(t0 + FPS_WINDOW);
        let fps = clock.fps().unwrap();
        assert!((fps - 62.0).abs() < 1e-3, "fps {fps}");
    }
}
