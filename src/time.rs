pub use std::time::Instant;
use std::time::Duration;

/// Frames between FPS log lines.
pub const FPS_LOG_INTERVAL: u64 = 1024;

/// Tracks frame deltas and logs the average frame rate every
/// [`FPS_LOG_INTERVAL`] frames.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    start: Instant,
    last_frame: Instant,
    window_start: Instant,
    frames: u64,
}

impl FrameTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            window_start: now,
            frames: 0,
        }
    }

    /// Advances one frame and returns the seconds since the previous call.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frames += 1;

        if self.frames % FPS_LOG_INTERVAL == 0 {
            if let Some(fps) = average_fps(FPS_LOG_INTERVAL, now.saturating_duration_since(self.window_start)) {
                log::info!("FPS: {:.1} ({} frames)", fps, self.frames);
            }
            self.window_start = now;
        }

        dt
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Seconds since the timer was created.
    pub fn elapsed(&self) -> f32 {
        self.last_frame.saturating_duration_since(self.start).as_secs_f32()
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

fn average_fps(frames: u64, elapsed: Duration) -> Option<f64> {
    let seconds = elapsed.as_secs_f64();
    (seconds > 0.0).then(|| frames as f64 / seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_reports_delta_since_previous_frame() {
        let mut timer = FrameTimer::new();
        let start = timer.last_frame;
        let dt = timer.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn average_fps_needs_elapsed_time() {
        assert_eq!(average_fps(1024, Duration::ZERO), None);
        assert_eq!(average_fps(1024, Duration::from_secs(2)), Some(512.0));
    }
}
