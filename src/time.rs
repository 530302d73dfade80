//! Frame clock and step conversion.
//!
//! Behaviors advance in simulation steps rather than seconds. A [`Time`]
//! measures the wall-clock gap between frames and turns it into a step
//! delta using a configurable step rate.
//!
//! ```ignore
//! use dotrail::time::Time;
//!
//! let mut time = Time::new(60.0);
//! loop {
//!     session.tick(time.update());
//! }
//! ```

use std::time::{Duration, Instant};

const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Rolling frames-per-second estimate over [`FPS_WINDOW`].
#[derive(Debug)]
struct FpsMeter {
    window_start: Instant,
    frames_at_start: u64,
    value: f32,
}

impl FpsMeter {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames_at_start: 0,
            value: 0.0,
        }
    }

    fn record(&mut self, now: Instant, frames: u64) {
        let span = now.duration_since(self.window_start);
        if span < FPS_WINDOW {
            return;
        }
        self.value = (frames - self.frames_at_start) as f32 / span.as_secs_f32();
        self.window_start = now;
        self.frames_at_start = frames;
    }
}

/// Converts frame timing into simulation steps.
#[derive(Debug)]
pub struct Time {
    previous: Instant,
    seconds: f32,
    steps_per_second: f32,
    frames: u64,
    fps: FpsMeter,
    /// Seconds reported per frame regardless of the wall clock.
    fixed_seconds: Option<f32>,
    scale: f32,
    paused: bool,
}

impl Time {
    /// Clock starting now, advancing `steps_per_second` steps per second.
    pub fn new(steps_per_second: f32) -> Self {
        let now = Instant::now();
        Self {
            previous: now,
            seconds: 0.0,
            steps_per_second: steps_per_second.max(0.0),
            frames: 0,
            fps: FpsMeter::new(now),
            fixed_seconds: None,
            scale: 1.0,
            paused: false,
        }
    }

    /// Advance to the next frame and return its step delta.
    ///
    /// Returns 0 while paused; paused calls do not count as frames.
    pub fn update(&mut self) -> f32 {
        if self.paused {
            self.seconds = 0.0;
            return 0.0;
        }

        let now = Instant::now();
        let measured = now.duration_since(self.previous).as_secs_f32();
        self.previous = now;
        self.seconds = self.fixed_seconds.unwrap_or(measured) * self.scale;
        self.frames += 1;
        self.fps.record(now, self.frames);

        self.delta_step()
    }

    /// Scaled seconds covered by the last frame.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.seconds
    }

    /// Steps covered by the last frame.
    #[inline]
    pub fn delta_step(&self) -> f32 {
        self.seconds * self.steps_per_second
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frames
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps.value
    }

    #[inline]
    pub fn steps_per_second(&self) -> f32 {
        self.steps_per_second
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.scale
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop time. `update` returns 0 until [`resume`](Self::resume).
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after a pause. The paused interval is not counted.
    pub fn resume(&mut self) {
        if self.paused {
            self.previous = Instant::now();
            self.paused = false;
        }
    }

    pub fn toggle_pause(&mut self) {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Negative rates clamp to 0.
    pub fn set_steps_per_second(&mut self, steps_per_second: f32) {
        self.steps_per_second = steps_per_second.max(0.0);
    }

    /// Report `seconds` per frame instead of measuring. `None` restores the
    /// wall clock.
    pub fn set_fixed_delta(&mut self, seconds: Option<f32>) {
        self.fixed_seconds = seconds;
    }

    /// Multiply every frame's duration. Negative scales clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.scale = scale.max(0.0);
    }

    /// Restart counting from now. Rate, scale and fixed delta are kept.
    pub fn reset(&mut self) {
        let now = Instant::now();
        self.previous = now;
        self.seconds = 0.0;
        self.frames = 0;
        self.fps = FpsMeter::new(now);
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new(60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_new_clock() {
        let time = Time::new(30.0);
        assert_eq!(time.frame(), 0);
        assert_eq!(time.steps_per_second(), 30.0);
        assert_eq!(time.time_scale(), 1.0);
        assert!(!time.is_paused());
    }

    #[test]
    fn test_measured_frames_produce_steps() {
        let mut time = Time::new(60.0);
        thread::sleep(Duration::from_millis(10));
        let steps = time.update();

        assert!(time.delta() > 0.0);
        assert!(steps > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_fixed_delta_converts_to_steps() {
        let mut time = Time::new(120.0);
        time.set_fixed_delta(Some(0.5));
        assert!((time.update() - 60.0).abs() < 1e-4);
    }

    #[test]
    fn test_scale_multiplies_steps() {
        let mut time = Time::new(10.0);
        time.set_fixed_delta(Some(1.0));
        time.set_time_scale(0.5);
        assert!((time.update() - 5.0).abs() < 1e-5);

        time.set_time_scale(-1.0);
        assert_eq!(time.time_scale(), 0.0);
        assert_eq!(time.update(), 0.0);
    }

    #[test]
    fn test_pause_stops_steps() {
        let mut time = Time::new(60.0);
        time.set_fixed_delta(Some(1.0 / 60.0));
        time.pause();
        assert_eq!(time.update(), 0.0);
        assert_eq!(time.frame(), 0);

        time.toggle_pause();
        assert!(!time.is_paused());
        assert!((time.update() - 1.0).abs() < 1e-5);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_reset_clears_frames() {
        let mut time = Time::new(60.0);
        time.set_fixed_delta(Some(0.1));
        time.update();
        time.update();
        time.reset();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.delta(), 0.0);
        assert!((time.update() - 6.0).abs() < 1e-4);
    }
}
