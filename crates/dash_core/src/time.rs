//! Fixed-timestep clock.
//!
//! Wall-clock time feeds an accumulator; the simulation consumes it in fixed
//! slices of `fixed_dt_us` microseconds. Physics reads the same slice as
//! `fixed_dt()` seconds, animations read it as integer microseconds.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

/// One 60 Hz step, in microseconds.
pub const DEFAULT_FIXED_DT_US: u64 = 16_667;

pub struct TimeState {
    pub fixed_dt_us: u64,
    pub max_accumulator_us: u64,
    accumulator_us: u64,
    pub total_time_us: u64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_fixed_dt_us(DEFAULT_FIXED_DT_US)
    }

    pub fn with_fixed_dt_us(fixed_dt_us: u64) -> Self {
        let fixed_dt_us = fixed_dt_us.max(1);
        let fixed_dt = fixed_dt_us as f64 / 1_000_000.0;
        Self {
            fixed_dt_us,
            max_accumulator_us: 250_000,
            accumulator_us: 0,
            total_time_us: 0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [fixed_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1.0 / fixed_dt,
            smoothed_frame_time_ms: fixed_dt * 1000.0,
        }
    }

    /// Fixed step length in seconds.
    pub fn fixed_dt(&self) -> f32 {
        self.fixed_dt_us as f32 / 1_000_000.0
    }

    pub fn total_time(&self) -> f64 {
        self.total_time_us as f64 / 1_000_000.0
    }

    /// Measure wall-clock time since the previous frame and feed it in.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Feed `real_dt` seconds of elapsed time and start a new frame.
    pub fn advance(&mut self, real_dt: f64) {
        let max_dt = self.max_accumulator_us as f64 / 1_000_000.0;
        self.real_dt = real_dt.max(0.0);

        // Spiral-of-death cap
        if self.real_dt > max_dt {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                max_dt * 1000.0
            );
            self.real_dt = max_dt;
        }

        self.accumulator_us += (self.real_dt * 1_000_000.0).round() as u64;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator_us >= self.fixed_dt_us {
            self.accumulator_us -= self.fixed_dt_us;
            self.total_time_us += self.fixed_dt_us;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}
