//! Sprite-sheet animation state and deterministic tick logic.
//!
//! A sheet is a single row of equally sized frames. The state tracks which
//! frame is showing (as a source rectangle into the sheet) and where the
//! sprite sits on screen. Timing uses integer microseconds (`u64`) so frame
//! advancement is exact under the fixed-timestep loop: no floating-point drift.

use glam::Vec2;

use crate::rect::Rect;

/// Microseconds per frame for a sheet played at `frames_per_second`.
pub const fn frame_duration_us(frames_per_second: u32) -> u64 {
    if frames_per_second == 0 {
        return u64::MAX;
    }
    1_000_000 / frames_per_second as u64
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub frame_count: u32,
    /// Region of the sheet currently displayed.
    pub source_rect: Rect,
    /// Top-left corner on screen.
    pub position: Vec2,
    pub current_frame: u32,
    pub frame_duration_us: u64,
    pub elapsed_us: u64,
}

impl AnimationState {
    /// Slice a sheet of `sheet_size` pixels into `frame_count` columns.
    pub fn from_sheet(
        sheet_size: Vec2,
        frame_count: u32,
        frame_duration_us: u64,
        position: Vec2,
    ) -> Self {
        let frame_count = frame_count.max(1);
        Self {
            frame_count,
            source_rect: Rect::new(
                0.0,
                0.0,
                sheet_size.x / frame_count as f32,
                sheet_size.y,
            ),
            position,
            current_frame: 0,
            frame_duration_us: frame_duration_us.max(1),
            elapsed_us: 0,
        }
    }

    pub fn frame_size(&self) -> Vec2 {
        self.source_rect.size()
    }

    /// Screen-space bounds of the displayed frame.
    pub fn bounds(&self) -> Rect {
        Rect::from_position(self.position, self.frame_size())
    }

    /// Advance by `dt_us`. Leftover time carries into the next frame, so any
    /// sequence of deltas summing to `total` advances exactly
    /// `total / frame_duration_us` frames. Returns the number of advances.
    pub fn update(&mut self, dt_us: u64) -> u32 {
        self.elapsed_us += dt_us;

        let mut advanced = 0;
        while self.elapsed_us >= self.frame_duration_us {
            self.elapsed_us -= self.frame_duration_us;
            self.current_frame = (self.current_frame + 1) % self.frame_count;
            advanced += 1;
        }
        if advanced > 0 {
            self.source_rect.x = self.current_frame as f32 * self.source_rect.width;
        }
        advanced
    }
}
