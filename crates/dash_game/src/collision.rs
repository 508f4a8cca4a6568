//! Player-versus-obstacle overlap.
//!
//! Obstacle hitboxes are shrunk by a padding before testing so grazing the
//! transparent corners of a sprite does not count. The player's bounds are
//! used unpadded.

use dash_core::Rect;

use crate::obstacle::Obstacle;

/// Index of the first obstacle whose padded hitbox overlaps `player_bounds`.
pub fn first_hit(player_bounds: &Rect, obstacles: &[Obstacle], padding: f32) -> Option<usize> {
    obstacles
        .iter()
        .position(|obstacle| obstacle.hitbox(padding).intersects(player_bounds))
}

/// A collision flag that can be set but never cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StickyFlag(bool);

impl StickyFlag {
    /// Latch `value` in. Returns true only on the step the flag first turns on.
    pub fn latch(&mut self, value: bool) -> bool {
        let rising = value && !self.0;
        self.0 |= value;
        rising
    }

    pub fn is_set(self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::AnimationState;
    use glam::Vec2;

    fn obstacle_at(x: f32, y: f32) -> Obstacle {
        Obstacle::new(
            AnimationState::from_sheet(Vec2::new(384.0, 128.0), 3, 83_333, Vec2::new(x, y)),
            -200.0,
        )
    }

    fn player_bounds() -> Rect {
        Rect::new(192.0, 252.0, 128.0, 128.0)
    }

    #[test]
    fn padded_corner_graze_is_forgiven() {
        // Unpadded boxes overlap by 40 px horizontally, padded ones do not.
        let obstacles = [obstacle_at(280.0, 252.0)];
        assert!(first_hit(&player_bounds(), &obstacles, 0.0).is_some());
        assert_eq!(first_hit(&player_bounds(), &obstacles, 50.0), None);
    }

    #[test]
    fn deep_overlap_hits() {
        let obstacles = [obstacle_at(900.0, 252.0), obstacle_at(200.0, 252.0)];
        assert_eq!(first_hit(&player_bounds(), &obstacles, 50.0), Some(1));
    }

    #[test]
    fn jumping_over_clears_padded_hitbox() {
        let obstacles = [obstacle_at(200.0, 252.0)];
        let airborne = Rect::new(192.0, 150.0, 128.0, 128.0);
        // Player bottom at 278 stays above the padded top at 302.
        assert_eq!(first_hit(&airborne, &obstacles, 50.0), None);
    }

    #[test]
    fn sticky_flag_never_clears() {
        let mut flag = StickyFlag::default();
        assert!(!flag.latch(false));
        assert!(!flag.is_set());
        assert!(flag.latch(true));
        assert!(flag.is_set());
        for _ in 0..10 {
            assert!(!flag.latch(false));
            assert!(flag.is_set());
        }
        assert!(!flag.latch(true), "only the first hit is a rising edge");
    }
}
