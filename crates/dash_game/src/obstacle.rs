use dash_core::{AnimationState, Rect};

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub anim: AnimationState,
    /// Pixels/s, negative scrolls left.
    pub velocity_x: f32,
}

impl Obstacle {
    pub fn new(anim: AnimationState, velocity_x: f32) -> Self {
        Self { anim, velocity_x }
    }

    /// Move and animate one step. Obstacles animate continuously.
    pub fn step(&mut self, dt: f32, dt_us: u64) {
        self.anim.position.x += self.velocity_x * dt;
        self.anim.update(dt_us);
    }

    /// Bounds shrunk by `padding` on every side.
    pub fn hitbox(&self, padding: f32) -> Rect {
        self.anim.bounds().shrink(padding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::animation::frame_duration_us;
    use glam::Vec2;

    fn obstacle_at(x: f32) -> Obstacle {
        Obstacle::new(
            AnimationState::from_sheet(
                Vec2::new(384.0, 128.0),
                3,
                frame_duration_us(12),
                Vec2::new(x, 252.0),
            ),
            -200.0,
        )
    }

    #[test]
    fn reaches_window_edge_after_one_second() {
        let mut obstacle = obstacle_at(712.0);
        for _ in 0..60 {
            obstacle.step(1.0 / 60.0, 16_667);
        }
        assert!(
            (obstacle.anim.position.x - 512.0).abs() < 0.01,
            "x = {}",
            obstacle.anim.position.x
        );
    }

    #[test]
    fn animates_while_moving() {
        let mut obstacle = obstacle_at(600.0);
        obstacle.step(1.0 / 12.0, frame_duration_us(12));
        assert_eq!(obstacle.anim.current_frame, 1);
        assert_eq!(obstacle.anim.source_rect.x, 128.0);
    }

    #[test]
    fn hitbox_is_padded_frame() {
        let obstacle = obstacle_at(600.0);
        assert_eq!(obstacle.hitbox(50.0), Rect::new(650.0, 302.0, 28.0, 28.0));
        assert_eq!(obstacle.hitbox(0.0), Rect::new(600.0, 252.0, 128.0, 128.0));
    }
}
