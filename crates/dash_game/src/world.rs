//! All mutable game state for one run of the level, and the per-step update.
//!
//! `World::step` runs the frame rule in a fixed order: scroll the parallax
//! layers, integrate the player, move and animate obstacles, test collisions,
//! scroll the finish line, animate the player, then resolve the outcome. It has
//! no GPU or window dependency, so a whole run can be driven from tests.

use dash_core::animation::frame_duration_us;
use dash_core::AnimationState;
use glam::Vec2;

use crate::assets::{SheetSizes, TextureId};
use crate::collision::{first_hit, StickyFlag};
use crate::config::{BannerConfig, GameConfig, PhysicsConfig};
use crate::obstacle::Obstacle;
use crate::parallax::ParallaxLayer;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameOutcome {
    #[default]
    Playing,
    Won,
    Lost,
}

impl GameOutcome {
    /// A collision always loses, even past the finish line.
    pub fn resolve(collided: bool, player_x: f32, finish_line: f32) -> Self {
        if collided {
            Self::Lost
        } else if player_x >= finish_line {
            Self::Won
        } else {
            Self::Playing
        }
    }

    /// Sprites are hidden once the run is decided and the banner takes over.
    pub fn draws_sprites(self) -> bool {
        self == Self::Playing
    }

    pub fn banner_text(self, banner: &BannerConfig) -> Option<&str> {
        match self {
            Self::Playing => None,
            Self::Won => Some(&banner.win_text),
            Self::Lost => Some(&banner.lose_text),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Playing => "playing",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepInput {
    pub jump_pressed: bool,
}

/// Parallax layers in draw order, back to front.
pub const LAYER_TEXTURES: [TextureId; 3] = [
    TextureId::Background,
    TextureId::Midground,
    TextureId::Foreground,
];

#[derive(Debug, Clone)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub physics: PhysicsConfig,
    pub hitbox_padding: f32,
    pub layers: [ParallaxLayer; 3],
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    /// Scrolls left with the obstacles; the run is won once the player passes it.
    pub finish_line: f32,
    finish_velocity: f32,
    collided: StickyFlag,
    outcome: GameOutcome,
}

impl World {
    pub fn new(config: &GameConfig, sizes: &SheetSizes) -> Self {
        let width = config.window.width as f32;
        let height = config.window.height as f32;

        let parallax = &config.parallax;
        let layer_speeds = [
            parallax.background.speed,
            parallax.midground.speed,
            parallax.foreground.speed,
        ];
        let layers = std::array::from_fn(|i| {
            ParallaxLayer::new(
                layer_speeds[i],
                sizes.get(LAYER_TEXTURES[i]).x,
                parallax.scale,
            )
        });

        let obstacle_cfg = &config.obstacles;
        let obstacles: Vec<Obstacle> = (0..obstacle_cfg.count)
            .map(|i| {
                let mut anim = AnimationState::from_sheet(
                    sizes.get(TextureId::Obstacle),
                    obstacle_cfg.sheet.frame_count,
                    frame_duration_us(obstacle_cfg.sheet.frames_per_second),
                    Vec2::ZERO,
                );
                anim.position = Vec2::new(
                    width + i as f32 * obstacle_cfg.spacing,
                    height - anim.frame_size().y,
                );
                Obstacle::new(anim, obstacle_cfg.velocity)
            })
            .collect();
        let finish_line = obstacles
            .last()
            .map(|o| o.anim.position.x)
            .unwrap_or(width);

        let mut player_anim = AnimationState::from_sheet(
            sizes.get(TextureId::Player),
            config.player.frame_count,
            frame_duration_us(config.player.frames_per_second),
            Vec2::ZERO,
        );
        let frame = player_anim.frame_size();
        player_anim.position = Vec2::new(width / 2.0 - frame.x / 2.0, height - frame.y);

        log::info!(
            "Level ready: {} obstacle(s), finish line at x={:.0}",
            obstacles.len(),
            finish_line
        );

        Self {
            width,
            height,
            physics: config.physics,
            hitbox_padding: obstacle_cfg.hitbox_padding,
            layers,
            player: Player::new(player_anim),
            obstacles,
            finish_line,
            finish_velocity: obstacle_cfg.velocity,
            collided: StickyFlag::default(),
            outcome: GameOutcome::Playing,
        }
    }

    /// y of the player's top edge when standing on the floor.
    pub fn ground_line(&self) -> f32 {
        self.height - self.player.anim.frame_size().y
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    #[cfg(test)]
    pub fn collided(&self) -> bool {
        self.collided.is_set()
    }

    /// Horizontal distance the finish line still has to travel to the player.
    pub fn finish_distance(&self) -> f32 {
        (self.finish_line - self.player.anim.position.x).max(0.0)
    }

    pub fn step(&mut self, input: StepInput, dt: f32, dt_us: u64) -> GameOutcome {
        for layer in &mut self.layers {
            layer.update(dt);
        }

        let ground_line = self.ground_line();
        self.player
            .step(input.jump_pressed, dt, &self.physics, ground_line);

        for obstacle in &mut self.obstacles {
            obstacle.step(dt, dt_us);
        }

        let hit = first_hit(
            &self.player.anim.bounds(),
            &self.obstacles,
            self.hitbox_padding,
        );
        if self.collided.latch(hit.is_some()) {
            log::info!("Collision with obstacle {}", hit.unwrap_or_default());
        }

        self.finish_line += self.finish_velocity * dt;

        self.player.animate(dt_us);

        let outcome = GameOutcome::resolve(
            self.collided.is_set(),
            self.player.anim.position.x,
            self.finish_line,
        );
        if outcome != self.outcome {
            log::info!("Outcome: {} -> {}", self.outcome.label(), outcome.label());
            self.outcome = outcome;
        }
        outcome
    }
}
