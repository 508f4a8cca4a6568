use dash_core::AnimationState;

use crate::config::PhysicsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Grounded,
    Airborne,
}

impl Motion {
    pub fn label(self) -> &'static str {
        match self {
            Self::Grounded => "grounded",
            Self::Airborne => "airborne",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub anim: AnimationState,
    /// Pixels/s, negative is up.
    pub velocity_y: f32,
    pub motion: Motion,
}

impl Player {
    pub fn new(anim: AnimationState) -> Self {
        Self {
            anim,
            velocity_y: 0.0,
            motion: Motion::Grounded,
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.motion == Motion::Grounded
    }

    /// Integrate one step. `ground_line` is the y of the sprite's top edge when
    /// it stands on the floor; anything smaller is in the air.
    pub fn step(&mut self, jump_pressed: bool, dt: f32, physics: &PhysicsConfig, ground_line: f32) {
        match self.motion {
            Motion::Grounded => {
                self.velocity_y = 0.0;
                // Jump is edge-triggered and only legal from the ground.
                if jump_pressed {
                    self.velocity_y = physics.jump_velocity;
                    log::trace!("Jump at y={:.1}", self.anim.position.y);
                }
            }
            Motion::Airborne => {
                self.velocity_y += physics.gravity * dt;
            }
        }

        self.anim.position.y += self.velocity_y * dt;

        if self.anim.position.y >= ground_line {
            self.anim.position.y = ground_line;
            self.velocity_y = 0.0;
            self.motion = Motion::Grounded;
        } else {
            self.motion = Motion::Airborne;
        }
    }

    /// Run cycle only plays while on the ground.
    pub fn animate(&mut self, dt_us: u64) {
        if self.is_grounded() {
            self.anim.update(dt_us);
        }
    }
}
