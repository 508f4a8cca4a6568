//! Hands a frame's edge-triggered keys to its fixed steps.
//!
//! Keys pressed since the last consumed frame go to the first fixed step only;
//! the remaining steps of the same frame see no input. Edges are cleared only
//! once a step has taken them, so a press that lands on a frame with zero
//! steps carries over to the next frame.

use dash_core::input::{InputState, Key, JUMP_KEYS};

use crate::world::StepInput;

/// What one fixed step should do in response to the keyboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCommands {
    pub quit: bool,
    pub toggle_debug: bool,
    pub restart: bool,
    pub step: StepInput,
}

impl StepCommands {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            quit: input.is_just_pressed(Key::Escape),
            toggle_debug: input.is_just_pressed(Key::F3),
            restart: input.is_just_pressed(Key::R),
            step: StepInput {
                jump_pressed: input.any_just_pressed(JUMP_KEYS),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct FrameInput {
    consumed: bool,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands for the next fixed step of this frame.
    pub fn next_step(&mut self, input: &InputState) -> StepCommands {
        if self.consumed {
            return StepCommands::default();
        }
        self.consumed = true;
        StepCommands::from_input(input)
    }

    /// Clear the edges if any step of this frame took them.
    pub fn finish(self, input: &mut InputState) {
        if self.consumed {
            input.end_frame();
        }
    }
}
