pub mod animation;
pub mod input;
pub mod rect;
pub mod time;

pub use animation::AnimationState;
pub use input::{InputState, Key};
pub use rect::Rect;
pub use time::TimeState;
