pub mod hud;

pub use hud::{Banner, Hud, HudActions, HudStats};
