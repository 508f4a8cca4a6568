use crate::world::StepInput;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    #[serde(default = "default_dt")]
    pub fixed_dt: f32,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub jump_pressed: bool,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    pub fn fixed_dt_us(&self) -> u64 {
        (f64::from(self.fixed_dt) * 1_000_000.0).round() as u64
    }

    pub fn expanded_inputs(&self) -> Vec<StepInput> {
        let mut out = Vec::new();
        for frame in &self.frames {
            for _ in 0..frame.repeat.max(1) {
                out.push(StepInput {
                    jump_pressed: frame.jump_pressed,
                });
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.fixed_dt.is_nan() || replay.fixed_dt <= 0.0 {
        return Err("Replay validation failed: fixed_dt must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    Ok(())
}

const fn default_dt() -> f32 {
    1.0 / 60.0
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::SheetSizes;
    use crate::config::GameConfig;
    use crate::world::{GameOutcome, World};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "dash_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn write_replay(name_hint: &str, json: &str) -> std::path::PathBuf {
        let path = temp_file_path(name_hint);
        fs::write(&path, json).expect("write replay file");
        path
    }

    fn new_world() -> World {
        let config = GameConfig::default();
        World::new(&config, &SheetSizes::fallback(&config))
    }

    /// One jump per obstacle, each 1.5 s apart, starting at t = 1.0 s.
    const CLEAR_RUN: &str = r#"{
      "fixed_dt": 0.016666667,
      "frames": [
        { "repeat": 60 },
        { "jump_pressed": true }, { "repeat": 89 },
        { "jump_pressed": true }, { "repeat": 89 },
        { "jump_pressed": true }, { "repeat": 89 },
        { "jump_pressed": true }, { "repeat": 89 },
        { "jump_pressed": true }, { "repeat": 89 },
        { "jump_pressed": true }, { "repeat": 89 },
        { "repeat": 120 }
      ]
    }"#;

    #[test]
    fn replay_file_parses_and_expands() {
        let path = write_replay(
            "parse",
            r#"{
              "fixed_dt": 0.016666667,
              "frames": [
                { "repeat": 3 },
                { "jump_pressed": true }
              ]
            }"#,
        );

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_inputs();
        assert_eq!(expanded.len(), 4);
        assert!(!expanded[0].jump_pressed);
        assert!(expanded[3].jump_pressed);
        assert_eq!(replay.fixed_dt_us(), 16_667);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn replay_rejects_bad_timestep_and_empty_frames() {
        let bad_dt = write_replay("bad_dt", r#"{ "fixed_dt": 0.0, "frames": [{}] }"#);
        let err = load_replay_from_path(&bad_dt).expect_err("zero dt must fail");
        assert!(err.contains("fixed_dt"));

        let empty = write_replay("empty", r#"{ "frames": [] }"#);
        let err = load_replay_from_path(&empty).expect_err("empty frames must fail");
        assert!(err.contains("frames"));

        let _ = fs::remove_file(bad_dt);
        let _ = fs::remove_file(empty);
    }

    #[test]
    fn replay_run_is_deterministic() {
        let path = write_replay("deterministic", CLEAR_RUN);
        let replay = load_replay_from_path(&path).expect("replay should load");
        let inputs = replay.expanded_inputs();
        let dt_us = replay.fixed_dt_us();

        let mut run_a = new_world();
        let mut run_b = new_world();
        for input in &inputs {
            run_a.step(*input, replay.fixed_dt, dt_us);
        }
        for input in &inputs {
            run_b.step(*input, replay.fixed_dt, dt_us);
        }

        assert_eq!(run_a.player, run_b.player);
        assert_eq!(run_a.obstacles, run_b.obstacles);
        assert_eq!(run_a.layers, run_b.layers);
        assert_eq!(run_a.finish_line, run_b.finish_line);
        assert_eq!(run_a.outcome(), run_b.outcome());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn timed_jumps_clear_every_obstacle_and_win() {
        let path = write_replay("clear_run", CLEAR_RUN);
        let replay = load_replay_from_path(&path).expect("replay should load");
        let dt_us = replay.fixed_dt_us();

        let mut world = new_world();
        let mut outcome = GameOutcome::Playing;
        for (step, input) in replay.expanded_inputs().into_iter().enumerate() {
            outcome = world.step(input, replay.fixed_dt, dt_us);
            assert_ne!(outcome, GameOutcome::Lost, "hit on step {step}");
            if outcome == GameOutcome::Won {
                break;
            }
        }
        assert_eq!(outcome, GameOutcome::Won);
        assert!(!world.collided());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn idle_replay_loses() {
        let path = write_replay("idle", r#"{ "frames": [{ "repeat": 180 }] }"#);
        let replay = load_replay_from_path(&path).expect("replay should load");

        let mut world = new_world();
        for input in replay.expanded_inputs() {
            world.step(input, replay.fixed_dt, replay.fixed_dt_us());
        }
        assert_eq!(world.outcome(), GameOutcome::Lost);

        let _ = fs::remove_file(path);
    }
}
