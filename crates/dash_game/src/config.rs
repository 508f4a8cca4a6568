//! Game tuning loaded from JSON.
//!
//! Every field has a default equal to the shipped tuning, so a missing file,
//! an empty object or a partial file all produce a playable config. The file is
//! polled for changes by `ConfigWatcher` and reloaded at a step boundary.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use dash_platform::PlatformConfig;

/// Largest placeholder side accepted from config.
pub const MAX_FALLBACK_SIZE: u32 = 8192;

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub physics: PhysicsConfig,
    pub player: SheetConfig,
    pub obstacles: ObstacleConfig,
    pub parallax: ParallaxConfig,
    pub banner: BannerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration, (pixels/s)/s.
    pub gravity: f32,
    /// Vertical velocity set by a jump, pixels/s. Negative is up.
    pub jump_velocity: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TextureConfig {
    pub path: String,
    /// Size of the solid placeholder used when `path` cannot be loaded.
    pub fallback_size: [u32; 2],
    pub fallback_color: [u8; 4],
}

/// A single-row sprite sheet.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SheetConfig {
    pub texture: TextureConfig,
    pub frame_count: u32,
    pub frames_per_second: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ObstacleConfig {
    pub sheet: SheetConfig,
    pub count: u32,
    /// Horizontal gap between consecutive obstacle spawn positions.
    pub spacing: f32,
    /// Horizontal velocity, pixels/s. Negative scrolls left.
    pub velocity: f32,
    /// Shrinks each obstacle's hitbox on every side.
    pub hitbox_padding: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LayerConfig {
    pub texture: TextureConfig,
    /// Leftward scroll speed, pixels/s.
    pub speed: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ParallaxConfig {
    pub scale: f32,
    pub background: LayerConfig,
    pub midground: LayerConfig,
    pub foreground: LayerConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BannerConfig {
    pub font_size: f32,
    pub color: [u8; 4],
    pub win_text: String,
    pub lose_text: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "dash!".to_string(),
            width: 512,
            height: 380,
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 1_000.0,
            jump_velocity: -600.0,
        }
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            fallback_size: [64, 64],
            fallback_color: [255, 0, 255, 255],
        }
    }
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            texture: TextureConfig {
                path: "textures/avg-buddy.png".to_string(),
                fallback_size: [768, 128],
                fallback_color: [70, 90, 200, 255],
            },
            frame_count: 6,
            frames_per_second: 12,
        }
    }
}

impl Default for ObstacleConfig {
    fn default() -> Self {
        Self {
            sheet: SheetConfig {
                texture: TextureConfig {
                    path: "textures/spikey.png".to_string(),
                    fallback_size: [384, 128],
                    fallback_color: [200, 40, 60, 255],
                },
                frame_count: 3,
                frames_per_second: 12,
            },
            count: 6,
            spacing: 300.0,
            velocity: -200.0,
            hitbox_padding: 50.0,
        }
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            texture: TextureConfig::default(),
            speed: 0.0,
        }
    }
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: LayerConfig {
                texture: TextureConfig {
                    path: "textures/background-avg.png".to_string(),
                    fallback_size: [256, 192],
                    fallback_color: [40, 30, 70, 255],
                },
                speed: 20.0,
            },
            midground: LayerConfig {
                texture: TextureConfig {
                    path: "textures/midground-aadavg.png".to_string(),
                    fallback_size: [256, 192],
                    fallback_color: [60, 50, 110, 90],
                },
                speed: 40.0,
            },
            foreground: LayerConfig {
                texture: TextureConfig {
                    path: "textures/foreground-avg.png".to_string(),
                    fallback_size: [256, 192],
                    fallback_color: [90, 80, 140, 60],
                },
                speed: 80.0,
            },
        }
    }
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            font_size: 30.0,
            color: [255, 255, 255, 255],
            win_text: "You Win!".to_string(),
            lose_text: "Game Over :(".to_string(),
        }
    }
}

impl GameConfig {
    pub fn platform_config(&self) -> PlatformConfig {
        PlatformConfig {
            title: self.window.title.clone(),
            width: self.window.width,
            height: self.window.height,
        }
    }
}

pub struct ConfigWatcher {
    config_path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub fn new(config_path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&config_path);
        Self {
            config_path,
            last_seen_modified,
        }
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.config_path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to defaults.
pub fn load_config_or_default(path: &Path) -> Result<GameConfig, String> {
    if !path.exists() {
        log::warn!(
            "Config file '{}' not found, using built-in defaults",
            path.display()
        );
        return Ok(GameConfig::default());
    }
    load_config_from_path(path)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.window.width == 0 || config.window.height == 0 {
        return Err("Config validation failed: window width and height must be > 0".to_string());
    }
    if !config.physics.gravity.is_finite() || config.physics.gravity < 0.0 {
        return Err(
            "Config validation failed: physics.gravity must be finite and >= 0".to_string(),
        );
    }
    if !config.physics.jump_velocity.is_finite() || config.physics.jump_velocity >= 0.0 {
        return Err(
            "Config validation failed: physics.jump_velocity must be finite and < 0 (upward)"
                .to_string(),
        );
    }
    validate_sheet("player", &config.player)?;
    validate_sheet("obstacles.sheet", &config.obstacles.sheet)?;
    if config.obstacles.count == 0 {
        return Err("Config validation failed: obstacles.count must be > 0".to_string());
    }
    if !config.obstacles.spacing.is_finite() || !config.obstacles.velocity.is_finite() {
        return Err(
            "Config validation failed: obstacles.spacing and velocity must be finite".to_string(),
        );
    }
    // Negative spacing puts the finish line before the first obstacle.
    if config.obstacles.spacing < 0.0 {
        return Err("Config validation failed: obstacles.spacing must be >= 0".to_string());
    }
    if !config.obstacles.hitbox_padding.is_finite() || config.obstacles.hitbox_padding < 0.0 {
        return Err("Config validation failed: obstacles.hitbox_padding must be >= 0".to_string());
    }
    if !config.parallax.scale.is_finite() || config.parallax.scale <= 0.0 {
        return Err("Config validation failed: parallax.scale must be > 0".to_string());
    }
    for (name, layer) in [
        ("background", &config.parallax.background),
        ("midground", &config.parallax.midground),
        ("foreground", &config.parallax.foreground),
    ] {
        if !layer.speed.is_finite() || layer.speed < 0.0 {
            return Err(format!(
                "Config validation failed: parallax.{name}.speed must be >= 0"
            ));
        }
        validate_texture(&format!("parallax.{name}"), &layer.texture)?;
    }
    if !config.banner.font_size.is_finite() || config.banner.font_size <= 0.0 {
        return Err("Config validation failed: banner.font_size must be > 0".to_string());
    }
    Ok(())
}

fn validate_sheet(name: &str, sheet: &SheetConfig) -> Result<(), String> {
    if sheet.frame_count == 0 {
        return Err(format!(
            "Config validation failed: {name}.frame_count must be > 0"
        ));
    }
    if sheet.frames_per_second == 0 {
        return Err(format!(
            "Config validation failed: {name}.frames_per_second must be > 0"
        ));
    }
    validate_texture(name, &sheet.texture)
}

fn validate_texture(name: &str, texture: &TextureConfig) -> Result<(), String> {
    if texture.path.is_empty() {
        return Err(format!(
            "Config validation failed: {name}.texture.path is empty"
        ));
    }
    if texture.fallback_size[0] == 0 || texture.fallback_size[1] == 0 {
        return Err(format!(
            "Config validation failed: {name}.texture.fallback_size must be > 0"
        ));
    }
    if texture.fallback_size.iter().any(|&side| side > MAX_FALLBACK_SIZE) {
        return Err(format!(
            "Config validation failed: {name}.texture.fallback_size must be <= {MAX_FALLBACK_SIZE}"
        ));
    }
    Ok(())
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    fn temp_file_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "dash_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn defaults_are_valid() {
        validate_config(&GameConfig::default()).expect("defaults should validate");
    }

    #[test]
    fn defaults_match_shipped_tuning() {
        let config = GameConfig::default();
        assert_eq!(config.window.width, 512);
        assert_eq!(config.window.height, 380);
        assert_eq!(config.physics.gravity, 1_000.0);
        assert_eq!(config.physics.jump_velocity, -600.0);
        assert_eq!(config.player.frame_count, 6);
        assert_eq!(config.obstacles.sheet.frame_count, 3);
        assert_eq!(config.obstacles.count, 6);
        assert_eq!(config.obstacles.velocity, -200.0);
        assert_eq!(config.parallax.background.speed, 20.0);
        assert_eq!(config.parallax.midground.speed, 40.0);
        assert_eq!(config.parallax.foreground.speed, 80.0);
    }

    #[test]
    fn empty_object_parses_to_defaults() {
        let path = temp_file_path("empty");
        fs::write(&path, "{}").expect("write temp file");
        let config = load_config_from_path(&path).expect("empty config should load");
        assert_eq!(config, GameConfig::default());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let path = temp_file_path("partial");
        fs::write(
            &path,
            r#"{
              "physics": { "gravity": 1500.0 },
              "obstacles": { "count": 2, "velocity": -250.0 }
            }"#,
        )
        .expect("write temp file");

        let config = load_config_from_path(&path).expect("partial config should load");
        assert_eq!(config.physics.gravity, 1500.0);
        assert_eq!(config.physics.jump_velocity, -600.0);
        assert_eq!(config.obstacles.count, 2);
        assert_eq!(config.obstacles.velocity, -250.0);
        assert_eq!(config.obstacles.spacing, 300.0);
        assert_eq!(config.obstacles.sheet.texture.path, "textures/spikey.png");
        assert_eq!(config.obstacles.sheet.frame_count, 3);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_zero_frame_count() {
        let path = temp_file_path("zero_frames");
        fs::write(&path, r#"{ "player": { "frame_count": 0 } }"#).expect("write temp file");
        let err = load_config_from_path(&path).expect_err("zero frame count should fail");
        assert!(err.contains("player.frame_count"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_downward_jump() {
        let mut config = GameConfig::default();
        config.physics.jump_velocity = 600.0;
        let err = validate_config(&config).expect_err("positive jump should fail");
        assert!(err.contains("jump_velocity"));
    }

    #[test]
    fn rejects_zero_obstacles() {
        let mut config = GameConfig::default();
        config.obstacles.count = 0;
        let err = validate_config(&config).expect_err("no obstacles should fail");
        assert!(err.contains("obstacles.count"));
    }

    #[test]
    fn rejects_oversized_fallback_size() {
        let mut config = GameConfig::default();
        config.parallax.foreground.texture.fallback_size = [70_000, 70_000];
        let err = validate_config(&config).expect_err("oversized placeholder should fail");
        assert!(err.contains("parallax.foreground.texture.fallback_size"));

        config.parallax.foreground.texture.fallback_size = [MAX_FALLBACK_SIZE, 1];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_infinite_physics() {
        let mut config = GameConfig::default();
        config.physics.gravity = f32::INFINITY;
        let err = validate_config(&config).expect_err("infinite gravity should fail");
        assert!(err.contains("physics.gravity"));

        let mut config = GameConfig::default();
        config.physics.jump_velocity = f32::NEG_INFINITY;
        let err = validate_config(&config).expect_err("infinite jump should fail");
        assert!(err.contains("physics.jump_velocity"));
    }

    #[test]
    fn rejects_negative_spacing() {
        let mut config = GameConfig::default();
        config.obstacles.spacing = -300.0;
        let err = validate_config(&config).expect_err("negative spacing should fail");
        assert!(err.contains("obstacles.spacing"));

        config.obstacles.spacing = 0.0;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_negative_scroll_speed() {
        let mut config = GameConfig::default();
        config.parallax.midground.speed = -1.0;
        let err = validate_config(&config).expect_err("negative speed should fail");
        assert!(err.contains("parallax.midground.speed"));
    }

    #[test]
    fn malformed_json_reports_path() {
        let path = temp_file_path("malformed");
        fs::write(&path, "{ not json").expect("write temp file");
        let err = load_config_from_path(&path).expect_err("malformed json should fail");
        assert!(err.contains("Failed to parse config JSON"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = temp_file_path("missing");
        let config = load_config_or_default(&path).expect("missing file uses defaults");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn watcher_detects_newly_created_file() {
        let path = temp_file_path("watcher_create");
        let _ = fs::remove_file(&path);

        let mut watcher = ConfigWatcher::new(path.clone());
        assert!(!watcher.should_reload(), "missing file should not reload");

        fs::write(&path, "{}").expect("write temp file");
        assert!(
            watcher.should_reload(),
            "creating file should trigger reload once"
        );
        assert!(
            !watcher.should_reload(),
            "without changes, second poll should not reload"
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn shipped_config_file_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/config/dash.json");
        let config = load_config_from_path(&path).expect("shipped config should load");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn platform_config_mirrors_window_section() {
        let mut config = GameConfig::default();
        config.window.title = "test".to_string();
        config.window.width = 640;
        let platform = config.platform_config();
        assert_eq!(platform.title, "test");
        assert_eq!(platform.width, 640);
        assert_eq!(platform.height, 380);
    }
}
