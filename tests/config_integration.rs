//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use std::fs;
use std::path::PathBuf;

use gauntlet::config::AppConfig;
use serial_test::serial;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gauntlet-config-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("GAUNTLET_WINDOW__TITLE", "Test From Env");
    std::env::set_var("GAUNTLET_PHYSICS__GRAVITY", "-0.6");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("GAUNTLET_WINDOW__TITLE");
    std::env::remove_var("GAUNTLET_PHYSICS__GRAVITY");

    assert_eq!(config.window.title, "Test From Env");
    assert_eq!(config.physics.gravity, -0.6);
}

#[test]
#[serial]
fn test_shipped_defaults_match_code() {
    let config = AppConfig::load().unwrap();
    let defaults = AppConfig::default();
    assert_eq!(config.physics.tick_rate, defaults.physics.tick_rate);
    assert_eq!(config.physics.jump_velocity, defaults.physics.jump_velocity);
    assert_eq!(config.game.restart_clock, defaults.game.restart_clock);
    assert_eq!(config.rendering.shadow_map_size, defaults.rendering.shadow_map_size);
    assert_eq!(config.camera.eye_height, defaults.camera.eye_height);
}

#[test]
#[serial]
fn test_user_file_overrides_default_file() {
    let dir = scratch_dir("layers");
    fs::write(dir.join("default.toml"), "[window]\ntitle = \"Base\"\nwidth = 800\n").unwrap();
    fs::write(dir.join("user.toml"), "[window]\ntitle = \"Mine\"\n\n[debug]\nlevel_skip_keys = true\n").unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    fs::remove_dir_all(&dir).unwrap();

    assert_eq!(config.window.title, "Mine");
    assert_eq!(config.window.width, 800);
    assert!(config.debug.level_skip_keys);
    assert!(config.to_game_config().level_skip_keys);
}

#[test]
#[serial]
fn test_missing_directory_gives_defaults() {
    let config = AppConfig::load_from("does/not/exist").unwrap();
    assert_eq!(config.window.title, "Gauntlet");
    assert_eq!(config.game.lava_rise_rate, 0.1);
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    let dir = scratch_dir("malformed");
    fs::write(dir.join("default.toml"), "[physics]\ngravity = \"down\"\n").unwrap();
    let result = AppConfig::load_from(&dir);
    fs::remove_dir_all(&dir).unwrap();

    let error = result.unwrap_err();
    assert!(error.to_string().starts_with("Configuration error"));
}
