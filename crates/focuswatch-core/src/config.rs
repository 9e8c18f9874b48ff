//! TOML-based watcher configuration.
//!
//! Holds every tunable of the engine:
//! - Window rules (regex, score, description) in priority order
//! - Default scoring and self-window scoring
//! - Mild penalty hours and the 30-minute score reset
//! - Window presentation behavior (topmost, proximity hiding, flow fade)
//! - Game process detection for slow-polling
//!
//! A loaded [`Config`] is a fully-validated, immutable snapshot; the engine
//! never observes a partially-updated one. [`ConfigWatcher`] reloads the
//! file when its mtime changes, keeping the previous snapshot on error.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One scoring rule: the first rule whose regex matches the active window
/// title (case-insensitive, unanchored) contributes its score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRule {
    /// Regex searched against the window title. An empty pattern never
    /// matches.
    #[serde(default)]
    pub regex: String,
    #[serde(default = "default_rule_score")]
    pub score: i64,
    #[serde(default)]
    pub description: String,
}

/// Foreground game detection. While one of the named processes is running,
/// the watch loop stretches its tick interval to `check_interval_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetection {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub process_names: Vec<String>,
    #[serde(default = "default_game_check_interval")]
    pub check_interval_seconds: u64,
}

/// Validated configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub verbose: bool,

    /// Score applied when no rule matches (if `apply_default_score_mode`).
    #[serde(default = "default_default_score")]
    pub default_score: i64,
    #[serde(default = "default_true")]
    pub apply_default_score_mode: bool,

    /// Score applied while the watcher's own window is focused.
    #[serde(default)]
    pub self_window_score: i64,
    /// Title of the watcher's own window; an empty title disables the
    /// self-window rule.
    #[serde(default = "default_self_window_title")]
    pub self_window_title: String,

    #[serde(default = "default_true")]
    pub always_on_top: bool,
    #[serde(default = "default_true")]
    pub hide_on_mouse_proximity: bool,
    /// Pixels the window bounding box is expanded by on all four sides for
    /// the proximity check.
    #[serde(default = "default_proximity_distance")]
    pub proximity_distance: i32,
    #[serde(default = "default_true")]
    pub always_on_top_while_score_decreasing: bool,

    /// Clamp negative deltas to -1 between the configured hours.
    #[serde(default)]
    pub mild_penalty_mode: bool,
    #[serde(default = "default_mild_penalty_start_hour")]
    pub mild_penalty_start_hour: u32,
    #[serde(default = "default_mild_penalty_end_hour")]
    pub mild_penalty_end_hour: u32,

    #[serde(default = "default_score_up_color")]
    pub score_up_color: String,
    #[serde(default = "default_score_down_color")]
    pub score_down_color: String,

    #[serde(default = "default_true")]
    pub reset_score_every_30_minutes: bool,

    #[serde(default = "default_true")]
    pub fade_window_on_flow_mode_enabled: bool,
    /// Seconds of sustained flow before the fade starts.
    #[serde(default = "default_flow_mode_delay_seconds")]
    pub flow_mode_delay_seconds: u32,
    #[serde(default = "default_fade_rate")]
    pub flow_mode_fade_rate_percent_per_second: u32,
    /// 0.0 = fully transparent, 1.0 = fully opaque.
    #[serde(default = "default_default_transparency")]
    pub default_transparency: f64,

    /// Initial overlay position; `None` leaves placement to the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_y: Option<i32>,

    #[serde(default)]
    pub window_patterns: Vec<WindowRule>,

    #[serde(default)]
    pub game_playing_detection: GameDetection,
}

// Default functions
fn default_rule_score() -> i64 {
    1
}
fn default_game_check_interval() -> u64 {
    60
}
fn default_default_score() -> i64 {
    -1
}
fn default_true() -> bool {
    true
}
fn default_self_window_title() -> String {
    "FocusWatch".into()
}
fn default_proximity_distance() -> i32 {
    50
}
fn default_mild_penalty_start_hour() -> u32 {
    22
}
fn default_mild_penalty_end_hour() -> u32 {
    23
}
fn default_score_up_color() -> String {
    "#ffffff".into()
}
fn default_score_down_color() -> String {
    "#ff0000".into()
}
fn default_flow_mode_delay_seconds() -> u32 {
    3
}
fn default_fade_rate() -> u32 {
    20
}
fn default_default_transparency() -> f64 {
    1.0
}

impl Default for GameDetection {
    fn default() -> Self {
        Self {
            enabled: false,
            process_names: Vec::new(),
            check_interval_seconds: default_game_check_interval(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            default_score: -1,
            apply_default_score_mode: true,
            self_window_score: 0,
            self_window_title: default_self_window_title(),
            always_on_top: true,
            hide_on_mouse_proximity: true,
            proximity_distance: 50,
            always_on_top_while_score_decreasing: true,
            mild_penalty_mode: false,
            mild_penalty_start_hour: 22,
            mild_penalty_end_hour: 23,
            score_up_color: default_score_up_color(),
            score_down_color: default_score_down_color(),
            reset_score_every_30_minutes: true,
            fade_window_on_flow_mode_enabled: true,
            flow_mode_delay_seconds: 3,
            flow_mode_fade_rate_percent_per_second: 20,
            default_transparency: 1.0,
            window_x: None,
            window_y: None,
            window_patterns: Vec::new(),
            game_playing_detection: GameDetection::default(),
        }
    }
}

impl Config {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every range and format constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.proximity_distance < 0 {
            return Err(ConfigError::InvalidValue {
                key: "proximity_distance",
                message: format!(
                    "{} must be a non-negative integer",
                    self.proximity_distance
                ),
            });
        }
        validate_hour(self.mild_penalty_start_hour, "mild_penalty_start_hour")?;
        validate_hour(self.mild_penalty_end_hour, "mild_penalty_end_hour")?;
        validate_hex_color(&self.score_up_color, "score_up_color")?;
        validate_hex_color(&self.score_down_color, "score_down_color")?;
        let rate = self.flow_mode_fade_rate_percent_per_second;
        if rate == 0 || rate > 100 {
            return Err(ConfigError::InvalidValue {
                key: "flow_mode_fade_rate_percent_per_second",
                message: format!("{rate} must be an integer between 1 and 100"),
            });
        }
        if !(0.0..=1.0).contains(&self.default_transparency) {
            return Err(ConfigError::InvalidValue {
                key: "default_transparency",
                message: format!(
                    "{} must be between 0.0 and 1.0",
                    self.default_transparency
                ),
            });
        }
        for (index, rule) in self.window_patterns.iter().enumerate() {
            if rule.regex.is_empty() {
                continue;
            }
            if let Err(e) = regex::Regex::new(&rule.regex) {
                return Err(ConfigError::InvalidPattern {
                    index,
                    message: e.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn validate_hour(value: u32, key: &'static str) -> Result<(), ConfigError> {
    if value > 23 {
        return Err(ConfigError::InvalidValue {
            key,
            message: format!("{value} must be an integer between 0 and 23"),
        });
    }
    Ok(())
}

fn validate_hex_color(value: &str, key: &'static str) -> Result<(), ConfigError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(ConfigError::InvalidValue {
            key,
            message: format!("{value:?} must be a 7-character hex color string (e.g., '#ffffff')"),
        });
    }
    Ok(())
}

/// Tracks a configuration file on disk and reloads it when modified.
///
/// Reload failures leave the caller's previous snapshot untouched -- the
/// engine only ever swaps to a fully-validated replacement.
#[derive(Debug)]
pub struct ConfigWatcher {
    path: PathBuf,
    last_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load, parse, and validate the file, recording its mtime.
    pub fn load(&mut self) -> Result<Config, ConfigError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                ConfigError::ReadFailed {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        let config = Config::from_toml_str(&raw)?;
        self.last_modified = mtime(&self.path);
        Ok(config)
    }

    /// Whether the file's mtime differs from the last successful load.
    pub fn is_modified(&self) -> bool {
        match mtime(&self.path) {
            Some(current) => self.last_modified != Some(current),
            None => false,
        }
    }

    /// Reload when modified. `Ok(None)` means the file was unchanged.
    pub fn reload_if_modified(&mut self) -> Result<Option<Config>, ConfigError> {
        if self.is_modified() {
            self.load().map(Some)
        } else {
            Ok(None)
        }
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_score, -1);
        assert!(config.apply_default_score_mode);
        assert_eq!(config.proximity_distance, 50);
        assert_eq!(config.flow_mode_delay_seconds, 3);
        assert_eq!(config.default_transparency, 1.0);
        assert!(!config.game_playing_detection.enabled);
        assert_eq!(config.game_playing_detection.check_interval_seconds, 60);
    }

    #[test]
    fn full_file_parses() {
        let config = Config::from_toml_str(
            r##"
verbose = true
default_score = -2
apply_default_score_mode = false
self_window_score = 1
always_on_top = false
hide_on_mouse_proximity = false
proximity_distance = 80
always_on_top_while_score_decreasing = false
mild_penalty_mode = true
mild_penalty_start_hour = 23
mild_penalty_end_hour = 1
score_up_color = "#00ff00"
score_down_color = "#0000ff"
reset_score_every_30_minutes = false
fade_window_on_flow_mode_enabled = false
flow_mode_delay_seconds = 10
flow_mode_fade_rate_percent_per_second = 50
default_transparency = 0.9
window_x = 100
window_y = 200

[[window_patterns]]
regex = "github"
score = 10
description = "GitHub"

[[window_patterns]]
regex = "twitter|x\\.com"
score = -5
description = "Twitter/X"

[game_playing_detection]
enabled = true
process_names = ["StreetFighter6.exe"]
check_interval_seconds = 30
"##,
        )
        .unwrap();
        assert_eq!(config.window_patterns.len(), 2);
        assert_eq!(config.window_patterns[0].score, 10);
        assert_eq!(config.window_patterns[1].regex, "twitter|x\\.com");
        assert_eq!(config.mild_penalty_start_hour, 23);
        assert_eq!(config.mild_penalty_end_hour, 1);
        assert_eq!(config.window_x, Some(100));
        assert!(config.game_playing_detection.enabled);
        assert_eq!(
            config.game_playing_detection.process_names,
            vec!["StreetFighter6.exe"]
        );
    }

    #[test]
    fn pattern_score_defaults_to_one() {
        let config = Config::from_toml_str(
            r#"
[[window_patterns]]
regex = "docs"
"#,
        )
        .unwrap();
        assert_eq!(config.window_patterns[0].score, 1);
        assert_eq!(config.window_patterns[0].description, "");
    }

    #[test]
    fn rejects_hour_out_of_range() {
        let err = Config::from_toml_str("mild_penalty_start_hour = 24").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "mild_penalty_start_hour",
                ..
            }
        ));
    }

    #[test]
    fn rejects_fade_rate_out_of_range() {
        for raw in [
            "flow_mode_fade_rate_percent_per_second = 0",
            "flow_mode_fade_rate_percent_per_second = 101",
        ] {
            let err = Config::from_toml_str(raw).unwrap_err();
            assert!(matches!(
                err,
                ConfigError::InvalidValue {
                    key: "flow_mode_fade_rate_percent_per_second",
                    ..
                }
            ));
        }
    }

    #[test]
    fn rejects_transparency_out_of_range() {
        let err = Config::from_toml_str("default_transparency = 1.5").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "default_transparency",
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_hex_color() {
        for raw in [
            r##"score_up_color = "ffffff""##,
            r##"score_down_color = "#ff00" "##,
            r##"score_up_color = "#gggggg""##,
        ] {
            assert!(Config::from_toml_str(raw).is_err(), "accepted: {raw}");
        }
    }

    #[test]
    fn rejects_negative_proximity_distance() {
        let err = Config::from_toml_str("proximity_distance = -1").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "proximity_distance",
                ..
            }
        ));
    }

    #[test]
    fn rejects_uncompilable_pattern() {
        let err = Config::from_toml_str(
            r#"
[[window_patterns]]
regex = "["
score = 1
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { index: 0, .. }));
    }

    #[test]
    fn empty_pattern_is_allowed() {
        // An empty regex is tolerated at load time; it simply never matches.
        let config = Config::from_toml_str(
            r#"
[[window_patterns]]
regex = ""
score = 5
"#,
        )
        .unwrap();
        assert_eq!(config.window_patterns.len(), 1);
    }
}
