//! Harness configuration.
//!
//! Selects the game, seed, tick pacing and input source of a headless run,
//! plus the tuning of both games. Loaded from and saved to a TOML file.

use ghost_gameplay::{AutopilotConfig, RacingConfig, StrategyConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "ghostline.toml";

/// Which game a run plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GameChoice {
    /// Lane racer
    #[default]
    Racing,
    /// Case-study strategy game
    Strategy,
}

impl GameChoice {
    /// Name written into exported logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Racing => "racing",
            Self::Strategy => "strategy",
        }
    }
}

/// Where live actions come from while recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InputChoice {
    /// Built-in deterministic script
    #[default]
    Scripted,
    /// Obstacle-avoiding driver (racing only)
    Autopilot,
    /// No input at all
    Idle,
}

/// Headless harness parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    // === Session ===
    /// Game to play
    pub game: GameChoice,
    /// Session seed (None = the game's default seed)
    pub seed: Option<u64>,
    /// Live input source
    pub input: InputChoice,

    // === Timing ===
    /// Milliseconds per tick
    pub tick_ms: u64,
    /// Tick limit for the recording
    pub max_ticks: u64,
    /// Pace ticks against the wall clock instead of simulated time
    pub realtime: bool,

    // === Output ===
    /// Where the exported action log is written
    pub log_path: PathBuf,

    // === Tuning ===
    /// Racing rules
    pub racing: RacingConfig,
    /// Autopilot thresholds
    pub autopilot: AutopilotConfig,
    /// Strategy rules
    pub strategy: StrategyConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            game: GameChoice::Racing,
            seed: None,
            input: InputChoice::Scripted,

            tick_ms: 16,
            max_ticks: 3_600, // one minute at 60 Hz
            realtime: false,

            log_path: PathBuf::from("ghostline-log.json"),

            racing: RacingConfig::default(),
            autopilot: AutopilotConfig::default(),
            strategy: StrategyConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Reads a harness config, falling back to defaults when the file is
    /// missing or unreadable. Loaded values are validated before use, so a
    /// bad `[racing]` table cannot reach the simulation.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "No harness config, using defaults");
            return Self::default();
        }

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| toml::from_str::<Self>(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(mut config) => {
                config.validate();
                info!(
                    path = %path.display(),
                    game = config.game.as_str(),
                    input = ?config.input,
                    "Loaded harness config"
                );
                config
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unusable harness config, using defaults");
                Self::default()
            },
        }
    }

    /// Writes the config as TOML, creating parent directories.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        let text = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;

        info!(path = %path.display(), game = self.game.as_str(), "Saved harness config");
        Ok(())
    }

    /// Clamps pacing to ranges the harness can run and repairs game tuning.
    pub fn validate(&mut self) {
        let (tick_ms, max_ticks) = (self.tick_ms, self.max_ticks);
        self.tick_ms = tick_ms.clamp(1, 1_000);
        self.max_ticks = max_ticks.clamp(1, 1_000_000);
        if (tick_ms, max_ticks) != (self.tick_ms, self.max_ticks) {
            warn!(
                tick_ms = self.tick_ms,
                max_ticks = self.max_ticks,
                "Harness pacing clamped"
            );
        }
        self.racing.validate();
    }

    /// The seed a recording starts with.
    #[must_use]
    pub fn resolved_seed(&self) -> u64 {
        use ghost_gameplay::{RacingGame, StrategyGame};
        use ghost_replay::GameKind;

        self.seed.unwrap_or(match self.game {
            GameChoice::Racing => RacingGame::DEFAULT_SEED,
            GameChoice::Strategy => StrategyGame::DEFAULT_SEED,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::default();
        assert_eq!(config.game, GameChoice::Racing);
        assert_eq!(config.input, InputChoice::Scripted);
        assert_eq!(config.tick_ms, 16);
        assert!(!config.realtime);
        assert_eq!(config.resolved_seed(), 12_345);
    }

    #[test]
    fn test_strategy_default_seed() {
        let config = HarnessConfig {
            game: GameChoice::Strategy,
            ..HarnessConfig::default()
        };
        assert_eq!(config.resolved_seed(), 54_321);

        let config = HarnessConfig {
            seed: Some(9),
            ..config
        };
        assert_eq!(config.resolved_seed(), 9);
    }

    #[test]
    fn test_config_validation() {
        let mut config = HarnessConfig {
            tick_ms: 0,
            max_ticks: 0,
            ..HarnessConfig::default()
        };
        config.validate();
        assert_eq!(config.tick_ms, 1);
        assert_eq!(config.max_ticks, 1);
    }

    #[test]
    fn test_loaded_racing_bounds_are_repaired() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("reversed.toml");
        fs::write(
            &config_path,
            "[racing]\nplayer_min_x = 700.0\nplayer_max_x = 100.0\n",
        )
        .expect("write");

        let config = HarnessConfig::load_from(&config_path);
        assert!(config.racing.player_min_x <= config.racing.player_max_x);
        assert!((config.racing.player_min_x - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("ghostline.toml");

        let mut config = HarnessConfig::default();
        config.game = GameChoice::Strategy;
        config.seed = Some(777);
        config.input = InputChoice::Idle;
        config.strategy.signal_interval = 45;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = HarnessConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = HarnessConfig::load_from("/nonexistent/path/ghostline.toml");
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn test_config_load_invalid_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "game = [not toml").expect("write");

        assert_eq!(HarnessConfig::load_from(&config_path), HarnessConfig::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: HarnessConfig =
            toml::from_str("game = \"strategy\"\n[racing]\nmove_step = 8.0\n").expect("parse");
        assert_eq!(config.game, GameChoice::Strategy);
        assert!((config.racing.move_step - 8.0).abs() < f32::EPSILON);
        assert_eq!(config.racing.coin_points, 100);
        assert_eq!(config.max_ticks, 3_600);
    }

    #[test]
    fn test_config_toml_serialization() {
        let toml_str =
            toml::to_string_pretty(&HarnessConfig::default()).expect("Failed to serialize");
        assert!(toml_str.contains("tick_ms"));
        assert!(toml_str.contains("[racing]"));
    }
}
