use directories::ProjectDirs;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use std::f64::consts::{FRAC_PI_2, PI};
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

/// Compass position of the fixed pointer the wheel is read against.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum PointerDirection {
    #[default]
    #[strum(serialize = "East", serialize = "e", serialize = "0")]
    East,
    #[strum(serialize = "South", serialize = "s", serialize = "1")]
    South,
    #[strum(serialize = "West", serialize = "w", serialize = "2")]
    West,
    #[strum(serialize = "North", serialize = "n", serialize = "3")]
    North,
}

impl PointerDirection {
    /// Angle of the pointer in the wheel's coordinate system (x right, y down).
    pub fn angle(self) -> f64 {
        match self {
            Self::East => 0.0,
            Self::South => FRAC_PI_2,
            Self::West => PI,
            Self::North => 3.0 * FRAC_PI_2,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct SpinSettings {
    /// Wall-clock length of one spin animation.
    pub duration_ms: u64,
    /// Guaranteed full turns on top of the random offset.
    pub extra_turns: u32,
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self {
            duration_ms: 5000,
            extra_turns: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Config {
    /// Slice colors as "#RRGGBB" strings; empty means the built-in palette.
    pub palette: Vec<String>,
    pub spin: SpinSettings,
    pub pointer: PointerDirection,
    /// Labels preloaded onto the wheel at startup.
    pub options: Vec<String>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Notify error: {0}")]
    Notify(#[from] notify::Error),
}

pub fn get_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "whirl", "whirl").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let config_path = get_config_path()?;

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("WHIRL"))
        .build()?;

    Ok(s.try_deserialize()?)
}

pub fn load_or_setup() -> Config {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Falling back to default configuration: {}", e);
            Config::default()
        }
    }
}

pub fn write_default_config() -> std::io::Result<std::path::PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

use crate::events::AppEvent;
use async_channel::Sender;

pub async fn run_async_watcher(tx: Sender<AppEvent>) {
    let config_path = match get_config_path() {
        Ok(p) => p,
        Err(e) => {
            log::error!("Config watcher error: {}", e);
            return;
        }
    };
    let config_dir = match config_path.parent() {
        Some(p) => p.to_path_buf(),
        None => return,
    };

    if let Err(e) = fs_err::create_dir_all(&config_dir) {
        log::error!("Failed to create config directory for watching: {}", e);
        return;
    }

    let (bridge_tx, bridge_rx) = async_channel::unbounded();

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = bridge_tx.send_blocking(res);
        },
        notify::Config::default(),
    ) {
        Ok(w) => w,
        Err(e) => {
            log::error!("Failed to create watcher: {}", e);
            return;
        }
    };

    if let Err(e) = watcher.watch(&config_dir, RecursiveMode::NonRecursive) {
        log::error!("Failed to watch config directory: {}", e);
        return;
    }

    while let Ok(res) = bridge_rx.recv().await {
        match res {
            Ok(event) => {
                let meaningful_event = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );

                if meaningful_event
                    && event.paths.iter().any(|p| p == &config_path)
                    && tx.send(AppEvent::ConfigReload).await.is_err()
                {
                    break;
                }
            }
            Err(e) => log::error!("Watch error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use strum::IntoEnumIterator;

    #[test]
    fn test_pointer_direction_deserialization() {
        let cases = vec![
            ("\"east\"", PointerDirection::East),
            ("\"East\"", PointerDirection::East),
            ("\"EAST\"", PointerDirection::East),
            ("\"e\"", PointerDirection::East),
            ("\"0\"", PointerDirection::East),
            ("\"s\"", PointerDirection::South),
            ("\"west\"", PointerDirection::West),
            ("\"n\"", PointerDirection::North),
            ("\"3\"", PointerDirection::North),
        ];

        for (json, expected) in cases {
            let deserialized: PointerDirection = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn test_pointer_angles_cover_one_turn() {
        for dir in PointerDirection::iter() {
            let angle = dir.angle();
            assert!((0.0..2.0 * PI).contains(&angle), "{dir}: {angle}");
        }
        assert_eq!(PointerDirection::default().angle(), 0.0);
    }

    #[test]
    fn test_default_config_file_matches_defaults() {
        let parsed: Config = config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed.palette.len(), 12);
        assert_eq!(parsed.spin.duration_ms, SpinSettings::default().duration_ms);
        assert_eq!(parsed.spin.extra_turns, SpinSettings::default().extra_turns);
        assert_eq!(parsed.pointer, PointerDirection::East);
        assert!(parsed.options.is_empty());
    }
}
