use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::pipeline::project::Configuration;
use crate::shared::{ColorScheme, GridSize};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    defaults: DefaultsConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Deserialize, Default)]
struct DefaultsConfig {
    color_scheme: Option<String>,
    grid_size: Option<String>,
    midi_input: Option<String>,
}

#[derive(Deserialize, Default)]
struct LoggingConfig {
    level: Option<String>,
}

/// Startup defaults: the embedded `config.toml`, overlaid with the user's file.
pub struct Config {
    defaults: DefaultsConfig,
    logging: LoggingConfig,
}

impl Config {
    /// Load from `path`, or from the user config dir when no path is given.
    pub fn load(path: Option<&Path>) -> Self {
        let mut base: ConfigFile = match toml::from_str(DEFAULT_CONFIG) {
            Ok(base) => base,
            Err(e) => {
                log::error!(target: "config", "embedded config.toml is malformed: {e}");
                ConfigFile::default()
            }
        };

        let path = path.map(Path::to_path_buf).or_else(user_config_path);
        if let Some(path) = path.filter(|p| p.exists()) {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match Self::parse(&contents) {
                    Ok(user) => {
                        log::info!(target: "config", "loaded {}", path.display());
                        merge_defaults(&mut base.defaults, user.defaults);
                        merge_logging(&mut base.logging, user.logging);
                    }
                    Err(e) => {
                        log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                    }
                },
                Err(e) => {
                    log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                }
            }
        }

        Config {
            defaults: base.defaults,
            logging: base.logging,
        }
    }

    fn parse(contents: &str) -> Result<ConfigFile, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.defaults
            .color_scheme
            .as_deref()
            .and_then(|tag| parse_or_warn(tag, "color_scheme", ColorScheme::from_tag))
            .unwrap_or_default()
    }

    pub fn grid_size(&self) -> GridSize {
        self.defaults
            .grid_size
            .as_deref()
            .and_then(|tag| parse_or_warn(tag, "grid_size", GridSize::from_tag))
            .unwrap_or_default()
    }

    pub fn midi_input(&self) -> Option<String> {
        self.defaults.midi_input.clone()
    }

    pub fn log_level(&self) -> Option<log::LevelFilter> {
        self.logging
            .level
            .as_deref()
            .and_then(|level| parse_or_warn(level, "logging.level", |l| l.parse().ok()))
    }

    pub fn configuration(&self) -> Configuration {
        Configuration {
            color_scheme: self.color_scheme(),
            grid_size: self.grid_size(),
            selected_input_id: None,
        }
    }
}

fn parse_or_warn<T>(value: &str, key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let parsed = parse(value.trim());
    if parsed.is_none() {
        log::warn!(target: "config", "unknown {key} {value:?}, using default");
    }
    parsed
}

fn merge_defaults(base: &mut DefaultsConfig, user: DefaultsConfig) {
    if user.color_scheme.is_some() {
        base.color_scheme = user.color_scheme;
    }
    if user.grid_size.is_some() {
        base.grid_size = user.grid_size;
    }
    if user.midi_input.is_some() {
        base.midi_input = user.midi_input;
    }
}

fn merge_logging(base: &mut LoggingConfig, user: LoggingConfig) {
    if user.level.is_some() {
        base.level = user.level;
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("padgrid").join("config.toml"))
}
