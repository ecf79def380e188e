//! Configuration loading and typed config structures for the Moodsprite service.
//!
//! The canonical configuration lives in `moodsprite-config.yaml` at the
//! project root. Every field has a default, so an empty document (or no
//! file at all) yields a working service pointed at `sera/keyframes`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use moodsprite_assets::CharacterDefinition;
use serde::Deserialize;

/// Environment variable naming an alternate config file.
pub const CONFIG_PATH_ENV: &str = "MOODSPRITE_CONFIG";
/// Environment variable overriding `assets.root`.
pub const ASSET_ROOT_ENV: &str = "MOODSPRITE_ASSET_ROOT";
/// Environment variable overriding `server.port`.
pub const PORT_ENV: &str = "MOODSPRITE_PORT";
/// Config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "moodsprite-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `moodsprite-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Where the asset producer's tree lives.
    #[serde(default)]
    pub assets: AssetsConfig,

    /// Streaming session cadence and entry mood.
    #[serde(default)]
    pub session: SessionSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// The character to build: moods, cues and version metadata.
    #[serde(default)]
    pub character: CharacterDefinition,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `MOODSPRITE_ASSET_ROOT` overrides `assets.root`
    /// - `MOODSPRITE_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse configuration from a YAML string, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as null, not as an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Unparseable port values are ignored and the configured port kept.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ASSET_ROOT_ENV) {
            self.assets.root = PathBuf::from(root);
        }
        if let Some(port) = lookup(PORT_ENV).and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Asset tree location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetsConfig {
    /// Root directory holding the subject image and one directory per mood.
    #[serde(default = "default_asset_root")]
    pub root: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: default_asset_root(),
        }
    }
}

/// Session streaming parameters as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSettings {
    /// Milliseconds between cues.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Validity window stamped on every cue.
    #[serde(default = "default_duration_valid_ms")]
    pub duration_valid_ms: u32,

    /// Substring selecting the mood a session streams.
    #[serde(default = "default_entry_mood_keyword")]
    pub entry_mood_keyword: String,
}

impl SessionSettings {
    /// The tick interval as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            duration_valid_ms: default_duration_valid_ms(),
            entry_mood_keyword: default_entry_mood_keyword(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    50051
}

fn default_asset_root() -> PathBuf {
    PathBuf::from("sera/keyframes")
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_duration_valid_ms() -> u32 {
    1000
}

fn default_entry_mood_keyword() -> String {
    "helpful".to_owned()
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.port, 50051);
        assert_eq!(config.assets.root, PathBuf::from("sera/keyframes"));
        assert_eq!(config.session.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.session.duration_valid_ms, 1000);
        assert_eq!(config.session.entry_mood_keyword, "helpful");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.character.name, "Sera");
    }

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = ServiceConfig::parse_without_env("").unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9000

assets:
  root: "/srv/pip"

session:
  tick_interval_ms: 250
  duration_valid_ms: 400
  entry_mood_keyword: "cheerful"

logging:
  level: "debug"

character:
  name: "Pip"
  semantic_version: "0.3.0"
  moods:
    - name: happy
      description: "cheerful and bright"
      cues: ["grinning", "laughing"]
"#;
        let config = ServiceConfig::parse_without_env(yaml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.assets.root, PathBuf::from("/srv/pip"));
        assert_eq!(config.session.tick_interval(), Duration::from_millis(250));
        assert_eq!(config.session.duration_valid_ms, 400);
        assert_eq!(config.session.entry_mood_keyword, "cheerful");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.character.name, "Pip");
        assert_eq!(config.character.moods.len(), 1);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = ServiceConfig::parse_without_env("session:\n  tick_interval_ms: 50\n").unwrap();
        assert_eq!(config.session.tick_interval_ms, 50);
        assert_eq!(config.session.duration_valid_ms, 1000);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn overrides_replace_root_and_port() {
        let vars: BTreeMap<&str, &str> =
            BTreeMap::from([(ASSET_ROOT_ENV, "/tmp/assets"), (PORT_ENV, "8088")]);
        let mut config = ServiceConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| (*v).to_owned()));
        assert_eq!(config.assets.root, PathBuf::from("/tmp/assets"));
        assert_eq!(config.server.port, 8088);
    }

    #[test]
    fn bad_port_override_is_ignored() {
        let mut config = ServiceConfig::default();
        config.apply_overrides(|key| (key == PORT_ENV).then(|| "not-a-port".to_owned()));
        assert_eq!(config.server.port, 50051);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = ServiceConfig::parse_without_env("server: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = ServiceConfig::from_file(Path::new("/nonexistent/moodsprite.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
