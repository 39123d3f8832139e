// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporter configuration.
//!
//! Configuration is read from a TOML file. Every setting has a default, taken
//! from the embedded `default-config.toml`.

use crate::errors::ConfigError;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::{collections::BTreeSet, io};
use teamcity_messages::TimestampOffset;
use tracing::{debug, warn};

/// Special value for `--config` and `SCALATEST_TEAMCITY_CONFIG` that skips
/// config loading entirely.
pub const CONFIG_NONE: &str = "none";

/// The paths, relative to the working directory, searched for a config file.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "scalatest-teamcity.toml",
    ".config/scalatest-teamcity.toml",
];

/// Specifies where to load configuration from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigLocation<'a> {
    /// Discover configuration from [`DEFAULT_CONFIG_PATHS`].
    Default,

    /// Skip config loading entirely, using only built-in defaults.
    Isolated,

    /// Load configuration from an explicit path.
    ///
    /// Returns an error if the file does not exist.
    Explicit(&'a Utf8Path),
}

impl<'a> ConfigLocation<'a> {
    /// Creates a config location from a CLI or environment variable value.
    ///
    /// Returns `Default` if `None`, `Isolated` if `"none"`, otherwise
    /// `Explicit` with the path.
    pub fn from_cli_or_env(s: Option<&'a str>) -> Self {
        match s {
            None => Self::Default,
            Some(s) if s == CONFIG_NONE => Self::Isolated,
            Some(s) => Self::Explicit(Utf8Path::new(s)),
        }
    }
}

/// Resolved reporter configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ReporterConfig {
    /// Write an empty line before every service message.
    pub blank_line_separators: bool,

    /// Decode Scala-encoded names in test names.
    pub decode_names: bool,

    /// The offset used to format timestamps.
    pub timestamp_offset: TimestampOffset,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        DefaultConfig::from_embedded().resolve(None)
    }
}

impl ReporterConfig {
    /// Loads configuration from the given location.
    ///
    /// `base_dir` is the directory that [`DEFAULT_CONFIG_PATHS`] are relative
    /// to, typically the current working directory.
    pub fn from_location(
        location: ConfigLocation<'_>,
        base_dir: &Utf8Path,
    ) -> Result<Self, ConfigError> {
        Self::from_location_with_warnings(location, base_dir, &mut DefaultConfigWarnings)
    }

    fn from_location_with_warnings(
        location: ConfigLocation<'_>,
        base_dir: &Utf8Path,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigError> {
        let config = match location {
            ConfigLocation::Isolated => {
                debug!("config: skipping (isolated)");
                None
            }
            ConfigLocation::Explicit(path) => {
                debug!("config: loading from explicit path {path}");
                match DeserializedConfig::from_path_with_warnings(path, warnings)? {
                    Some(config) => Some(config),
                    None => {
                        return Err(ConfigError::FileNotFound {
                            path: path.to_owned(),
                        });
                    }
                }
            }
            ConfigLocation::Default => {
                let paths: Vec<Utf8PathBuf> = DEFAULT_CONFIG_PATHS
                    .iter()
                    .map(|path| base_dir.join(path))
                    .collect();
                let mut found = None;
                for path in &paths {
                    if let Some(config) = DeserializedConfig::from_path_with_warnings(path, warnings)? {
                        found = Some(config);
                        break;
                    }
                }
                if found.is_none() {
                    debug!("config: no config file found at any candidate path: {paths:?}");
                }
                found
            }
        };

        Ok(DefaultConfig::from_embedded().resolve(config.as_ref()))
    }
}

/// Trait for handling config warnings.
///
/// The default implementation logs warnings, while tests collect them.
trait ConfigWarnings {
    /// Handle unknown configuration keys found in a config file.
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>);
}

struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(&mut self, config_file: &Utf8Path, unknown: &BTreeSet<String>) {
        let mut unknown_str = String::new();
        if unknown.len() == 1 {
            // Print this on the same line.
            unknown_str.push_str("key: ");
            unknown_str.extend(unknown.iter().map(String::as_str));
        } else {
            unknown_str.push_str("keys:\n");
            for ignored_key in unknown {
                unknown_str.push_str("\n  - ");
                unknown_str.push_str(ignored_key);
            }
        }

        warn!("in config file {config_file}, ignoring unknown configuration {unknown_str}");
    }
}

/// Timestamp offset as written in config files.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
enum OffsetSetting {
    Utc,
    Local,
}

impl From<OffsetSetting> for TimestampOffset {
    fn from(setting: OffsetSetting) -> Self {
        match setting {
            OffsetSetting::Utc => TimestampOffset::Utc,
            OffsetSetting::Local => TimestampOffset::Local,
        }
    }
}

/// A config file, as deserialized. Every setting is optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedConfig {
    #[serde(default)]
    output: DeserializedOutputConfig,
    #[serde(default)]
    names: DeserializedNamesConfig,
    #[serde(default)]
    timestamps: DeserializedTimestampsConfig,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedOutputConfig {
    blank_line_separators: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedNamesConfig {
    decode: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DeserializedTimestampsConfig {
    offset: Option<OffsetSetting>,
}

impl DeserializedConfig {
    /// Loads a config file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    fn from_path_with_warnings(
        path: &Utf8Path,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Option<Self>, ConfigError> {
        debug!("config: attempting to load from {path}");
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!("config: file does not exist at {path}");
                return Ok(None);
            }
            Err(error) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    error,
                });
            }
        };

        let (config, unknown) =
            deserialize_toml::<Self>(&contents).map_err(|error| ConfigError::Parse {
                path: path.to_owned(),
                error,
            })?;

        if !unknown.is_empty() {
            warnings.unknown_config_keys(path, &unknown);
        }

        debug!("config: loaded successfully from {path}");
        Ok(Some(config))
    }
}

/// The embedded default config. Every setting is required.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultConfig {
    output: DefaultOutputConfig,
    names: DefaultNamesConfig,
    timestamps: DefaultTimestampsConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultOutputConfig {
    blank_line_separators: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultNamesConfig {
    decode: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DefaultTimestampsConfig {
    offset: OffsetSetting,
}

impl DefaultConfig {
    const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Parses the embedded default config.
    ///
    /// Panics if the embedded TOML is invalid or contains unknown keys.
    fn from_embedded() -> Self {
        let (config, unknown) = deserialize_toml::<Self>(Self::DEFAULT_CONFIG)
            .expect("embedded default config should be valid");

        // The default config is shipped with this crate, so unknown keys are a bug.
        if !unknown.is_empty() {
            panic!(
                "found unknown keys in default config: {}",
                unknown.into_iter().collect::<Vec<_>>().join(", ")
            );
        }

        config
    }

    fn resolve(&self, config: Option<&DeserializedConfig>) -> ReporterConfig {
        ReporterConfig {
            blank_line_separators: config
                .and_then(|c| c.output.blank_line_separators)
                .unwrap_or(self.output.blank_line_separators),
            decode_names: config
                .and_then(|c| c.names.decode)
                .unwrap_or(self.names.decode),
            timestamp_offset: config
                .and_then(|c| c.timestamps.offset)
                .unwrap_or(self.timestamps.offset)
                .into(),
        }
    }
}

/// Deserializes TOML content and returns it along with any unknown keys.
fn deserialize_toml<T: for<'de> Deserialize<'de>>(
    contents: &str,
) -> Result<(T, BTreeSet<String>), toml::de::Error> {
    let deserializer = toml::Deserializer::parse(contents)?;
    let mut unknown = BTreeSet::new();
    let config: T = serde_ignored::deserialize(deserializer, |path| {
        unknown.insert(path.to_string());
    })?;
    Ok((config, unknown))
}
