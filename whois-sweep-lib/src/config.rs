//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `WS_*`
//! environment variables, and merging them with proper precedence rules.

use crate::error::SweepError;
use crate::types::SweepConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
///
/// This represents the structure of configuration files that users can create
/// to set default values, extra classification phrases and custom presets.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Extra phrases appended to the built-in lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patterns: Option<PatternsConfig>,

    /// User-defined TLD presets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_presets: Option<HashMap<String, Vec<String>>>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Probes per domain (1-10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// Backoff time unit (as string, e.g. "500ms", "1s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff_unit: Option<String>,

    /// Pause between probed domains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<String>,

    /// Timeout for one whois invocation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Server passed to `whois -h`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_server: Option<String>,

    /// Default TLD preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// Default TLD list (alternative to preset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tlds: Option<Vec<String>>,

    /// Default result log path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Only print available domains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_available: Option<bool>,
}

/// Additional classification phrases.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatternsConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rate_limit: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expiry_labels: Vec<String>,
}

impl FileConfig {
    /// Layer this file's settings over `config`.
    ///
    /// Durations are assumed valid; `ConfigManager::load_file` rejects bad ones.
    pub fn apply_to(&self, mut config: SweepConfig) -> SweepConfig {
        if let Some(defaults) = &self.defaults {
            if let Some(max_attempts) = defaults.max_attempts {
                config = config.with_max_attempts(max_attempts);
            }
            if let Some(unit) = defaults.backoff_unit.as_deref().and_then(parse_duration_string) {
                config = config.with_backoff_unit(unit);
            }
            if let Some(delay) = defaults.delay.as_deref().and_then(parse_duration_string) {
                config = config.with_inter_probe_delay(delay);
            }
            if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_duration_string) {
                config = config.with_whois_timeout(timeout);
            }
            if let Some(server) = &defaults.whois_server {
                config = config.with_whois_server(server.clone());
            }
        }

        if let Some(patterns) = &self.patterns {
            config.phrases.extend(
                &patterns.rate_limit,
                &patterns.available,
                &patterns.expiry_labels,
            );
        }

        if let Some(presets) = &self.custom_presets {
            config
                .custom_presets
                .extend(presets.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        config
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if parsing or validation fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, SweepError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SweepError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            SweepError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)
            .map_err(|e| SweepError::config(format!("Failed to parse TOML configuration: {}", e)))?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is the lowest, then the home directory, then the current
    /// directory. Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, SweepError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping config file");
                }
            }
        }

        if self.verbose {
            for path in &loaded_files {
                tracing::info!(path = %path.display(), "Loaded config file");
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./whois-sweep.toml", "./.whois-sweep.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the global configuration file path in the home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".whois-sweep.toml", "whois-sweep.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("whois-sweep").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`; pattern
    /// lists from both are kept.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower_defaults), Some(higher_defaults)) => {
                    // A TLD source in the higher file replaces both in the lower one
                    let (preset, tlds) =
                        if higher_defaults.preset.is_some() || higher_defaults.tlds.is_some() {
                            (higher_defaults.preset, higher_defaults.tlds)
                        } else {
                            (lower_defaults.preset, lower_defaults.tlds)
                        };
                    Some(DefaultsConfig {
                        max_attempts: higher_defaults.max_attempts.or(lower_defaults.max_attempts),
                        backoff_unit: higher_defaults.backoff_unit.or(lower_defaults.backoff_unit),
                        delay: higher_defaults.delay.or(lower_defaults.delay),
                        timeout: higher_defaults.timeout.or(lower_defaults.timeout),
                        whois_server: higher_defaults.whois_server.or(lower_defaults.whois_server),
                        preset,
                        tlds,
                        output: higher_defaults.output.or(lower_defaults.output),
                        only_available: higher_defaults
                            .only_available
                            .or(lower_defaults.only_available),
                    })
                }
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            patterns: match (lower.patterns, higher.patterns) {
                (Some(mut lower_patterns), Some(higher_patterns)) => {
                    lower_patterns.rate_limit.extend(higher_patterns.rate_limit);
                    lower_patterns.available.extend(higher_patterns.available);
                    lower_patterns
                        .expiry_labels
                        .extend(higher_patterns.expiry_labels);
                    Some(lower_patterns)
                }
                (lower_patterns, higher_patterns) => higher_patterns.or(lower_patterns),
            },
            custom_presets: match (lower.custom_presets, higher.custom_presets) {
                (Some(mut lower_presets), Some(higher_presets)) => {
                    lower_presets.extend(higher_presets);
                    Some(lower_presets)
                }
                (lower_presets, higher_presets) => higher_presets.or(lower_presets),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), SweepError> {
        if let Some(defaults) = &config.defaults {
            if let Some(max_attempts) = defaults.max_attempts {
                if !(1..=10).contains(&max_attempts) {
                    return Err(SweepError::config("max_attempts must be between 1 and 10"));
                }
            }

            for (key, value) in [
                ("backoff_unit", &defaults.backoff_unit),
                ("delay", &defaults.delay),
                ("timeout", &defaults.timeout),
            ] {
                if let Some(value) = value {
                    if parse_duration_string(value).is_none() {
                        return Err(SweepError::config(format!(
                            "Invalid {} '{}'. Use format like '500ms', '5s', '2m'",
                            key, value
                        )));
                    }
                }
            }

            if defaults.preset.is_some() && defaults.tlds.is_some() {
                return Err(SweepError::config(
                    "Cannot specify both 'preset' and 'tlds' in defaults",
                ));
            }
        }

        if let Some(presets) = &config.custom_presets {
            for (name, tlds) in presets {
                if name.is_empty() {
                    return Err(SweepError::config("Custom preset names cannot be empty"));
                }

                if tlds.is_empty() {
                    return Err(SweepError::config(format!(
                        "Custom preset '{}' cannot have empty TLD list",
                        name
                    )));
                }

                for tld in tlds {
                    if tld.trim().is_empty() || tld.contains(' ') {
                        return Err(SweepError::config(format!(
                            "Invalid TLD '{}' in preset '{}'",
                            tld, name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via `WS_*`
/// environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub max_attempts: Option<u32>,
    pub backoff_unit: Option<Duration>,
    pub delay: Option<Duration>,
    pub timeout: Option<Duration>,
    pub server: Option<String>,
    pub preset: Option<String>,
    pub tlds: Option<Vec<String>>,
    pub output: Option<String>,
    pub only_available: Option<bool>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Layer the environment's settings over `config`.
    pub fn apply_to(&self, mut config: SweepConfig) -> SweepConfig {
        if let Some(max_attempts) = self.max_attempts {
            config = config.with_max_attempts(max_attempts);
        }
        if let Some(unit) = self.backoff_unit {
            config = config.with_backoff_unit(unit);
        }
        if let Some(delay) = self.delay {
            config = config.with_inter_probe_delay(delay);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_whois_timeout(timeout);
        }
        if let Some(server) = &self.server {
            config = config.with_whois_server(server.clone());
        }
        config
    }

    /// The preset to use, if no explicit TLD list is set.
    pub fn get_effective_preset(&self) -> Option<String> {
        if self.tlds.is_some() {
            None
        } else {
            self.preset.clone()
        }
    }
}

/// Load configuration from `WS_*` environment variables.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    load_env_config_with(|key| env::var(key).ok(), verbose)
}

/// Load `WS_*` settings through an arbitrary lookup.
pub fn load_env_config_with<F>(lookup: F, verbose: bool) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    let read = |key: &str| {
        let value = lookup(key).filter(|v| !v.trim().is_empty())?;
        if verbose {
            tracing::info!("Using {}={}", key, value);
        }
        Some(value)
    };

    if let Some(val) = read("WS_MAX_ATTEMPTS") {
        match val.trim().parse::<u32>() {
            Ok(n) if (1..=10).contains(&n) => env_config.max_attempts = Some(n),
            _ => tracing::warn!("Invalid WS_MAX_ATTEMPTS='{}', must be 1-10", val),
        }
    }

    env_config.backoff_unit = read("WS_BACKOFF_UNIT").and_then(|v| env_duration("WS_BACKOFF_UNIT", &v));
    env_config.delay = read("WS_DELAY").and_then(|v| env_duration("WS_DELAY", &v));
    env_config.timeout = read("WS_TIMEOUT").and_then(|v| env_duration("WS_TIMEOUT", &v));

    env_config.server = read("WS_SERVER").map(|s| s.trim().to_string());
    env_config.preset = read("WS_PRESET").map(|s| s.trim().to_string());

    if let Some(tld_str) = read("WS_TLD") {
        let tlds: Vec<String> = tld_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !tlds.is_empty() {
            env_config.tlds = Some(tlds);
        }
    }

    env_config.output = read("WS_OUTPUT");

    if let Some(val) = read("WS_ONLY_AVAILABLE") {
        match parse_bool(&val) {
            Some(flag) => env_config.only_available = Some(flag),
            None => tracing::warn!("Invalid WS_ONLY_AVAILABLE='{}', use true/false", val),
        }
    }

    env_config.config = read("WS_CONFIG");

    env_config
}

fn env_duration(key: &str, value: &str) -> Option<Duration> {
    let parsed = parse_duration_string(value);
    if parsed.is_none() {
        tracing::warn!(
            "Invalid {}='{}', use format like '500ms', '5s', '2m'",
            key,
            value
        );
    }
    parsed
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a duration string like "500ms", "5s", "2m"; a bare number is seconds.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use whois_sweep_lib::parse_duration_string;
///
/// assert_eq!(parse_duration_string("500ms"), Some(Duration::from_millis(500)));
/// assert_eq!(parse_duration_string("2m"), Some(Duration::from_secs(120)));
/// assert_eq!(parse_duration_string("soon"), None);
/// ```
pub fn parse_duration_string(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    if let Some(ms) = value.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = value.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        value.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_duration_string() {
        assert_eq!(parse_duration_string("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration_string(" 7 "), Some(Duration::from_secs(7)));
        assert_eq!(parse_duration_string("0"), Some(Duration::ZERO));
        assert_eq!(parse_duration_string("invalid"), None);
        assert_eq!(parse_duration_string("-1s"), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
max_attempts = 5
backoff_unit = "500ms"
delay = "3s"
preset = "startup"
only_available = true

[patterns]
rate_limit = ["Slow Down"]

[custom_presets]
my_preset = ["com", "org", "io"]
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.as_ref().unwrap();
        assert_eq!(defaults.max_attempts, Some(5));
        assert_eq!(defaults.preset, Some("startup".to_string()));
        assert_eq!(defaults.only_available, Some(true));

        let presets = config.custom_presets.as_ref().unwrap();
        assert_eq!(
            presets.get("my_preset"),
            Some(&vec![
                "com".to_string(),
                "org".to_string(),
                "io".to_string()
            ])
        );

        let sweep = config.apply_to(SweepConfig::default());
        assert_eq!(sweep.max_attempts, 5);
        assert_eq!(sweep.backoff_unit, Duration::from_millis(500));
        assert_eq!(sweep.inter_probe_delay, Duration::from_secs(3));
        assert_eq!(sweep.whois_timeout, Duration::from_secs(10));
        assert!(sweep.phrases.rate_limit.contains(&"slow down".to_string()));
        assert!(sweep.phrases.rate_limit.contains(&"too many requests".to_string()));
        assert!(sweep.custom_presets.contains_key("my_preset"));
    }

    #[test]
    fn test_invalid_max_attempts() {
        let temp_file = write_config("[defaults]\nmax_attempts = 0\n");
        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());

        let temp_file = write_config("[defaults]\nmax_attempts = 11\n");
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let temp_file = write_config("[defaults]\ndelay = \"forever\"\n");
        let manager = ConfigManager::new(false);
        let err = manager.load_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("delay"));
    }

    #[test]
    fn test_preset_and_tlds_conflict() {
        let temp_file = write_config("[defaults]\npreset = \"tech\"\ntlds = [\"com\"]\n");
        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_empty_custom_preset_rejected() {
        let temp_file = write_config("[custom_presets]\nnothing = []\n");
        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let manager = ConfigManager::new(false);
        assert!(manager.load_file("/no/such/whois-sweep.toml").is_err());
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                max_attempts: Some(2),
                preset: Some("startup".to_string()),
                delay: Some("5s".to_string()),
                ..Default::default()
            }),
            patterns: Some(PatternsConfig {
                available: vec!["free for registration".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                max_attempts: Some(4),
                ..Default::default()
            }),
            patterns: Some(PatternsConfig {
                available: vec!["no entries found".to_string()],
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.max_attempts, Some(4)); // Higher wins
        assert_eq!(defaults.preset, Some("startup".to_string())); // Lower preserved
        assert_eq!(defaults.delay, Some("5s".to_string()));
        assert_eq!(merged.patterns.unwrap().available.len(), 2);
    }

    #[test]
    fn test_merge_tld_source_replaces_lower() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                preset: Some("startup".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                tlds: Some(vec!["com".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let defaults = manager.merge_configs(lower, higher).defaults.unwrap();
        assert_eq!(defaults.preset, None);
        assert_eq!(defaults.tlds, Some(vec!["com".to_string()]));
    }

    #[test]
    fn test_load_env_config() {
        let vars: HashMap<&str, &str> = [
            ("WS_MAX_ATTEMPTS", "4"),
            ("WS_BACKOFF_UNIT", "250ms"),
            ("WS_DELAY", "0"),
            ("WS_TLD", "com, io,,dev"),
            ("WS_ONLY_AVAILABLE", "yes"),
            ("WS_SERVER", "whois.verisign-grs.com"),
        ]
        .into_iter()
        .collect();

        let env_config =
            load_env_config_with(|key| vars.get(key).map(|v| v.to_string()), false);

        assert_eq!(env_config.max_attempts, Some(4));
        assert_eq!(env_config.backoff_unit, Some(Duration::from_millis(250)));
        assert_eq!(env_config.delay, Some(Duration::ZERO));
        assert_eq!(
            env_config.tlds,
            Some(vec!["com".to_string(), "io".to_string(), "dev".to_string()])
        );
        assert_eq!(env_config.only_available, Some(true));
        assert_eq!(env_config.timeout, None);

        let sweep = env_config.apply_to(SweepConfig::default());
        assert_eq!(sweep.max_attempts, 4);
        assert_eq!(sweep.inter_probe_delay, Duration::ZERO);
        assert_eq!(sweep.whois_server.as_deref(), Some("whois.verisign-grs.com"));
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let vars: HashMap<&str, &str> = [
            ("WS_MAX_ATTEMPTS", "99"),
            ("WS_TIMEOUT", "whenever"),
            ("WS_ONLY_AVAILABLE", "maybe"),
            ("WS_PRESET", "   "),
        ]
        .into_iter()
        .collect();

        let env_config =
            load_env_config_with(|key| vars.get(key).map(|v| v.to_string()), false);
        assert_eq!(env_config, EnvConfig::default());
    }

    #[test]
    fn test_env_effective_preset() {
        let env_config = EnvConfig {
            preset: Some("tech".to_string()),
            tlds: Some(vec!["com".to_string()]),
            ..Default::default()
        };
        assert_eq!(env_config.get_effective_preset(), None);
    }
}
