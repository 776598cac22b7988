//! YAML configuration for the test helpers.
//!
//! Default tolerances, poll timings and the temp-dir prefix can be set once
//! per suite from a YAML file and tuned per run through `TESTUTILS_*`
//! environment variables.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! approx:
//!   temporal_tolerance_ms: 1000
//!   rel: 1.0e-6
//!   abs: 1.0e-12
//!
//! wait:
//!   timeout_ms: 10000
//!   pause_ms: 1000
//!
//! tmp_dir:
//!   prefix: "testutils-"
//! ```
//!
//! ## Environment overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `TESTUTILS_APPROX_TEMPORAL_TOLERANCE_MS` | `approx.temporal_tolerance_ms` |
//! | `TESTUTILS_APPROX_REL` | `approx.rel` |
//! | `TESTUTILS_APPROX_ABS` | `approx.abs` |
//! | `TESTUTILS_WAIT_TIMEOUT_MS` | `wait.timeout_ms` |
//! | `TESTUTILS_WAIT_PAUSE_MS` | `wait.pause_ms` |
//! | `TESTUTILS_TMP_DIR_PREFIX` | `tmp_dir.prefix` |

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use matchers::{
    ApproxConfig, DEFAULT_ABS_TOLERANCE, DEFAULT_REL_TOLERANCE, DEFAULT_TEMPORAL_TOLERANCE_MS,
};
use tmpdir::{TempDirFactory, TmpDir, TmpDirError};
use waiters::{WaitConfig, DEFAULT_PAUSE, DEFAULT_TIMEOUT};

const ENV_PREFIX: &str = "TESTUTILS_";

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TestUtilsConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub approx: ApproxYamlConfig,

    #[serde(default)]
    pub wait: WaitYamlConfig,

    #[serde(default)]
    pub tmp_dir: TmpDirYamlConfig,
}

impl TestUtilsConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "config_file_read");
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: TestUtilsConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with `TESTUTILS_*` variables from the process environment
    /// applied.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigLoadError> {
        self.apply_overrides(std::env::vars())
    }

    /// Applies `TESTUTILS_*` overrides from `vars` and re-validates.
    /// Unrelated variables are ignored.
    pub fn apply_overrides<I, K, V>(&mut self, vars: I) -> Result<(), ConfigLoadError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let Some(field) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.as_ref();
            match field {
                "APPROX_TEMPORAL_TOLERANCE_MS" => {
                    self.approx.temporal_tolerance_ms = parse_override(field, value)?
                }
                "APPROX_REL" => self.approx.rel = parse_override(field, value)?,
                "APPROX_ABS" => self.approx.abs = parse_override(field, value)?,
                "WAIT_TIMEOUT_MS" => self.wait.timeout_ms = parse_override(field, value)?,
                "WAIT_PAUSE_MS" => self.wait.pause_ms = parse_override(field, value)?,
                "TMP_DIR_PREFIX" => self.tmp_dir.prefix = value.to_string(),
                _ => continue,
            }
            debug!(variable = %key.as_ref(), "config_env_override");
        }
        self.validate()
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.approx.validate()?;
        self.wait.validate()?;
        self.tmp_dir.validate()?;

        Ok(())
    }

    pub fn approx_config(&self) -> ApproxConfig {
        self.approx.to_approx_config()
    }

    pub fn wait_config(&self) -> WaitConfig {
        WaitConfig {
            timeout: Duration::from_millis(self.wait.timeout_ms),
            pause: Duration::from_millis(self.wait.pause_ms),
        }
    }

    pub fn tmp_dir_factory(&self) -> Result<TempDirFactory, TmpDirError> {
        TempDirFactory::with_prefix(&self.tmp_dir.prefix)
    }

    pub fn tmp_dir(&self) -> Result<TmpDir, TmpDirError> {
        TmpDir::with_prefix(&self.tmp_dir.prefix)
    }
}

impl Default for TestUtilsConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            approx: ApproxYamlConfig::default(),
            wait: WaitYamlConfig::default(),
            tmp_dir: TmpDirYamlConfig::default(),
        }
    }
}

fn parse_override<T: FromStr>(field: &str, value: &str) -> Result<T, ConfigLoadError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|err| {
        ConfigLoadError::Validation(format!("{ENV_PREFIX}{field}={value:?}: {err}"))
    })
}

/// Default tolerances for `approx`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproxYamlConfig {
    #[serde(default = "default_temporal_tolerance_ms")]
    pub temporal_tolerance_ms: i64,

    #[serde(default = "default_rel")]
    pub rel: f64,

    #[serde(default = "default_abs")]
    pub abs: f64,
}

impl ApproxYamlConfig {
    fn to_approx_config(&self) -> ApproxConfig {
        ApproxConfig {
            // only i64::MIN is out of range, and any negative value fails validation
            temporal_tolerance: TimeDelta::try_milliseconds(self.temporal_tolerance_ms)
                .unwrap_or(TimeDelta::MIN),
            rel: self.rel,
            abs: self.abs,
        }
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        self.to_approx_config()
            .validate()
        .map_err(|err| ConfigLoadError::Validation(format!("approx: {err}")))
    }
}

impl Default for ApproxYamlConfig {
    fn default() -> Self {
        Self {
            temporal_tolerance_ms: default_temporal_tolerance_ms(),
            rel: default_rel(),
            abs: default_abs(),
        }
    }
}

/// Poll timings for `wait_until`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitYamlConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
}

impl WaitYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.pause_ms == 0 {
            return Err(ConfigLoadError::Validation(
                "wait: pause_ms must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for WaitYamlConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            pause_ms: default_pause_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmpDirYamlConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl TmpDirYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.prefix.contains(['/', '\\']) {
            return Err(ConfigLoadError::Validation(format!(
                "tmp_dir: prefix {:?} must not contain path separators",
                self.prefix
            )));
        }
        Ok(())
    }
}

impl Default for TmpDirYamlConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_temporal_tolerance_ms() -> i64 {
    DEFAULT_TEMPORAL_TOLERANCE_MS
}
fn default_rel() -> f64 {
    DEFAULT_REL_TOLERANCE
}
fn default_abs() -> f64 {
    DEFAULT_ABS_TOLERANCE
}
fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}
fn default_pause_ms() -> u64 {
    DEFAULT_PAUSE.as_millis() as u64
}
fn default_prefix() -> String {
    "testutils-".to_string()
}
