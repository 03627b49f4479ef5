//! Run configuration – reads/writes `~/.sensorbridge/config.toml`.

use serde::{Deserialize, Serialize};
use sensorbridge_hal::sim::sim_interface_name;
use sensorbridge_types::SensorType;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted settings for `sensorbridge run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Id reported by sensors in their `__repr__`.
    #[serde(default = "default_environment_id")]
    pub environment_id: u32,

    /// Number of simulation steps to run.
    #[serde(default = "default_steps")]
    pub steps: u32,

    /// Seconds advanced per step.
    #[serde(default = "default_time_step")]
    pub time_step: f64,

    /// Interface names passed to `RaveCreateSensor`.
    #[serde(default = "default_sensors")]
    pub sensors: Vec<String>,
}

fn default_environment_id() -> u32 {
    1
}
fn default_steps() -> u32 {
    10
}
fn default_time_step() -> f64 {
    0.05
}
fn default_sensors() -> Vec<String> {
    SensorType::CONCRETE
        .into_iter()
        .filter_map(sim_interface_name)
        .map(str::to_string)
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment_id: default_environment_id(),
            steps: default_steps(),
            time_step: default_time_step(),
            sensors: default_sensors(),
        }
    }
}

/// Return the path to `~/.sensorbridge/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".sensorbridge").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `SENSORBRIDGE_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `SENSORBRIDGE_ENV_ID` | `environment_id` |
/// | `SENSORBRIDGE_STEPS` | `steps` |
/// | `SENSORBRIDGE_TIME_STEP` | `time_step` |
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("SENSORBRIDGE_ENV_ID")
        && let Ok(id) = v.parse::<u32>()
    {
        cfg.environment_id = id;
    }
    if let Ok(v) = std::env::var("SENSORBRIDGE_STEPS")
        && let Ok(steps) = v.parse::<u32>()
    {
        cfg.steps = steps;
    }
    if let Ok(v) = std::env::var("SENSORBRIDGE_TIME_STEP")
        && let Ok(dt) = v.parse::<f64>()
        && dt > 0.0
    {
        cfg.time_step = dt;
    }
}

/// Save the config to disk, creating `~/.sensorbridge/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}
