//! Advisor configuration
//!
//! Settings for each advisory task (model, timeout, temperature) plus the
//! currency label interpolated into prompts.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/spendwise/config/advisor.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/advisor.toml");

/// Default timeout for one advisory call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Advisory task types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskType {
    /// Personalized suggestions for reducing spending
    SpendingAdvice,
    /// Lifestyle advice and over-leveraging tips
    LifestyleGuide,
}

impl TaskType {
    /// Get the config key for this task type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpendingAdvice => "spending_advice",
            Self::LifestyleGuide => "lifestyle_guide",
        }
    }

    pub fn all() -> &'static [TaskType] {
        &[Self::SpendingAdvice, Self::LifestyleGuide]
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "spending_advice" => Some(Self::SpendingAdvice),
            "lifestyle_guide" => Some(Self::LifestyleGuide),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings for a specific task type
#[derive(Debug, Clone, PartialEq)]
pub struct TaskConfig {
    /// Model override. `None` means the backend's configured model.
    pub model: Option<String>,
    pub timeout: Duration,
    pub temperature: f32,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            model: None,
            timeout: DEFAULT_TIMEOUT,
            temperature: 0.3,
        }
    }
}

/// Advisor configuration
#[derive(Debug, Clone, Default)]
pub struct AdvisorConfig {
    pub defaults: TaskConfig,
    pub tasks: HashMap<TaskType, TaskConfig>,
    /// Currency label for prompts (empty drops the currency sentence)
    pub currency: Option<String>,
    config_path: Option<PathBuf>,
}

impl AdvisorConfig {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        let path = default_config_path();
        let mut config = load_config(path.as_deref())?;
        config.config_path = path.filter(|p| p.exists());
        Ok(config)
    }

    /// Load from an explicit file (embedded defaults if it doesn't exist)
    pub fn from_path(path: &Path) -> Result<Self> {
        let mut config = load_config(Some(path))?;
        if path.exists() {
            config.config_path = Some(path.to_path_buf());
        }
        Ok(config)
    }

    /// Parse the embedded default config
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }

    /// Same timeout for every task; used by tests and the CLI `--timeout` flag
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.defaults.timeout = timeout;
        for task in self.tasks.values_mut() {
            task.timeout = timeout;
        }
        self
    }

    /// Get the full task configuration
    pub fn for_task(&self, task: TaskType) -> &TaskConfig {
        self.tasks.get(&task).unwrap_or(&self.defaults)
    }

    pub fn timeout_for_task(&self, task: TaskType) -> Duration {
        self.for_task(task).timeout
    }

    pub fn model_for_task(&self, task: TaskType) -> Option<&str> {
        self.for_task(task).model.as_deref()
    }

    /// Override file this config was read from, if any
    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config_path.as_ref()
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendwise").join("config").join("advisor.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<AdvisorConfig> {
    match override_path {
        Some(path) if path.exists() => {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
            parse_config(&content)
        }
        _ => parse_config(DEFAULT_CONFIG),
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawDefaults>,
    tasks: Option<HashMap<String, RawTaskConfig>>,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    model: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTaskConfig {
    model: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<AdvisorConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AdvisorConfig::default();

    if let Some(defaults) = raw.defaults {
        if defaults.model.is_some() {
            config.defaults.model = defaults.model;
        }
        if let Some(secs) = defaults.timeout_secs {
            config.defaults.timeout = timeout_from_secs(secs)?;
        }
        if let Some(temperature) = defaults.temperature {
            config.defaults.temperature = temperature;
        }
        config.currency = defaults.currency.filter(|c| !c.trim().is_empty());
    }

    if let Some(tasks) = raw.tasks {
        for (task_name, task_config) in tasks {
            let Some(task) = TaskType::from_key(&task_name) else {
                tracing::debug!(task = %task_name, "Skipping unknown task in advisor config");
                continue;
            };

            let timeout = match task_config.timeout_secs {
                Some(secs) => timeout_from_secs(secs)?,
                None => config.defaults.timeout,
            };

            config.tasks.insert(
                task,
                TaskConfig {
                    model: task_config.model.or_else(|| config.defaults.model.clone()),
                    timeout,
                    temperature: task_config
                        .temperature
                        .unwrap_or(config.defaults.temperature),
                },
            );
        }
    }

    Ok(config)
}

fn timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::Config("timeout_secs must be at least 1".into()));
    }
    Ok(Duration::from_secs(secs))
}
