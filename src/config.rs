use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{
    EngineSettings, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_PRIORITY_ACTIONS,
    DEFAULT_RELATED_ARCHETYPE_CREDIT, DEFAULT_TOP_VALUE_METRICS,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default = "default_related_archetype_credit")]
    pub related_archetype_credit: f64,
    #[serde(default = "default_top_value_metrics")]
    pub top_value_metrics: usize,
    #[serde(default = "default_priority_actions")]
    pub priority_actions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ReferenceConfig {
    /// Empty means the built-in dataset.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub reference_path: Option<String>,
    pub confidence_threshold: Option<f64>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config/pricing-navigator/config.toml")
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(Self::default_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed reading config: {}", path.display()))?;
        let parsed: Self = toml::from_str(&data)
            .with_context(|| format!("failed parsing TOML config: {}", path.display()))?;
        Ok(parsed)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.reference_path {
            self.reference.path = path;
        }
        if let Some(threshold) = overrides.confidence_threshold {
            self.engine.confidence_threshold = threshold;
        }
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
    }

    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed creating config directory: {}", parent.display())
            })?;
        }
        fs::write(path, Self::default_template())
            .with_context(|| format!("failed writing config template: {}", path.display()))
    }

    pub fn resolved_reference_path(&self) -> Option<PathBuf> {
        let trimmed = self.reference.path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(expand_tilde(trimmed))
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            confidence_threshold: self.engine.confidence_threshold,
            related_archetype_credit: self.engine.related_archetype_credit,
            top_value_metrics: self.engine.top_value_metrics,
            priority_actions: self.engine.priority_actions,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn default_template() -> String {
        let template = r#"[engine]
# Best archetype score below this is reported as unclassified.
confidence_threshold = 0.3
# Affinity for models not designed for the classified archetype.
related_archetype_credit = 0.5
top_value_metrics = 3
priority_actions = 3

[reference]
# JSON or TOML reference tables; empty uses the built-in dataset.
path = ""

[server]
host = "127.0.0.1"
port = 3001
"#;
        template.to_string()
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            reference: ReferenceConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            related_archetype_credit: default_related_archetype_credit(),
            top_value_metrics: default_top_value_metrics(),
            priority_actions: default_priority_actions(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_related_archetype_credit() -> f64 {
    DEFAULT_RELATED_ARCHETYPE_CREDIT
}

fn default_top_value_metrics() -> usize {
    DEFAULT_TOP_VALUE_METRICS
}

fn default_priority_actions() -> usize {
    DEFAULT_PRIORITY_ACTIONS
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}
