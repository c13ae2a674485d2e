use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use toolscope_types::{Experiments, McpServer, ModeConfig, RuntimeSettings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON5 parse error: {0}")]
    Json5(#[from] json5::Error),
    #[error("Config directory not found")]
    NoDirFound,
}

/// Top-level toolscope configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolscopeConfig {
    /// Environment facts used by the feature gates.
    #[serde(default)]
    pub settings: RuntimeSettings,
    /// Experiment flags.
    #[serde(default)]
    pub experiments: Experiments,
    /// User-defined modes. Same-slug entries shadow built-in modes.
    #[serde(default)]
    pub custom_modes: Vec<ModeConfig>,
    /// Extra aliases registered at startup: canonical tool → alias names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, Vec<String>>,
    /// Connected MCP servers. `None` when no resource hub is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<McpServer>>,
    /// Mode used when none is requested.
    #[serde(default = "default_mode")]
    pub default_mode: String,
}

fn default_mode() -> String {
    "code".to_string()
}

impl Default for ToolscopeConfig {
    fn default() -> Self {
        Self {
            settings: RuntimeSettings::default(),
            experiments: Experiments::default(),
            custom_modes: Vec::new(),
            aliases: BTreeMap::new(),
            mcp_servers: None,
            default_mode: default_mode(),
        }
    }
}

/// Project-local custom modes file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectModes {
    #[serde(default)]
    pub custom_modes: Vec<ModeConfig>,
}

/// Resolve the toolscope config directory (~/.toolscope/).
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|h| h.join(".toolscope"))
        .ok_or(ConfigError::NoDirFound)
}

/// Resolve the config file path (~/.toolscope/config.json5).
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.json5"))
}

/// Project modes file for a workspace (`<workspace>/.toolscope/modes.json5`).
pub fn project_modes_path(workspace: &Path) -> PathBuf {
    workspace.join(".toolscope").join("modes.json5")
}

/// Load configuration from the default path, falling back to defaults.
pub fn load_config() -> Result<ToolscopeConfig, ConfigError> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let path = config_file_path()?;
    load_config_from(&path)
}

/// Load configuration from a specific path, falling back to defaults if not found.
pub fn load_config_from(path: &Path) -> Result<ToolscopeConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("Config file not found at {}, using defaults", path.display());
        return Ok(ToolscopeConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: ToolscopeConfig = json5::from_str(&content)?;
    Ok(config)
}

/// Load project-local custom modes; an absent file yields no modes.
pub fn load_project_modes(workspace: &Path) -> Result<Vec<ModeConfig>, ConfigError> {
    let path = project_modes_path(workspace);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)?;
    let modes: ProjectModes = json5::from_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        count = modes.custom_modes.len(),
        "Loaded project modes"
    );
    Ok(modes.custom_modes)
}

/// Merge custom mode sources in priority order (low → high).
///
/// A later mode with the same slug replaces the earlier one in place; new
/// slugs are appended.
pub fn merge_custom_modes(sources: &[Vec<ModeConfig>]) -> Vec<ModeConfig> {
    let mut merged: Vec<ModeConfig> = Vec::new();
    for mode in sources.iter().flatten() {
        match merged.iter_mut().find(|m| m.slug == mode.slug) {
            Some(existing) => {
                tracing::debug!(slug = %mode.slug, "Custom mode overridden");
                *existing = mode.clone();
            }
            None => merged.push(mode.clone()),
        }
    }
    merged
}
