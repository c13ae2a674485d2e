use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toolscope_config::ToolscopeConfig;
use toolscope_tools::{CatalogHandle, ModePolicy, Resolver, StaticResourceHub, ToolCatalog};
use toolscope_types::{ModeConfig, ModelInfo, ToolDefinition};

/// Everything a command needs, loaded once at startup.
pub struct Session {
    pub config: ToolscopeConfig,
    pub custom_modes: Vec<ModeConfig>,
    pub resolver: Resolver,
    pub resource_hub: Option<StaticResourceHub>,
}

impl Session {
    /// Load config and project modes, then build and validate the registry.
    ///
    /// Any alias or mode integrity error aborts startup.
    pub fn load(config_path: Option<&Path>, workspace: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => toolscope_config::load_config_from(path),
            None => toolscope_config::load_config(),
        }
        .context("Failed to load config")?;

        let workspace = match workspace {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let project_modes = toolscope_config::load_project_modes(&workspace)
            .with_context(|| format!("Failed to load project modes from {}", workspace.display()))?;
        let custom_modes =
            toolscope_config::merge_custom_modes(&[config.custom_modes.clone(), project_modes]);

        let catalog = ToolCatalog::builtin_with_aliases(
            config
                .aliases
                .iter()
                .map(|(canonical, aliases)| (canonical.as_str(), aliases)),
        )
        .context("Tool alias table is inconsistent")?;
        let modes = ModePolicy::builtin().context("Built-in mode registry is inconsistent")?;
        let resolver = Resolver::new(CatalogHandle::new(catalog), modes);

        let resource_hub = config.mcp_servers.clone().map(StaticResourceHub::new);

        tracing::debug!(
            custom_modes = custom_modes.len(),
            aliases = config.aliases.len(),
            "Session loaded"
        );

        Ok(Self {
            config,
            custom_modes,
            resolver,
            resource_hub,
        })
    }

    /// Requested mode, or the configured default.
    pub fn mode<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.unwrap_or(self.config.default_mode.as_str())
    }
}

/// Read model overrides from a JSON file.
pub fn read_model_info(path: Option<&PathBuf>) -> Result<Option<ModelInfo>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read model info {}", path.display()))?;
    let info = serde_json::from_str(&content)
        .with_context(|| format!("Invalid model info in {}", path.display()))?;
    Ok(Some(info))
}

/// Read candidate tool definitions from a JSON file, defaulting to every
/// catalog tool and alias.
pub fn read_candidates(
    path: Option<&PathBuf>,
    catalog: &ToolCatalog,
) -> Result<Vec<ToolDefinition>> {
    let Some(path) = path else {
        return Ok(catalog
            .presentable_names()
            .iter()
            .map(|name| ToolDefinition::named(name))
            .collect());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidates {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid candidate list in {}", path.display()))
}
