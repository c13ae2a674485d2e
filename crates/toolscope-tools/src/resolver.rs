//! Tool resolution: which tools an assistant invocation may use.
//!
//! Resolution chain: `mode → base set → model overrides → alias widening →
//! feature gates → rename`.
//!
//! Every step is a pure function of the request; identical requests produce
//! identical output in candidate order.

use std::collections::{BTreeSet, HashSet};

use toolscope_types::{Experiments, ModeConfig, ModelInfo, RuntimeSettings, ToolDefinition};

use crate::catalog::{CatalogHandle, ToolCatalog};
use crate::customize::{self, Customization};
use crate::gate::{self, GateContext, ResourceHub};
use crate::modes::{self, ModePolicy};
use crate::names;

/// Caller-owned inputs for one resolution call.
#[derive(Clone, Copy)]
pub struct ResolveRequest<'a> {
    /// Requested mode slug; unknown slugs use the default mode.
    pub mode: &'a str,
    pub custom_modes: &'a [ModeConfig],
    pub experiments: &'a Experiments,
    pub model: Option<&'a ModelInfo>,
    pub settings: &'a RuntimeSettings,
    pub resource_hub: Option<&'a dyn ResourceHub>,
}

impl<'a> ResolveRequest<'a> {
    pub fn new(mode: &'a str, settings: &'a RuntimeSettings, experiments: &'a Experiments) -> Self {
        Self {
            mode,
            custom_modes: &[],
            experiments,
            model: None,
            settings,
            resource_hub: None,
        }
    }

    pub fn with_custom_modes(mut self, custom_modes: &'a [ModeConfig]) -> Self {
        self.custom_modes = custom_modes;
        self
    }

    pub fn with_model(mut self, model: &'a ModelInfo) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_resource_hub(mut self, hub: &'a dyn ResourceHub) -> Self {
        self.resource_hub = Some(hub);
        self
    }

    fn gate_context(&self) -> GateContext<'a> {
        GateContext {
            settings: self.settings,
            experiments: self.experiments,
            resource_hub: self.resource_hub,
        }
    }
}

/// Allowed tools of one permitted group, for mode descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub group: String,
    /// Restriction description (or pattern) when the mode limits this group.
    pub restriction: Option<String>,
    pub tools: Vec<String>,
}

/// Composes mode policy, model overrides and feature gates.
#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: CatalogHandle,
    modes: ModePolicy,
}

impl Resolver {
    pub fn new(catalog: CatalogHandle, modes: ModePolicy) -> Self {
        Self { catalog, modes }
    }

    pub fn catalog(&self) -> &CatalogHandle {
        &self.catalog
    }

    pub fn modes(&self) -> &ModePolicy {
        &self.modes
    }

    /// Mode policy and model overrides, before alias widening.
    fn customized(&self, catalog: &ToolCatalog, req: &ResolveRequest<'_>) -> Customization {
        let mode = self.modes.resolve(req.mode, req.custom_modes);
        let base: BTreeSet<String> = ModePolicy::tools_for_mode(&mode.groups, catalog.groups())
            .into_iter()
            .filter(|tool| modes::check_mode(tool, mode, req.experiments, catalog, None).is_ok())
            .collect();
        customize::apply(base, mode, req.model, catalog)
    }

    fn final_names(
        &self,
        catalog: &ToolCatalog,
        customization: &Customization,
        req: &ResolveRequest<'_>,
    ) -> BTreeSet<String> {
        let aliases = catalog.aliases();
        let widened: BTreeSet<String> = customization
            .allowed
            .iter()
            .flat_map(|tool| aliases.alias_group(tool))
            .collect();
        gate::apply(widened, &req.gate_context(), aliases)
    }

    /// Every tool name (canonical and alias) the request may present.
    pub fn allowed_tool_names(&self, req: &ResolveRequest<'_>) -> BTreeSet<String> {
        let catalog = self.catalog.snapshot();
        let customization = self.customized(&catalog, req);
        self.final_names(&catalog, &customization, req)
    }

    /// Candidate definitions the request may use, in candidate order.
    ///
    /// Canonical tools the model asked for by alias are presented under that
    /// alias. A presented name that was already emitted is skipped.
    pub fn resolve_available_tools(
        &self,
        candidates: &[ToolDefinition],
        req: &ResolveRequest<'_>,
    ) -> Vec<ToolDefinition> {
        let catalog = self.catalog.snapshot();
        let customization = self.customized(&catalog, req);
        let allowed = self.final_names(&catalog, &customization, req);
        let aliases = catalog.aliases();

        let mut emitted = HashSet::new();
        let mut result = Vec::new();
        for candidate in candidates {
            if !allowed.contains(&candidate.name) {
                continue;
            }
            let canonical = aliases.resolve_alias(&candidate.name);
            let presented = match customization.renames.get(canonical) {
                Some(alias) if canonical == candidate.name => alias.clone(),
                _ => candidate.name.clone(),
            };
            if !emitted.insert(presented.clone()) {
                tracing::debug!(tool = %presented, "Skipping duplicate presented tool");
                continue;
            }
            let mut definition = candidate.clone();
            definition.name = presented;
            result.push(definition);
        }

        tracing::debug!(
            mode = req.mode,
            candidates = candidates.len(),
            presented = result.len(),
            "Resolved available tools"
        );
        result
    }

    /// Whether `tool` would be presented for `req`, without building the full set.
    pub fn is_tool_allowed_in_mode(&self, tool: &str, req: &ResolveRequest<'_>) -> bool {
        let catalog = self.catalog.snapshot();
        self.tool_allowed(&catalog, tool, req)
    }

    fn tool_allowed(&self, catalog: &ToolCatalog, tool: &str, req: &ResolveRequest<'_>) -> bool {
        let mode = self.modes.resolve(req.mode, req.custom_modes);
        let aliases = catalog.aliases();
        let canonical = aliases.resolve_alias(tool);

        let in_base = modes::check_mode(canonical, mode, req.experiments, catalog, None).is_ok();
        let permitted = match req.model {
            None => in_base,
            Some(model) => {
                let excluded = model
                    .excluded_tools
                    .iter()
                    .any(|t| aliases.resolve_alias(t) == canonical);
                let included = model
                    .included_tools
                    .iter()
                    .any(|t| aliases.resolve_alias(t) == canonical)
                    && customize::include_permitted(canonical, mode, catalog);
                (in_base && !excluded) || included
            }
        };

        permitted && gate::is_available(tool, &req.gate_context(), aliases)
    }

    /// Allowed tools of `group` in catalog order, default partition first.
    pub fn tools_for_group(&self, group: &str, req: &ResolveRequest<'_>) -> Vec<String> {
        let catalog = self.catalog.snapshot();
        let Some(tool_group) = catalog.groups().group(group) else {
            return Vec::new();
        };
        tool_group
            .all_tools()
            .filter(|tool| self.tool_allowed(&catalog, tool, req))
            .map(str::to_string)
            .collect()
    }

    /// Per permitted group of the requested mode, the tools it contributes.
    pub fn mode_summary(&self, req: &ResolveRequest<'_>) -> Vec<GroupSummary> {
        let mode = self.modes.resolve(req.mode, req.custom_modes);
        mode.groups
            .iter()
            .map(|entry| GroupSummary {
                group: entry.name().to_string(),
                restriction: entry.options().and_then(|options| {
                    options
                        .description
                        .clone()
                        .or_else(|| options.file_regex.clone())
                }),
                tools: self.tools_for_group(entry.name(), req),
            })
            .collect()
    }

    /// All of `tools` if the mode may call external (MCP) tools, otherwise none.
    pub fn filter_external_tools<T>(
        &self,
        tools: Vec<T>,
        mode: &str,
        custom_modes: &[ModeConfig],
        experiments: &Experiments,
    ) -> Vec<T> {
        let catalog = self.catalog.snapshot();
        let resolved = self.modes.resolve(mode, custom_modes);
        match modes::check_mode(names::USE_MCP_TOOL, resolved, experiments, &catalog, None) {
            Ok(()) => tools,
            Err(e) => {
                tracing::debug!(mode = %resolved.slug, "External tools hidden: {e}");
                Vec::new()
            }
        }
    }
}
