//! Environment feature gates.
//!
//! Every conditionally available tool has exactly one row in
//! [`FEATURE_GATES`]. Rows only ever remove tools and never interact.

use std::collections::BTreeSet;

use toolscope_types::{Experiments, McpServer, RuntimeSettings};

use crate::aliases::AliasRegistry;
use crate::names;

/// Read-only access to the MCP servers currently connected.
pub trait ResourceHub {
    fn list_servers(&self) -> Vec<McpServer>;
}

/// Resource hub over a fixed server list.
#[derive(Debug, Clone, Default)]
pub struct StaticResourceHub {
    servers: Vec<McpServer>,
}

impl StaticResourceHub {
    pub fn new(servers: Vec<McpServer>) -> Self {
        Self { servers }
    }
}

impl ResourceHub for StaticResourceHub {
    fn list_servers(&self) -> Vec<McpServer> {
        self.servers.clone()
    }
}

/// Environment facts for one resolution call.
#[derive(Clone, Copy)]
pub struct GateContext<'a> {
    pub settings: &'a RuntimeSettings,
    pub experiments: &'a Experiments,
    pub resource_hub: Option<&'a dyn ResourceHub>,
}

/// One gated tool and the predicate that keeps it.
pub struct FeatureGate {
    pub tool: &'static str,
    pub feature: &'static str,
    pub available: fn(&GateContext<'_>) -> bool,
}

pub const FEATURE_GATES: &[FeatureGate] = &[
    FeatureGate {
        tool: names::CODEBASE_SEARCH,
        feature: "code index",
        available: |ctx| ctx.settings.code_index.is_some_and(|index| index.is_ready()),
    },
    FeatureGate {
        tool: names::UPDATE_TODO_LIST,
        feature: "todo list",
        available: |ctx| ctx.settings.todo_list_enabled,
    },
    FeatureGate {
        tool: names::GENERATE_IMAGE,
        feature: "image generation experiment",
        available: |ctx| ctx.experiments.image_generation,
    },
    FeatureGate {
        tool: names::RUN_SLASH_COMMAND,
        feature: "slash command experiment",
        available: |ctx| ctx.experiments.run_slash_command,
    },
    FeatureGate {
        tool: names::BROWSER_ACTION,
        feature: "browser tool",
        available: |ctx| ctx.settings.browser_tool_enabled,
    },
    FeatureGate {
        tool: names::APPLY_DIFF,
        feature: "diff editing",
        available: |ctx| ctx.settings.diff_enabled,
    },
    FeatureGate {
        tool: names::ACCESS_MCP_RESOURCE,
        feature: "mcp resources",
        available: |ctx| {
            ctx.resource_hub.is_some_and(|hub| {
                hub.list_servers()
                    .iter()
                    .any(|server| !server.resources.is_empty())
            })
        },
    },
];

/// Whether `tool` (or the canonical tool it aliases) survives every gate.
pub fn is_available(tool: &str, ctx: &GateContext<'_>, aliases: &AliasRegistry) -> bool {
    let canonical = aliases.resolve_alias(tool);
    FEATURE_GATES
        .iter()
        .filter(|gate| gate.tool == canonical)
        .all(|gate| (gate.available)(ctx))
}

/// Remove every gated tool whose feature is unavailable.
pub fn apply(
    mut tools: BTreeSet<String>,
    ctx: &GateContext<'_>,
    aliases: &AliasRegistry,
) -> BTreeSet<String> {
    for gate in FEATURE_GATES {
        if (gate.available)(ctx) {
            continue;
        }
        let before = tools.len();
        tools.retain(|name| aliases.resolve_alias(name) != gate.tool);
        if tools.len() != before {
            tracing::debug!(
                tool = gate.tool,
                feature = gate.feature,
                "Tool removed: feature unavailable"
            );
        }
    }
    tools
}
