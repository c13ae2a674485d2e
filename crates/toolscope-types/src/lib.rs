use serde::{Deserialize, Serialize};

// ──────────────────── Mode Types ────────────────────

/// Restriction payload attached to a group entry of a mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupOptions {
    /// Regex that file paths must match for tools of this group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_regex: Option<String>,
    /// Human-readable description of the restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One permitted group of a mode, either `"read"` or `["edit", { ... }]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum GroupEntry {
    Plain(String),
    Restricted(String, GroupOptions),
}

impl GroupEntry {
    /// Group name this entry grants.
    pub fn name(&self) -> &str {
        match self {
            GroupEntry::Plain(name) | GroupEntry::Restricted(name, _) => name,
        }
    }

    /// Restriction payload, if any.
    pub fn options(&self) -> Option<&GroupOptions> {
        match self {
            GroupEntry::Plain(_) => None,
            GroupEntry::Restricted(_, options) => Some(options),
        }
    }
}

impl From<&str> for GroupEntry {
    fn from(name: &str) -> Self {
        GroupEntry::Plain(name.to_string())
    }
}

/// A named behavior profile with an ordered allow-list of tool groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModeConfig {
    /// Identifier used to select the mode (e.g. "code").
    pub slug: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Permitted groups, in presentation order.
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
    /// Whether this is the fallback mode for unknown slugs.
    #[serde(default, skip_serializing_if = "is_false")]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_to_use: Option<String>,
}

impl ModeConfig {
    /// Create a mode with plain (unrestricted) groups.
    pub fn new(slug: &str, name: &str, groups: &[&str]) -> Self {
        Self {
            slug: slug.to_string(),
            name: name.to_string(),
            groups: groups.iter().map(|g| GroupEntry::from(*g)).collect(),
            default: false,
            role_definition: None,
            when_to_use: None,
        }
    }

    /// Entry for `group`, if the mode permits it.
    pub fn group(&self, group: &str) -> Option<&GroupEntry> {
        self.groups.iter().find(|entry| entry.name() == group)
    }

    pub fn permits_group(&self, group: &str) -> bool {
        self.group(group).is_some()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

// ──────────────────── Model Types ────────────────────

/// Per-model tool overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Tool names or aliases to subtract.
    #[serde(default)]
    pub excluded_tools: Vec<String>,
    /// Tool names or aliases to add, gated by group membership.
    #[serde(default)]
    pub included_tools: Vec<String>,
}

// ──────────────────── Runtime Types ────────────────────

/// Experiment flags gating preview tools.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Experiments {
    #[serde(default)]
    pub image_generation: bool,
    #[serde(default)]
    pub run_slash_command: bool,
}

/// State of the semantic code index.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeIndexStatus {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub configured: bool,
    #[serde(default)]
    pub initialized: bool,
}

impl CodeIndexStatus {
    /// Whether the index can serve searches.
    pub fn is_ready(&self) -> bool {
        self.enabled && self.configured && self.initialized
    }
}

/// Environment facts consulted when pruning tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSettings {
    /// Code index state. `None` when no index manager exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_index: Option<CodeIndexStatus>,
    #[serde(default = "default_true")]
    pub todo_list_enabled: bool,
    #[serde(default = "default_true")]
    pub diff_enabled: bool,
    #[serde(default = "default_true")]
    pub browser_tool_enabled: bool,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            code_index: None,
            todo_list_enabled: true,
            diff_enabled: true,
            browser_tool_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

// ──────────────────── Tool Types ────────────────────

/// A tool definition eligible for presentation to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Definition with an empty description and schema.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            input_schema: serde_json::Value::Null,
        }
    }
}

// ──────────────────── MCP Types ────────────────────

/// A resource exposed by an MCP server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpResource {
    pub uri: String,
    #[serde(default)]
    pub name: String,
}

/// An MCP server as reported by the resource hub.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpServer {
    pub name: String,
    #[serde(default)]
    pub resources: Vec<McpResource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_entry_plain_and_restricted() {
        let json = r#"["read", ["edit", {"fileRegex": "\\.md$", "description": "Markdown only"}]]"#;
        let groups: Vec<GroupEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], GroupEntry::Plain("read".into()));
        assert_eq!(groups[1].name(), "edit");
        let options = groups[1].options().unwrap();
        assert_eq!(options.file_regex.as_deref(), Some("\\.md$"));
        assert_eq!(options.description.as_deref(), Some("Markdown only"));
    }

    #[test]
    fn test_mode_config_defaults() {
        let json = r#"{"slug": "reviewer", "groups": ["read"]}"#;
        let mode: ModeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(mode.slug, "reviewer");
        assert!(!mode.default);
        assert!(mode.permits_group("read"));
        assert!(!mode.permits_group("edit"));
    }

    #[test]
    fn test_model_info_camel_case() {
        let json = r#"{"excludedTools": ["apply_diff"], "includedTools": ["edit_file"]}"#;
        let info: ModelInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.excluded_tools, vec!["apply_diff"]);
        assert_eq!(info.included_tools, vec!["edit_file"]);

        let empty: ModelInfo = serde_json::from_str("{}").unwrap();
        assert!(empty.excluded_tools.is_empty());
        assert!(empty.included_tools.is_empty());
    }

    #[test]
    fn test_runtime_settings_defaults() {
        let settings: RuntimeSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, RuntimeSettings::default());
        assert!(settings.todo_list_enabled);
        assert!(settings.diff_enabled);
        assert!(settings.browser_tool_enabled);
        assert!(settings.code_index.is_none());
    }

    #[test]
    fn test_code_index_ready_requires_all_flags() {
        let mut status = CodeIndexStatus {
            enabled: true,
            configured: true,
            initialized: false,
        };
        assert!(!status.is_ready());
        status.initialized = true;
        assert!(status.is_ready());
    }

    #[test]
    fn test_mcp_server_without_resources() {
        let json = r#"{"name": "github"}"#;
        let server: McpServer = serde_json::from_str(json).unwrap();
        assert!(server.resources.is_empty());
    }
}
