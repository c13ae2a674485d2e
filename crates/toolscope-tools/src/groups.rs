//! Tool group definitions.
//!
//! A group is a named bucket of tools a mode can permit as a whole. Each
//! group splits its tools into `tools` (granted whenever the group is
//! allowed) and `custom_tools` (granted only when a model includes them).

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use crate::error::IntegrityError;
use crate::names::{self, groups as g};

/// Tools granted by one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolGroup {
    pub name: String,
    /// Granted whenever the group is allowed.
    pub tools: Vec<String>,
    /// Opt-in only; requires an explicit model include.
    pub custom_tools: Vec<String>,
}

impl ToolGroup {
    pub fn new(name: &str, tools: &[&str], custom_tools: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tools: tools.iter().map(|s| s.to_string()).collect(),
            custom_tools: custom_tools.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// All tools of the group, default partition first.
    pub fn all_tools(&self) -> impl Iterator<Item = &str> {
        self.tools
            .iter()
            .chain(self.custom_tools.iter())
            .map(String::as_str)
    }
}

/// Read-only mapping from group name to the tools it grants.
#[derive(Debug, Clone)]
pub struct GroupCatalog {
    groups: Vec<ToolGroup>,
    /// Tool name → index into `groups`.
    owner: HashMap<String, usize>,
    always_available: Vec<String>,
    always_available_set: HashSet<String>,
}

/// The built-in group catalog.
static BUILTIN: Lazy<GroupCatalog> = Lazy::new(|| {
    let groups = vec![
        ToolGroup::new(
            g::READ,
            &[
                names::READ_FILE,
                names::FETCH_INSTRUCTIONS,
                names::SEARCH_FILES,
                names::LIST_FILES,
                names::CODEBASE_SEARCH,
            ],
            &[],
        ),
        ToolGroup::new(
            g::EDIT,
            &[
                names::APPLY_DIFF,
                names::WRITE_TO_FILE,
                names::GENERATE_IMAGE,
            ],
            &[
                names::SEARCH_AND_REPLACE,
                names::EDIT_FILE,
                names::APPLY_PATCH,
            ],
        ),
        ToolGroup::new(g::BROWSER, &[names::BROWSER_ACTION], &[]),
        ToolGroup::new(g::COMMAND, &[names::EXECUTE_COMMAND], &[]),
        ToolGroup::new(
            g::MCP,
            &[names::USE_MCP_TOOL, names::ACCESS_MCP_RESOURCE],
            &[],
        ),
        ToolGroup::new(g::MODES, &[names::SWITCH_MODE, names::NEW_TASK], &[]),
    ];
    let always_available = [
        names::ASK_FOLLOWUP_QUESTION,
        names::ATTEMPT_COMPLETION,
        names::SWITCH_MODE,
        names::NEW_TASK,
        names::UPDATE_TODO_LIST,
        names::RUN_SLASH_COMMAND,
    ];
    match GroupCatalog::new(groups, &always_available) {
        Ok(catalog) => catalog,
        Err(e) => panic!("built-in group catalog is inconsistent: {e}"),
    }
});

impl GroupCatalog {
    /// Build a catalog, rejecting blank names and tools owned by two groups.
    pub fn new(groups: Vec<ToolGroup>, always_available: &[&str]) -> Result<Self, IntegrityError> {
        let mut owner: HashMap<String, usize> = HashMap::new();
        for (index, group) in groups.iter().enumerate() {
            if group.name.trim().is_empty() {
                return Err(IntegrityError::BlankIdentifier {
                    context: "group name",
                });
            }
            for tool in group.all_tools() {
                if tool.trim().is_empty() {
                    return Err(IntegrityError::BlankIdentifier {
                        context: "group tool",
                    });
                }
                if let Some(&first) = owner.get(tool) {
                    return Err(IntegrityError::ToolInTwoGroups {
                        tool: tool.to_string(),
                        first: groups[first].name.clone(),
                        second: group.name.clone(),
                    });
                }
                owner.insert(tool.to_string(), index);
            }
        }

        let mut always = Vec::new();
        let mut always_set = HashSet::new();
        for tool in always_available {
            if tool.trim().is_empty() {
                return Err(IntegrityError::BlankIdentifier {
                    context: "always-available tool",
                });
            }
            if always_set.insert(tool.to_string()) {
                always.push(tool.to_string());
            }
        }

        Ok(Self {
            groups,
            owner,
            always_available: always,
            always_available_set: always_set,
        })
    }

    /// The process-wide built-in catalog.
    pub fn builtin() -> &'static GroupCatalog {
        &BUILTIN
    }

    pub fn group(&self, name: &str) -> Option<&ToolGroup> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Name of the group owning `tool`, covering both partitions.
    pub fn group_of(&self, tool: &str) -> Option<&str> {
        self.owner
            .get(tool)
            .and_then(|&index| self.groups.get(index))
            .map(|group| group.name.as_str())
    }

    pub fn is_always_available(&self, tool: &str) -> bool {
        self.always_available_set.contains(tool)
    }

    pub fn always_available(&self) -> &[String] {
        &self.always_available
    }

    /// Whether `tool` is named anywhere in the catalog.
    pub fn is_known_tool(&self, tool: &str) -> bool {
        self.owner.contains_key(tool) || self.always_available_set.contains(tool)
    }

    /// Whether `tool` is in the opt-in partition of its group.
    pub fn is_custom_tool(&self, tool: &str) -> bool {
        self.owner
            .get(tool)
            .and_then(|&index| self.groups.get(index))
            .is_some_and(|group| group.custom_tools.iter().any(|t| t == tool))
    }

    /// Every tool in catalog order, without duplicates.
    pub fn all_tools(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let grouped = self.groups.iter().flat_map(|group| group.all_tools());
        let always = self.always_available.iter().map(String::as_str);
        for tool in grouped.chain(always) {
            if seen.insert(tool) {
                result.push(tool.to_string());
            }
        }
        result
    }
}
