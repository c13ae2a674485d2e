//! Per-model include/exclude overrides applied on top of a mode's tool set.
//!
//! Steps:
//! 1. No model info → base set unchanged.
//! 2. Remove every `excluded_tools` entry (canonicalized).
//! 3. Add every `included_tools` entry (canonicalized) whose group the mode permits.
//! 4. Remember alias spellings of included tools for output renaming. When
//!    several aliases of one tool are included, the last one listed wins.

use std::collections::{BTreeMap, BTreeSet};

use toolscope_types::{ModeConfig, ModelInfo};

use crate::catalog::ToolCatalog;

/// Allowed set after model overrides, plus requested renames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customization {
    /// Canonical tool names.
    pub allowed: BTreeSet<String>,
    /// Canonical name → alias the model asked for (last include wins).
    pub renames: BTreeMap<String, String>,
}

/// Apply `model`'s overrides to `base` for `mode`.
pub fn apply(
    base: BTreeSet<String>,
    mode: &ModeConfig,
    model: Option<&ModelInfo>,
    catalog: &ToolCatalog,
) -> Customization {
    let Some(model) = model else {
        return Customization {
            allowed: base,
            renames: BTreeMap::new(),
        };
    };

    let aliases = catalog.aliases();
    let mut allowed = base;
    let mut renames = BTreeMap::new();

    for tool in &model.excluded_tools {
        allowed.remove(aliases.resolve_alias(tool));
    }

    for tool in &model.included_tools {
        let canonical = aliases.resolve_alias(tool);
        if !include_permitted(canonical, mode, catalog) {
            tracing::debug!(
                tool = %tool,
                mode = %mode.slug,
                "Model include dropped: group not permitted by mode"
            );
            continue;
        }
        allowed.insert(canonical.to_string());
        if canonical != tool.as_str() {
            tracing::debug!(canonical, alias = %tool, "Model requested alias name");
            renames.insert(canonical.to_string(), tool.clone());
        }
    }

    Customization { allowed, renames }
}

/// Whether an include of `canonical` may take effect under `mode`.
///
/// Only tools owned by a group the mode permits qualify; tools outside
/// every group cannot be smuggled in.
pub fn include_permitted(canonical: &str, mode: &ModeConfig, catalog: &ToolCatalog) -> bool {
    catalog
        .groups()
        .group_of(canonical)
        .is_some_and(|group| mode.permits_group(group))
}
