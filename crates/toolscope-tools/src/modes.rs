//! Mode registry and per-mode tool permission.
//!
//! Permission chain for one tool: `alias → experiment → always-available →
//! group membership → group restriction`.

use std::collections::BTreeSet;

use regex::Regex;
use toolscope_types::{Experiments, GroupEntry, GroupOptions, ModeConfig};

use crate::catalog::ToolCatalog;
use crate::error::{IntegrityError, ToolAccessError};
use crate::groups::GroupCatalog;
use crate::names::{self, groups as g};

/// Tools that additionally require an experiment flag.
const EXPERIMENT_TOOLS: &[(&str, fn(&Experiments) -> bool)] = &[
    (names::GENERATE_IMAGE, |e| e.image_generation),
    (names::RUN_SLASH_COMMAND, |e| e.run_slash_command),
];

/// Parameters of a concrete invocation, checked against group restrictions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolParams {
    /// Target file path, for tools that write files.
    pub path: Option<String>,
}

impl ToolParams {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

/// Whether `tool` passes its experiment gate. Ungated tools always pass.
pub fn experiment_enabled(tool: &str, experiments: &Experiments) -> bool {
    EXPERIMENT_TOOLS
        .iter()
        .find(|(gated, _)| *gated == tool)
        .is_none_or(|(_, enabled)| enabled(experiments))
}

/// The built-in modes. `code` is the default.
pub fn builtin_modes() -> Vec<ModeConfig> {
    let markdown_only = GroupEntry::Restricted(
        g::EDIT.to_string(),
        GroupOptions {
            file_regex: Some(r"\.md$".to_string()),
            description: Some("Markdown files only".to_string()),
        },
    );

    let mut architect = ModeConfig::new("architect", "Architect", &[g::READ]);
    architect.groups.extend([
        markdown_only,
        GroupEntry::from(g::BROWSER),
        GroupEntry::from(g::MCP),
    ]);
    architect.when_to_use = Some("Plan and design before implementation".to_string());

    let mut code = ModeConfig::new(
        "code",
        "Code",
        &[g::READ, g::EDIT, g::BROWSER, g::COMMAND, g::MCP],
    );
    code.default = true;
    code.when_to_use = Some("Write, modify or refactor code".to_string());

    let mut ask = ModeConfig::new("ask", "Ask", &[g::READ, g::BROWSER, g::MCP]);
    ask.when_to_use = Some("Answer questions without changing files".to_string());

    let mut debug = ModeConfig::new(
        "debug",
        "Debug",
        &[g::READ, g::EDIT, g::BROWSER, g::COMMAND, g::MCP],
    );
    debug.when_to_use = Some("Diagnose and fix problems".to_string());

    let mut orchestrator = ModeConfig::new("orchestrator", "Orchestrator", &[]);
    orchestrator.when_to_use = Some("Delegate work to other modes".to_string());

    vec![architect, code, ask, debug, orchestrator]
}

/// Built-in modes plus resolution and permission checks.
#[derive(Debug, Clone)]
pub struct ModePolicy {
    modes: Vec<ModeConfig>,
    default_index: usize,
}

impl ModePolicy {
    /// Validate that slugs are unique and non-blank and exactly one mode is the default.
    pub fn new(modes: Vec<ModeConfig>) -> Result<Self, IntegrityError> {
        let mut seen = BTreeSet::new();
        for mode in &modes {
            if mode.slug.trim().is_empty() {
                return Err(IntegrityError::BlankIdentifier {
                    context: "mode slug",
                });
            }
            if !seen.insert(mode.slug.as_str()) {
                return Err(IntegrityError::DuplicateMode {
                    slug: mode.slug.clone(),
                });
            }
        }

        let defaults: Vec<usize> = modes
            .iter()
            .enumerate()
            .filter(|(_, mode)| mode.default)
            .map(|(index, _)| index)
            .collect();
        match defaults.as_slice() {
            [index] => Ok(Self {
                default_index: *index,
                modes,
            }),
            other => Err(IntegrityError::DefaultModeCount { count: other.len() }),
        }
    }

    pub fn builtin() -> Result<Self, IntegrityError> {
        Self::new(builtin_modes())
    }

    pub fn default_slug(&self) -> &str {
        self.default_mode().slug.as_str()
    }

    fn default_mode(&self) -> &ModeConfig {
        // `new` guarantees the index is in bounds.
        &self.modes[self.default_index]
    }

    fn find<'a>(&'a self, slug: &str, custom_modes: &'a [ModeConfig]) -> Option<&'a ModeConfig> {
        custom_modes
            .iter()
            .find(|mode| mode.slug == slug)
            .or_else(|| self.modes.iter().find(|mode| mode.slug == slug))
    }

    /// Mode for `slug`; custom modes shadow built-ins. Unknown slugs fall back
    /// to the default mode, so this never fails.
    pub fn resolve<'a>(&'a self, slug: &str, custom_modes: &'a [ModeConfig]) -> &'a ModeConfig {
        let slug = slug.trim();
        if let Some(mode) = self.find(slug, custom_modes) {
            return mode;
        }
        tracing::debug!(
            slug,
            default = self.default_slug(),
            "Unknown mode, using default"
        );
        self.find(self.default_slug(), custom_modes)
            .unwrap_or_else(|| self.default_mode())
    }

    /// Built-in modes (shadowed by same-slug custom modes) followed by new custom modes.
    pub fn all_modes<'a>(&'a self, custom_modes: &'a [ModeConfig]) -> Vec<&'a ModeConfig> {
        let mut result: Vec<&ModeConfig> = self
            .modes
            .iter()
            .map(|builtin| {
                custom_modes
                    .iter()
                    .find(|custom| custom.slug == builtin.slug)
                    .unwrap_or(builtin)
            })
            .collect();
        for custom in custom_modes {
            if !result.iter().any(|mode| mode.slug == custom.slug) {
                result.push(custom);
            }
        }
        result
    }

    /// Default-partition tools of every group in `groups`, plus always-available tools.
    pub fn tools_for_mode(groups: &[GroupEntry], catalog: &GroupCatalog) -> BTreeSet<String> {
        let mut tools: BTreeSet<String> = groups
            .iter()
            .filter_map(|entry| catalog.group(entry.name()))
            .flat_map(|group| group.tools.iter().cloned())
            .collect();
        tools.extend(catalog.always_available().iter().cloned());
        tools
    }

    /// Group names of `mode`, in presentation order.
    pub fn group_names(mode: &ModeConfig) -> Vec<&str> {
        mode.groups.iter().map(GroupEntry::name).collect()
    }

    /// Check `tool` (or any of its aliases) against the mode for `slug`.
    pub fn check(
        &self,
        tool: &str,
        slug: &str,
        custom_modes: &[ModeConfig],
        experiments: &Experiments,
        catalog: &ToolCatalog,
        params: Option<&ToolParams>,
    ) -> Result<(), ToolAccessError> {
        let mode = self.resolve(slug, custom_modes);
        check_mode(tool, mode, experiments, catalog, params)
    }

    pub fn is_allowed(
        &self,
        tool: &str,
        slug: &str,
        custom_modes: &[ModeConfig],
        experiments: &Experiments,
        catalog: &ToolCatalog,
    ) -> bool {
        self.check(tool, slug, custom_modes, experiments, catalog, None)
            .is_ok()
    }

    /// Check a concrete invocation of `tool` against the file restriction of
    /// its group in the mode for `slug`.
    ///
    /// Group membership is not checked, so opt-in tools a model includes are
    /// held to the same restriction as the rest of their group.
    pub fn check_restriction(
        &self,
        tool: &str,
        slug: &str,
        custom_modes: &[ModeConfig],
        catalog: &ToolCatalog,
        params: Option<&ToolParams>,
    ) -> Result<(), ToolAccessError> {
        let mode = self.resolve(slug, custom_modes);
        let canonical = catalog.aliases().resolve_alias(tool);
        let Some(group) = catalog.groups().group_of(canonical) else {
            return Ok(());
        };
        match mode.group(group) {
            Some(entry) => restrict(tool, mode, group, entry, params),
            None => Ok(()),
        }
    }
}

/// Permission check against an already resolved mode.
pub(crate) fn check_mode(
    tool: &str,
    mode: &ModeConfig,
    experiments: &Experiments,
    catalog: &ToolCatalog,
    params: Option<&ToolParams>,
) -> Result<(), ToolAccessError> {
    let canonical = catalog.aliases().resolve_alias(tool);
    let groups = catalog.groups();

    if !experiment_enabled(canonical, experiments) {
        return Err(ToolAccessError::ExperimentDisabled {
            tool: tool.to_string(),
        });
    }
    if groups.is_always_available(canonical) {
        return Ok(());
    }

    let not_allowed = || ToolAccessError::NotAllowed {
        tool: tool.to_string(),
        mode: mode.slug.clone(),
    };
    let group = groups.group_of(canonical).ok_or_else(not_allowed)?;
    if groups.is_custom_tool(canonical) {
        return Err(not_allowed());
    }
    let entry = mode.group(group).ok_or_else(not_allowed)?;
    restrict(tool, mode, group, entry, params)
}

/// Apply the `file_regex` of `entry`, if any.
fn restrict(
    tool: &str,
    mode: &ModeConfig,
    group: &str,
    entry: &GroupEntry,
    params: Option<&ToolParams>,
) -> Result<(), ToolAccessError> {
    let Some(pattern) = entry.options().and_then(|options| options.file_regex.as_deref()) else {
        return Ok(());
    };
    let regex = Regex::new(pattern).map_err(|e| {
        tracing::warn!(mode = %mode.slug, group, pattern, "Invalid file restriction: {e}");
        ToolAccessError::InvalidRestriction {
            mode: mode.slug.clone(),
            group: group.to_string(),
            pattern: pattern.to_string(),
        }
    })?;

    match params.and_then(|p| p.path.as_deref()) {
        Some(path) if !regex.is_match(path) => Err(ToolAccessError::FileRestriction {
            tool: tool.to_string(),
            mode: mode.slug.clone(),
            pattern: pattern.to_string(),
            path: path.to_string(),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ModePolicy {
        ModePolicy::builtin().unwrap()
    }

    fn catalog() -> ToolCatalog {
        ToolCatalog::builtin().unwrap()
    }

    fn reviewer() -> ModeConfig {
        ModeConfig::new("reviewer", "Reviewer", &[g::READ])
    }

    #[test]
    fn test_builtin_default_is_code() {
        assert_eq!(policy().default_slug(), "code");
    }

    #[test]
    fn test_unknown_slug_falls_back_to_default() {
        let policy = policy();
        let fallback = policy.resolve("nonexistent-slug", &[]);
        let default = policy.resolve(policy.default_slug(), &[]);
        assert_eq!(fallback, default);
        assert_eq!(policy.resolve("   ", &[]).slug, "code");
    }

    #[test]
    fn test_custom_mode_shadows_builtin() {
        let policy = policy();
        let custom = vec![ModeConfig::new("ask", "Ask (read only)", &[g::READ])];
        let mode = policy.resolve("ask", &custom);
        assert_eq!(mode.name, "Ask (read only)");
        assert!(!mode.permits_group(g::BROWSER));
    }

    #[test]
    fn test_fallback_honors_custom_default_override() {
        let policy = policy();
        let custom = vec![ModeConfig::new("code", "Code (custom)", &[g::READ])];
        assert_eq!(policy.resolve("missing", &custom).name, "Code (custom)");
    }

    #[test]
    fn test_all_modes_merges_custom() {
        let policy = policy();
        let custom = vec![
            reviewer(),
            ModeConfig::new("debug", "Debug (custom)", &[g::READ]),
        ];
        let all = policy.all_modes(&custom);
        assert_eq!(all.len(), 6);
        assert_eq!(all[3].name, "Debug (custom)");
        assert_eq!(all[5].slug, "reviewer");
    }

    #[test]
    fn test_default_mode_count_validated() {
        let mut modes = builtin_modes();
        for mode in &mut modes {
            mode.default = false;
        }
        assert_eq!(
            ModePolicy::new(modes.clone()).unwrap_err(),
            IntegrityError::DefaultModeCount { count: 0 }
        );
        modes[0].default = true;
        modes[1].default = true;
        assert_eq!(
            ModePolicy::new(modes).unwrap_err(),
            IntegrityError::DefaultModeCount { count: 2 }
        );
    }

    #[test]
    fn test_duplicate_mode_rejected() {
        let mut modes = builtin_modes();
        modes.push(ModeConfig::new("ask", "Ask again", &[]));
        assert!(matches!(
            ModePolicy::new(modes),
            Err(IntegrityError::DuplicateMode { .. })
        ));
    }

    #[test]
    fn test_tools_for_mode_excludes_custom_tools() {
        let catalog = catalog();
        let code = policy().resolve("code", &[]).clone();
        let tools = ModePolicy::tools_for_mode(&code.groups, catalog.groups());
        assert!(tools.contains(names::APPLY_DIFF));
        assert!(tools.contains(names::EXECUTE_COMMAND));
        assert!(tools.contains(names::ATTEMPT_COMPLETION));
        assert!(!tools.contains(names::EDIT_FILE));
    }

    #[test]
    fn test_orchestrator_only_gets_always_available() {
        let catalog = catalog();
        let orchestrator = policy().resolve("orchestrator", &[]).clone();
        let tools = ModePolicy::tools_for_mode(&orchestrator.groups, catalog.groups());
        let expected: BTreeSet<String> =
            catalog.groups().always_available().iter().cloned().collect();
        assert_eq!(tools, expected);
    }

    #[test]
    fn test_is_allowed_by_group() {
        let policy = policy();
        let catalog = catalog();
        let experiments = Experiments::default();
        assert!(policy.is_allowed(names::READ_FILE, "ask", &[], &experiments, &catalog));
        assert!(!policy.is_allowed(names::APPLY_DIFF, "ask", &[], &experiments, &catalog));
        assert!(!policy.is_allowed(
            names::EXECUTE_COMMAND,
            "architect",
            &[],
            &experiments,
            &catalog
        ));
        assert!(policy.is_allowed(
            names::ATTEMPT_COMPLETION,
            "orchestrator",
            &[],
            &experiments,
            &catalog
        ));
        assert!(!policy.is_allowed("unknown_tool", "code", &[], &experiments, &catalog));
    }

    #[test]
    fn test_custom_tool_needs_explicit_include() {
        let policy = policy();
        let catalog = catalog();
        let err = policy
            .check(names::EDIT_FILE, "code", &[], &Experiments::default(), &catalog, None)
            .unwrap_err();
        assert!(matches!(err, ToolAccessError::NotAllowed { .. }));
    }

    #[test]
    fn test_experiment_gated_tools() {
        let policy = policy();
        let catalog = catalog();
        let off = Experiments::default();
        let on = Experiments {
            image_generation: true,
            run_slash_command: true,
        };
        assert!(!policy.is_allowed(names::GENERATE_IMAGE, "code", &[], &off, &catalog));
        assert!(policy.is_allowed(names::GENERATE_IMAGE, "code", &[], &on, &catalog));
        assert!(!policy.is_allowed(names::RUN_SLASH_COMMAND, "ask", &[], &off, &catalog));
        assert!(policy.is_allowed(names::RUN_SLASH_COMMAND, "ask", &[], &on, &catalog));
    }

    #[test]
    fn test_alias_shares_permission() {
        let policy = policy();
        let catalog = catalog();
        let experiments = Experiments::default();
        for mode in ["code", "ask", "architect", "orchestrator"] {
            assert_eq!(
                policy.is_allowed("create_file", mode, &[], &experiments, &catalog),
                policy.is_allowed(names::WRITE_TO_FILE, mode, &[], &experiments, &catalog),
            );
        }
    }

    #[test]
    fn test_file_restriction() {
        let policy = policy();
        let catalog = catalog();
        let experiments = Experiments::default();
        let check = |tool: &str, params: Option<&ToolParams>| {
            policy.check(tool, "architect", &[], &experiments, &catalog, params)
        };

        let markdown = ToolParams::with_path("docs/plan.md");
        assert!(check(names::WRITE_TO_FILE, Some(&markdown)).is_ok());

        let source = ToolParams::with_path("src/main.rs");
        assert_eq!(
            check(names::WRITE_TO_FILE, Some(&source)).unwrap_err(),
            ToolAccessError::FileRestriction {
                tool: names::WRITE_TO_FILE.into(),
                mode: "architect".into(),
                pattern: r"\.md$".into(),
                path: "src/main.rs".into(),
            }
        );

        // Without a path the restriction is satisfiable.
        assert!(check(names::WRITE_TO_FILE, None).is_ok());
        // Other groups are unaffected.
        assert!(check(names::READ_FILE, Some(&source)).is_ok());
    }

    #[test]
    fn test_check_restriction_covers_opt_in_tools() {
        let policy = policy();
        let catalog = catalog();
        let source = ToolParams::with_path("src/main.rs");
        let markdown = ToolParams::with_path("docs/plan.md");

        // Not a member of the architect mode on its own...
        let experiments = Experiments::default();
        assert!(matches!(
            policy.check(names::EDIT_FILE, "architect", &[], &experiments, &catalog, None),
            Err(ToolAccessError::NotAllowed { .. })
        ));
        // ...but still bound by the edit group's pattern once a model includes it.
        assert!(matches!(
            policy.check_restriction(names::EDIT_FILE, "architect", &[], &catalog, Some(&source)),
            Err(ToolAccessError::FileRestriction { .. })
        ));
        assert!(
            policy
                .check_restriction(names::EDIT_FILE, "architect", &[], &catalog, Some(&markdown))
                .is_ok()
        );
        assert!(
            policy
                .check_restriction(names::EDIT_FILE, "code", &[], &catalog, Some(&source))
                .is_ok()
        );
        assert!(
            policy
                .check_restriction(names::READ_FILE, "architect", &[], &catalog, Some(&source))
                .is_ok()
        );
    }

    #[test]
    fn test_group_names() {
        let policy = policy();
        let architect = policy.resolve("architect", &[]);
        assert_eq!(
            ModePolicy::group_names(architect),
            vec![g::READ, g::EDIT, g::BROWSER, g::MCP]
        );
        let orchestrator = policy.resolve("orchestrator", &[]);
        assert!(ModePolicy::group_names(orchestrator).is_empty());
    }

    #[test]
    fn test_invalid_restriction_denies() {
        let policy = policy();
        let catalog = catalog();
        let experiments = Experiments::default();
        let mut broken = reviewer();
        broken.groups.push(GroupEntry::Restricted(
            g::EDIT.to_string(),
            GroupOptions {
                file_regex: Some("([".to_string()),
                description: None,
            },
        ));
        let custom = vec![broken];
        let err = policy
            .check(names::APPLY_DIFF, "reviewer", &custom, &experiments, &catalog, None)
            .unwrap_err();
        assert!(matches!(err, ToolAccessError::InvalidRestriction { .. }));
        assert!(matches!(
            policy.check_restriction(names::EDIT_FILE, "reviewer", &custom, &catalog, None),
            Err(ToolAccessError::InvalidRestriction { .. })
        ));
        assert!(policy.is_allowed(names::READ_FILE, "reviewer", &custom, &experiments, &catalog));
    }
}
