use thiserror::Error;

/// Static tool/mode data that violates a registry invariant.
///
/// Raised while building the catalog, alias table or mode registry. A process
/// holding one of these must not start resolving tools.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("blank identifier in {context}")]
    BlankIdentifier { context: &'static str },
    #[error("tool `{tool}` is listed in both group `{first}` and group `{second}`")]
    ToolInTwoGroups {
        tool: String,
        first: String,
        second: String,
    },
    #[error("tool `{canonical}` registered its aliases twice")]
    DuplicateRegistration { canonical: String },
    #[error("alias `{alias}` is listed twice for `{canonical}`")]
    DuplicateAlias { alias: String, canonical: String },
    #[error("alias `{alias}` of `{canonical}` is already an alias of `{owner}`")]
    AliasClaimed {
        alias: String,
        canonical: String,
        owner: String,
    },
    #[error("alias `{alias}` of `{canonical}` collides with an existing tool name")]
    AliasCollidesWithTool { alias: String, canonical: String },
    #[error("`{canonical}` cannot take aliases: it is already an alias of `{owner}`")]
    CanonicalIsAlias { canonical: String, owner: String },
    #[error("mode `{slug}` is defined twice")]
    DuplicateMode { slug: String },
    #[error("expected exactly one default mode, found {count}")]
    DefaultModeCount { count: usize },
}

/// Why a single tool invocation is not permitted in a mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolAccessError {
    #[error("tool `{tool}` is not allowed in mode `{mode}`")]
    NotAllowed { tool: String, mode: String },
    #[error("tool `{tool}` requires an experiment that is disabled")]
    ExperimentDisabled { tool: String },
    #[error("tool `{tool}` in mode `{mode}` may only edit files matching `{pattern}`, got `{path}`")]
    FileRestriction {
        tool: String,
        mode: String,
        pattern: String,
        path: String,
    },
    #[error("mode `{mode}` restricts group `{group}` with invalid pattern `{pattern}`")]
    InvalidRestriction {
        mode: String,
        group: String,
        pattern: String,
    },
}
