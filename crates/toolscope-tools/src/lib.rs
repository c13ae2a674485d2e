//! toolscope-tools: Tool capability resolution.
//!
//! Provides:
//! - Tool group catalog (read, edit, browser, command, mcp, modes) and tool aliases
//! - Mode registry with default-mode fallback and per-mode permission checks
//! - Per-model include/exclude overrides
//! - Environment feature gates
//! - The resolver that turns a request into the tool list presented to the model

pub mod aliases;
pub mod catalog;
pub mod customize;
pub mod error;
pub mod gate;
pub mod groups;
pub mod modes;
pub mod names;
pub mod resolver;

pub use aliases::{AliasRegistry, AliasRegistryBuilder};
pub use catalog::{CatalogHandle, ToolCatalog};
pub use customize::Customization;
pub use error::{IntegrityError, ToolAccessError};
pub use gate::{FEATURE_GATES, FeatureGate, GateContext, ResourceHub, StaticResourceHub};
pub use groups::{GroupCatalog, ToolGroup};
pub use modes::{ModePolicy, ToolParams};
pub use resolver::{GroupSummary, ResolveRequest, Resolver};
