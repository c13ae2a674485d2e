//! Immutable group + alias snapshot, and the handle that swaps it.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::aliases::AliasRegistry;
use crate::error::IntegrityError;
use crate::groups::GroupCatalog;

/// One consistent pair of group catalog and alias registry.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    groups: GroupCatalog,
    aliases: AliasRegistry,
}

impl ToolCatalog {
    pub fn new(groups: GroupCatalog, aliases: AliasRegistry) -> Self {
        Self { groups, aliases }
    }

    /// Built-in groups with the stock aliases.
    pub fn builtin() -> Result<Self, IntegrityError> {
        let groups = GroupCatalog::builtin().clone();
        let aliases = AliasRegistry::builtin(&groups)?;
        Ok(Self::new(groups, aliases))
    }

    /// Built-in groups with the stock aliases plus `extra` registrations.
    pub fn builtin_with_aliases<'a, I, A>(extra: I) -> Result<Self, IntegrityError>
    where
        I: IntoIterator<Item = (&'a str, A)>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let groups = GroupCatalog::builtin().clone();
        let mut builder = AliasRegistry::builtin_builder(&groups)?;
        for (canonical, aliases) in extra {
            let aliases: Vec<String> = aliases
                .into_iter()
                .map(|a| a.as_ref().to_string())
                .collect();
            builder.register(canonical, &aliases)?;
        }
        let aliases = builder.build();
        Ok(Self::new(groups, aliases))
    }

    pub fn groups(&self) -> &GroupCatalog {
        &self.groups
    }

    pub fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }

    /// Every catalog tool followed by its aliases, in catalog order.
    pub fn presentable_names(&self) -> Vec<String> {
        self.groups
            .all_tools()
            .iter()
            .flat_map(|tool| self.aliases.alias_group(tool))
            .collect()
    }
}

/// Shared, swappable reference to the active [`ToolCatalog`].
///
/// Readers take an `Arc` snapshot; a reload replaces the whole catalog under
/// one write lock so no reader sees a partially registered alias set.
#[derive(Debug, Clone)]
pub struct CatalogHandle {
    inner: Arc<RwLock<Arc<ToolCatalog>>>,
}

impl CatalogHandle {
    pub fn new(catalog: ToolCatalog) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Current catalog.
    pub fn snapshot(&self) -> Arc<ToolCatalog> {
        self.inner.read().clone()
    }

    /// Swap in a fully built catalog, returning the previous one.
    pub fn replace(&self, catalog: ToolCatalog) -> Arc<ToolCatalog> {
        let next = Arc::new(catalog);
        let mut guard = self.inner.write();
        tracing::info!("Tool catalog replaced");
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::names;

    #[test]
    fn test_builtin_catalog() {
        let catalog = ToolCatalog::builtin().unwrap();
        assert_eq!(
            catalog.aliases().resolve_alias("create_file"),
            names::WRITE_TO_FILE
        );
        assert!(catalog.groups().is_known_tool(names::APPLY_DIFF));
    }

    #[test]
    fn test_builtin_with_extra_aliases() {
        let catalog =
            ToolCatalog::builtin_with_aliases([(names::READ_FILE, vec!["view_file"])]).unwrap();
        assert_eq!(catalog.aliases().resolve_alias("view_file"), names::READ_FILE);
        assert_eq!(
            catalog.aliases().resolve_alias("search_replace"),
            names::SEARCH_AND_REPLACE
        );
    }

    #[test]
    fn test_extra_alias_conflicting_with_stock() {
        let result =
            ToolCatalog::builtin_with_aliases([(names::READ_FILE, vec!["search_replace"])]);
        assert!(matches!(result, Err(IntegrityError::AliasClaimed { .. })));
    }

    #[test]
    fn test_presentable_names_include_aliases() {
        let catalog = ToolCatalog::builtin().unwrap();
        let names_list = catalog.presentable_names();
        let canonical_pos = names_list
            .iter()
            .position(|n| n == names::SEARCH_AND_REPLACE)
            .unwrap();
        assert_eq!(names_list[canonical_pos + 1], "search_replace");
    }

    #[test]
    fn test_handle_replace_swaps_whole_catalog() {
        let handle = CatalogHandle::new(ToolCatalog::builtin().unwrap());
        let before = handle.snapshot();
        assert!(!before.aliases().is_alias("view_file"));

        let reloaded =
            ToolCatalog::builtin_with_aliases([(names::READ_FILE, vec!["view_file"])]).unwrap();
        let previous = handle.replace(reloaded);

        assert!(!previous.aliases().is_alias("view_file"));
        assert!(handle.snapshot().aliases().is_alias("view_file"));
        // Snapshots taken before the swap stay valid and unchanged.
        assert!(!before.aliases().is_alias("view_file"));
    }
}
