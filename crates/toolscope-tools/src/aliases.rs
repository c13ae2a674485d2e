//! Alias table: alternate presentation names for canonical tools.
//!
//! Built once at startup and frozen. Registration is validated eagerly so a
//! conflicting alias aborts boot instead of surfacing mid-request.

use std::collections::HashMap;

use crate::error::IntegrityError;
use crate::groups::GroupCatalog;
use crate::names;

/// Stock aliases for built-in tools.
const BUILTIN_ALIASES: &[(&str, &[&str])] = &[
    (names::SEARCH_AND_REPLACE, &["search_replace"]),
    (names::WRITE_TO_FILE, &["create_file"]),
    (names::EXECUTE_COMMAND, &["run_terminal_command"]),
];

/// Frozen canonical ↔ alias maps.
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    /// Canonical → aliases, in registration order.
    aliases: HashMap<String, Vec<String>>,
    /// Alias → canonical.
    canonical: HashMap<String, String>,
}

impl AliasRegistry {
    /// Start registering aliases against `catalog`.
    pub fn builder(catalog: &GroupCatalog) -> AliasRegistryBuilder<'_> {
        AliasRegistryBuilder {
            catalog,
            registry: AliasRegistry::default(),
        }
    }

    /// Registry holding the stock aliases for `catalog`.
    pub fn builtin(catalog: &GroupCatalog) -> Result<Self, IntegrityError> {
        Ok(Self::builtin_builder(catalog)?.build())
    }

    /// Builder with the stock aliases already registered.
    pub fn builtin_builder(
        catalog: &GroupCatalog,
    ) -> Result<AliasRegistryBuilder<'_>, IntegrityError> {
        let mut builder = Self::builder(catalog);
        for &(canonical, aliases) in BUILTIN_ALIASES {
            builder.register(canonical, aliases)?;
        }
        Ok(builder)
    }

    /// Registry built from `(canonical, aliases)` pairs in order.
    pub fn from_definitions<'a, I, A>(
        catalog: &GroupCatalog,
        defs: I,
    ) -> Result<Self, IntegrityError>
    where
        I: IntoIterator<Item = (&'a str, A)>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let mut builder = Self::builder(catalog);
        for (canonical, aliases) in defs {
            let aliases: Vec<String> = aliases
                .into_iter()
                .map(|a| a.as_ref().to_string())
                .collect();
            builder.register(canonical, &aliases)?;
        }
        Ok(builder.build())
    }

    /// Canonical name for `name`; identity when unknown or already canonical.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.canonical.get(name).map(String::as_str).unwrap_or(name)
    }

    /// `[canonical, alias1, alias2, ...]` for `name`, or `[name]` when not aliased.
    pub fn alias_group(&self, name: &str) -> Vec<String> {
        let canonical = self.resolve_alias(name);
        let mut group = vec![canonical.to_string()];
        if let Some(aliases) = self.aliases.get(canonical) {
            group.extend(aliases.iter().cloned());
        }
        group
    }

    /// Aliases registered for `canonical`.
    pub fn aliases_of(&self, canonical: &str) -> &[String] {
        self.aliases
            .get(canonical)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.canonical.contains_key(name)
    }

    /// Every alias, sorted.
    pub fn all_aliases(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.canonical.keys().map(String::as_str).collect();
        all.sort_unstable();
        all
    }
}

/// Mutable registration phase of an [`AliasRegistry`].
#[derive(Debug)]
pub struct AliasRegistryBuilder<'a> {
    catalog: &'a GroupCatalog,
    registry: AliasRegistry,
}

impl AliasRegistryBuilder<'_> {
    /// Register every alias of `canonical`.
    ///
    /// Fails without touching the maps if any alias conflicts.
    pub fn register<S: AsRef<str>>(
        &mut self,
        canonical: &str,
        aliases: &[S],
    ) -> Result<&mut Self, IntegrityError> {
        if canonical.trim().is_empty() {
            return Err(IntegrityError::BlankIdentifier {
                context: "alias canonical",
            });
        }
        if self.registry.aliases.contains_key(canonical) {
            return Err(IntegrityError::DuplicateRegistration {
                canonical: canonical.to_string(),
            });
        }
        if let Some(owner) = self.registry.canonical.get(canonical) {
            return Err(IntegrityError::CanonicalIsAlias {
                canonical: canonical.to_string(),
                owner: owner.clone(),
            });
        }

        let mut accepted: Vec<String> = Vec::with_capacity(aliases.len());
        for alias in aliases {
            let alias = alias.as_ref();
            if alias.trim().is_empty() {
                return Err(IntegrityError::BlankIdentifier { context: "alias" });
            }
            if accepted.iter().any(|a| a == alias) {
                return Err(IntegrityError::DuplicateAlias {
                    alias: alias.to_string(),
                    canonical: canonical.to_string(),
                });
            }
            if let Some(owner) = self.registry.canonical.get(alias) {
                return Err(IntegrityError::AliasClaimed {
                    alias: alias.to_string(),
                    canonical: canonical.to_string(),
                    owner: owner.clone(),
                });
            }
            if alias == canonical
                || self.registry.aliases.contains_key(alias)
                || self.catalog.is_known_tool(alias)
            {
                return Err(IntegrityError::AliasCollidesWithTool {
                    alias: alias.to_string(),
                    canonical: canonical.to_string(),
                });
            }
            accepted.push(alias.to_string());
        }

        for alias in &accepted {
            self.registry
                .canonical
                .insert(alias.clone(), canonical.to_string());
        }
        tracing::debug!(canonical, aliases = ?accepted, "Registered tool aliases");
        self.registry.aliases.insert(canonical.to_string(), accepted);
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> AliasRegistry {
        self.registry
    }
}
