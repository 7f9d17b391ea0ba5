//! External lookup collaborators used by rule evaluation.
//!
//! The `List` kind resolves its values against a named allow-list and the
//! `MicrosoftAlias` kind resolves an alias to its owning distribution list.
//! Both resolutions live behind traits so the engine stays a pure function
//! of its inputs.

use std::collections::{BTreeMap, BTreeSet};

/// Resolves a named allow-list to its set of permitted values.
pub trait AllowListResolver: Send + Sync {
    fn resolve(&self, list: &str) -> Option<&BTreeSet<String>>;
}

/// Resolves an alias to the distribution list that owns it.
pub trait AliasDirectory: Send + Sync {
    fn owning_list(&self, alias: &str) -> Option<String>;
}

/// Allow-lists resolved from the rule configuration document.
#[derive(Debug, Clone, Default)]
pub struct NamedAllowLists {
    lists: BTreeMap<String, BTreeSet<String>>,
}

impl NamedAllowLists {
    pub fn new(lists: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self { lists }
    }

    pub fn insert(&mut self, name: impl Into<String>, values: impl IntoIterator<Item = String>) {
        self.lists.insert(name.into(), values.into_iter().collect());
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

impl AllowListResolver for NamedAllowLists {
    fn resolve(&self, list: &str) -> Option<&BTreeSet<String>> {
        self.lists.get(list)
    }
}

/// In-memory alias directory.
///
/// Builds without directory data use the default (empty) directory, in which
/// case every alias-validated field fails until a real directory is wired in.
#[derive(Debug, Clone, Default)]
pub struct StaticAliasDirectory {
    owners: BTreeMap<String, String>,
}

impl StaticAliasDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias as owned by a distribution list.
    pub fn insert(&mut self, alias: impl Into<String>, list: impl Into<String>) {
        self.owners.insert(alias.into(), list.into());
    }
}

impl AliasDirectory for StaticAliasDirectory {
    fn owning_list(&self, alias: &str) -> Option<String> {
        self.owners.get(alias).cloned()
    }
}
