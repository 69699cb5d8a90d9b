//! User commands that behave like a known command because they expand to it.
//!
//! With `\newcommand{\myref}[1]{\ref{#1}}` in the document, `\myref{sec}`
//! refers to a label just like `\ref{sec}` does. The registry is an explicit
//! value owned by the host: resolve against it, and call
//! [`AliasRegistry::update_aliases`] whenever the file set may have changed.

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;

use crate::file_set::FileSet;

#[derive(Debug, Clone)]
struct AliasSet {
    fingerprint: u64,
    members: IndexSet<String>,
}

#[derive(Debug, Default)]
pub struct AliasRegistry {
    /// Keyed by the first command of the base set.
    sets: RwLock<IndexMap<String, AliasSet>>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// All known aliases of `base`, `base` included. Unknown commands are
    /// only their own alias.
    pub fn aliases(&self, base: &str) -> IndexSet<String> {
        self.sets
            .read()
            .values()
            .find(|set| set.members.contains(base))
            .map(|set| set.members.clone())
            .unwrap_or_else(|| IndexSet::from([base.to_string()]))
    }

    /// True if `name` is a member of `base_set` or one of its aliases.
    pub fn is_alias(&self, base_set: &[&str], name: &str) -> bool {
        if base_set.contains(&name) {
            return true;
        }
        let Some(key) = base_set.first() else {
            return false;
        };
        self.sets
            .read()
            .get(*key)
            .is_some_and(|set| set.members.contains(name))
    }

    /// Recomputes the aliases of `base_set` if the definitions in `file_set`
    /// changed since the last update. Returns whether anything was
    /// recomputed.
    pub fn update_aliases(&self, base_set: &[&str], file_set: &FileSet) -> bool {
        let Some(key) = base_set.first() else {
            return false;
        };
        let fingerprint = file_set.definition_fingerprint();
        let fresh = self
            .sets
            .read()
            .get(*key)
            .is_some_and(|set| set.fingerprint == fingerprint);
        if fresh {
            return false;
        }

        let members = expand(base_set, file_set);
        log::debug!(
            "Aliases of {} updated: {} commands",
            key,
            members.len()
        );
        self.sets
            .write()
            .insert(key.to_string(), AliasSet { fingerprint, members });
        true
    }
}

/// Adds user commands whose body invokes a member until nothing changes, so
/// chains of definitions are followed.
fn expand(base_set: &[&str], file_set: &FileSet) -> IndexSet<String> {
    let definitions = file_set.definitions();
    let mut members: IndexSet<String> = base_set.iter().map(|name| name.to_string()).collect();
    loop {
        let before = members.len();
        for definition in &definitions {
            if !members.contains(&definition.name)
                && definition
                    .body
                    .iter()
                    .any(|command| members.contains(command.base_name()))
            {
                members.insert(definition.name.clone());
            }
        }
        if members.len() == before {
            return members;
        }
    }
}
