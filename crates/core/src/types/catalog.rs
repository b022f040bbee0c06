//! Server-declared command catalog
//!
//! The catalog arrives once in the auth reply and never changes for the
//! lifetime of a session. `CommandCatalog` exposes lookups only; there is
//! no mutation API, so immutability holds by construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Argument contract for one server command
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandDescriptor {
    /// Number of positional string arguments the command expects
    pub arg_count: usize,
    /// Whether a record payload must accompany the request
    pub requires_record: bool,
}

/// Immutable name → descriptor mapping, shared across session handles
#[derive(Debug, Clone)]
pub struct CommandCatalog {
    inner: Arc<BTreeMap<String, CommandDescriptor>>,
}

impl CommandCatalog {
    pub fn new(map: BTreeMap<String, CommandDescriptor>) -> Self {
        Self {
            inner: Arc::new(map),
        }
    }

    /// Look up a command's argument contract
    pub fn get(&self, name: &str) -> Option<CommandDescriptor> {
        self.inner.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Command names in stable (sorted) order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, CommandDescriptor)> {
        self.inner.iter().map(|(name, desc)| (name.as_str(), *desc))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> CommandCatalog {
        let mut map = BTreeMap::new();
        map.insert(
            "sync".to_string(),
            CommandDescriptor {
                arg_count: 0,
                requires_record: false,
            },
        );
        map.insert(
            "remove_key".to_string(),
            CommandDescriptor {
                arg_count: 1,
                requires_record: false,
            },
        );
        map.insert(
            "update".to_string(),
            CommandDescriptor {
                arg_count: 1,
                requires_record: true,
            },
        );
        CommandCatalog::new(map)
    }

    #[test]
    fn test_lookup() {
        let catalog = sample_catalog();
        let desc = catalog.get("update").unwrap();
        assert_eq!(desc.arg_count, 1);
        assert!(desc.requires_record);
        assert!(catalog.get("drop_table").is_none());
    }

    #[test]
    fn test_names_sorted() {
        let catalog = sample_catalog();
        let names: Vec<&str> = catalog.names().collect();
        assert_eq!(names, vec!["remove_key", "sync", "update"]);
    }

    #[test]
    fn test_clones_share_contents() {
        let catalog = sample_catalog();
        let clone = catalog.clone();
        assert_eq!(catalog.len(), clone.len());
        assert!(clone.contains("sync"));
    }
}
