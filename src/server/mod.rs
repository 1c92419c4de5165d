//! Web-server configuration: handler mappings, FastCGI applications, scopes.
//!
//! The host configuration system sits behind `ConfigurationStore`. Everything
//! above it (`HandlerRegistry`, the registrar) works on plain owned entities
//! and never talks to the host API directly.

pub mod fastcgi;
pub mod handler;
pub mod json_store;
pub mod memory;
pub mod registry;
pub mod scope;

pub use fastcgi::{FastCgiApplication, FastCgiProtocol, StderrMode};
pub use handler::{HandlerMapping, RequireAccess, ResourceType};
pub use json_store::JsonFileStore;
pub use memory::{ConfigState, MemoryStore};
pub use registry::HandlerRegistry;
pub use scope::{ResolvedScope, Scope, resolve};

use crate::error::{Result, StoreFailure};
use serde::{Deserialize, Serialize};

/// Optional fields whose presence depends on the host schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaField {
    FastCgiStderrMode,
    FastCgiSignalBeforeTerminate,
}

impl SchemaField {
    pub const ALL: [SchemaField; 2] = [
        SchemaField::FastCgiStderrMode,
        SchemaField::FastCgiSignalBeforeTerminate,
    ];
}

/// Handler mappings defined locally at one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerList {
    /// Inherited mappings are hidden; only `entries` are visible here.
    pub cleared: bool,
    pub entries: Vec<HandlerMapping>,
}

impl HandlerList {
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|m| m.has_name(name))
    }

    /// Drop every local entry and hide inherited ones.
    pub fn clear(&mut self) {
        self.cleared = true;
        self.entries.clear();
    }

    /// Move the entry at `index` to the front. Returns false if out of range.
    pub fn move_to_front(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        if index > 0 {
            let mapping = self.entries.remove(index);
            self.entries.insert(0, mapping);
        }
        true
    }
}

/// Host configuration system.
///
/// Mutations are pending until `commit`. The top-level scope's local list
/// is the whole server list.
pub trait ConfigurationStore {
    /// Visible mappings at `scope`, inherited ones included, in precedence order.
    fn handler_mappings(&self, scope: &Scope) -> Result<Vec<HandlerMapping>>;

    /// Mappings defined at `scope` itself.
    fn local_handlers_mut(&mut self, scope: &Scope) -> Result<&mut HandlerList>;

    fn fastcgi_applications(&self) -> &[FastCgiApplication];

    fn fastcgi_applications_mut(&mut self) -> &mut Vec<FastCgiApplication>;

    fn is_top_level_scope(&self, scope: &Scope) -> bool;

    fn has_field(&self, field: SchemaField) -> bool;

    /// Persist every pending mutation.
    fn commit(&mut self) -> std::result::Result<(), StoreFailure>;

    /// Discard every pending mutation.
    fn rollback(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_to_front() {
        let mut list = HandlerList::default();
        for name in ["a", "b", "c"] {
            list.entries
                .push(HandlerMapping::fastcgi(name, "*.php", name, "FastCgiModule"));
        }
        assert!(list.move_to_front(2));
        let names: Vec<_> = list.entries.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert!(list.move_to_front(0));
        assert!(!list.move_to_front(3));
        assert_eq!(list.position("B"), Some(2));
    }
}
