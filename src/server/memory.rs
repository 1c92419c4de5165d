//! In-process configuration store with explicit commit/rollback.

use super::fastcgi::FastCgiApplication;
use super::handler::HandlerMapping;
use super::scope::Scope;
use super::{ConfigurationStore, HandlerList, SchemaField};
use crate::error::{ManagerError, Result, StoreFailure};
use crate::ini::Key;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Complete configuration snapshot.
///
/// A site's visible handlers are its local entries followed by its parent's
/// visible handlers, unless the local list is cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigState {
    pub sites: Vec<String>,
    pub server_handlers: HandlerList,
    /// Keyed by `Scope::key()`.
    pub scoped_handlers: IndexMap<String, HandlerList>,
    pub fastcgi_applications: Vec<FastCgiApplication>,
    pub schema_fields: Vec<SchemaField>,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self {
            sites: Vec::new(),
            server_handlers: HandlerList::default(),
            scoped_handlers: IndexMap::new(),
            fastcgi_applications: Vec::new(),
            schema_fields: SchemaField::ALL.to_vec(),
        }
    }
}

impl ConfigState {
    fn has_site(&self, name: &str) -> bool {
        self.sites.iter().any(|site| Key::new(site).matches(name))
    }

    fn check_scope(&self, scope: &Scope) -> Result<()> {
        match scope.site_name() {
            Some(site) if !self.has_site(site) => {
                Err(ManagerError::NotFound(format!("site '{}'", site)))
            }
            _ => Ok(()),
        }
    }

    pub fn visible_handlers(&self, scope: &Scope) -> Result<Vec<HandlerMapping>> {
        self.check_scope(scope)?;
        let Some(parent) = scope.parent() else {
            return Ok(self.server_handlers.entries.clone());
        };

        let mut visible = Vec::new();
        if let Some(local) = self.scoped_handlers.get(&scope.key()) {
            visible.extend(local.entries.iter().cloned());
            if local.cleared {
                return Ok(visible);
            }
        }
        visible.extend(self.visible_handlers(&parent)?);
        Ok(visible)
    }

    pub fn local_handlers_mut(&mut self, scope: &Scope) -> Result<&mut HandlerList> {
        self.check_scope(scope)?;
        if scope.is_server() {
            return Ok(&mut self.server_handlers);
        }
        Ok(self.scoped_handlers.entry(scope.key()).or_default())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    committed: ConfigState,
    pending: ConfigState,
    failure: Option<String>,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: ConfigState) -> Self {
        Self {
            committed: state.clone(),
            pending: state,
            ..Default::default()
        }
    }

    /// Limit the optional fields this store's schema knows about.
    pub fn with_schema_fields(mut self, fields: &[SchemaField]) -> Self {
        self.pending.schema_fields = fields.to_vec();
        self.committed.schema_fields = fields.to_vec();
        self
    }

    pub fn add_site(&mut self, name: &str) {
        if !self.pending.has_site(name) {
            self.pending.sites.push(name.to_string());
            self.committed.sites.push(name.to_string());
        }
    }

    /// Make the next `commit` fail with `message`.
    pub fn fail_next_commit(&mut self, message: &str) {
        self.failure = Some(message.to_string());
    }

    pub fn committed(&self) -> &ConfigState {
        &self.committed
    }

    pub fn pending(&self) -> &ConfigState {
        &self.pending
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }

    pub(crate) fn accept_pending(&mut self) {
        self.committed = self.pending.clone();
        self.commits += 1;
    }
}

impl ConfigurationStore for MemoryStore {
    fn handler_mappings(&self, scope: &Scope) -> Result<Vec<HandlerMapping>> {
        self.pending.visible_handlers(scope)
    }

    fn local_handlers_mut(&mut self, scope: &Scope) -> Result<&mut HandlerList> {
        self.pending.local_handlers_mut(scope)
    }

    fn fastcgi_applications(&self) -> &[FastCgiApplication] {
        &self.pending.fastcgi_applications
    }

    fn fastcgi_applications_mut(&mut self) -> &mut Vec<FastCgiApplication> {
        &mut self.pending.fastcgi_applications
    }

    fn is_top_level_scope(&self, scope: &Scope) -> bool {
        scope.is_server()
    }

    fn has_field(&self, field: SchemaField) -> bool {
        self.pending.schema_fields.contains(&field)
    }

    fn commit(&mut self) -> std::result::Result<(), StoreFailure> {
        if let Some(message) = self.failure.take() {
            return Err(message.into());
        }
        self.accept_pending();
        info!(commits = self.commits, "configuration committed");
        Ok(())
    }

    fn rollback(&mut self) {
        self.pending = self.committed.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(name: &str, path: &str) -> HandlerMapping {
        HandlerMapping::fastcgi(name, path, &format!("C:\\{}\\php-cgi.exe", name), "FastCgiModule")
    }

    fn names(mappings: &[HandlerMapping]) -> Vec<&str> {
        mappings.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_inheritance_and_clear() {
        let mut store = MemoryStore::new();
        store.add_site("Default Web Site");
        store.pending.server_handlers.entries = vec![mapping("A", "*.php"), mapping("B", "*.asp")];

        let site = Scope::site("default web site");
        let app = Scope::site_path("Default Web Site", "app");
        assert_eq!(names(&store.handler_mappings(&app).unwrap()), vec!["A", "B"]);

        store
            .local_handlers_mut(&site)
            .unwrap()
            .entries
            .push(mapping("S", "*.php"));
        assert_eq!(names(&store.handler_mappings(&app).unwrap()), vec!["S", "A", "B"]);

        store.local_handlers_mut(&app).unwrap().clear();
        assert!(store.handler_mappings(&app).unwrap().is_empty());
        assert_eq!(names(&store.handler_mappings(&Scope::Server).unwrap()), vec!["A", "B"]);
    }

    #[test]
    fn test_unknown_site_not_found() {
        let store = MemoryStore::new();
        let err = store.handler_mappings(&Scope::site("nope")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
    }

    #[test]
    fn test_commit_and_rollback() {
        let mut store = MemoryStore::new();
        store.fastcgi_applications_mut().push(FastCgiApplication::new("a", ""));
        store.rollback();
        assert!(store.fastcgi_applications().is_empty());

        store.fastcgi_applications_mut().push(FastCgiApplication::new("a", ""));
        store.fail_next_commit("locked");
        assert_eq!(store.commit().unwrap_err().to_string(), "locked");
        assert!(store.committed().fastcgi_applications.is_empty());

        store.commit().unwrap();
        assert_eq!(store.committed().fastcgi_applications.len(), 1);
        assert_eq!(store.commit_count(), 1);
    }
}
