//! Configuration store persisted as a JSON document.

use super::fastcgi::FastCgiApplication;
use super::handler::HandlerMapping;
use super::memory::{ConfigState, MemoryStore};
use super::scope::Scope;
use super::{ConfigurationStore, HandlerList, SchemaField};
use crate::error::{ManagerError, Result, StoreFailure};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Load `path`, or start from an empty configuration if it does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        let state = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str::<ConfigState>(&text)
                .map_err(|e| ManagerError::Config(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => ConfigState::default(),
            Err(e) => return Err(ManagerError::io(path, e)),
        };
        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::from_state(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn add_site(&mut self, name: &str) {
        self.inner.add_site(name);
    }

    fn write_atomically(&self) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self.inner.pending())?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl ConfigurationStore for JsonFileStore {
    fn handler_mappings(&self, scope: &Scope) -> Result<Vec<HandlerMapping>> {
        self.inner.handler_mappings(scope)
    }

    fn local_handlers_mut(&mut self, scope: &Scope) -> Result<&mut HandlerList> {
        self.inner.local_handlers_mut(scope)
    }

    fn fastcgi_applications(&self) -> &[FastCgiApplication] {
        self.inner.fastcgi_applications()
    }

    fn fastcgi_applications_mut(&mut self) -> &mut Vec<FastCgiApplication> {
        self.inner.fastcgi_applications_mut()
    }

    fn is_top_level_scope(&self, scope: &Scope) -> bool {
        self.inner.is_top_level_scope(scope)
    }

    fn has_field(&self, field: SchemaField) -> bool {
        self.inner.has_field(field)
    }

    fn commit(&mut self) -> std::result::Result<(), StoreFailure> {
        self.write_atomically()?;
        self.inner.accept_pending();
        info!(path = %self.path.display(), "configuration written");
        Ok(())
    }

    fn rollback(&mut self) {
        self.inner.rollback();
    }
}
