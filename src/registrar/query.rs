//! Read and edit the configuration of the interpreter active at a scope.

use super::{FastCgiRegistrar, PHPRC};
use crate::error::{ManagerError, Result};
use crate::ini::{Directive, DirectiveUpdate, ExtensionRef, ExtensionUpdate, IniDocument};
use crate::server::{FastCgiApplication, HandlerMapping, Scope};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One registered PHP handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpVersion {
    pub handler_name: String,
    pub executable: PathBuf,
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpConfigInfo {
    pub handler_name: String,
    pub executable: PathBuf,
    pub version: Option<String>,
    pub ini_path: PathBuf,
    pub error_log: Option<String>,
    pub installed_extensions: usize,
    pub enabled_extensions: usize,
}

impl FastCgiRegistrar<'_> {
    /// The `*.php` mapping in effect at `scope`, if any.
    pub fn active_handler(&self, scope: &Scope) -> Result<Option<HandlerMapping>> {
        let path = &self.config.handler_path;
        Ok(self
            .store
            .handler_mappings(scope)?
            .into_iter()
            .find(|m| m.matches_path(path)))
    }

    /// The active `*.php` mapping with its interpreter's product version.
    pub fn active_configuration(&self, scope: &Scope) -> Result<Option<PhpVersion>> {
        Ok(self.active_handler(scope)?.map(|m| self.describe(m)))
    }

    /// Every `*.php` mapping visible at `scope`, active one first.
    pub fn list_versions(&self, scope: &Scope) -> Result<Vec<PhpVersion>> {
        let path = &self.config.handler_path;
        Ok(self
            .store
            .handler_mappings(scope)?
            .into_iter()
            .filter(|m| m.matches_path(path))
            .map(|m| self.describe(m))
            .collect())
    }

    /// php.ini used by the active interpreter. `NotFound` if none is active.
    pub fn active_ini_path(&self, scope: &Scope) -> Result<PathBuf> {
        let handler = self.require_active(scope)?;
        Ok(self.ini_path_for(&handler))
    }

    pub fn config_info(&self, scope: &Scope) -> Result<Option<PhpConfigInfo>> {
        let Some(handler) = self.active_handler(scope)? else {
            return Ok(None);
        };
        let executable = PathBuf::from(handler.processor_path());
        let ini_path = self.ini_path_for(&handler);
        let mut doc = self.open_ini(&ini_path)?;
        let error_log = doc.directive("error_log").map(|d| d.value().to_string());
        let extensions = doc.extensions();

        Ok(Some(PhpConfigInfo {
            version: self.probe_version(&executable),
            installed_extensions: extensions.list().len(),
            enabled_extensions: extensions.enabled_count(),
            handler_name: handler.name,
            executable,
            ini_path,
            error_log,
        }))
    }

    pub fn settings(&self, scope: &Scope) -> Result<Vec<Directive>> {
        let mut doc = self.open_active_ini(scope)?;
        Ok(doc.directives().iter().cloned().collect())
    }

    pub fn add_or_update_settings(&self, scope: &Scope, updates: &[DirectiveUpdate]) -> Result<()> {
        let mut doc = self.open_active_ini(scope)?;
        doc.directives().add_or_update(updates);
        doc.save(self.fs)
    }

    /// Remove the exact `(name, value, section)` directive. Returns whether
    /// one was found; the file is only rewritten when it was.
    pub fn remove_setting(
        &self,
        scope: &Scope,
        name: &str,
        value: &str,
        section: &str,
    ) -> Result<bool> {
        let mut doc = self.open_active_ini(scope)?;
        if !doc.directives().remove(name, value, section) {
            return Ok(false);
        }
        doc.save(self.fs)?;
        Ok(true)
    }

    pub fn extensions(&self, scope: &Scope) -> Result<Vec<ExtensionRef>> {
        let mut doc = self.open_active_ini(scope)?;
        Ok(doc.extensions().list().into_iter().cloned().collect())
    }

    pub fn update_extensions(&self, scope: &Scope, updates: &[ExtensionUpdate]) -> Result<()> {
        let mut doc = self.open_active_ini(scope)?;
        doc.extensions().update(updates);
        doc.save(self.fs)
    }

    fn require_active(&self, scope: &Scope) -> Result<HandlerMapping> {
        self.active_handler(scope)?.ok_or_else(|| {
            ManagerError::NotFound(format!("no PHP handler is active at {}", scope))
        })
    }

    fn open_active_ini(&self, scope: &Scope) -> Result<IniDocument> {
        let ini_path = self.active_ini_path(scope)?;
        self.open_ini(&ini_path)
    }

    fn open_ini(&self, ini_path: &Path) -> Result<IniDocument> {
        IniDocument::open(self.fs, self.env, ini_path, &self.config)
    }

    fn fastcgi_app_for(&self, handler: &HandlerMapping) -> Option<&FastCgiApplication> {
        self.store
            .fastcgi_applications()
            .iter()
            .find(|app| app.matches(handler.processor_path(), handler.processor_arguments()))
    }

    fn ini_path_for(&self, handler: &HandlerMapping) -> PathBuf {
        let dir = match self.fastcgi_app_for(handler).and_then(|app| app.env_var(PHPRC)) {
            Some(phprc) => self.env.expand_path(Path::new(phprc)),
            None => Path::new(handler.processor_path())
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        dir.join(&self.config.ini_file_name)
    }

    fn describe(&self, mapping: HandlerMapping) -> PhpVersion {
        let executable = PathBuf::from(mapping.processor_path());
        PhpVersion {
            version: self.probe_version(&executable),
            handler_name: mapping.name,
            executable,
        }
    }

    fn probe_version(&self, executable: &Path) -> Option<String> {
        match self.fs.read_version(executable) {
            Ok(version) => version,
            Err(e) => {
                debug!(executable = %executable.display(), error = %e, "cannot read version");
                None
            }
        }
    }
}
