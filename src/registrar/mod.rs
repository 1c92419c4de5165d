//! PHP FastCGI registration.
//!
//! `register` runs a single forward pass:
//!
//! | Stage | Effect |
//! |-------|--------|
//! | ValidateInstall | interpreter, `ext` dir and php.ini present (php.ini may be templated) |
//! | EnsureFastCgiApp | FastCGI application for the executable exists |
//! | EnsureHandler | `*.php` mapping for the executable exists and is first |
//! | CommitConfig | server configuration persisted |
//! | ApplyBaselineIni | baseline directives and extensions written to php.ini |
//!
//! A failure up to and including `CommitConfig` discards the store's pending
//! mutations. If `ApplyBaselineIni` fails, the server configuration stays
//! committed; `RegistrationError::committed` reports it.

pub mod baseline;
pub mod install;
pub mod probe;
pub mod query;

pub use install::PhpInstall;
pub use query::{PhpConfigInfo, PhpVersion};

use crate::config::ManagerConfig;
use crate::error::{ErrorKind, ManagerError, Result};
use crate::host::env::Environment;
use crate::host::fs::FileSystem;
use crate::ini::IniDocument;
use crate::server::{
    ConfigurationStore, FastCgiApplication, HandlerMapping, HandlerRegistry, SchemaField, Scope,
    StderrMode,
};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Environment variable pointing the interpreter at its php.ini directory.
pub const PHPRC: &str = "PHPRC";
pub const PHP_FCGI_MAX_REQUESTS: &str = "PHP_FCGI_MAX_REQUESTS";
/// Version label used when the executable carries no version resource.
pub const UNKNOWN_VERSION: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStage {
    ValidateInstall,
    EnsureFastCgiApp,
    EnsureHandler,
    CommitConfig,
    ApplyBaselineIni,
}

impl RegistrationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidateInstall => "ValidateInstall",
            Self::EnsureFastCgiApp => "EnsureFastCgiApp",
            Self::EnsureHandler => "EnsureHandler",
            Self::CommitConfig => "CommitConfig",
            Self::ApplyBaselineIni => "ApplyBaselineIni",
        }
    }
}

impl fmt::Display for RegistrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("PHP registration failed at {stage}: {source}")]
pub struct RegistrationError {
    pub stage: RegistrationStage,
    /// Server configuration was already committed when the failure happened.
    pub committed: bool,
    #[source]
    pub source: ManagerError,
}

impl RegistrationError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

/// Outcome of a successful `register`.
#[derive(Debug, Clone)]
pub struct Registration {
    pub install: PhpInstall,
    pub handler: HandlerMapping,
    pub version: Option<String>,
    pub handler_created: bool,
    pub fastcgi_created: bool,
}

pub struct FastCgiRegistrar<'a> {
    store: &'a mut dyn ConfigurationStore,
    fs: &'a dyn FileSystem,
    env: &'a dyn Environment,
    config: ManagerConfig,
}

impl<'a> FastCgiRegistrar<'a> {
    pub fn new(
        store: &'a mut dyn ConfigurationStore,
        fs: &'a dyn FileSystem,
        env: &'a dyn Environment,
    ) -> Self {
        Self {
            store,
            fs,
            env,
            config: ManagerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    fn registry(&mut self, scope: &Scope) -> HandlerRegistry<'_> {
        HandlerRegistry::open(&mut *self.store, scope)
    }

    /// Register the interpreter in `install_dir` and make it active at `scope`.
    pub fn register(
        &mut self,
        install_dir: &Path,
        scope: &Scope,
    ) -> std::result::Result<Registration, RegistrationError> {
        info!(dir = %install_dir.display(), %scope, "registering PHP");
        let install = self
            .validate_install(install_dir)
            .map_err(failed(RegistrationStage::ValidateInstall, false))?;

        let staged = self.stage_and_commit(&install, scope);
        if let Err(e) = &staged {
            self.store.rollback();
            warn!(stage = %e.stage, "discarded pending configuration changes");
        }
        let (version, handler, handler_created, fastcgi_created) = staged?;

        self.apply_baseline_ini(&install, &handler.name)
            .map_err(failed(RegistrationStage::ApplyBaselineIni, true))?;

        info!(handler = %handler.name, %scope, "PHP registered");
        Ok(Registration {
            install,
            handler,
            version,
            handler_created,
            fastcgi_created,
        })
    }

    /// The store-mutating stages, ending with the commit.
    fn stage_and_commit(
        &mut self,
        install: &PhpInstall,
        scope: &Scope,
    ) -> std::result::Result<(Option<String>, HandlerMapping, bool, bool), RegistrationError> {
        let fastcgi_created = self.ensure_fastcgi_app(install);

        let version = self
            .read_version(&install.executable)
            .map_err(failed(RegistrationStage::EnsureHandler, false))?;
        let (handler, handler_created) = self
            .ensure_handler(scope, install, version.as_deref())
            .map_err(failed(RegistrationStage::EnsureHandler, false))?;

        self.commit()
            .map_err(failed(RegistrationStage::CommitConfig, false))?;
        Ok((version, handler, handler_created, fastcgi_created))
    }

    pub fn validate_install(&self, install_dir: &Path) -> Result<PhpInstall> {
        PhpInstall::validate(self.fs, self.env, &self.config, install_dir)
    }

    /// Create the FastCGI application for the executable unless it exists.
    /// Returns whether one was created.
    pub fn ensure_fastcgi_app(&mut self, install: &PhpInstall) -> bool {
        let executable = install.executable_str();
        if self
            .store
            .fastcgi_applications()
            .iter()
            .any(|app| app.matches(&executable, ""))
        {
            return false;
        }

        let mut app = FastCgiApplication::new(&executable, "");
        app.instance_max_requests = self.config.instance_max_requests;
        app.monitor_changes_to = install.ini_path.to_string_lossy().into_owned();
        app.environment_variables.insert(
            PHPRC.to_string(),
            install.directory.to_string_lossy().into_owned(),
        );
        app.environment_variables.insert(
            PHP_FCGI_MAX_REQUESTS.to_string(),
            self.config.php_fcgi_max_requests.to_string(),
        );
        if self.store.has_field(SchemaField::FastCgiStderrMode) {
            app.stderr_mode = Some(StderrMode::default());
        }
        if self.store.has_field(SchemaField::FastCgiSignalBeforeTerminate) {
            app.signal_before_terminate_seconds = Some(0);
        }

        self.store.fastcgi_applications_mut().push(app);
        info!(executable = %executable, "created FastCGI application");
        true
    }

    /// Make the `*.php` mapping for the executable first at `scope`,
    /// creating it if needed. Returns the mapping and whether it was created.
    pub fn ensure_handler(
        &mut self,
        scope: &Scope,
        install: &PhpInstall,
        version: Option<&str>,
    ) -> Result<(HandlerMapping, bool)> {
        let executable = install.executable_str();
        let handler_path = self.config.handler_path.clone();
        let prefix = self.config.handler_name_prefix.clone();
        let module = self.config.handler_module.clone();

        let mut registry = self.registry(scope);
        match registry.find_by_path_and_processor(&handler_path, &executable)? {
            Some(existing) => {
                let active = registry.activate(&existing.name)?;
                Ok((active, false))
            }
            None => {
                let template = HandlerMapping::fastcgi("", &handler_path, &executable, &module);
                let created =
                    registry.ensure(template, &prefix, version.unwrap_or(UNKNOWN_VERSION))?;
                Ok((created, true))
            }
        }
    }

    pub fn commit(&mut self) -> Result<()> {
        self.store.commit().map_err(ManagerError::CommitFailed)
    }

    /// Apply baseline directives and extensions to the installation's php.ini.
    pub fn apply_baseline_ini(&self, install: &PhpInstall, handler_name: &str) -> Result<()> {
        let mut doc = IniDocument::open(self.fs, self.env, &install.ini_path, &self.config)?;
        let directives = baseline::directive_updates(&self.config, self.env, install, handler_name);
        let extensions = baseline::extension_updates(&self.config);
        doc.directives().add_or_update(&directives);
        doc.extensions().update(&extensions);
        doc.save(self.fs)?;
        info!(ini = %install.ini_path.display(), "applied baseline php.ini settings");
        Ok(())
    }

    /// Activate the mapping called `handler_name` at `scope` and commit.
    /// Pending changes are discarded if either step fails.
    pub fn select_version(&mut self, scope: &Scope, handler_name: &str) -> Result<HandlerMapping> {
        let activated = self.registry(scope).activate(handler_name);
        let selected = activated.and_then(|active| self.commit().map(|()| active));
        if selected.is_err() {
            self.store.rollback();
        }
        selected
    }

    /// Write a randomly named php-info page into `dir`.
    pub fn create_probe_file(&self, dir: &Path) -> Result<PathBuf> {
        probe::create_probe_file(self.fs, dir)
    }

    pub fn remove_probe_file(&self, path: &Path) -> Result<()> {
        probe::remove_probe_file(self.fs, path)
    }

    fn read_version(&self, executable: &Path) -> Result<Option<String>> {
        let version = self
            .fs
            .read_version(executable)
            .map_err(|e| ManagerError::io(executable, e))?;
        if version.is_none() {
            warn!(executable = %executable.display(), "no product version resource");
        }
        Ok(version)
    }
}

fn failed(stage: RegistrationStage, committed: bool) -> impl Fn(ManagerError) -> RegistrationError {
    move |source| RegistrationError {
        stage,
        committed,
        source,
    }
}
