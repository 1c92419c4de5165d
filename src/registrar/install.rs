//! Interpreter installation checks.

use crate::config::ManagerConfig;
use crate::error::{ManagerError, Result};
use crate::host::env::Environment;
use crate::host::fs::FileSystem;
use std::path::{Path, PathBuf};
use tracing::info;

/// A validated PHP installation directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhpInstall {
    pub directory: PathBuf,
    pub executable: PathBuf,
    pub extension_dir: PathBuf,
    pub ini_path: PathBuf,
}

impl PhpInstall {
    /// Check `dir` holds an interpreter, an extension directory and a php.ini.
    ///
    /// A missing php.ini is created from the first template found. Nothing is
    /// written unless the executable and extension checks pass.
    pub fn validate(
        fs: &dyn FileSystem,
        env: &dyn Environment,
        config: &ManagerConfig,
        dir: &Path,
    ) -> Result<Self> {
        let directory = env.expand_path(dir);

        let executable = config
            .executable_names
            .iter()
            .map(|name| directory.join(name))
            .find(|path| fs.file_exists(path))
            .ok_or_else(|| {
                ManagerError::InvalidArgument(format!(
                    "{} does not contain any of: {}",
                    directory.display(),
                    config.executable_names.join(", ")
                ))
            })?;

        let extension_dir = directory.join(&config.extension_subdir);
        if !fs.dir_exists(&extension_dir) {
            return Err(ManagerError::InvalidArgument(format!(
                "{} has no '{}' extension directory",
                directory.display(),
                config.extension_subdir
            )));
        }

        let ini_path = directory.join(&config.ini_file_name);
        if !fs.file_exists(&ini_path) {
            let template = config
                .ini_templates
                .iter()
                .map(|name| directory.join(name))
                .find(|path| fs.file_exists(path))
                .ok_or_else(|| {
                    ManagerError::InvalidArgument(format!(
                        "{} has no {} and no template to create it from",
                        directory.display(),
                        config.ini_file_name
                    ))
                })?;
            fs.copy_file(&template, &ini_path)
                .map_err(|e| ManagerError::io(&ini_path, e))?;
            info!(
                template = %template.display(),
                ini = %ini_path.display(),
                "created php.ini from template"
            );
        }

        Ok(Self {
            directory,
            executable,
            extension_dir,
            ini_path,
        })
    }

    /// Executable path as stored in the server configuration.
    pub fn executable_str(&self) -> String {
        self.executable.to_string_lossy().into_owned()
    }
}
