//! Manager tunables.
//!
//! Defaults target a Windows/IIS host. Every field can be overridden from a
//! JSON document; missing fields keep their default.

use crate::error::{ManagerError, Result};
use crate::host::fs::FileSystem;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Interpreter executables, in preference order.
    pub executable_names: Vec<String>,
    pub ini_file_name: String,
    /// Copied to `ini_file_name` when it is missing; first found wins.
    pub ini_templates: Vec<String>,
    pub extension_subdir: String,
    pub extension_glob: String,
    pub handler_path: String,
    pub handler_module: String,
    pub handler_name_prefix: String,
    pub instance_max_requests: u32,
    pub php_fcgi_max_requests: u32,
    /// Section used for baseline directives that do not exist yet.
    pub baseline_section: String,
    /// Directive name -> value template.
    ///
    /// Templates may use `{install}`, `{ext_dir}`, `{handler}` and `%VAR%`.
    pub baseline_directives: IndexMap<String, String>,
    pub baseline_extensions: Vec<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        let baseline_directives = [
            ("extension_dir", "{ext_dir}"),
            ("log_errors", "On"),
            ("error_log", "%WINDIR%\\Temp\\{handler}_errors.log"),
            ("session.save_path", "%WINDIR%\\Temp\\"),
            ("cgi.force_redirect", "0"),
            ("cgi.fix_pathinfo", "1"),
            ("fastcgi.impersonate", "1"),
            ("fastcgi.logging", "0"),
            ("max_execution_time", "300"),
            ("display_errors", "Off"),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

        Self {
            executable_names: vec!["php-cgi.exe".to_string(), "php.exe".to_string()],
            ini_file_name: "php.ini".to_string(),
            ini_templates: vec![
                "php.ini-recommended".to_string(),
                "php.ini-production".to_string(),
            ],
            extension_subdir: "ext".to_string(),
            extension_glob: "php*.dll".to_string(),
            handler_path: "*.php".to_string(),
            handler_module: "FastCgiModule".to_string(),
            handler_name_prefix: "php-".to_string(),
            instance_max_requests: 10_000,
            php_fcgi_max_requests: 10_000,
            baseline_section: "PHP".to_string(),
            baseline_directives,
            baseline_extensions: vec![
                "php_curl.dll".to_string(),
                "php_gd2.dll".to_string(),
                "php_mysql.dll".to_string(),
            ],
        }
    }
}

impl ManagerConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ManagerError::Config(e.to_string()))
    }

    pub fn from_json_file(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let text = fs.read_text(path).map_err(|e| ManagerError::io(path, e))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ManagerConfig::from_json_str(
            r#"{ "extension_glob": "*.so", "executable_names": ["php-cgi"] }"#,
        )
        .unwrap();
        assert_eq!(config.extension_glob, "*.so");
        assert_eq!(config.executable_names, vec!["php-cgi".to_string()]);
        assert_eq!(config.handler_path, "*.php");
        assert_eq!(config.baseline_directives.len(), 10);
        assert_eq!(
            config.baseline_directives.get_index(0),
            Some((&"extension_dir".to_string(), &"{ext_dir}".to_string()))
        );
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = ManagerConfig::from_json_str("{ not json").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
