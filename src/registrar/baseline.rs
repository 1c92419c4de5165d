//! Baseline php.ini tuning applied after registration.

use super::install::PhpInstall;
use crate::config::ManagerConfig;
use crate::host::env::Environment;
use crate::ini::{DirectiveUpdate, ExtensionUpdate};

/// Render the configured directive templates for one installation.
pub fn directive_updates(
    config: &ManagerConfig,
    env: &dyn Environment,
    install: &PhpInstall,
    handler_name: &str,
) -> Vec<DirectiveUpdate> {
    let directory = install.directory.to_string_lossy();
    let ext_dir = install.extension_dir.to_string_lossy();

    config
        .baseline_directives
        .iter()
        .map(|(name, template)| {
            let value = template
                .replace("{install}", &directory)
                .replace("{ext_dir}", &ext_dir)
                .replace("{handler}", handler_name);
            DirectiveUpdate::new(
                name.as_str(),
                env.expand(&value),
                config.baseline_section.as_str(),
            )
        })
        .collect()
}

pub fn extension_updates(config: &ManagerConfig) -> Vec<ExtensionUpdate> {
    config
        .baseline_extensions
        .iter()
        .map(|name| ExtensionUpdate::enable(name.as_str()))
        .collect()
}
