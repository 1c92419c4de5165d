//! Request handler mappings.

use crate::ini::Key;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResourceType {
    File,
    Directory,
    #[default]
    Either,
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RequireAccess {
    None,
    Read,
    Write,
    #[default]
    Script,
    Execute,
}

/// One routing rule. Precedence is positional: the first mapping whose
/// `path` matches a request wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerMapping {
    pub name: String,
    /// Request path pattern, e.g. `*.php`.
    pub path: String,
    pub verb: String,
    /// Executable path, optionally followed by `|arguments`.
    pub script_processor: String,
    pub modules: String,
    pub resource_type: ResourceType,
    pub require_access: RequireAccess,
    pub precondition: String,
}

impl HandlerMapping {
    /// A FastCGI mapping for every verb.
    pub fn fastcgi(name: &str, path: &str, script_processor: &str, module: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            verb: "*".to_string(),
            script_processor: script_processor.to_string(),
            modules: module.to_string(),
            resource_type: ResourceType::Either,
            require_access: RequireAccess::Script,
            precondition: String::new(),
        }
    }

    pub fn has_name(&self, name: &str) -> bool {
        Key::new(&self.name).matches(name)
    }

    pub fn matches_path(&self, path: &str) -> bool {
        Key::new(&self.path).matches(path)
    }

    pub fn matches_processor(&self, script_processor: &str) -> bool {
        Key::new(&self.script_processor).matches(script_processor)
    }

    /// Executable part of `script_processor`.
    pub fn processor_path(&self) -> &str {
        match self.script_processor.split_once('|') {
            Some((path, _)) => path,
            None => &self.script_processor,
        }
    }

    pub fn processor_arguments(&self) -> &str {
        match self.script_processor.split_once('|') {
            Some((_, args)) => args,
            None => "",
        }
    }
}
