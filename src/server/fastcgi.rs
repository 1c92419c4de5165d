//! FastCGI application (worker pool) definitions.

use crate::ini::Key;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FastCgiProtocol {
    #[default]
    NamedPipe,
    Tcp,
}

/// What the host does with data the worker writes to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StderrMode {
    ReturnStderrIn500,
    ReturnGeneric500,
    #[default]
    IgnoreAndReturn200,
    TerminateProcess,
}

/// Identity is `(full_path, arguments)`, case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastCgiApplication {
    pub full_path: String,
    pub arguments: String,
    pub max_instances: u32,
    pub instance_max_requests: u32,
    pub idle_timeout: u32,
    pub activity_timeout: u32,
    pub request_timeout: u32,
    pub queue_length: u32,
    pub monitor_changes_to: String,
    pub environment_variables: IndexMap<String, String>,
    pub protocol: FastCgiProtocol,
    /// `None` when the host schema has no such field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_mode: Option<StderrMode>,
    /// `None` when the host schema has no such field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_before_terminate_seconds: Option<u32>,
}

impl FastCgiApplication {
    /// A definition with the host's stock limits.
    pub fn new(full_path: &str, arguments: &str) -> Self {
        Self {
            full_path: full_path.to_string(),
            arguments: arguments.to_string(),
            max_instances: 4,
            instance_max_requests: 200,
            idle_timeout: 300,
            activity_timeout: 30,
            request_timeout: 90,
            queue_length: 1000,
            monitor_changes_to: String::new(),
            environment_variables: IndexMap::new(),
            protocol: FastCgiProtocol::NamedPipe,
            stderr_mode: None,
            signal_before_terminate_seconds: None,
        }
    }

    pub fn matches(&self, full_path: &str, arguments: &str) -> bool {
        Key::new(&self.full_path).matches(full_path) && Key::new(&self.arguments).matches(arguments)
    }

    pub fn effective_stderr_mode(&self) -> StderrMode {
        self.stderr_mode.unwrap_or_default()
    }

    pub fn effective_signal_before_terminate_seconds(&self) -> u32 {
        self.signal_before_terminate_seconds.unwrap_or(0)
    }

    /// Environment variable value, name compared case-insensitively.
    pub fn env_var(&self, name: &str) -> Option<&str> {
        let key = Key::new(name);
        self.environment_variables
            .iter()
            .find(|(k, _)| Key::new(k) == key)
            .map(|(_, v)| v.as_str())
    }
}
