//! `%NAME%` environment reference expansion.

use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static VAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%([A-Za-z_][A-Za-z0-9_()]*)%").expect("valid environment reference pattern")
});

pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;

    /// Substitute every known `%NAME%`; unknown references are left as written.
    fn expand(&self, raw: &str) -> String {
        VAR_REF
            .replace_all(raw, |caps: &Captures<'_>| {
                self.var(&caps[1]).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    fn expand_path(&self, raw: &Path) -> PathBuf {
        PathBuf::from(self.expand(&raw.to_string_lossy()))
    }
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// A fixed variable table. Names compare case-insensitively, as on Windows.
#[derive(Debug, Clone, Default)]
pub struct FixedEnvironment {
    vars: IndexMap<String, String>,
}

impl FixedEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_uppercase(), value.to_string());
    }
}

impl Environment for FixedEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(&name.to_uppercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_known_and_unknown() {
        let env = FixedEnvironment::new()
            .with("WINDIR", "C:\\Windows")
            .with("ProgramFiles(x86)", "C:\\PF86");
        assert_eq!(env.expand("%windir%\\Temp\\"), "C:\\Windows\\Temp\\");
        assert_eq!(env.expand("%ProgramFiles(x86)%\\PHP"), "C:\\PF86\\PHP");
        assert_eq!(env.expand("%MISSING%\\x"), "%MISSING%\\x");
        assert_eq!(env.expand("100% sure"), "100% sure");
    }
}
