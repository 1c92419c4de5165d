//! Canonical lookup keys.
//!
//! php.ini names, section names and extension file names all compare
//! case-insensitively. Every comparison goes through `Key` so there is exactly
//! one normalization rule.

use std::fmt;

/// Lower-cased, trimmed form of a name used for equality only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Key(String);

impl Key {
    pub fn new(name: &str) -> Self {
        Key(name.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive equality against a raw name.
    pub fn matches(&self, name: &str) -> bool {
        *self == Key::new(name)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::new(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_case_insensitive() {
        assert_eq!(Key::new("Memory_Limit"), Key::new("memory_limit"));
        assert!(Key::new("PHP_GD2.DLL").matches("php_gd2.dll"));
        assert!(!Key::new("PHP").matches("PHP2"));
    }
}
