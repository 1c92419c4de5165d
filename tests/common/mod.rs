//! Common test helpers for php-manager integration tests
//!
//! Builds throwaway PHP installation directories under a temp dir and the
//! server-side fixtures (stores, environments) the registrar runs against.

#![allow(dead_code)]

use php_manager::host::FixedEnvironment;
use php_manager::server::{ConfigState, HandlerMapping, MemoryStore};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

pub const SITE: &str = "Default Web Site";

fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

/// Bytes of a fake `php-cgi.exe`, with a `ProductVersion` resource when
/// `version` is given.
pub fn fake_executable(version: Option<&str>) -> Vec<u8> {
    let mut bytes = b"MZ\x90\x00\x03\x00test interpreter".to_vec();
    if let Some(version) = version {
        bytes.extend(utf16le("ProductVersion"));
        bytes.extend([0, 0, 0, 0]);
        bytes.extend(utf16le(version));
        bytes.extend([0, 0]);
    }
    bytes
}

/// A PHP installation laid out the way the Windows zip distribution is.
pub struct TestInstall {
    dir: TempDir,
}

impl TestInstall {
    /// `php-cgi.exe`, an `ext` directory holding `extensions`, and `php.ini`
    /// with `ini` as content.
    pub fn new(version: Option<&str>, ini: Option<&str>, extensions: &[&str]) -> Self {
        let dir = tempdir().expect("temp dir");
        fs::write(dir.path().join("php-cgi.exe"), fake_executable(version)).expect("write exe");
        fs::create_dir(dir.path().join("ext")).expect("create ext");
        for name in extensions {
            fs::write(dir.path().join("ext").join(name), b"MZ").expect("write extension");
        }
        if let Some(ini) = ini {
            fs::write(dir.path().join("php.ini"), ini).expect("write php.ini");
        }
        Self { dir }
    }

    pub fn standard(version: &str) -> Self {
        Self::new(
            Some(version),
            Some("[PHP]\nengine = On\n"),
            &["php_curl.dll", "php_gd2.dll", "php_mysql.dll", "php_xsl.dll"],
        )
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn executable(&self) -> PathBuf {
        self.dir.path().join("php-cgi.exe")
    }

    pub fn executable_str(&self) -> String {
        self.executable().to_string_lossy().into_owned()
    }

    pub fn ini_path(&self) -> PathBuf {
        self.dir.path().join("php.ini")
    }

    pub fn read_ini(&self) -> String {
        fs::read_to_string(self.ini_path()).expect("read php.ini")
    }

    pub fn write_file(&self, name: &str, content: &str) {
        fs::write(self.dir.path().join(name), content).expect("write file");
    }
}

pub fn test_env() -> FixedEnvironment {
    FixedEnvironment::new().with("WINDIR", "C:\\Windows")
}

/// A store with one site and `server_handlers` already committed.
pub fn store_with_site(server_handlers: Vec<HandlerMapping>) -> MemoryStore {
    let mut state = ConfigState::default();
    state.sites.push(SITE.to_string());
    state.server_handlers.entries = server_handlers;
    MemoryStore::from_state(state)
}

pub fn static_file_handler() -> HandlerMapping {
    HandlerMapping::fastcgi("StaticFile", "*", "", "StaticFileModule")
}

pub fn handler_names(mappings: &[HandlerMapping]) -> Vec<String> {
    mappings.iter().map(|m| m.name.clone()).collect()
}
