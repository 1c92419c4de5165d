//! php.ini document model: parse, inspect, mutate, serialize.

use super::directives::{self, Directives};
use super::entry::{ExtensionRef, IniEntry, LineEnding, unquote};
use super::extensions::Extensions;
use super::key::Key;
use crate::config::ManagerConfig;
use crate::error::{ManagerError, Result};
use crate::host::env::Environment;
use crate::host::fs::FileSystem;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directive naming the extension module directory.
pub const EXTENSION_DIR_DIRECTIVE: &str = "extension_dir";

/// In-memory php.ini.
///
/// The raw entry sequence is the single source of truth; directive and
/// extension views borrow it mutably and edit it in place. A document is
/// meant to live for one read-mutate-save cycle only.
#[derive(Debug, Clone, Default)]
pub struct IniDocument {
    entries: Vec<IniEntry>,
    /// Modules found on disk with no `extension=` line. Never serialized.
    discovered: Vec<ExtensionRef>,
    line_ending: LineEnding,
    trailing_newline: bool,
    path: Option<PathBuf>,
}

impl IniDocument {
    /// Parse php.ini text. Never fails: unrecognized lines are kept as `Blank`.
    ///
    /// Each line keeps its own terminator. The majority style is only used
    /// for lines inserted later.
    pub fn parse(text: &str) -> Self {
        let breaks = text.matches('\n').count();
        let crlf = text.matches("\r\n").count();
        let line_ending = if crlf * 2 > breaks {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        };
        let mut doc = IniDocument {
            line_ending,
            trailing_newline: text.is_empty() || text.ends_with('\n'),
            ..Default::default()
        };
        if text.is_empty() {
            return doc;
        }

        let body = text.strip_suffix('\n').unwrap_or(text);
        let mut section = String::new();
        let mut seen: HashSet<(Key, Key)> = HashSet::new();

        for line in body.split('\n') {
            let entry = IniEntry::classify(line, &section);
            match &entry {
                IniEntry::Section(header) => section = header.name().to_string(),
                IniEntry::Directive(directive) => {
                    let identity = (directive.key().clone(), directive.section_key().clone());
                    if !seen.insert(identity) {
                        warn!(
                            directive = directive.name(),
                            section = directive.section(),
                            "duplicate php.ini directive, first occurrence is authoritative"
                        );
                    }
                }
                _ => {}
            }
            doc.entries.push(entry);
        }

        // An unterminated last line is stored as if it ended in the majority
        // style so lines appended after it get a matching separator.
        if !doc.trailing_newline {
            if let Some(last) = doc.entries.pop() {
                doc.entries.push(last.terminated(line_ending));
            }
        }

        debug!(lines = doc.entries.len(), "parsed php.ini");
        doc
    }

    /// Read and parse the file at `path`. Fails with `NotFound` if it is missing.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let text = fs
            .read_text(path)
            .map_err(|e| ManagerError::io(path, e))?;
        let mut doc = Self::parse(&text);
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// `load`, then reconcile against the effective extension directory.
    pub fn open(
        fs: &dyn FileSystem,
        env: &dyn Environment,
        path: &Path,
        config: &ManagerConfig,
    ) -> Result<Self> {
        let mut doc = Self::load(fs, path)?;
        if let Some(dir) = doc.extension_dir(env, &config.extension_subdir) {
            doc.reconcile_extension_directory(fs, &dir, &config.extension_glob);
        }
        Ok(doc)
    }

    /// Write the document back over the file it was loaded from.
    pub fn save(&self, fs: &dyn FileSystem) -> Result<()> {
        let path = self.path.as_deref().ok_or_else(|| {
            ManagerError::InvalidArgument("document was not loaded from a file".to_string())
        })?;
        self.save_to(fs, path)
    }

    pub fn save_to(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        fs.write_text(path, &self.serialize())
            .map_err(|e| ManagerError::io(path, e))?;
        debug!(path = %path.display(), "saved php.ini");
        Ok(())
    }

    /// Join every entry's line text in current order.
    pub fn serialize(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let mut out = self
            .entries
            .iter()
            .map(IniEntry::raw)
            .collect::<Vec<_>>()
            .join("\n");
        if self.trailing_newline {
            out.push('\n');
        } else if self.line_ending == LineEnding::CrLf && out.ends_with('\r') {
            out.pop();
        }
        out
    }

    /// Add every module matching `pattern` in `dir` that the document does not
    /// list yet, as a disabled extension. Returns how many were added.
    ///
    /// An unreadable directory is logged and leaves the view unchanged.
    pub fn reconcile_extension_directory(
        &mut self,
        fs: &dyn FileSystem,
        dir: &Path,
        pattern: &str,
    ) -> usize {
        let files = match fs.list_files(dir, pattern) {
            Ok(files) => files,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "cannot scan extension directory");
                return 0;
            }
        };

        let mut added = 0;
        for file in files {
            let key = Key::new(&file);
            let listed = self
                .entries
                .iter()
                .filter_map(IniEntry::as_extension)
                .any(|ext| *ext.key() == key);
            let known = self.discovered.iter().any(|ext| *ext.key() == key);
            if !listed && !known {
                self.discovered.push(ExtensionRef::discovered(&file));
                added += 1;
            }
        }
        debug!(dir = %dir.display(), added, "reconciled extension directory");
        added
    }

    /// Effective extension directory.
    ///
    /// Falls back to `<ini dir>/<default_subdir>` when `extension_dir` is
    /// absent, empty, or the relative token `./`.
    pub fn extension_dir(&self, env: &dyn Environment, default_subdir: &str) -> Option<PathBuf> {
        let configured = self
            .directive(EXTENSION_DIR_DIRECTIVE)
            .map(|d| unquote(d.value()).to_string());
        match configured {
            Some(dir) if !dir.is_empty() && dir != "./" => Some(PathBuf::from(env.expand(&dir))),
            _ => self
                .path
                .as_deref()
                .and_then(Path::parent)
                .map(|parent| parent.join(default_subdir)),
        }
    }

    pub fn entries(&self) -> &[IniEntry] {
        &self.entries
    }

    pub fn discovered(&self) -> &[ExtensionRef] {
        &self.discovered
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Read-only directive lookup, same resolution as `Directives::get`.
    pub fn directive(&self, name: &str) -> Option<&super::entry::Directive> {
        directives::find(&self.entries, name).and_then(|i| self.entries[i].as_directive())
    }

    pub fn directives(&mut self) -> Directives<'_> {
        Directives::new(&mut self.entries, self.line_ending)
    }

    pub fn extensions(&mut self) -> Extensions<'_> {
        Extensions::new(&mut self.entries, &self.discovered, self.line_ending)
    }
}
