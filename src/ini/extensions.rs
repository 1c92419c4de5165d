//! Extension enable/disable view over a document's entries.

use super::entry::{ExtensionRef, IniEntry, LineEnding, SectionHeader};
use super::key::Key;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionUpdate {
    pub name: String,
    pub enabled: bool,
}

impl ExtensionUpdate {
    pub fn enable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }

    pub fn disable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: false,
        }
    }
}

pub struct Extensions<'a> {
    entries: &'a mut Vec<IniEntry>,
    discovered: &'a [ExtensionRef],
    line_ending: LineEnding,
}

impl<'a> Extensions<'a> {
    pub(crate) fn new(
        entries: &'a mut Vec<IniEntry>,
        discovered: &'a [ExtensionRef],
        line_ending: LineEnding,
    ) -> Self {
        Self {
            entries,
            discovered,
            line_ending,
        }
    }

    fn position(&self, key: &Key) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.as_extension().is_some_and(|ext| ext.key() == key))
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionRef> {
        let key = Key::new(name);
        match self.position(&key) {
            Some(index) => self.entries[index].as_extension(),
            None => self.discovered.iter().find(|ext| *ext.key() == key),
        }
    }

    /// Listed extensions in document order, then on-disk-only ones.
    pub fn list(&self) -> Vec<&ExtensionRef> {
        let mut listed: Vec<&ExtensionRef> = self
            .entries
            .iter()
            .filter_map(IniEntry::as_extension)
            .collect();
        let on_disk: Vec<&ExtensionRef> = self
            .discovered
            .iter()
            .filter(|ext| !listed.iter().any(|l| l.key() == ext.key()))
            .collect();
        listed.extend(on_disk);
        listed
    }

    pub fn enabled_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.as_extension().is_some())
            .count()
    }

    pub fn update(&mut self, updates: &[ExtensionUpdate]) {
        for update in updates {
            self.apply(update);
        }
    }

    fn apply(&mut self, update: &ExtensionUpdate) {
        let key = Key::new(&update.name);
        match (self.position(&key), update.enabled) {
            (Some(_), false) => {
                // Every line loading the module goes, each with its own header.
                let mut removed = 0;
                while let Some(index) = self.position(&key) {
                    self.remove_line(index);
                    removed += 1;
                }
                debug!(extension = %update.name, lines = removed, "disabled extension");
            }
            (None, true) => {
                // Keep the on-disk spelling when the module was discovered.
                let file_name = self
                    .discovered
                    .iter()
                    .find(|ext| *ext.key() == key)
                    .map(|ext| ext.file_name().to_string())
                    .unwrap_or_else(|| update.name.clone());
                let ext = ExtensionRef::enabled(&file_name);
                let header = SectionHeader::new(&ext.section_name());
                self.entries
                    .push(IniEntry::Section(header).terminated(self.line_ending));
                self.entries
                    .push(IniEntry::Extension(ext).terminated(self.line_ending));
                debug!(extension = %file_name, "enabled extension");
            }
            (Some(_), true) | (None, false) => {}
        }
    }

    /// Drop the `extension=` line at `index`, plus the header right above it
    /// when that header is the module's own `[NAME]`.
    fn remove_line(&mut self, index: usize) {
        let header = match &self.entries[index] {
            IniEntry::Extension(ext) => format!("[{}]", ext.section_name()),
            _ => return,
        };
        self.entries.remove(index);
        let owns_header = index > 0
            && matches!(&self.entries[index - 1], IniEntry::Section(h) if h.text() == header);
        if owns_header {
            self.entries.remove(index - 1);
        }
    }
}
