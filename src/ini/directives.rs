//! Structured `name = value` view over a document's entries.
//!
//! Duplicate names resolve to the first occurrence in document order for
//! lookup, update and removal alike.

use super::entry::{Directive, IniEntry, LineEnding, SectionHeader};
use super::key::Key;
use serde::{Deserialize, Serialize};

/// One requested directive change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveUpdate {
    pub name: String,
    pub value: String,
    pub section: String,
}

impl DirectiveUpdate {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            section: section.into(),
        }
    }
}

/// Index of the first directive named `name`, ignoring section.
pub(crate) fn find(entries: &[IniEntry], name: &str) -> Option<usize> {
    let key = Key::new(name);
    entries
        .iter()
        .position(|entry| entry.as_directive().is_some_and(|d| *d.key() == key))
}

pub struct Directives<'a> {
    entries: &'a mut Vec<IniEntry>,
    line_ending: LineEnding,
}

impl<'a> Directives<'a> {
    pub(crate) fn new(entries: &'a mut Vec<IniEntry>, line_ending: LineEnding) -> Self {
        Self {
            entries,
            line_ending,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Directive> {
        find(self.entries.as_slice(), name).and_then(|i| self.entries[i].as_directive())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Directive> + '_ {
        self.entries.iter().filter_map(IniEntry::as_directive)
    }

    pub fn in_section(&self, section: &str) -> impl Iterator<Item = &Directive> + '_ {
        let key = Key::new(section);
        self.iter().filter(move |d| *d.section_key() == key)
    }

    /// Apply `updates` in order.
    ///
    /// An existing directive (matched by name only) is rewritten in place.
    /// A new one goes after the last directive of its section, after a bare
    /// header of that section, or at the end under a fresh header. Each
    /// update sees the insertions made by the ones before it.
    pub fn add_or_update(&mut self, updates: &[DirectiveUpdate]) {
        for update in updates {
            self.upsert(update);
        }
    }

    fn upsert(&mut self, update: &DirectiveUpdate) {
        if let Some(index) = find(self.entries.as_slice(), &update.name) {
            if let IniEntry::Directive(directive) = &mut self.entries[index] {
                directive.set_value(&update.value);
            }
            return;
        }

        let section_key = Key::new(&update.section);
        let ending = self.line_ending;
        let entry = IniEntry::Directive(Directive::new(
            &update.name,
            &update.value,
            &update.section,
        ))
        .terminated(ending);

        let last_in_section = self.entries.iter().rposition(|e| {
            e.as_directive()
                .is_some_and(|d| *d.section_key() == section_key)
        });
        if let Some(index) = last_in_section {
            self.entries.insert(index + 1, entry);
            return;
        }

        if section_key.is_empty() {
            // Default section lives above the first header.
            let at = self
                .entries
                .iter()
                .position(|e| e.as_section().is_some())
                .unwrap_or(self.entries.len());
            self.entries.insert(at, entry);
            return;
        }

        let header = self
            .entries
            .iter()
            .position(|e| e.as_section().is_some_and(|h| *h.key() == section_key));
        if let Some(index) = header {
            self.entries.insert(index + 1, entry);
            return;
        }

        self.entries
            .push(IniEntry::Blank(String::new()).terminated(ending));
        self.entries
            .push(IniEntry::Section(SectionHeader::new(&update.section)).terminated(ending));
        self.entries.push(entry);
    }

    /// Remove the first directive equal to `(name, value, section)`.
    /// Section headers are never removed.
    pub fn remove(&mut self, name: &str, value: &str, section: &str) -> bool {
        let index = self.entries.iter().position(|e| {
            e.as_directive()
                .is_some_and(|d| d.same_setting(name, value, section))
        });
        match index {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ini::IniDocument;

    #[test]
    fn test_update_in_place_keeps_line_count() {
        let text = "[PHP]\nengine = On\nmemory_limit = 64M\nmax_input_time = 60\n";
        let mut doc = IniDocument::parse(text);
        doc.directives()
            .add_or_update(&[DirectiveUpdate::new("memory_limit", "256M", "PHP")]);

        let out = doc.serialize();
        assert_eq!(out.lines().count(), text.lines().count());
        assert_eq!(out.lines().filter(|l| *l == "memory_limit = 256M").count(), 1);
        assert!(!out.contains("64M"));
    }

    #[test]
    fn test_update_matches_name_across_sections() {
        let mut doc = IniDocument::parse("[PHP]\ndisplay_errors = On\n[Other]\n");
        doc.directives()
            .add_or_update(&[DirectiveUpdate::new("DISPLAY_ERRORS", "Off", "Other")]);
        assert_eq!(doc.serialize(), "[PHP]\ndisplay_errors = Off\n[Other]\n");
    }

    #[test]
    fn test_new_section_appended_in_order() {
        let mut doc = IniDocument::parse("[PHP]\nengine = On\n");
        doc.directives().add_or_update(&[
            DirectiveUpdate::new("custom.one", "1", "Custom"),
            DirectiveUpdate::new("custom.two", "2", "Custom"),
        ]);
        assert_eq!(
            doc.serialize(),
            "[PHP]\nengine = On\n\n[Custom]\ncustom.one = 1\ncustom.two = 2\n"
        );
    }

    #[test]
    fn test_insert_after_last_directive_of_section() {
        let mut doc = IniDocument::parse(
            "[PHP]\nengine = On\nshort_open_tag = Off\n\n[Session]\nsession.name = SID\n",
        );
        doc.directives()
            .add_or_update(&[DirectiveUpdate::new("log_errors", "On", "php")]);
        assert_eq!(
            doc.serialize(),
            "[PHP]\nengine = On\nshort_open_tag = Off\nlog_errors = On\n\n\
             [Session]\nsession.name = SID\n"
        );
    }

    #[test]
    fn test_insert_under_existing_empty_header() {
        let mut doc = IniDocument::parse("[PHP]\nengine = On\n[Custom]\n; nothing yet\n");
        doc.directives()
            .add_or_update(&[DirectiveUpdate::new("custom.one", "1", "custom")]);
        assert_eq!(
            doc.serialize(),
            "[PHP]\nengine = On\n[Custom]\ncustom.one = 1\n; nothing yet\n"
        );
    }

    #[test]
    fn test_insert_into_default_section() {
        let mut doc = IniDocument::parse("; header\n[PHP]\nengine = On\n");
        doc.directives()
            .add_or_update(&[DirectiveUpdate::new("top", "1", "")]);
        assert_eq!(doc.serialize(), "; header\ntop = 1\n[PHP]\nengine = On\n");
    }

    #[test]
    fn test_get_returns_first_duplicate() {
        let mut doc = IniDocument::parse("[A]\nx = 1\n[B]\nx = 2\n");
        assert_eq!(doc.directives().get("X").unwrap().value(), "1");
        assert_eq!(doc.directive("x").unwrap().section(), "A");
        assert_eq!(doc.directives().in_section("b").count(), 1);
    }

    #[test]
    fn test_remove_requires_exact_setting() {
        let mut doc = IniDocument::parse("[PHP]\nengine = On\nlog_errors = On\n");
        assert!(!doc.directives().remove("engine", "Off", "PHP"));
        assert!(!doc.directives().remove("engine", "On", "Session"));
        assert!(doc.directives().remove("ENGINE", "on", "php"));
        assert_eq!(doc.serialize(), "[PHP]\nlog_errors = On\n");
    }
}
