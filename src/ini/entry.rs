//! Line-level php.ini entries.
//!
//! Every entry keeps the literal text it was parsed from, including the `\r`
//! of a CRLF terminator. Serialization only ever writes that text back, so
//! untouched lines survive byte for byte.

use super::key::Key;

/// Name of the directive that loads an extension module.
pub const EXTENSION_DIRECTIVE: &str = "extension";

/// Terminator style given to lines the document inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IniEntry {
    /// `; ...`
    Comment(String),
    /// `[name]`
    Section(SectionHeader),
    /// `name = value`
    Directive(Directive),
    /// `extension=<file>`
    Extension(ExtensionRef),
    /// Anything else, including empty lines. Preserved verbatim.
    Blank(String),
}

impl IniEntry {
    /// Literal line text up to the `\n`. A CRLF line keeps its `\r`.
    pub fn raw(&self) -> &str {
        match self {
            IniEntry::Comment(raw) | IniEntry::Blank(raw) => raw,
            IniEntry::Section(header) => header.raw(),
            IniEntry::Directive(directive) => directive.raw(),
            IniEntry::Extension(ext) => ext.raw().unwrap_or_default(),
        }
    }

    /// Line text without any terminator.
    pub fn text(&self) -> &str {
        strip_cr(self.raw())
    }

    /// Give a freshly built entry the `\r` of a CRLF terminator.
    pub fn terminated(mut self, ending: LineEnding) -> Self {
        if ending == LineEnding::Lf {
            return self;
        }
        match &mut self {
            IniEntry::Comment(raw) | IniEntry::Blank(raw) => raw.push('\r'),
            IniEntry::Section(header) => header.raw.push('\r'),
            IniEntry::Directive(directive) => directive.raw.push('\r'),
            IniEntry::Extension(ext) => {
                if let Some(raw) = &mut ext.raw {
                    raw.push('\r');
                }
            }
        }
        self
    }

    pub fn as_directive(&self) -> Option<&Directive> {
        match self {
            IniEntry::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    pub fn as_extension(&self) -> Option<&ExtensionRef> {
        match self {
            IniEntry::Extension(ext) => Some(ext),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&SectionHeader> {
        match self {
            IniEntry::Section(header) => Some(header),
            _ => None,
        }
    }

    /// Classify one source line. `section` is the section in effect at this line.
    ///
    /// Never fails: lines that fit no known shape become `Blank`.
    pub fn classify(line: &str, section: &str) -> IniEntry {
        let trimmed = line.trim();

        if trimmed.starts_with(';') {
            return IniEntry::Comment(line.to_string());
        }

        if trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
            let name = trimmed[1..trimmed.len() - 1].trim();
            return IniEntry::Section(SectionHeader {
                raw: line.to_string(),
                name: name.to_string(),
                key: Key::new(name),
            });
        }

        let Some((name, value)) = trimmed.split_once('=') else {
            return IniEntry::Blank(line.to_string());
        };
        let name = name.trim();
        if name.is_empty() {
            return IniEntry::Blank(line.to_string());
        }

        if Key::new(name).matches(EXTENSION_DIRECTIVE) {
            let file_name = unquote(value.trim());
            if file_name.is_empty() {
                // `extension=` with nothing after it is unusable input.
                return IniEntry::Blank(line.to_string());
            }
            return IniEntry::Extension(ExtensionRef {
                key: Key::new(file_name),
                file_name: file_name.to_string(),
                enabled: true,
                raw: Some(line.to_string()),
            });
        }

        IniEntry::Directive(Directive {
            key: Key::new(name),
            section_key: Key::new(section),
            name: name.to_string(),
            value: value.trim().to_string(),
            section: section.to_string(),
            raw: line.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHeader {
    raw: String,
    name: String,
    key: Key,
}

impl SectionHeader {
    pub fn new(name: &str) -> Self {
        Self {
            raw: format!("[{}]", name),
            name: name.to_string(),
            key: Key::new(name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn text(&self) -> &str {
        strip_cr(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    name: String,
    value: String,
    section: String,
    raw: String,
    key: Key,
    section_key: Key,
}

impl Directive {
    pub fn new(name: &str, value: &str, section: &str) -> Self {
        Self {
            raw: format_directive(name, value),
            key: Key::new(name),
            section_key: Key::new(section),
            name: name.to_string(),
            value: value.to_string(),
            section: section.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn section_key(&self) -> &Key {
        &self.section_key
    }

    /// Replace the value and resynchronize the line text to `name = value`.
    /// The line keeps its terminator.
    pub fn set_value(&mut self, value: &str) {
        let crlf = self.raw.ends_with('\r');
        self.value = value.to_string();
        self.raw = format_directive(&self.name, &self.value);
        if crlf {
            self.raw.push('\r');
        }
    }

    /// Equality on `(name, value, section)`, all case-insensitive.
    pub fn same_setting(&self, name: &str, value: &str, section: &str) -> bool {
        self.key.matches(name)
            && self.section_key.matches(section)
            && Key::new(&self.value) == Key::new(value)
    }
}

/// An extension module, either listed in the document or only found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionRef {
    file_name: String,
    enabled: bool,
    raw: Option<String>,
    key: Key,
}

impl ExtensionRef {
    /// A new `extension=<file>` line.
    pub fn enabled(file_name: &str) -> Self {
        Self {
            raw: Some(format!("{}={}", EXTENSION_DIRECTIVE, file_name)),
            key: Key::new(file_name),
            file_name: file_name.to_string(),
            enabled: true,
        }
    }

    /// A module present in the extension directory with no backing line.
    pub fn discovered(file_name: &str) -> Self {
        Self {
            raw: None,
            key: Key::new(file_name),
            file_name: file_name.to_string(),
            enabled: false,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Conventional section header for this module: `php_gd2.dll` -> `GD2`.
    pub fn section_name(&self) -> String {
        let stem = match self.file_name.rfind('.') {
            Some(dot) if dot > 0 => &self.file_name[..dot],
            _ => self.file_name.as_str(),
        };
        let base = match stem.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("php_") && stem.len() > 4 => &stem[4..],
            _ => stem,
        };
        base.to_uppercase()
    }
}

fn strip_cr(raw: &str) -> &str {
    raw.strip_suffix('\r').unwrap_or(raw)
}

fn format_directive(name: &str, value: &str) -> String {
    format!("{} = {}", name, value)
}

pub(crate) fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .trim()
}
