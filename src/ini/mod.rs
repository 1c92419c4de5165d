//! php.ini document model.
//!
//! Lossless line-oriented parser with structured directive and extension
//! views. Unrecognized input is preserved, never rejected.

pub mod directives;
pub mod document;
pub mod entry;
pub mod extensions;
pub mod key;

pub use directives::{DirectiveUpdate, Directives};
pub use document::IniDocument;
pub use entry::{Directive, ExtensionRef, IniEntry, LineEnding, SectionHeader};
pub use extensions::{ExtensionUpdate, Extensions};
pub use key::Key;
