//! Formatting configuration for cljfmt
//!
//! The default tables in `cljfmt_core::indent` are never mutated. A printer builds an [`IndentTable`] per invocation:
//! a fresh copy of the defaults with this config's overrides layered on top.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use cljfmt_core::indent::{DEFAULT_INDENTS, DEFAULT_THREAD_FIRSTS};
use cljfmt_core::{IndentStyle, ThreadFirstStyle};
use cljfmt_syntax::ParseOptions;

use super::transform::Transform;

/// Formatting configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// Character repeated to build indentation
    pub indent_char: char,
    /// Per-symbol indent styles, keyed by qualified (`ns/sym`) or bare name
    pub indent_overrides: BTreeMap<String, IndentStyle>,
    /// Per-symbol threading macro styles
    pub thread_first_overrides: BTreeMap<String, ThreadFirstStyle>,
    /// Tree transforms to run between parse and print
    pub transforms: BTreeSet<Transform>,
    /// How source is parsed before printing
    pub parse_options: ParseOptions,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_char: ' ',
            indent_overrides: BTreeMap::new(),
            thread_first_overrides: BTreeMap::new(),
            transforms: BTreeSet::new(),
            parse_options: ParseOptions::non_semantic(),
        }
    }
}

impl FormatConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation character
    pub fn with_indent_char(mut self, c: char) -> Self {
        self.indent_char = c;
        self
    }

    /// Override the indent style of one symbol
    pub fn with_indent_override(mut self, name: impl Into<String>, style: IndentStyle) -> Self {
        self.indent_overrides.insert(name.into(), style);
        self
    }

    /// Merge a batch of indent overrides; later entries win
    pub fn with_indent_overrides(mut self, overrides: impl IntoIterator<Item = (String, IndentStyle)>) -> Self {
        self.indent_overrides.extend(overrides);
        self
    }

    /// Override the threading style of one symbol
    pub fn with_thread_first_override(mut self, name: impl Into<String>, style: ThreadFirstStyle) -> Self {
        self.thread_first_overrides.insert(name.into(), style);
        self
    }

    /// Enable a transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transforms.insert(transform);
        self
    }

    /// Set the parse options used by the `format_source*` entry points
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }
}

/// Resolved symbol tables for one printer invocation.
#[derive(Debug, Clone)]
pub struct IndentTable {
    styles: HashMap<String, IndentStyle>,
    thread_firsts: HashMap<String, ThreadFirstStyle>,
}

impl IndentTable {
    /// Seed a fresh table from the defaults and layer `indent` and `thread_first` overrides on top.
    pub fn with_overrides(
        indent: &BTreeMap<String, IndentStyle>,
        thread_first: &BTreeMap<String, ThreadFirstStyle>,
    ) -> Self {
        let mut styles: HashMap<String, IndentStyle> =
            DEFAULT_INDENTS.iter().map(|e| (e.name.to_string(), e.style)).collect();
        styles.extend(indent.iter().map(|(k, v)| (k.clone(), *v)));

        let mut thread_firsts: HashMap<String, ThreadFirstStyle> =
            DEFAULT_THREAD_FIRSTS.iter().map(|e| (e.name.to_string(), e.style)).collect();
        thread_firsts.extend(thread_first.iter().map(|(k, v)| (k.clone(), *v)));

        Self { styles, thread_firsts }
    }

    /// Table for a config's overrides.
    pub fn for_config(config: &FormatConfig) -> Self {
        Self::with_overrides(&config.indent_overrides, &config.thread_first_overrides)
    }

    /// Exact lookup; no namespace resolution happens here.
    pub fn style(&self, name: &str) -> Option<IndentStyle> {
        self.styles.get(name).copied()
    }

    pub fn thread_first(&self, name: &str) -> Option<ThreadFirstStyle> {
        self.thread_firsts.get(name).copied()
    }
}

impl Default for IndentTable {
    fn default() -> Self {
        Self::with_overrides(&BTreeMap::new(), &BTreeMap::new())
    }
}
