//! Define the indentation-style vocabulary and the default per-symbol tables.
//!
//! This module is the single source of truth for which list forms get which indentation: a closed
//! [`IndentStyle`] enumeration plus the const [`DEFAULT_INDENTS`] table keyed by bare symbol name, and the
//! [`ThreadFirstStyle`] vocabulary for threading macros.
//!
//! ## Notes
//! - Lookup via [`default_indent`] is **exact** on the bare name. Qualified symbols are resolved by the printer,
//!   which strips or rewrites the namespace before consulting these tables.
//! - The tables are immutable. Printers that want overrides copy them into their own map first.
//!
//! ## Examples
//! ```rust
//! use cljfmt_core::indent::{self, IndentStyle};
//!
//! assert_eq!(indent::default_indent("defn"), Some(IndentStyle::ListBody));
//! assert_eq!(indent::default_indent("let"), Some(IndentStyle::Let));
//! assert_eq!(indent::prefix_indent("with-connection"), Some(IndentStyle::ListBody));
//! assert_eq!(indent::default_indent("println"), None);
//! ```

use std::fmt;

/// Indentation style for a sequence form.
///
/// The style decides where continuation lines of a sequence land:
///
/// ```text
/// Normal    [1        List      (foo bar     ListBody  (defn foo []
///            2]                      baz)                bar)
/// ```
///
/// `Let`, `Letfn`, `Deftype`, and `For` print their own list as `ListBody` and additionally mark nested forms
/// (binding vectors, function specs, method bodies). The `Cond*` styles are `ListBody` with paired arguments: the
/// second element of each pair gets two extra columns when it starts a line. The digit is the number of leading
/// unpaired arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndentStyle {
    Normal,
    List,
    ListBody,
    Let,
    Letfn,
    Deftype,
    For,
    Cond0,
    Cond1,
    Cond2,
}

impl IndentStyle {
    /// Every style, in declaration order.
    pub const ALL: &'static [IndentStyle] = &[
        IndentStyle::Normal,
        IndentStyle::List,
        IndentStyle::ListBody,
        IndentStyle::Let,
        IndentStyle::Letfn,
        IndentStyle::Deftype,
        IndentStyle::For,
        IndentStyle::Cond0,
        IndentStyle::Cond1,
        IndentStyle::Cond2,
    ];

    /// Resolve a `.cljfmt` style keyword such as `:list-body`.
    pub fn from_keyword(kw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_keyword() == kw)
    }

    /// The `.cljfmt` keyword spelling of this style.
    pub fn as_keyword(self) -> &'static str {
        match self {
            IndentStyle::Normal => ":normal",
            IndentStyle::List => ":list",
            IndentStyle::ListBody => ":list-body",
            IndentStyle::Let => ":let",
            IndentStyle::Letfn => ":letfn",
            IndentStyle::Deftype => ":deftype",
            IndentStyle::For => ":for",
            IndentStyle::Cond0 => ":cond0",
            IndentStyle::Cond1 => ":cond1",
            IndentStyle::Cond2 => ":cond2",
        }
    }

    /// Number of leading unpaired arguments for the cond family, `None` for every other style.
    pub fn cond_leading_args(self) -> Option<usize> {
        match self {
            IndentStyle::Cond0 => Some(0),
            IndentStyle::Cond1 => Some(1),
            IndentStyle::Cond2 => Some(2),
            _ => None,
        }
    }

    /// The style to use for a list that sits in a threaded position.
    ///
    /// Threading injects the first argument implicitly, so one leading argument disappears from the source.
    ///
    /// ```rust
    /// use cljfmt_core::IndentStyle;
    ///
    /// assert_eq!(IndentStyle::Cond2.thread_first(), IndentStyle::Cond1);
    /// assert_eq!(IndentStyle::Cond1.thread_first(), IndentStyle::Cond0);
    /// assert_eq!(IndentStyle::Cond0.thread_first(), IndentStyle::Cond0);
    /// assert_eq!(IndentStyle::List.thread_first(), IndentStyle::List);
    /// ```
    pub fn thread_first(self) -> Self {
        match self {
            IndentStyle::Cond2 => IndentStyle::Cond1,
            IndentStyle::Cond1 => IndentStyle::Cond0,
            other => other,
        }
    }
}

impl fmt::Display for IndentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_keyword())
    }
}

/// How a threading macro passes its value along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ThreadFirstStyle {
    /// `(-> x (f a) (g b))`: every form after the threaded value receives it.
    Normal,
    /// `(cond-> x test (f a))`: only the second form of each test/form pair receives it.
    CondArrow,
}

/// One row of the default indentation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentEntry {
    pub name: &'static str,
    pub style: IndentStyle,
}

const fn entry(name: &'static str, style: IndentStyle) -> IndentEntry {
    IndentEntry { name, style }
}

use IndentStyle::{Cond0, Cond1, Cond2, Deftype, For, Let, Letfn, ListBody};

/// Default indentation styles keyed by bare symbol name.
pub static DEFAULT_INDENTS: &[IndentEntry] = &[
    // Body forms
    entry("as->", ListBody),
    entry("bound-fn", ListBody),
    entry("catch", ListBody),
    entry("def", ListBody),
    entry("definline", ListBody),
    entry("defmacro", ListBody),
    entry("defmethod", ListBody),
    entry("defmulti", ListBody),
    entry("defn", ListBody),
    entry("defn-", ListBody),
    entry("defonce", ListBody),
    entry("defstruct", ListBody),
    entry("deftest", ListBody),
    entry("deftest-", ListBody),
    entry("doto", ListBody),
    entry("extend", ListBody),
    entry("fn", ListBody),
    entry("if", ListBody),
    entry("if-not", ListBody),
    entry("locking", ListBody),
    entry("ns", ListBody),
    entry("set-test", ListBody),
    entry("testing", ListBody),
    entry("when", ListBody),
    entry("when-not", ListBody),
    entry("while", ListBody),
    entry("with-bindings", ListBody),
    entry("with-in-str", ListBody),
    entry("with-precision", ListBody),
    entry("with-redefs-fn", ListBody),
    entry("with-test", ListBody),
    // Binding forms
    entry("binding", Let),
    entry("dotimes", Let),
    entry("if-let", Let),
    entry("if-some", Let),
    entry("let", Let),
    entry("loop", Let),
    entry("when-first", Let),
    entry("when-let", Let),
    entry("when-some", Let),
    entry("with-local-vars", Let),
    entry("with-open", Let),
    entry("with-redefs", Let),
    entry("doseq", For),
    entry("for", For),
    entry("letfn", Letfn),
    // Type definitions
    entry("definterface", Deftype),
    entry("defprotocol", Deftype),
    entry("defrecord", Deftype),
    entry("deftype", Deftype),
    entry("extend-protocol", Deftype),
    entry("extend-type", Deftype),
    entry("proxy", Deftype),
    entry("reify", Deftype),
    // Paired clauses
    entry("cond", Cond0),
    entry("assoc", Cond1),
    entry("case", Cond1),
    entry("cond->", Cond1),
    entry("cond->>", Cond1),
    entry("condp", Cond2),
];

/// Look up the default style for a bare symbol name.
pub fn default_indent(name: &str) -> Option<IndentStyle> {
    DEFAULT_INDENTS.iter().find(|e| e.name == name).map(|e| e.style)
}

/// Name prefixes that conventionally introduce body-taking macros.
pub const BODY_PREFIXES: &[&str] = &["def", "let", "with-", "when-"];

/// Heuristic style for names not found in any table.
///
/// Returns [`IndentStyle::ListBody`] for names starting with one of [`BODY_PREFIXES`].
pub fn prefix_indent(name: &str) -> Option<IndentStyle> {
    BODY_PREFIXES
        .iter()
        .any(|p| name.starts_with(p))
        .then_some(IndentStyle::ListBody)
}

/// One row of the default thread-first table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadFirstEntry {
    pub name: &'static str,
    pub style: ThreadFirstStyle,
}

/// Default threading macros keyed by bare symbol name.
pub static DEFAULT_THREAD_FIRSTS: &[ThreadFirstEntry] = &[
    ThreadFirstEntry { name: "->", style: ThreadFirstStyle::Normal },
    ThreadFirstEntry { name: "some->", style: ThreadFirstStyle::Normal },
    ThreadFirstEntry { name: "cond->", style: ThreadFirstStyle::CondArrow },
];

/// Look up the default thread-first style for a bare symbol name.
pub fn default_thread_first(name: &str) -> Option<ThreadFirstStyle> {
    DEFAULT_THREAD_FIRSTS
        .iter()
        .find(|e| e.name == name)
        .map(|e| e.style)
}
