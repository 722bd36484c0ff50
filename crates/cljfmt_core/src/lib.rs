//! Provide the shared Clojure reader vocabulary and indentation tables used by the cljfmt scanner, parser, and
//! printer.
//!
//! This crate is intentionally small and dependency-free. It contains deterministic lookups that both:
//! - the scanner/parser use to classify characters and decode character literals, and
//! - the printer uses to pick an indentation style for a list form.
//!
//! ## Notes
//!
//! - This is a "vocabulary" crate: **no IO**, no global mutable state, and no tree types.
//! - The default tables are `static` slices. Per-invocation customization always builds a fresh copy; nothing here
//!   is ever mutated.

pub mod chars;
pub mod indent;

pub use indent::{IndentStyle, ThreadFirstStyle};

/// Structural and quoting characters that terminate a symbol, keyword, or number.
///
/// ## Notes
/// - Whitespace and `,` also terminate symbols; see [`is_symbol_char`].
pub const DELIMITERS: &[char] = &['"', ';', '@', '^', '~', '(', ')', '[', ']', '{', '}', '\\'];

/// Return whether `c` is whitespace to the Clojure reader.
///
/// Commas are whitespace in Clojure. Newlines are whitespace too; the scanner special-cases them before asking.
///
/// ## Examples
/// ```rust
/// use cljfmt_core::is_whitespace;
///
/// assert!(is_whitespace(','));
/// assert!(is_whitespace('\r'));
/// assert!(!is_whitespace('a'));
/// ```
pub fn is_whitespace(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

/// Return whether `c` may appear inside a symbol, keyword, or number token.
///
/// A symbol character is any rune that is not whitespace, not a comma, and not one of [`DELIMITERS`].
///
/// ## Examples
/// ```rust
/// use cljfmt_core::is_symbol_char;
///
/// assert!(is_symbol_char('%'));
/// assert!(is_symbol_char('#'));
/// assert!(!is_symbol_char('('));
/// assert!(!is_symbol_char(','));
/// ```
pub fn is_symbol_char(c: char) -> bool {
    !is_whitespace(c) && !DELIMITERS.contains(&c)
}

/// Return the part of a possibly-qualified symbol after the last `/`.
///
/// ## Notes
/// - The bare `/` symbol (division) is its own name.
///
/// ## Examples
/// ```rust
/// use cljfmt_core::symbol_name;
///
/// assert_eq!(symbol_name("clojure.core/let"), "let");
/// assert_eq!(symbol_name("let"), "let");
/// assert_eq!(symbol_name("/"), "/");
/// ```
pub fn symbol_name(sym: &str) -> &str {
    match split_qualified(sym) {
        Some((_, name)) => name,
        None => sym,
    }
}

/// Split `ns/name` into its namespace and name parts.
///
/// Returns `None` for unqualified symbols (including the bare `/`).
///
/// ## Examples
/// ```rust
/// use cljfmt_core::split_qualified;
///
/// assert_eq!(split_qualified("str/join"), Some(("str", "join")));
/// assert_eq!(split_qualified("join"), None);
/// ```
pub fn split_qualified(sym: &str) -> Option<(&str, &str)> {
    match sym.strip_suffix("//") {
        Some(ns) if !ns.is_empty() => return Some((ns, "/")),
        _ => {}
    }
    let idx = sym.rfind('/')?;
    if idx == 0 {
        return None;
    }
    Some((&sym[..idx], &sym[idx + 1..]))
}
