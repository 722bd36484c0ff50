//! Named character literals (`\newline`, `\space`, ...).
//!
//! The scanner only delimits a character literal; decoding the text after the backslash happens in the parser, which
//! consults [`from_name`] for the multi-rune spellings.

/// Metadata for one named character literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedChar {
    /// Spelling after the backslash, e.g. `"newline"`.
    pub name: &'static str,
    /// Decoded character.
    pub value: char,
}

/// Every named character literal the reader accepts.
pub const NAMED_CHARS: &[NamedChar] = &[
    NamedChar { name: "newline", value: '\n' },
    NamedChar { name: "space", value: ' ' },
    NamedChar { name: "tab", value: '\t' },
    NamedChar { name: "formfeed", value: '\u{0c}' },
    NamedChar { name: "backspace", value: '\u{08}' },
    NamedChar { name: "return", value: '\r' },
];

/// Resolve a named character literal.
///
/// ## Examples
/// ```rust
/// use cljfmt_core::chars;
///
/// assert_eq!(chars::from_name("space"), Some(' '));
/// assert_eq!(chars::from_name("Space"), None);
/// ```
pub fn from_name(name: &str) -> Option<char> {
    NAMED_CHARS.iter().find(|c| c.name == name).map(|c| c.value)
}
