//! Token types for the Clojure scanner.
//!
//! ## Notes
//! - `Token::text` is the exact source slice, delimiters included (`"foo"`, `\newline`, `#{`). The tree builder
//!   strips or decodes it.
//! - For `Error` tokens, `text` holds the error message instead.

use std::fmt;

use crate::diagnostics::SyntaxError;
use crate::node::Pos;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Kind of token produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,

    // ========== Single-character tokens ==========
    /// `'`
    Apostrophe,
    /// `@`
    AtSign,
    /// `` ` ``
    Backtick,
    /// `^`
    Circumflex,
    /// `{`
    LeftBrace,
    /// `[`
    LeftBracket,
    /// `(`
    LeftParen,
    /// `}`
    RightBrace,
    /// `]`
    RightBracket,
    /// `)`
    RightParen,
    /// `~`
    Tilde,
    Newline,

    // ========== Text-carrying tokens ==========
    /// `\c`, `\newline`, `\u00e9`, ...
    CharLiteral,
    /// `; foo` or `#! foo`, up to but excluding the line terminator.
    Comment,
    /// Any dispatch macro: `#{`, `#(`, `#"`, `#?`, `#?@`, `#:`, `#_`, `#'`, `#=`, `#^`. Never a tag.
    Dispatch,
    Keyword,
    /// Any run of symbol characters starting with a digit (or a sign and a digit). May be invalid.
    Number,
    /// A bare `#` introducing a tag literal.
    Octothorpe,
    String,
    /// Also covers fn-literal arguments (`%`, `%1`, `%&`).
    Symbol,

    Error,
}

impl TokenKind {
    /// Whether tokens of this kind carry meaningful text beyond their kind.
    pub fn has_text(self) -> bool {
        matches!(
            self,
            TokenKind::CharLiteral
                | TokenKind::Comment
                | TokenKind::Dispatch
                | TokenKind::Error
                | TokenKind::Keyword
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::Symbol
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "eof",
            TokenKind::Apostrophe => "apostrophe",
            TokenKind::AtSign => "at-sign",
            TokenKind::Backtick => "backtick",
            TokenKind::Circumflex => "circumflex",
            TokenKind::LeftBrace => "left-brace",
            TokenKind::LeftBracket => "left-bracket",
            TokenKind::LeftParen => "left-paren",
            TokenKind::RightBrace => "right-brace",
            TokenKind::RightBracket => "right-bracket",
            TokenKind::RightParen => "right-paren",
            TokenKind::Tilde => "tilde",
            TokenKind::Newline => "newline",
            TokenKind::CharLiteral => "char-literal",
            TokenKind::Comment => "comment",
            TokenKind::Dispatch => "dispatch",
            TokenKind::Keyword => "keyword",
            TokenKind::Number => "number",
            TokenKind::Octothorpe => "octothorpe",
            TokenKind::String => "string",
            TokenKind::Symbol => "symbol",
            TokenKind::Error => "error",
        };
        f.write_str(name)
    }
}

/// A token with its starting position and source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Pos,
    pub text: String,
}

impl Token {
    /// Construct a new token.
    pub fn new(kind: TokenKind, pos: Pos, text: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            text: text.into(),
        }
    }

    /// Convert an `Error` token into the scanner error it describes.
    pub fn into_error(self) -> SyntaxError {
        SyntaxError::lex(self.pos, self.text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.has_text() {
            write!(f, "<{}@{}>({:?})", self.kind, self.pos, self.text)
        } else {
            write!(f, "<{}@{}>", self.kind, self.pos)
        }
    }
}
