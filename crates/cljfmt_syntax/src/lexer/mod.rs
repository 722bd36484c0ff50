//! Scanner for Clojure source text
//!
//! Produces tokens on demand (pull-based) with one rune of pushback. Handles:
//! - Structural single-character tokens and explicit newline tokens
//! - Comments (`;` and `#!`), strings, character literals, keywords
//! - Permissive numbers (`3foo` is one malformed number, not two tokens)
//! - Reader dispatch (`#{`, `#(`, `#"`, `#?`, `#?@`, `#:`, `#_`, `#'`, `#=`, `#^`) and tag octothorpes
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token)

pub mod tokens;

use std::sync::Arc;

pub use tokens::{Token, TokenKind};

use crate::diagnostics::SyntaxError;
use crate::node::Pos;
use cljfmt_core::{is_symbol_char, is_whitespace};

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// [Outer] ──'#:'──→ [Keyword] ──keyword──→ [Outer]
//    │
//    └──EOF / error──→ [Done(token)]   (repeats the terminal token forever)
// ============================================================================

#[derive(Debug)]
enum State {
    Outer,
    /// The `#:` dispatch was just emitted; the namespace keyword follows.
    Keyword,
    Done(Token),
}

/// Byte offset plus line/column, without the source name.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    offset: usize,
    line: usize,
    col: usize,
}

/// Scanner for Clojure source code.
///
/// Call [`Lexer::next_token`] repeatedly; the stream ends with an `Eof` or `Error` token, after which every call
/// returns that same token again. As an [`Iterator`], the lexer yields the terminal token once and then stops.
pub struct Lexer<'a> {
    name: Arc<str>,
    source: &'a str,
    /// Position of the next unread character.
    cursor: Cursor,
    /// Position before the most recent `bump()`; `None` right after a `back()`.
    last: Option<Cursor>,
    /// Start of the token being scanned.
    start: Cursor,
    state: State,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer. `name` only appears in positions and error messages.
    pub fn new(name: &str, source: &'a str) -> Self {
        let origin = Cursor {
            offset: 0,
            line: 1,
            col: 1,
        };
        Self {
            name: Arc::from(name),
            source,
            cursor: origin,
            last: None,
            start: origin,
            state: State::Outer,
        }
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Token {
        loop {
            let tok = match &self.state {
                State::Done(tok) => return tok.clone(),
                State::Keyword => {
                    self.state = State::Outer;
                    self.lex_namespace_keyword()
                }
                State::Outer => match self.lex_outer() {
                    Some(tok) => tok,
                    None => continue,
                },
            };
            if matches!(tok.kind, TokenKind::Eof | TokenKind::Error) {
                tracing::trace!(token = %tok, "scanner finished");
                self.state = State::Done(tok.clone());
            }
            return tok;
        }
    }

    // ========================================================================
    // Character plumbing
    // ========================================================================

    fn pos_of(&self, at: Cursor) -> Pos {
        Pos {
            name: Arc::clone(&self.name),
            offset: at.offset,
            line: at.line,
            col: at.col,
        }
    }

    fn peek(&self) -> Option<char> {
        self.source[self.cursor.offset..].chars().next()
    }

    /// Consume one character.
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.last = Some(self.cursor);
        let width = c.len_utf8();
        self.cursor.offset += width;
        self.cursor.col += width;
        if c == '\n' {
            self.cursor.line += 1;
            self.cursor.col = 1;
        }
        Some(c)
    }

    /// Un-consume the character returned by the most recent `bump()`.
    fn back(&mut self) {
        match self.last.take() {
            Some(prev) => self.cursor = prev,
            None => unreachable!("back() not preceded by a bump()"),
        }
    }

    fn scan_while(&mut self, pred: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
    }

    /// Start the next token at the current position.
    fn mark(&mut self) {
        self.start = self.cursor;
    }

    /// Emit the text scanned since the last `mark()`.
    fn emit(&mut self, kind: TokenKind) -> Token {
        let text = &self.source[self.start.offset..self.cursor.offset];
        let tok = Token::new(kind, self.pos_of(self.start), text);
        self.mark();
        tok
    }

    /// Emit a token with explicit text at the token start, without moving the start.
    fn synth(&self, kind: TokenKind, text: &str) -> Token {
        Token::new(kind, self.pos_of(self.start), text)
    }

    fn error(&self, message: impl Into<String>) -> Token {
        Token::new(TokenKind::Error, self.pos_of(self.start), message)
    }

    // ========================================================================
    // States
    // ========================================================================

    /// Scan one token, or return `None` after skipping a run of whitespace.
    fn lex_outer(&mut self) -> Option<Token> {
        let Some(c) = self.bump() else {
            return Some(self.emit(TokenKind::Eof));
        };
        let tok = match c {
            ';' => self.lex_comment(),
            '"' => self.lex_string(),
            '\\' => self.lex_char_literal(),
            ':' => self.lex_run(TokenKind::Keyword),
            // Symbols may begin with %, e.g. fn-literal arguments.
            '%' => self.lex_run(TokenKind::Symbol),
            '#' => self.lex_dispatch(),
            '+' | '-' => match self.peek() {
                Some(d) if d.is_ascii_digit() => self.lex_run(TokenKind::Number),
                _ => self.lex_run(TokenKind::Symbol),
            },
            '\'' => self.emit(TokenKind::Apostrophe),
            '@' => self.emit(TokenKind::AtSign),
            '`' => self.emit(TokenKind::Backtick),
            '^' => self.emit(TokenKind::Circumflex),
            '{' => self.emit(TokenKind::LeftBrace),
            '[' => self.emit(TokenKind::LeftBracket),
            '(' => self.emit(TokenKind::LeftParen),
            '}' => self.emit(TokenKind::RightBrace),
            ']' => self.emit(TokenKind::RightBracket),
            ')' => self.emit(TokenKind::RightParen),
            '~' => self.emit(TokenKind::Tilde),
            '\n' => self.emit(TokenKind::Newline),
            c if is_whitespace(c) => {
                self.scan_while(|c| c != '\n' && is_whitespace(c));
                self.mark();
                return None;
            }
            c if c.is_ascii_digit() => self.lex_run(TokenKind::Number),
            c if is_symbol_char(c) => self.lex_run(TokenKind::Symbol),
            c => self.error(format!("unrecognized token starting with {c}")),
        };
        Some(tok)
    }

    /// Symbols, keywords, and numbers are all maximal runs of symbol characters.
    fn lex_run(&mut self, kind: TokenKind) -> Token {
        self.scan_while(is_symbol_char);
        self.emit(kind)
    }

    /// Comments stop before `\r` or `\n`; the terminator is scanned separately.
    fn lex_comment(&mut self) -> Token {
        self.scan_while(|c| c != '\r' && c != '\n');
        self.emit(TokenKind::Comment)
    }

    fn lex_string(&mut self) -> Token {
        let mut escaped = false;
        loop {
            match self.bump() {
                None => return self.error("reached EOF before string closing quote"),
                Some('"') if !escaped => return self.emit(TokenKind::String),
                Some('\\') => escaped = !escaped,
                Some(_) => escaped = false,
            }
        }
    }

    /// The scanner only delimits character literals; the parser decodes them.
    fn lex_char_literal(&mut self) -> Token {
        if self.bump().is_none() {
            return self.error("invalid character literal");
        }
        self.lex_run(TokenKind::CharLiteral)
    }

    /// Scan the keyword after `#:`, including its leading colon(s).
    fn lex_namespace_keyword(&mut self) -> Token {
        self.bump();
        self.lex_run(TokenKind::Keyword)
    }

    // ========================================================================
    // Dispatch
    // ------------------------------------------------------------------------
    // Whitespace matters here: `#foo` and `# foo` are both the tag `foo`, but
    // `# _` is the tag `_` while `#_` is the discard macro.
    //
    // - tag: emit a bare `#` and leave the symbol for the next token
    // - `#{` `#(` `#"`: two-char dispatch token, then the delimiter is rescanned
    //   ("#{1}" → "#{", "{", "1", "}")
    // - `#?` `#?@`: the following `(` is left for the next token
    // - `#:`: the namespace is scanned as a keyword, colon included
    //   ("#:foo{}" → "#:", ":foo", "{", "}")
    // - `#'` `#_` `#^` `#=`: two-char dispatch token
    // - `#!`: comment to end of line
    // - `#<`: unreadable, always an error
    // ========================================================================

    fn lex_dispatch(&mut self) -> Token {
        let Some(c) = self.bump() else {
            return self.emit(TokenKind::Octothorpe);
        };
        match c {
            '{' | '(' | '"' => {
                self.back();
                let tok = self.synth(TokenKind::Dispatch, &format!("#{c}"));
                self.mark();
                tok
            }
            '?' => {
                if self.peek() == Some('@') {
                    self.bump();
                }
                self.emit(TokenKind::Dispatch)
            }
            ':' => {
                self.back();
                let tok = self.synth(TokenKind::Dispatch, "#:");
                self.mark();
                self.state = State::Keyword;
                tok
            }
            '\'' | '_' | '^' | '=' => self.emit(TokenKind::Dispatch),
            '!' => self.lex_comment(),
            '<' => self.error("unreadable dispatch macro"),
            _ => {
                self.back();
                self.emit(TokenKind::Octothorpe)
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if matches!(self.state, State::Done(_)) {
            return None;
        }
        Some(self.next_token())
    }
}

/// Scan `source` into a token list. The list ends with the `Eof` token.
///
/// ## Parameters
/// - `name`: diagnostic source name, shown in error positions.
/// - `source`: Clojure source text.
///
/// ## Errors
/// Returns the first scan error; scanning never continues past one.
#[tracing::instrument(skip_all, fields(name = name, source_len = source.len()))]
pub fn lex(name: &str, source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    for tok in Lexer::new(name, source) {
        if tok.kind == TokenKind::Error {
            return Err(tok.into_error());
        }
        tokens.push(tok);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex("test", source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        lex("test", source)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Eof)
            .map(|t| t.text)
            .collect()
    }

    fn lex_err(source: &str) -> String {
        lex("test", source).unwrap_err().to_string()
    }

    // ========================================
    // Basic tokens
    // ========================================

    #[test]
    fn test_single_char_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("'@`^{[(}])~\n"),
            vec![
                Apostrophe,
                AtSign,
                Backtick,
                Circumflex,
                LeftBrace,
                LeftBracket,
                LeftParen,
                RightBrace,
                RightBracket,
                RightParen,
                Tilde,
                Newline,
                Eof
            ]
        );
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
        assert_eq!(kinds("  ,, \t"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_commas_are_whitespace() {
        assert_eq!(texts("[1,2 ,3]"), vec!["[", "1", "2", "3", "]"]);
    }

    #[test]
    fn test_symbols_keywords_numbers() {
        use TokenKind::*;
        assert_eq!(
            kinds("foo :bar 12 -3 + - %1 a%b%"),
            vec![Symbol, Keyword, Number, Number, Symbol, Symbol, Symbol, Symbol, Eof]
        );
        assert_eq!(texts(":100%>50% ::auto"), vec![":100%>50%", "::auto"]);
    }

    #[test]
    fn test_sign_at_eof_is_symbol() {
        let tokens = lex("test", "-").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Symbol);
        assert_eq!(tokens[0].text, "-");
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn test_number_is_permissive() {
        let tokens = lex("test", "(+ 3foo)").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Number);
        assert_eq!(tokens[2].text, "3foo");
        assert_eq!(texts("1.5e10 0x1F 22/7 1N"), vec!["1.5e10", "0x1F", "22/7", "1N"]);
    }

    // ========================================
    // Comments, strings, characters
    // ========================================

    #[test]
    fn test_comment_stops_before_cr() {
        let tokens = lex("test", "3;a\r4").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert_eq!(tokens[1].text, ";a");
        assert_eq!(tokens[2].kind, TokenKind::Number);
        assert_eq!(tokens[2].text, "4");
    }

    #[test]
    fn test_comment_leaves_newline() {
        assert_eq!(
            kinds("; hi\nx"),
            vec![TokenKind::Comment, TokenKind::Newline, TokenKind::Symbol, TokenKind::Eof]
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(texts(r#""a\"b""#), vec![r#""a\"b""#]);
        assert_eq!(texts(r#""a\\" b"#), vec![r#""a\\""#, "b"]);
        assert_eq!(texts("\"multi\nline\""), vec!["\"multi\nline\""]);
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(
            lex_err("(foo \"bar"),
            "lex error at test:1:6: reached EOF before string closing quote"
        );
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(
            texts(r"\a \newline \é \( \\"),
            vec![r"\a", r"\newline", r"\é", r"\(", r"\\"]
        );
        let tokens = lex("test", r"[\a]").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::CharLiteral);
        assert_eq!(tokens[2].kind, TokenKind::RightBracket);
    }

    #[test]
    fn test_backslash_at_eof() {
        assert_eq!(lex_err("\\"), "lex error at test:1:1: invalid character literal");
    }

    #[test]
    fn test_control_characters_scan_as_symbols() {
        let tokens = lex("test", "\u{0007}").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Symbol);
    }

    // ========================================
    // Dispatch
    // ========================================

    #[test]
    fn test_paired_dispatch_rescans_delimiter() {
        assert_eq!(texts("#{1}"), vec!["#{", "{", "1", "}"]);
        assert_eq!(texts("#(inc %)"), vec!["#(", "(", "inc", "%", ")"]);
        assert_eq!(texts(r#"#"a+""#), vec!["#\"", "\"a+\""]);
    }

    #[test]
    fn test_reader_conditional_dispatch() {
        assert_eq!(texts("#?(:clj 1)"), vec!["#?", "(", ":clj", "1", ")"]);
        assert_eq!(texts("#?@(:clj [1])"), vec!["#?@", "(", ":clj", "[", "1", "]", ")"]);
    }

    #[test]
    fn test_namespaced_map_dispatch() {
        assert_eq!(texts("#:foo{:a 1}"), vec!["#:", ":foo", "{", ":a", "1", "}"]);
        assert_eq!(texts("#::{:b 2}"), vec!["#:", "::", "{", ":b", "2", "}"]);
        let tokens = lex("test", "#:foo{}").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].pos.col, 2);
    }

    #[test]
    fn test_self_contained_dispatch() {
        assert_eq!(texts("#'a #_b #^c #=d"), vec!["#'", "a", "#_", "b", "#^", "c", "#=", "d"]);
    }

    #[test]
    fn test_tag_whitespace_sensitivity() {
        use TokenKind::*;
        assert_eq!(kinds("#foo"), vec![Octothorpe, Symbol, Eof]);
        assert_eq!(kinds("# foo"), vec![Octothorpe, Symbol, Eof]);
        assert_eq!(kinds("# _"), vec![Octothorpe, Symbol, Eof]);
        assert_eq!(kinds("#_"), vec![Dispatch, Eof]);
    }

    #[test]
    fn test_shebang_comment() {
        let tokens = lex("test", "#! hello!\n1").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].text, "#! hello!");
    }

    #[test]
    fn test_unreadable_dispatch() {
        assert_eq!(lex_err("#<X Y Z>"), "lex error at test:1:1: unreadable dispatch macro");
    }

    #[test]
    fn test_octothorpe_at_eof() {
        assert_eq!(kinds("#"), vec![TokenKind::Octothorpe, TokenKind::Eof]);
    }

    // ========================================
    // Positions and termination
    // ========================================

    #[test]
    fn test_positions_track_lines_and_byte_columns() {
        let tokens = lex("test", "a\n  (é b)").unwrap();
        let b = tokens.iter().find(|t| t.text == "b").unwrap();
        assert_eq!((b.pos.line, b.pos.col, b.pos.offset), (2, 7, 8));
        let newline = &tokens[1];
        assert_eq!((newline.pos.line, newline.pos.col), (1, 2));
    }

    #[test]
    fn test_terminal_token_repeats() {
        let mut lexer = Lexer::new("test", "\"open");
        let first = lexer.next_token();
        assert_eq!(first.kind, TokenKind::Error);
        assert_eq!(lexer.next_token(), first);
        assert_eq!(lexer.next(), None);

        let mut lexer = Lexer::new("test", "x");
        assert_eq!(lexer.next_token().kind, TokenKind::Symbol);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    }
}
