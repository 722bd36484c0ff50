/// Parser core types and entrypoint.
///
/// This chunk defines the [`Parser`] type, its token plumbing (one-token lookahead with a single pushback slot),
/// and the top-level `parse()` loop.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module while avoiding a single "god file".

/// Parser state.
///
/// ## Notes
/// - The parser is strictly fail-fast: the first scan or parse error aborts the whole parse.
/// - Nodes are allocated bottom-up, so every child's parent link is set as soon as its parent exists.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    tree: Tree,
    /// Token handed back by `backup()`, returned by the next `next()`.
    pending: Option<Token>,
    in_fn_literal: bool,
}

impl<'a> Parser<'a> {
    /// Create a new parser pulling tokens from `lexer`.
    ///
    /// ## Parameters
    /// - `lexer`: Token source produced by `cljfmt_syntax::lexer`.
    /// - `options`: Which nodes to keep; recorded on the resulting tree.
    pub fn new(lexer: Lexer<'a>, options: ParseOptions) -> Self {
        Self {
            lexer,
            tree: Tree::new(options),
            pending: None,
            in_fn_literal: false,
        }
    }

    /// Parse every top-level form until EOF.
    ///
    /// ## Errors
    /// Returns the first [`SyntaxError`]; no partial tree is produced.
    pub fn parse(mut self) -> Result<Tree, SyntaxError> {
        while let Some(id) = self.parse_next()? {
            if self.include(id) {
                self.tree.push_root(id);
            }
        }
        tracing::debug!(roots = self.tree.roots().len(), nodes = self.tree.arena_len(), "parsed tree");
        Ok(self.tree)
    }

    // ========================================================================
    // Token plumbing
    // ========================================================================

    fn next(&mut self) -> Result<Token, SyntaxError> {
        if let Some(tok) = self.pending.take() {
            return Ok(tok);
        }
        let tok = self.lexer.next_token();
        if tok.kind == TokenKind::Error {
            return Err(tok.into_error());
        }
        Ok(tok)
    }

    /// Push `tok` back so the next `next()` returns it again.
    ///
    /// ## Panics
    /// Two consecutive backups are a parser bug, not an input error.
    fn backup(&mut self, tok: Token) {
        if self.pending.replace(tok).is_some() {
            panic!("backup() called twice consecutively");
        }
    }

    fn error(&self, pos: &Pos, message: impl Into<String>) -> SyntaxError {
        SyntaxError::parse(pos.clone(), message)
    }

    fn unexpected(&self, tok: &Token) -> SyntaxError {
        self.error(&tok.pos, format!("unexpected token {:?}", tok.text))
    }

    fn unexpected_eof(&self, pos: &Pos) -> SyntaxError {
        self.error(pos, "unexpected EOF")
    }

    fn alloc(&mut self, pos: Pos, kind: NodeKind) -> NodeId {
        self.tree.alloc(pos, kind)
    }

    /// Whether a freshly parsed node should be kept, given the tree options.
    fn include(&self, id: NodeId) -> bool {
        let options = self.tree.options();
        if options.ignore_comment_forms && self.tree.is_comment_form(id) {
            return false;
        }
        let kind = self.tree.kind(id);
        if options.ignore_reader_discard && matches!(kind, NodeKind::ReaderDiscard(_)) {
            return false;
        }
        options.include_non_semantic || kind.is_semantic()
    }

    // ========================================================================
    // Forms
    // ========================================================================

    /// Parse the next form of any kind. Returns `None` at EOF.
    fn parse_next(&mut self) -> Result<Option<NodeId>, SyntaxError> {
        let tok = self.next()?;
        let id = match tok.kind {
            TokenKind::Eof => return Ok(None),
            TokenKind::Symbol => {
                let kind = match tok.text.as_str() {
                    "nil" => NodeKind::Nil,
                    "true" => NodeKind::Bool(true),
                    "false" => NodeKind::Bool(false),
                    _ => NodeKind::Symbol(tok.text),
                };
                self.alloc(tok.pos, kind)
            }
            TokenKind::CharLiteral => self.parse_char_literal(tok)?,
            TokenKind::Comment => self.alloc(tok.pos, NodeKind::Comment(tok.text)),
            TokenKind::Keyword => self.alloc(tok.pos, NodeKind::Keyword(tok.text)),
            TokenKind::Newline => self.alloc(tok.pos, NodeKind::Newline),
            TokenKind::Number => self.alloc(tok.pos, NodeKind::Number(tok.text)),
            TokenKind::String => {
                let body = strip_delimiters(&tok.text);
                self.alloc(tok.pos, NodeKind::String(body))
            }
            TokenKind::LeftParen => self.parse_list(tok.pos)?,
            TokenKind::LeftBracket => self.parse_vector(tok.pos)?,
            TokenKind::LeftBrace => self.parse_map(tok.pos, None)?,
            TokenKind::AtSign => self.parse_wrapper(tok.pos, NodeKind::Deref)?,
            TokenKind::Apostrophe => self.parse_wrapper(tok.pos, NodeKind::Quote)?,
            TokenKind::Backtick => self.parse_wrapper(tok.pos, NodeKind::SyntaxQuote)?,
            TokenKind::Circumflex => self.parse_wrapper(tok.pos, NodeKind::Metadata)?,
            TokenKind::Tilde => self.parse_unquote(tok.pos)?,
            TokenKind::Dispatch => self.parse_dispatch(tok)?,
            TokenKind::Octothorpe => self.parse_tag(tok.pos)?,
            TokenKind::RightParen
            | TokenKind::RightBracket
            | TokenKind::RightBrace
            | TokenKind::Error => return Err(self.unexpected(&tok)),
        };
        Ok(Some(id))
    }

    /// Parse the next semantically meaningful form, skipping comments and newlines.
    ///
    /// ## Errors
    /// Reaching EOF first is an "unexpected EOF" error at the EOF token.
    fn parse_next_semantic(&mut self) -> Result<NodeId, SyntaxError> {
        loop {
            let tok = self.next()?;
            if tok.kind == TokenKind::Eof {
                return Err(self.unexpected_eof(&tok.pos));
            }
            let pos = tok.pos.clone();
            self.backup(tok);
            match self.parse_next()? {
                Some(id) if self.tree.kind(id).is_semantic() => return Ok(id),
                Some(_) => continue,
                None => return Err(self.unexpected_eof(&pos)),
            }
        }
    }
}

/// Drop exactly one leading and one trailing character (the quotes).
fn strip_delimiters(text: &str) -> String {
    let mut chars = text.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}
